use askdb_core::accounts::Account;
use askdb_core::db::DbTarget;
use askdb_core::pipeline::{QueryOutcome, SchemaRefresh};
use askdb_core::QueryError;
use axum::extract::State;
use axum::routing::{get, post};
use axum::{Json, Router};
use serde::{Deserialize, Serialize};
use tower_http::trace::TraceLayer;

use crate::error::ApiError;
use crate::state::{MultiTenantState, SingleTenantState};

#[derive(Debug, Deserialize)]
pub struct QueryRequest {
    pub query: String,
}

#[derive(Debug, Deserialize)]
pub struct TenantQueryRequest {
    pub token: String,
    pub query: String,
}

#[derive(Debug, Serialize)]
pub struct AddAccountResponse {
    pub message: String,
    pub token: String,
}

#[derive(Debug, Serialize)]
pub struct AccountsResponse {
    pub accounts: Vec<Account>,
}

pub fn single_tenant_router(state: SingleTenantState) -> Router {
    Router::new()
        .route("/api/query", post(query_database))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

pub fn multi_tenant_router(state: MultiTenantState) -> Router {
    Router::new()
        .route("/api/add_account", post(add_account))
        .route("/api/get_accounts", get(get_accounts))
        .route("/api/query", post(query_tenant_database))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

async fn query_database(
    State(state): State<SingleTenantState>,
    Json(req): Json<QueryRequest>,
) -> Result<Json<QueryOutcome>, ApiError> {
    let outcome = state
        .queries
        .answer(&state.target, &req.query, SchemaRefresh::Cached)
        .await?;
    Ok(Json(outcome))
}

async fn add_account(
    State(state): State<MultiTenantState>,
    Json(target): Json<DbTarget>,
) -> Result<Json<AddAccountResponse>, ApiError> {
    let account = Account::new(target);
    let token = account.token.clone();
    tracing::info!(
        host = %account.target.host,
        database = %account.target.database,
        "registering account"
    );

    state.accounts.append(account).await?;

    Ok(Json(AddAccountResponse {
        message: "Account added successfully".to_string(),
        token,
    }))
}

async fn get_accounts(
    State(state): State<MultiTenantState>,
) -> Result<Json<AccountsResponse>, ApiError> {
    let accounts = state.accounts.list().await?;
    Ok(Json(AccountsResponse { accounts }))
}

async fn query_tenant_database(
    State(state): State<MultiTenantState>,
    Json(req): Json<TenantQueryRequest>,
) -> Result<Json<QueryOutcome>, ApiError> {
    let account = state
        .accounts
        .find_by_token(&req.token)
        .await?
        .ok_or(QueryError::AccountNotFound)?;

    let outcome = state
        .queries
        .answer(&account.target, &req.query, SchemaRefresh::PerRequest)
        .await?;
    Ok(Json(outcome))
}
