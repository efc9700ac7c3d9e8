use std::sync::Arc;

use askdb_core::accounts::{AccountStore, JsonFileAccountStore};
use askdb_core::config::{AppConfig, Mode};
use askdb_core::db::MySqlDatabase;
use askdb_core::llm::GeminiClient;
use askdb_core::pipeline::QueryService;
use askdb_core::prompt::PromptSource;
use tracing_subscriber::EnvFilter;

mod error;
mod routes;
mod state;

use crate::state::{MultiTenantState, SingleTenantState};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenv::dotenv().ok();
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info,tower_http=info".into()),
        )
        .init();

    let config = AppConfig::from_env()?;

    let queries = Arc::new(
        QueryService::new(
            Arc::new(MySqlDatabase),
            Arc::new(GeminiClient::new(&config.gemini)),
        )
        .with_strict_sql(config.strict_sql),
    );

    let app = match config.mode {
        Mode::Single => {
            let target = config.database.clone();
            let (_, source) = queries.refresh_prompt(&target).await;
            if source == PromptSource::Fresh {
                tracing::info!(database = %target.database, "schema loaded, prompt ready");
            } else {
                tracing::warn!("Failed to read database structure. Using default prompt.");
            }
            routes::single_tenant_router(SingleTenantState { queries, target })
        }
        Mode::Multi => {
            let accounts: Arc<dyn AccountStore> =
                Arc::new(JsonFileAccountStore::new(&config.accounts_path));
            tracing::info!(path = %config.accounts_path.display(), "using account store");
            routes::multi_tenant_router(MultiTenantState { queries, accounts })
        }
    };

    let bind_addr = config.bind_addr();
    let listener = tokio::net::TcpListener::bind(&bind_addr).await?;
    tracing::info!(mode = ?config.mode, model = %config.gemini.model, "Server running on {}", bind_addr);
    axum::serve(listener, app).await?;

    Ok(())
}
