use std::sync::Arc;

use askdb_core::accounts::AccountStore;
use askdb_core::db::DbTarget;
use askdb_core::pipeline::QueryService;

/// State for the single-database server.
#[derive(Clone)]
pub struct SingleTenantState {
    pub queries: Arc<QueryService>,
    pub target: DbTarget,
}

/// State for the server that resolves a database per request from registered accounts.
#[derive(Clone)]
pub struct MultiTenantState {
    pub queries: Arc<QueryService>,
    pub accounts: Arc<dyn AccountStore>,
}
