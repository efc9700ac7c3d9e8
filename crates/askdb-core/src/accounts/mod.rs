use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::db::DbTarget;

pub mod file_store;

pub use file_store::JsonFileAccountStore;

/// A registered database, addressed by its generated token.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Account {
    pub token: String,
    #[serde(flatten)]
    pub target: DbTarget,
}

impl Account {
    /// Registers `target` under a fresh random token.
    pub fn new(target: DbTarget) -> Self {
        Self {
            token: uuid::Uuid::new_v4().to_string(),
            target,
        }
    }
}

/// Storage for registered accounts. Append must not lose concurrent writes.
#[async_trait]
pub trait AccountStore: Send + Sync {
    async fn append(&self, account: Account) -> anyhow::Result<()>;

    async fn list(&self) -> anyhow::Result<Vec<Account>>;

    async fn find_by_token(&self, token: &str) -> anyhow::Result<Option<Account>> {
        Ok(self.list().await?.into_iter().find(|a| a.token == token))
    }
}
