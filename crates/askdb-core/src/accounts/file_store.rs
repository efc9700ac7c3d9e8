use std::path::{Path, PathBuf};

use anyhow::Context;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tokio::sync::Mutex;

use crate::accounts::{Account, AccountStore};

/// On-disk layout: `{"accounts": [...]}`.
#[derive(Debug, Default, Serialize, Deserialize)]
pub struct AccountsFile {
    #[serde(default)]
    pub accounts: Vec<Account>,
}

/// Accounts kept in one pretty-printed JSON file.
///
/// Appends rewrite the whole file through a sibling temp file and a rename, one at a
/// time per store. A missing file reads as an empty list.
pub struct JsonFileAccountStore {
    path: PathBuf,
    write_lock: Mutex<()>,
}

impl JsonFileAccountStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            write_lock: Mutex::new(()),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    async fn load(&self) -> anyhow::Result<AccountsFile> {
        let raw = match tokio::fs::read_to_string(&self.path).await {
            Ok(raw) => raw,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                return Ok(AccountsFile::default())
            }
            Err(e) => {
                return Err(e).with_context(|| format!("read accounts file: {}", self.path.display()))
            }
        };
        if raw.trim().is_empty() {
            return Ok(AccountsFile::default());
        }
        serde_json::from_str(&raw)
            .with_context(|| format!("parse accounts file: {}", self.path.display()))
    }

    async fn store(&self, file: &AccountsFile) -> anyhow::Result<()> {
        let json = serde_json::to_string_pretty(file)?;

        let mut tmp = self.path.clone().into_os_string();
        tmp.push(".tmp");
        let tmp = PathBuf::from(tmp);

        tokio::fs::write(&tmp, json)
            .await
            .with_context(|| format!("write accounts file: {}", tmp.display()))?;
        tokio::fs::rename(&tmp, &self.path)
            .await
            .with_context(|| format!("replace accounts file: {}", self.path.display()))
    }
}

#[async_trait]
impl AccountStore for JsonFileAccountStore {
    async fn append(&self, account: Account) -> anyhow::Result<()> {
        let _guard = self.write_lock.lock().await;
        let mut file = self.load().await?;
        file.accounts.push(account);
        self.store(&file).await?;
        tracing::debug!(count = file.accounts.len(), "accounts file rewritten");
        Ok(())
    }

    async fn list(&self) -> anyhow::Result<Vec<Account>> {
        Ok(self.load().await?.accounts)
    }
}
