use std::fmt;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use sqlx::mysql::MySqlConnectOptions;

use crate::schema::SchemaMap;
use crate::schema::reader;
use crate::sql::executor;
use crate::sql::result::SqlResult;

pub const DEFAULT_MYSQL_PORT: u16 = 3306;

/// Connection parameters for one MySQL database.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DbTarget {
    pub host: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub port: Option<u16>,
    pub user: String,
    pub password: String,
    pub database: String,
}

impl DbTarget {
    pub fn port_or_default(&self) -> u16 {
        self.port.unwrap_or(DEFAULT_MYSQL_PORT)
    }

    /// Stable identity of the database, used to key cached prompts.
    pub fn cache_key(&self) -> String {
        format!(
            "{}@{}:{}/{}",
            self.user,
            self.host,
            self.port_or_default(),
            self.database
        )
    }

    pub fn connect_options(&self) -> MySqlConnectOptions {
        let mut opts = MySqlConnectOptions::new()
            .host(&self.host)
            .port(self.port_or_default())
            .username(&self.user)
            .password(&self.password);
        if !self.database.is_empty() {
            opts = opts.database(&self.database);
        }
        opts
    }
}

// keeps passwords out of logs
impl fmt::Debug for DbTarget {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DbTarget")
            .field("host", &self.host)
            .field("port", &self.port)
            .field("user", &self.user)
            .field("password", &"***")
            .field("database", &self.database)
            .finish()
    }
}

/// The two database operations the query pipeline needs.
#[async_trait]
pub trait Database: Send + Sync {
    async fn read_schema(&self, target: &DbTarget) -> anyhow::Result<SchemaMap>;

    async fn execute(&self, target: &DbTarget, sql: &str) -> Result<SqlResult, sqlx::Error>;
}

/// Opens a fresh connection per call and closes it before returning.
#[derive(Debug, Default, Clone, Copy)]
pub struct MySqlDatabase;

#[async_trait]
impl Database for MySqlDatabase {
    async fn read_schema(&self, target: &DbTarget) -> anyhow::Result<SchemaMap> {
        reader::read_schema(&target.connect_options()).await
    }

    async fn execute(&self, target: &DbTarget, sql: &str) -> Result<SqlResult, sqlx::Error> {
        executor::execute_sql(&target.connect_options(), sql).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn target() -> DbTarget {
        DbTarget {
            host: "db.internal".into(),
            port: None,
            user: "app".into(),
            password: "hunter2".into(),
            database: "shop".into(),
        }
    }

    #[test]
    fn cache_key_includes_default_port() {
        assert_eq!(target().cache_key(), "app@db.internal:3306/shop");
    }

    #[test]
    fn debug_redacts_password() {
        let out = format!("{:?}", target());
        assert!(!out.contains("hunter2"));
        assert!(out.contains("db.internal"));
    }

    #[test]
    fn port_is_omitted_from_json_when_unset() {
        let v = serde_json::to_value(target()).unwrap();
        assert!(v.get("port").is_none());

        let parsed: DbTarget = serde_json::from_value(serde_json::json!({
            "host": "h", "user": "u", "password": "p", "database": "d"
        }))
        .unwrap();
        assert_eq!(parsed.port, None);
    }
}
