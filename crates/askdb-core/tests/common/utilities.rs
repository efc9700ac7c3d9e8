use std::sync::{Arc, Mutex};

use askdb_core::db::{Database, DbTarget};
use askdb_core::llm::{GenerationError, SqlGenerator};
use askdb_core::prompt::Prompt;
use askdb_core::schema::SchemaMap;
use askdb_core::sql::SqlResult;
use async_trait::async_trait;

pub fn target(database: &str) -> DbTarget {
    DbTarget {
        host: "localhost".into(),
        port: None,
        user: "root".into(),
        password: "secret".into(),
        database: database.into(),
    }
}

pub fn schema(tables: &[(&str, &[&str])]) -> SchemaMap {
    tables
        .iter()
        .map(|(t, cols)| (t.to_string(), cols.iter().map(|c| c.to_string()).collect()))
        .collect()
}

pub fn users_schema() -> SchemaMap {
    schema(&[("USERS", &["user_id", "username", "email"])])
}

/// Records every call; answers from canned values.
#[derive(Default)]
pub struct FakeDatabase {
    pub schema: Mutex<Option<SchemaMap>>,
    pub result: Mutex<Option<SqlResult>>,
    pub schema_reads: Mutex<Vec<String>>,
    pub executed: Mutex<Vec<(String, String)>>,
}

impl FakeDatabase {
    pub fn new(schema: Option<SchemaMap>, result: Option<SqlResult>) -> Arc<Self> {
        Arc::new(Self {
            schema: Mutex::new(schema),
            result: Mutex::new(result),
            ..Default::default()
        })
    }

    pub fn executed(&self) -> Vec<(String, String)> {
        self.executed.lock().unwrap().clone()
    }

    pub fn schema_reads(&self) -> Vec<String> {
        self.schema_reads.lock().unwrap().clone()
    }
}

#[async_trait]
impl Database for FakeDatabase {
    async fn read_schema(&self, target: &DbTarget) -> anyhow::Result<SchemaMap> {
        self.schema_reads.lock().unwrap().push(target.database.clone());
        self.schema
            .lock()
            .unwrap()
            .clone()
            .ok_or_else(|| anyhow::anyhow!("Can't connect to MySQL server on 'localhost:3306'"))
    }

    async fn execute(&self, target: &DbTarget, sql: &str) -> Result<SqlResult, sqlx::Error> {
        self.executed
            .lock()
            .unwrap()
            .push((target.database.clone(), sql.to_string()));
        self.result.lock().unwrap().clone().ok_or_else(|| {
            sqlx::Error::Protocol("1146 (42S02): Table 'shop.NOPE' doesn't exist".into())
        })
    }
}

/// Returns a fixed completion and keeps the prompts it was given.
pub struct FakeGenerator {
    reply: Option<String>,
    pub prompts: Mutex<Vec<String>>,
}

impl FakeGenerator {
    pub fn replying(sql: &str) -> Arc<Self> {
        Arc::new(Self {
            reply: Some(sql.to_string()),
            prompts: Mutex::new(Vec::new()),
        })
    }

    pub fn failing() -> Arc<Self> {
        Arc::new(Self {
            reply: None,
            prompts: Mutex::new(Vec::new()),
        })
    }

    pub fn prompts(&self) -> Vec<String> {
        self.prompts.lock().unwrap().clone()
    }
}

#[async_trait]
impl SqlGenerator for FakeGenerator {
    async fn generate_sql(&self, prompt: &Prompt, question: &str) -> Result<String, GenerationError> {
        self.prompts.lock().unwrap().push(prompt.with_question(question));
        self.reply.clone().ok_or(GenerationError::Empty)
    }
}
