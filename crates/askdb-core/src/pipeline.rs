use std::sync::Arc;

use serde::Serialize;

use crate::db::{Database, DbTarget};
use crate::error::QueryError;
use crate::llm::SqlGenerator;
use crate::prompt::{Prompt, PromptCache, PromptSource};
use crate::sql::SqlResult;
use crate::validate::static_check;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct QueryOutcome {
    pub sql_query: String,
    pub results: SqlResult,
}

/// When a request re-reads the schema before generating SQL.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SchemaRefresh {
    /// Re-read on every request.
    PerRequest,
    /// Use whatever was loaded earlier (e.g. at startup).
    Cached,
}

/// schema → prompt → model → SQL execution, for one database at a time.
pub struct QueryService {
    db: Arc<dyn Database>,
    generator: Arc<dyn SqlGenerator>,
    prompts: PromptCache,
    strict_sql: bool,
}

impl QueryService {
    pub fn new(db: Arc<dyn Database>, generator: Arc<dyn SqlGenerator>) -> Self {
        Self {
            db,
            generator,
            prompts: PromptCache::new(),
            strict_sql: false,
        }
    }

    /// Only let single SELECT/INSERT/UPDATE statements reach the database.
    pub fn with_strict_sql(mut self, strict: bool) -> Self {
        self.strict_sql = strict;
        self
    }

    pub fn prompts(&self) -> &PromptCache {
        &self.prompts
    }

    /// Reads the schema of `target` and rebuilds its prompt, falling back on failure.
    pub async fn refresh_prompt(&self, target: &DbTarget) -> (Arc<Prompt>, PromptSource) {
        let db = Arc::clone(&self.db);
        self.prompts
            .refresh_with(&target.cache_key(), || async move { db.read_schema(target).await })
            .await
    }

    pub async fn answer(
        &self,
        target: &DbTarget,
        question: &str,
        refresh: SchemaRefresh,
    ) -> Result<QueryOutcome, QueryError> {
        let prompt = match refresh {
            SchemaRefresh::PerRequest => self.refresh_prompt(target).await.0,
            SchemaRefresh::Cached => self.prompts.get_or_default(&target.cache_key()).0,
        };

        let sql_query = self.generate(&prompt, question).await?;

        if self.strict_sql {
            static_check::check_allowed(&sql_query).map_err(|e| {
                tracing::warn!(sql = %sql_query, "rejected generated SQL: {e}");
                QueryError::Rejected(e.to_string())
            })?;
        }

        let results = self.db.execute(target, &sql_query).await.map_err(|e| {
            tracing::error!(sql = %sql_query, "A database error occurred: {e}");
            QueryError::Database(e.to_string())
        })?;

        Ok(QueryOutcome { sql_query, results })
    }

    async fn generate(&self, prompt: &Prompt, question: &str) -> Result<String, QueryError> {
        match self.generator.generate_sql(prompt, question).await {
            Ok(sql) if !sql.trim().is_empty() => {
                tracing::info!(sql = %sql, "generated SQL");
                Ok(sql)
            }
            Ok(_) => {
                tracing::error!("model returned an empty SQL statement");
                Err(QueryError::GenerationFailed)
            }
            Err(e) => {
                tracing::error!("An error occurred while generating SQL: {e}");
                Err(QueryError::GenerationFailed)
            }
        }
    }
}
