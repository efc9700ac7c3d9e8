use std::sync::Arc;

use askdb_core::pipeline::{QueryService, SchemaRefresh};
use askdb_core::prompt::PromptSource;
use askdb_core::sql::{Row, SqlResult};
use askdb_core::QueryError;
use serde_json::json;

mod common;
use crate::common::{target, users_schema, FakeDatabase, FakeGenerator};

fn count_rows(n: i64) -> SqlResult {
    let mut row = Row::new();
    row.insert("COUNT(*)".into(), json!(n));
    SqlResult::Rows(vec![row])
}

#[tokio::test]
async fn counts_users_end_to_end() {
    let db = FakeDatabase::new(Some(users_schema()), Some(count_rows(3)));
    let generator = FakeGenerator::replying("SELECT COUNT(*) FROM USERS;");
    let service = QueryService::new(db.clone(), generator.clone());

    let outcome = service
        .answer(&target("shop"), "How many registered users are there?", SchemaRefresh::PerRequest)
        .await
        .expect("query");

    assert_eq!(outcome.sql_query, "SELECT COUNT(*) FROM USERS;");
    assert_eq!(
        serde_json::to_value(&outcome).unwrap(),
        json!({ "sql_query": "SELECT COUNT(*) FROM USERS;", "results": [ { "COUNT(*)": 3 } ] })
    );
    assert_eq!(
        db.executed(),
        vec![("shop".to_string(), "SELECT COUNT(*) FROM USERS;".to_string())]
    );

    let prompts = generator.prompts();
    assert_eq!(prompts.len(), 1);
    assert!(prompts[0].contains("USERS table columns: user_id, username, email\n"));
    assert!(prompts[0].ends_with("in the output.\nHow many registered users are there?"));
}

#[tokio::test]
async fn failed_generation_never_reaches_the_database() {
    let db = FakeDatabase::new(Some(users_schema()), Some(count_rows(3)));
    let service = QueryService::new(db.clone(), FakeGenerator::failing());

    let err = service
        .answer(&target("shop"), "How many users?", SchemaRefresh::PerRequest)
        .await
        .unwrap_err();

    assert!(matches!(err, QueryError::GenerationFailed));
    assert_eq!(err.to_string(), "Failed to generate SQL query");
    assert!(db.executed().is_empty());
}

#[tokio::test]
async fn blank_generation_counts_as_failure() {
    let db = FakeDatabase::new(Some(users_schema()), Some(count_rows(3)));
    let service = QueryService::new(db.clone(), FakeGenerator::replying("  \n"));

    let err = service
        .answer(&target("shop"), "anything", SchemaRefresh::Cached)
        .await
        .unwrap_err();

    assert!(matches!(err, QueryError::GenerationFailed));
    assert!(db.executed().is_empty());
}

#[tokio::test]
async fn driver_message_is_attached_to_database_errors() {
    let db = FakeDatabase::new(Some(users_schema()), None);
    let service = QueryService::new(db, FakeGenerator::replying("SELECT * FROM NOPE;"));

    let err = service
        .answer(&target("shop"), "show me nope", SchemaRefresh::PerRequest)
        .await
        .unwrap_err();

    let msg = err.to_string();
    assert!(msg.starts_with("Database error: "), "{msg}");
    assert!(msg.contains("Table 'shop.NOPE' doesn't exist"), "{msg}");
}

#[tokio::test]
async fn delete_passes_through_by_default() {
    let db = FakeDatabase::new(Some(users_schema()), Some(SqlResult::Rows(vec![])));
    let service = QueryService::new(db.clone(), FakeGenerator::replying("DELETE FROM USERS;"));

    let outcome = service
        .answer(&target("shop"), "remove everyone", SchemaRefresh::PerRequest)
        .await
        .expect("query");

    assert_eq!(outcome.results, SqlResult::Rows(vec![]));
    assert_eq!(db.executed().len(), 1);
}

#[tokio::test]
async fn strict_mode_rejects_delete_before_execution() {
    let db = FakeDatabase::new(Some(users_schema()), Some(SqlResult::Rows(vec![])));
    let service = QueryService::new(db.clone(), FakeGenerator::replying("DELETE FROM USERS;"))
        .with_strict_sql(true);

    let err = service
        .answer(&target("shop"), "remove everyone", SchemaRefresh::PerRequest)
        .await
        .unwrap_err();

    assert!(matches!(err, QueryError::Rejected(_)));
    assert!(db.executed().is_empty());
}

#[tokio::test]
async fn schema_failure_falls_back_to_last_prompt_for_that_database() {
    let db = FakeDatabase::new(Some(users_schema()), Some(count_rows(3)));
    let generator = FakeGenerator::replying("SELECT COUNT(*) FROM USERS;");
    let service = QueryService::new(db.clone(), generator.clone());
    let shop = target("shop");

    let (_, source) = service.refresh_prompt(&shop).await;
    assert_eq!(source, PromptSource::Fresh);

    *db.schema.lock().unwrap() = None;
    let (prompt, source) = service.refresh_prompt(&shop).await;
    assert_eq!(source, PromptSource::Stale);
    assert!(prompt.as_str().contains("USERS table columns"));

    let (prompt, source) = service.refresh_prompt(&target("other")).await;
    assert_eq!(source, PromptSource::Default);
    assert!(!prompt.as_str().contains("USERS table columns"));

    service
        .answer(&shop, "How many users?", SchemaRefresh::PerRequest)
        .await
        .expect("stale prompt still answers");
    assert!(generator.prompts()[0].contains("USERS table columns"));
}

#[tokio::test]
async fn cached_mode_does_not_reread_schema() {
    let db = FakeDatabase::new(Some(users_schema()), Some(count_rows(3)));
    let service = QueryService::new(db.clone(), FakeGenerator::replying("SELECT 1"));
    let shop = target("shop");

    service.refresh_prompt(&shop).await;
    for _ in 0..3 {
        service.answer(&shop, "q", SchemaRefresh::Cached).await.unwrap();
    }
    assert_eq!(db.schema_reads(), vec!["shop".to_string()]);

    service.answer(&shop, "q", SchemaRefresh::PerRequest).await.unwrap();
    assert_eq!(db.schema_reads().len(), 2);
}

#[tokio::test]
async fn concurrent_tenants_see_their_own_prompts() {
    let db = FakeDatabase::new(Some(users_schema()), Some(count_rows(1)));
    let generator = FakeGenerator::replying("SELECT 1");
    let service = Arc::new(QueryService::new(db, generator.clone()));

    let mut handles = Vec::new();
    for i in 0..8 {
        let service = Arc::clone(&service);
        handles.push(tokio::spawn(async move {
            let t = target(&format!("db{i}"));
            service.answer(&t, "q", SchemaRefresh::PerRequest).await.map(|_| ())
        }));
    }
    for h in handles {
        h.await.unwrap().unwrap();
    }

    for i in 0..8 {
        assert!(service.prompts().get(&target(&format!("db{i}")).cache_key()).is_some());
    }
    assert_eq!(generator.prompts().len(), 8);
}
