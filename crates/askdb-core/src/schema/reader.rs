use anyhow::Context;
use sqlx::mysql::{MySqlConnectOptions, MySqlConnection};
use sqlx::{Connection, Executor, Row};

use crate::schema::SchemaMap;

/// Reads every table and its columns from the database behind `opts`.
///
/// The connection is closed whether or not the reads succeed.
pub async fn read_schema(opts: &MySqlConnectOptions) -> anyhow::Result<SchemaMap> {
    let mut conn = MySqlConnection::connect_with(opts)
        .await
        .context("connect mysql")?;

    let result = describe_tables(&mut conn).await;

    if let Err(e) = conn.close().await {
        tracing::warn!("failed to close schema connection: {e}");
    }
    result
}

async fn describe_tables(conn: &mut MySqlConnection) -> anyhow::Result<SchemaMap> {
    let tables = first_column(
        (&mut *conn)
            .fetch_all(sqlx::raw_sql("SHOW TABLES"))
            .await
            .context("list tables")?,
    )?;

    let mut schema = SchemaMap::with_capacity(tables.len());
    for table in tables {
        let describe = format!("DESCRIBE {}", quote_ident(&table));
        let rows = (&mut *conn)
            .fetch_all(sqlx::raw_sql(&describe))
            .await
            .with_context(|| format!("describe table {table}"))?;
        schema.insert(table, first_column(rows)?);
    }

    Ok(schema)
}

// SHOW/DESCRIBE name columns are sometimes flagged binary by the server
fn first_column(rows: Vec<sqlx::mysql::MySqlRow>) -> anyhow::Result<Vec<String>> {
    rows.iter()
        .map(|row| {
            row.try_get_unchecked::<String, _>(0)
                .context("decode name column")
        })
        .collect()
}

pub(crate) fn quote_ident(name: &str) -> String {
    format!("`{}`", name.replace('`', "``"))
}
