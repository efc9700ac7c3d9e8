use serde_json::{Number, Value};
use sqlx::mysql::{MySqlConnectOptions, MySqlConnection, MySqlRow};
use chrono::Timelike;
use sqlx::types::chrono::{NaiveDate, NaiveDateTime, NaiveTime};
use sqlx::types::Decimal;
use sqlx::{Column, Connection, Executor, Row, TypeInfo, ValueRef};

use crate::sql::classify::{classify, StatementKind};
use crate::sql::result::{Row as ResultRow, SqlResult};

/// Runs `sql` on a fresh connection and closes it on every path.
///
/// INSERT/UPDATE run in a transaction and report affected rows; anything else is sent
/// as-is and its rows (if any) are returned. Statements go over the text protocol, so
/// whatever the server accepts is executed.
pub async fn execute_sql(opts: &MySqlConnectOptions, sql: &str) -> Result<SqlResult, sqlx::Error> {
    let mut conn = MySqlConnection::connect_with(opts).await?;

    let result = run(&mut conn, sql).await;

    if let Err(e) = conn.close().await {
        tracing::warn!("failed to close query connection: {e}");
    }
    result
}

async fn run(conn: &mut MySqlConnection, sql: &str) -> Result<SqlResult, sqlx::Error> {
    match classify(sql) {
        StatementKind::Mutating => {
            let mut tx = conn.begin().await?;
            let done = (&mut *tx).execute(sqlx::raw_sql(sql)).await?;
            tx.commit().await?;
            Ok(SqlResult::mutation(done.rows_affected()))
        }
        StatementKind::Read => {
            let rows = (&mut *conn).fetch_all(sqlx::raw_sql(sql)).await?;
            Ok(SqlResult::Rows(rows.iter().map(row_to_json).collect()))
        }
    }
}

pub fn row_to_json(row: &MySqlRow) -> ResultRow {
    row.columns()
        .iter()
        .map(|col| {
            let idx = col.ordinal();
            (col.name().to_string(), cell_to_json(row, idx, col.type_info().name()))
        })
        .collect()
}

fn cell_to_json(row: &MySqlRow, idx: usize, type_name: &str) -> Value {
    match row.try_get_raw(idx) {
        Ok(raw) if raw.is_null() => return Value::Null,
        Err(_) => return Value::Null,
        Ok(_) => {}
    }

    let decoded = match type_name {
        "BOOLEAN" | "TINYINT" | "SMALLINT" | "MEDIUMINT" | "INT" | "BIGINT" | "YEAR" => row
            .try_get_unchecked::<i64, _>(idx)
            .ok()
            .map(Value::from),
        name if name.ends_with("UNSIGNED") => row
            .try_get_unchecked::<u64, _>(idx)
            .ok()
            .map(Value::from),
        "FLOAT" => row
            .try_get::<f32, _>(idx)
            .ok()
            .and_then(|v| Number::from_f64(f64::from(v)))
            .map(Value::Number),
        "DOUBLE" => row
            .try_get::<f64, _>(idx)
            .ok()
            .and_then(Number::from_f64)
            .map(Value::Number),
        "DECIMAL" => row.try_get::<Decimal, _>(idx).ok().map(decimal_to_json),
        "DATE" => row
            .try_get::<NaiveDate, _>(idx)
            .ok()
            .map(|d| Value::String(d.format("%Y-%m-%d").to_string())),
        "DATETIME" | "TIMESTAMP" => row
            .try_get::<NaiveDateTime, _>(idx)
            .ok()
            .map(|dt| Value::String(format_datetime(&dt))),
        "TIME" => row
            .try_get::<NaiveTime, _>(idx)
            .ok()
            .map(|t| Value::String(format_time(&t))),
        "JSON" => row.try_get_unchecked::<String, _>(idx).ok().map(Value::String),
        _ => None,
    };

    decoded.unwrap_or_else(|| text_fallback(row, idx))
}

fn text_fallback(row: &MySqlRow, idx: usize) -> Value {
    if let Ok(s) = row.try_get::<String, _>(idx) {
        return Value::String(s);
    }
    if let Ok(bytes) = row.try_get_unchecked::<Vec<u8>, _>(idx) {
        return Value::String(String::from_utf8_lossy(&bytes).into_owned());
    }
    Value::Null
}

/// `YYYY-MM-DDTHH:MM:SS`, plus `.ffffff` only when there is a fractional part.
pub fn format_datetime(dt: &NaiveDateTime) -> String {
    format!("{}T{}", dt.format("%Y-%m-%d"), format_time(&dt.time()))
}

pub fn format_time(t: &NaiveTime) -> String {
    let micros = t.nanosecond() / 1_000;
    if micros == 0 {
        t.format("%H:%M:%S").to_string()
    } else {
        format!("{}.{:06}", t.format("%H:%M:%S"), micros)
    }
}

fn decimal_to_json(d: Decimal) -> Value {
    let s = d.to_string();
    s.parse::<f64>()
        .ok()
        .and_then(Number::from_f64)
        .map(Value::Number)
        .unwrap_or(Value::String(s))
}
