use anyhow::{anyhow, bail};
use sqlparser::ast::Statement;
use sqlparser::dialect::MySqlDialect;
use sqlparser::parser::Parser;

/// Basic static SQL parse check.
pub fn parse_ok(sql: &str) -> anyhow::Result<Vec<Statement>> {
    let dialect = MySqlDialect {};
    Ok(Parser::parse_sql(&dialect, sql)?)
}

/// Accepts exactly one SELECT, INSERT or UPDATE statement.
pub fn check_allowed(sql: &str) -> anyhow::Result<()> {
    let statements = parse_ok(sql).map_err(|e| anyhow!("unparsable statement: {e}"))?;

    let stmt = match statements.as_slice() {
        [] => bail!("no statement found"),
        [stmt] => stmt,
        many => bail!("expected one statement, found {}", many.len()),
    };

    match stmt {
        Statement::Query(_) | Statement::Insert(..) | Statement::Update { .. } => Ok(()),
        other => bail!("statement kind not allowed: {}", statement_head(other)),
    }
}

fn statement_head(stmt: &Statement) -> String {
    stmt.to_string()
        .split_whitespace()
        .next()
        .unwrap_or_default()
        .to_ascii_uppercase()
}
