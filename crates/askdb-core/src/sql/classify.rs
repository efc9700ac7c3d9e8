/// How the executor treats a statement.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StatementKind {
    /// INSERT or UPDATE: run in a transaction, report affected rows.
    Mutating,
    /// Everything else, including DELETE and DDL: run and fetch rows.
    Read,
}

const MUTATING_PREFIXES: [&str; 2] = ["INSERT", "UPDATE"];

/// Prefix check on the trimmed, uppercased statement text.
pub fn classify(sql: &str) -> StatementKind {
    let head = sql.trim_start();
    let is_mutating = MUTATING_PREFIXES.iter().any(|prefix| {
        head.get(..prefix.len())
            .is_some_and(|h| h.eq_ignore_ascii_case(prefix))
    });

    if is_mutating {
        StatementKind::Mutating
    } else {
        StatementKind::Read
    }
}
