use thiserror::Error;

/// Failures of a single natural-language query, in the order the pipeline can hit them.
///
/// The `Display` text of each variant is what callers show as the error detail.
#[derive(Debug, Error)]
pub enum QueryError {
    #[error("Account not found")]
    AccountNotFound,

    #[error("Failed to generate SQL query")]
    GenerationFailed,

    #[error("Rejected SQL: {0}")]
    Rejected(String),

    #[error("Database error: {0}")]
    Database(String),

    #[error("Account store error: {0}")]
    Store(String),
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("{0} not found in environment variables.")]
    Missing(&'static str),

    #[error("invalid value '{value}' for {name}: {reason}")]
    Invalid {
        name: &'static str,
        value: String,
        reason: String,
    },
}
