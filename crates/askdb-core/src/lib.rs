pub mod accounts;
pub mod config;
pub mod db;
pub mod error;
pub mod llm;
pub mod pipeline;
pub mod prompt;
pub mod schema;
pub mod sql;
pub mod validate;

pub use error::QueryError;
