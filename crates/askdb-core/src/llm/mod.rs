use async_trait::async_trait;
use thiserror::Error;

use crate::prompt::Prompt;

pub mod gemini;

pub use gemini::GeminiClient;

#[derive(Debug, Error)]
pub enum GenerationError {
    #[error("request failed: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("model API returned HTTP {status}: {body}")]
    Status { status: u16, body: String },

    #[error("model returned no text")]
    Empty,
}

/// Turns a question into SQL text using a prompt that describes the database.
#[async_trait]
pub trait SqlGenerator: Send + Sync {
    /// Returns the model's raw completion, expected to be one bare SQL statement.
    async fn generate_sql(&self, prompt: &Prompt, question: &str) -> Result<String, GenerationError>;
}
