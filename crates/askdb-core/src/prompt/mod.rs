pub mod builder;
pub mod cache;

pub use builder::{build_prompt, default_prompt, Prompt};
pub use cache::{PromptCache, PromptSource};
