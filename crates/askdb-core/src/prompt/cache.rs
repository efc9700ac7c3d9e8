use std::collections::HashMap;
use std::future::Future;
use std::sync::{Arc, Mutex, PoisonError, RwLock};

use crate::prompt::builder::{build_prompt, default_prompt, Prompt};
use crate::schema::SchemaMap;

/// Where the prompt handed out by [`PromptCache::refresh_with`] came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PromptSource {
    /// Built from a schema read just now.
    Fresh,
    /// Schema read failed; the last good prompt for the key was reused.
    Stale,
    /// Schema read failed and nothing was cached; the schema-less prompt was used.
    Default,
}

/// Immutable prompts per database key.
///
/// Readers take an `Arc` snapshot. Refreshes of one key are serialised; refreshes of
/// different keys run independently.
#[derive(Default)]
pub struct PromptCache {
    entries: RwLock<HashMap<String, Arc<Prompt>>>,
    writers: Mutex<HashMap<String, Arc<tokio::sync::Mutex<()>>>>,
}

impl PromptCache {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, key: &str) -> Option<Arc<Prompt>> {
        self.entries
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .get(key)
            .cloned()
    }

    /// Cached prompt for `key`, or the schema-less default when none was ever built.
    pub fn get_or_default(&self, key: &str) -> (Arc<Prompt>, PromptSource) {
        match self.get(key) {
            Some(prompt) => (prompt, PromptSource::Stale),
            None => (Arc::new(default_prompt()), PromptSource::Default),
        }
    }

    pub fn insert(&self, key: &str, schema: &SchemaMap) -> Arc<Prompt> {
        let prompt = Arc::new(build_prompt(schema));
        self.entries
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(key.to_string(), Arc::clone(&prompt));
        prompt
    }

    /// Loads the schema for `key` and replaces its prompt.
    ///
    /// When `load` fails or finds no tables, the previous prompt for the same key is
    /// returned, or the default prompt if there is none. Only one `load` per key runs
    /// at a time.
    pub async fn refresh_with<F, Fut>(&self, key: &str, load: F) -> (Arc<Prompt>, PromptSource)
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = anyhow::Result<SchemaMap>>,
    {
        let writer = self.writer(key);
        let outcome = {
            let _guard = writer.lock().await;
            match load().await {
                Ok(schema) if !schema.is_empty() => (self.insert(key, &schema), PromptSource::Fresh),
                Ok(_) => self.fallback(key, "database has no tables"),
                Err(e) => self.fallback(key, &format!("{e:#}")),
            }
        };
        self.release_writer(key, writer);
        outcome
    }

    fn fallback(&self, key: &str, reason: &str) -> (Arc<Prompt>, PromptSource) {
        let (prompt, source) = self.get_or_default(key);
        tracing::warn!(
            key,
            ?source,
            "Failed to read database structure, using fallback prompt: {reason}"
        );
        (prompt, source)
    }

    fn writer(&self, key: &str) -> Arc<tokio::sync::Mutex<()>> {
        let mut writers = self.writers.lock().unwrap_or_else(PoisonError::into_inner);
        Arc::clone(writers.entry(key.to_string()).or_default())
    }

    /// Drops the per-key lock once no other refresh holds or waits on it.
    fn release_writer(&self, key: &str, writer: Arc<tokio::sync::Mutex<()>>) {
        let mut writers = self.writers.lock().unwrap_or_else(PoisonError::into_inner);
        let idle = writers
            .get(key)
            .is_some_and(|w| Arc::ptr_eq(w, &writer) && Arc::strong_count(&writer) == 2);
        if idle {
            writers.remove(key);
        }
    }

    #[cfg(test)]
    fn writer_count(&self) -> usize {
        self.writers.lock().unwrap_or_else(PoisonError::into_inner).len()
    }
}
