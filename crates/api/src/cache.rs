use std::collections::HashMap;

use tokio::sync::RwLock;

/// Tag shared by every movie-derived response.
pub const MOVIES_CACHE_TAG: &str = "movies";

/// Output-cache invalidation hook.
///
/// Responses are not cached by this server; an edge cache keyed on the
/// per-tag generation can be put in front of it. Writes bump the generation
/// of every tag they affect so stale entries stop matching.
///
/// Thread-safe via interior `RwLock`; designed to be wrapped in `Arc` and
/// shared across the application.
#[derive(Default)]
pub struct OutputCache {
    generations: RwLock<HashMap<String, u64>>,
}

impl OutputCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Invalidate everything tagged with `tag`. Returns the new generation.
    pub async fn evict_by_tag(&self, tag: &str) -> u64 {
        let mut generations = self.generations.write().await;
        let generation = generations.entry(tag.to_string()).or_insert(0);
        *generation += 1;
        tracing::debug!(tag, generation = *generation, "Output cache tag evicted");
        *generation
    }

    /// Current generation of `tag`; zero if it was never evicted.
    pub async fn generation(&self, tag: &str) -> u64 {
        self.generations
            .read()
            .await
            .get(tag)
            .copied()
            .unwrap_or(0)
    }
}
