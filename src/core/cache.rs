//! Artifact caching for sharing loaded models across pipelines.
//!
//! Fitted artifacts are read-only once loaded, so every pipeline built from
//! the same source can share one copy instead of re-reading the files on
//! each request.

use std::any::{Any, TypeId};
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::Mutex;

/// Implemented by artifact sources to produce a stable cache key.
pub trait ArtifactKey {
    fn cache_key(&self) -> String;
}

type CacheStorage = HashMap<(TypeId, String), Arc<dyn Any + Send + Sync>>;

/// A thread-safe cache of loaded artifact bundles, keyed by type and source.
pub struct ArtifactCache {
    cache: Arc<Mutex<CacheStorage>>,
}

impl ArtifactCache {
    pub fn new() -> Self {
        Self {
            cache: Arc::new(Mutex::new(HashMap::new())),
        }
    }

    /// Get a cached value or create it with `loader`.
    ///
    /// The lock is not held while `loader` runs, so two concurrent misses for
    /// the same key may both load; the later insert wins and both callers get
    /// equivalent values.
    pub async fn get_or_create<M, F>(&self, key: &str, loader: F) -> anyhow::Result<M>
    where
        M: Clone + Send + Sync + 'static,
        F: FnOnce() -> anyhow::Result<M>,
    {
        let cache_key = (TypeId::of::<M>(), key.to_string());

        {
            let cache = self.cache.lock().await;
            if let Some(model) = cache.get(&cache_key).and_then(|c| c.downcast_ref::<M>()) {
                tracing::debug!(key, "artifact cache hit");
                return Ok(model.clone());
            }
        }

        let model = loader()?;

        {
            let mut cache = self.cache.lock().await;
            cache.insert(
                cache_key,
                Arc::new(model.clone()) as Arc<dyn Any + Send + Sync>,
            );
        }
        tracing::debug!(key, "artifact cache miss, loaded");

        Ok(model)
    }

    pub async fn clear(&self) {
        self.cache.lock().await.clear();
    }

    pub async fn len(&self) -> usize {
        self.cache.lock().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.cache.lock().await.is_empty()
    }
}

impl Default for ArtifactCache {
    fn default() -> Self {
        Self::new()
    }
}

static GLOBAL_ARTIFACT_CACHE: once_cell::sync::Lazy<ArtifactCache> =
    once_cell::sync::Lazy::new(ArtifactCache::new);

/// The process-wide artifact cache.
pub fn global_cache() -> &'static ArtifactCache {
    &GLOBAL_ARTIFACT_CACHE
}
