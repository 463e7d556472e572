//! Component B (cache half): a bounded, strictly least-recently-used cache
//! from content hash to embedding.
//!
//! Deliberately built on the dedicated `lru` crate rather than a
//! probabilistic admission cache (TinyLFU-style caches cannot guarantee "the
//! first `k` inserts are evicted after `N+k` distinct inserts", which is an
//! exact, tested invariant here).

use std::num::NonZeroUsize;

use lru::LruCache;
use parking_lot::Mutex;

/// Thread-safe LRU cache for embeddings, keyed by content hash.
pub struct EmbeddingCache {
    inner: Mutex<LruCache<String, Vec<f32>>>,
}

impl EmbeddingCache {
    /// `capacity` of 0 is treated as 1 (an `LruCache` cannot be zero-sized).
    pub fn new(capacity: usize) -> Self {
        let capacity = NonZeroUsize::new(capacity).unwrap_or(NonZeroUsize::new(1).unwrap());
        EmbeddingCache {
            inner: Mutex::new(LruCache::new(capacity)),
        }
    }

    /// On hit, moves the entry to most-recently-used and returns a clone of
    /// the cached vector.
    pub fn get(&self, content_hash: &str) -> Option<Vec<f32>> {
        self.inner.lock().get(content_hash).cloned()
    }

    /// Ignores empty vectors. On replace, moves to MRU without changing
    /// size; at capacity, evicts the least-recently-used entry first.
    pub fn set(&self, content_hash: &str, embedding: Vec<f32>) {
        if embedding.is_empty() {
            return;
        }
        self.inner.lock().put(content_hash.to_string(), embedding);
    }

    pub fn clear(&self) {
        self.inner.lock().clear();
    }

    pub fn len(&self) -> usize {
        self.inner.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn v(x: f32) -> Vec<f32> {
        vec![x]
    }

    #[test]
    fn test_get_miss_returns_none() {
        let cache = EmbeddingCache::new(4);
        assert!(cache.get("missing").is_none());
    }

    #[test]
    fn test_set_then_get_round_trips() {
        let cache = EmbeddingCache::new(4);
        cache.set("h1", v(1.0));
        assert_eq!(cache.get("h1"), Some(v(1.0)));
    }

    #[test]
    fn test_set_ignores_empty_embedding() {
        let cache = EmbeddingCache::new(4);
        cache.set("h1", Vec::new());
        assert_eq!(cache.len(), 0);
    }

    #[test]
    fn test_eviction_after_n_plus_k_inserts_without_reaccess() {
        let cache = EmbeddingCache::new(3);
        cache.set("h0", v(0.0));
        cache.set("h1", v(1.0));
        cache.set("h2", v(2.0));
        // Capacity reached; two more distinct inserts should evict h0, h1.
        cache.set("h3", v(3.0));
        cache.set("h4", v(4.0));

        assert!(cache.get("h0").is_none());
        assert!(cache.get("h1").is_none());
        assert_eq!(cache.len(), 3);
        assert_eq!(cache.get("h2"), Some(v(2.0)));
        assert_eq!(cache.get("h3"), Some(v(3.0)));
        assert_eq!(cache.get("h4"), Some(v(4.0)));
    }

    #[test]
    fn test_reaccess_protects_from_eviction() {
        let cache = EmbeddingCache::new(2);
        cache.set("h0", v(0.0));
        cache.set("h1", v(1.0));
        // Touch h0 so it becomes most-recently-used.
        assert_eq!(cache.get("h0"), Some(v(0.0)));
        cache.set("h2", v(2.0));

        // h1 was least-recently-used, so it is evicted instead of h0.
        assert!(cache.get("h1").is_none());
        assert_eq!(cache.get("h0"), Some(v(0.0)));
        assert_eq!(cache.get("h2"), Some(v(2.0)));
    }

    #[test]
    fn test_clear_empties_cache() {
        let cache = EmbeddingCache::new(4);
        cache.set("h0", v(0.0));
        cache.clear();
        assert_eq!(cache.len(), 0);
        assert!(cache.get("h0").is_none());
    }
}
