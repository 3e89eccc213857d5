//! Bounded cache of stitched predictions.
//!
//! Keyed by the exact flattened token string. Two documents whose plain
//! tokens join to the same string share an entry even if their sentence
//! structure differs; the predictions depend only on the forms, so this
//! matters only when a form itself contains the key separator.

use std::num::NonZeroUsize;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex};

use lru::LruCache;
use serde::Serialize;
use tracing::debug;

use super::distribution::LabelDistribution;

/// Default number of distinct token sequences kept.
pub const DEFAULT_CACHE_CAPACITY: usize = 1000;

/// Predictions for one whole flat sequence.
pub type CachedPredictions = Arc<Vec<LabelDistribution>>;

/// Snapshot of cache counters.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct CacheStats {
    pub entries: usize,
    pub capacity: usize,
    pub hits: u64,
    pub misses: u64,
}

/// Least-recently-used prediction cache, shared across requests.
pub struct PredictionCache {
    entries: Mutex<LruCache<String, CachedPredictions>>,
    capacity: NonZeroUsize,
    hits: AtomicU64,
    misses: AtomicU64,
}

impl PredictionCache {
    pub fn new(capacity: NonZeroUsize) -> Self {
        Self {
            entries: Mutex::new(LruCache::new(capacity)),
            capacity,
            hits: AtomicU64::new(0),
            misses: AtomicU64::new(0),
        }
    }

    /// Look up a key, marking it as recently used.
    pub fn get(&self, key: &str) -> Option<CachedPredictions> {
        let found = self
            .entries
            .lock()
            .ok()
            .and_then(|mut guard| guard.get(key).cloned());

        if found.is_some() {
            self.hits.fetch_add(1, Ordering::Relaxed);
        } else {
            self.misses.fetch_add(1, Ordering::Relaxed);
        }
        found
    }

    /// Store predictions, evicting the least recently used entry when full.
    /// Racing writers for the same key store equal values, so the last one
    /// simply wins.
    pub fn insert(&self, key: String, predictions: CachedPredictions) {
        if let Ok(mut guard) = self.entries.lock() {
            if let Some((evicted, _)) = guard.push(key, predictions) {
                if !guard.contains(&evicted) {
                    debug!(key_len = evicted.len(), "Evicted cached predictions");
                }
            }
        }
    }

    pub fn len(&self) -> usize {
        self.entries.lock().map(|guard| guard.len()).unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn capacity(&self) -> usize {
        self.capacity.get()
    }

    pub fn clear(&self) {
        if let Ok(mut guard) = self.entries.lock() {
            guard.clear();
        }
    }

    pub fn stats(&self) -> CacheStats {
        CacheStats {
            entries: self.len(),
            capacity: self.capacity(),
            hits: self.hits.load(Ordering::Relaxed),
            misses: self.misses.load(Ordering::Relaxed),
        }
    }
}

impl Default for PredictionCache {
    fn default() -> Self {
        Self::new(NonZeroUsize::new(DEFAULT_CACHE_CAPACITY).unwrap_or(NonZeroUsize::MIN))
    }
}
