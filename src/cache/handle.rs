//! Cache Handle Module
//!
//! Shared async handle over the cache store. Every operation here is
//! best-effort: failures are logged and converted into misses or no-ops so
//! a cache problem can never fail a ledger read or write. The handle is
//! constructed once at startup and injected into the ledger gateway; no
//! module-level cache state exists.

use std::sync::Arc;

use serde::de::DeserializeOwned;
use serde::Serialize;
use tokio::sync::RwLock;
use tracing::{debug, warn};

use crate::cache::store::SCAN_BATCH;
use crate::cache::{CacheStats, CacheStore};
use crate::error::CacheError;

// == Cache Handle ==
/// Cloneable, thread-safe cache handle with absorb-all-errors semantics.
#[derive(Clone)]
pub struct Cache {
    inner: Arc<RwLock<CacheStore>>,
}

impl Cache {
    /// Wraps a cache store in a shared handle.
    pub fn new(store: CacheStore) -> Self {
        Self {
            inner: Arc::new(RwLock::new(store)),
        }
    }

    /// Shared reference to the underlying store, used by the TTL cleanup task.
    pub fn store(&self) -> Arc<RwLock<CacheStore>> {
        Arc::clone(&self.inner)
    }

    // == Get ==
    /// Returns the raw cached payload, or None on miss or any cache error.
    pub async fn get(&self, key: &str) -> Option<String> {
        let mut store = self.inner.write().await;
        match store.get(key) {
            Ok(value) => Some(value),
            Err(CacheError::NotFound(_)) | Err(CacheError::Expired(_)) => None,
            Err(err) => {
                warn!(key, %err, "cache get failed, treating as miss");
                None
            }
        }
    }

    /// Returns the cached value decoded as `T`.
    ///
    /// A payload that no longer decodes is deleted and treated as a miss,
    /// forcing the caller back to the authoritative source.
    pub async fn get_json<T: DeserializeOwned>(&self, key: &str) -> Option<T> {
        let raw = self.get(key).await?;
        match serde_json::from_str(&raw) {
            Ok(value) => Some(value),
            Err(err) => {
                warn!(key, %err, "cached payload failed to decode, dropping entry");
                self.delete(key).await;
                None
            }
        }
    }

    // == Set ==
    /// Encodes and stores a value with the given TTL (None = store default).
    /// Failures are logged and swallowed.
    pub async fn set_json<T: Serialize>(&self, key: &str, value: &T, ttl: Option<u64>) {
        let payload = match serde_json::to_string(value) {
            Ok(payload) => payload,
            Err(err) => {
                warn!(key, %err, "failed to encode cache payload");
                return;
            }
        };

        let mut store = self.inner.write().await;
        if let Err(err) = store.set(key.to_string(), payload, ttl) {
            warn!(key, %err, "cache set failed");
        }
    }

    // == Delete ==
    /// Removes a single key. Deleting an absent key is a no-op.
    pub async fn delete(&self, key: &str) {
        let mut store = self.inner.write().await;
        match store.delete(key) {
            Ok(()) => debug!(key, "cache entry invalidated"),
            Err(CacheError::NotFound(_)) => {}
            Err(err) => warn!(key, %err, "cache delete failed"),
        }
    }

    // == Delete By Pattern ==
    /// Removes every key matching a glob pattern, in bounded passes.
    ///
    /// The write lock is released between passes so a large keyspace never
    /// blocks concurrent traffic for the full sweep. Returns the total
    /// number of entries removed.
    pub async fn delete_by_pattern(&self, pattern: &str) -> usize {
        let mut total = 0;
        loop {
            let removed = {
                let mut store = self.inner.write().await;
                store.delete_by_pattern_bounded(pattern, SCAN_BATCH)
            };
            total += removed;
            if removed < SCAN_BATCH {
                break;
            }
            tokio::task::yield_now().await;
        }

        if total > 0 {
            debug!(pattern, total, "cache entries invalidated by pattern");
        }
        total
    }

    // == Stats ==
    /// Returns a snapshot of cache statistics.
    pub async fn stats(&self) -> CacheStats {
        let store = self.inner.read().await;
        store.stats()
    }
}
