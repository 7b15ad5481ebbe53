//! Blob Store Module
//!
//! Opaque content-addressed storage for NFT metadata renderings. The
//! orchestrator only uploads; fetch-by-address is the consumer's concern.

use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Mutex;

use async_trait::async_trait;

use crate::error::Result;

// == Blob Store Trait ==
#[async_trait]
pub trait BlobStore: Send + Sync {
    /// Uploads a JSON document and returns its address.
    async fn put_json(&self, payload: &serde_json::Value) -> Result<String>;
}

// == Memory Blob Store ==
/// In-process blob store used locally and in tests.
#[derive(Default)]
pub struct MemoryBlobStore {
    objects: Mutex<HashMap<String, serde_json::Value>>,
    counter: AtomicU64,
}

impl MemoryBlobStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Fetches a stored document by address (test convenience).
    pub fn get(&self, uri: &str) -> Option<serde_json::Value> {
        self.objects.lock().expect("blob store poisoned").get(uri).cloned()
    }
}

#[async_trait]
impl BlobStore for MemoryBlobStore {
    async fn put_json(&self, payload: &serde_json::Value) -> Result<String> {
        let n = self.counter.fetch_add(1, Ordering::SeqCst) + 1;
        let uri = format!("blob://{:016x}", n);
        self.objects
            .lock()
            .expect("blob store poisoned")
            .insert(uri.clone(), payload.clone());
        Ok(uri)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_put_and_get() {
        let blobs = MemoryBlobStore::new();
        let payload = serde_json::json!({"tier": "silver", "points": 1010});

        let uri = blobs.put_json(&payload).await.unwrap();
        assert!(uri.starts_with("blob://"));
        assert_eq!(blobs.get(&uri), Some(payload));
    }

    #[tokio::test]
    async fn test_uris_are_unique() {
        let blobs = MemoryBlobStore::new();
        let a = blobs.put_json(&serde_json::json!(1)).await.unwrap();
        let b = blobs.put_json(&serde_json::json!(1)).await.unwrap();
        assert_ne!(a, b);
    }
}
