//! Cache Module
//!
//! Provides in-memory caching with TTL expiration, LRU eviction, and
//! glob-pattern bulk invalidation. Used exclusively by the ledger gateway;
//! no other component touches the cache directly.

mod entry;
mod handle;
mod lru;
mod pattern;
mod stats;
mod store;


// Re-export public types
pub use entry::CacheEntry;
pub use handle::Cache;
pub use lru::LruTracker;
pub use pattern::glob_match;
pub use stats::CacheStats;
pub use store::{CacheStore, SCAN_BATCH};

// == Public Constants ==
/// Maximum allowed key length in bytes
pub const MAX_KEY_LENGTH: usize = 256;

/// Maximum allowed value size in bytes
pub const MAX_VALUE_SIZE: usize = 1024 * 1024; // 1 MB
