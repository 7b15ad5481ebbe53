//! Chain Types Module
//!
//! Value types crossing the chain boundary. These mirror the contract's
//! records; the API layer never mutates them, it observes and caches them.

use serde::{Deserialize, Serialize};

use crate::loyalty::Tier;

// == Transaction Reference ==
/// Opaque reference to a committed chain transaction.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TxRef(pub String);

impl std::fmt::Display for TxRef {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

// == NFT Metadata ==
/// One record per user. The points and tier fields are snapshots taken when
/// the metadata was last rendered; the rendering is regenerated whenever the
/// tier changes, never patched in place.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NftMetadata {
    pub token_id: u64,
    pub metadata_uri: String,
    pub points: u64,
    pub tier: Tier,
    pub expiry_time: u64,
    pub exists: bool,
}

// == Free-Wash Status ==
/// Chain-owned coupon state. Granted as a side effect of a recorded
/// transaction; consumed by usage or passage of time.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FreeWashStatus {
    pub available: bool,
    pub used: bool,
    /// Absolute expiry, Unix seconds
    pub expiry_time: u64,
}

// == Activity Event ==
/// One entry of a user's on-chain activity log.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ActivityEvent {
    pub event_type: String,
    pub user: String,
    pub timestamp: u64,
    #[serde(default)]
    pub data: serde_json::Value,
}

// == Active Free-Wash ==
/// A user with a currently-active free-wash coupon, as paged by the chain.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ActiveFreeWash {
    pub address: String,
    pub expiry_time: u64,
}
