//! Response DTOs for the loyalty API
//!
//! Defines the structure of outgoing HTTP response bodies.

use serde::Serialize;

use crate::cache::CacheStats;
use crate::chain::{ActivityEvent, NftMetadata, TxRef};
use crate::loyalty::{FreeWashView, Tier};
use crate::store::UserRecord;

/// Response body for the points endpoint (GET /points/:address)
#[derive(Debug, Clone, Serialize)]
pub struct PointsResponse {
    pub address: String,
    pub points: u64,
    /// Tier derived from the balance, never stored
    pub tier: Tier,
}

impl PointsResponse {
    pub fn new(address: impl Into<String>, points: u64) -> Self {
        Self {
            address: address.into(),
            points,
            tier: Tier::for_points(points),
        }
    }
}

/// Response body for the NFT endpoint (GET /nft/:address)
#[derive(Debug, Clone, Serialize)]
pub struct NftResponse {
    pub address: String,
    #[serde(flatten)]
    pub metadata: NftMetadata,
}

impl NftResponse {
    pub fn new(address: impl Into<String>, metadata: NftMetadata) -> Self {
        Self {
            address: address.into(),
            metadata,
        }
    }
}

/// Response body for the coupon endpoint (GET /freewash/:address)
#[derive(Debug, Clone, Serialize)]
pub struct FreeWashResponse {
    pub address: String,
    #[serde(flatten)]
    pub coupon: FreeWashView,
}

impl FreeWashResponse {
    pub fn new(address: impl Into<String>, coupon: FreeWashView) -> Self {
        Self {
            address: address.into(),
            coupon,
        }
    }
}

/// Response body for one activity page (GET /activity/:address)
#[derive(Debug, Clone, Serialize)]
pub struct ActivityResponse {
    pub address: String,
    pub page: u32,
    pub page_size: u32,
    pub events: Vec<ActivityEvent>,
}

/// Response body for the admin list (GET /admins)
#[derive(Debug, Clone, Serialize)]
pub struct AdminsResponse {
    /// Admin addresses, contract owner included
    pub admins: Vec<String>,
}

/// Response body for the is-admin check (GET /admins/:address)
#[derive(Debug, Clone, Serialize)]
pub struct IsAdminResponse {
    pub address: String,
    pub is_admin: bool,
}

/// Response body for admin mutations (POST /admins, DELETE /admins/:address)
#[derive(Debug, Clone, Serialize)]
pub struct AdminMutationResponse {
    pub message: String,
    pub address: String,
    pub tx_ref: TxRef,
}

impl AdminMutationResponse {
    pub fn added(address: impl Into<String>, tx_ref: TxRef) -> Self {
        let address = address.into();
        Self {
            message: format!("Admin '{}' added", address),
            address,
            tx_ref,
        }
    }

    pub fn removed(address: impl Into<String>, tx_ref: TxRef) -> Self {
        let address = address.into();
        Self {
            message: format!("Admin '{}' removed", address),
            address,
            tx_ref,
        }
    }
}

/// Response body for user registration (POST /users)
#[derive(Debug, Clone, Serialize)]
pub struct CreateUserResponse {
    pub message: String,
    pub user: UserRecord,
}

impl CreateUserResponse {
    pub fn new(user: UserRecord) -> Self {
        Self {
            message: format!("User '{}' registered", user.address),
            user,
        }
    }
}

/// Response body for a recorded transaction (POST /transactions)
#[derive(Debug, Clone, Serialize)]
pub struct TransactionResponse {
    pub message: String,
    pub transaction_id: u64,
    pub tx_ref: TxRef,
}

impl TransactionResponse {
    pub fn new(transaction_id: u64, tx_ref: TxRef) -> Self {
        Self {
            message: "Transaction recorded".to_string(),
            transaction_id,
            tx_ref,
        }
    }
}

/// Response body for a package redemption (POST /redemptions)
#[derive(Debug, Clone, Serialize)]
pub struct RedemptionResponse {
    pub message: String,
    pub package_id: String,
    pub tx_ref: TxRef,
    /// Balance after the deduction, freshly read from the ledger
    pub remaining_points: u64,
}

impl RedemptionResponse {
    pub fn new(package_id: impl Into<String>, tx_ref: TxRef, remaining_points: u64) -> Self {
        let package_id = package_id.into();
        Self {
            message: format!("Package '{}' redeemed", package_id),
            package_id,
            tx_ref,
            remaining_points,
        }
    }
}

/// Response body for the stats endpoint (GET /cache/stats)
#[derive(Debug, Clone, Serialize)]
pub struct StatsResponse {
    pub hits: u64,
    pub misses: u64,
    pub evictions: u64,
    pub invalidations: u64,
    pub total_entries: usize,
    /// Hit rate (hits / (hits + misses))
    pub hit_rate: f64,
}

impl StatsResponse {
    pub fn new(stats: &CacheStats) -> Self {
        Self {
            hits: stats.hits,
            misses: stats.misses,
            evictions: stats.evictions,
            invalidations: stats.invalidations,
            total_entries: stats.total_entries,
            hit_rate: stats.hit_rate(),
        }
    }
}

/// Response body for the health endpoint (GET /health)
#[derive(Debug, Clone, Serialize)]
pub struct HealthResponse {
    /// Health status (e.g., "healthy")
    pub status: String,
    /// Current timestamp in ISO 8601 format
    pub timestamp: String,
}

impl HealthResponse {
    /// Creates a new HealthResponse with current timestamp
    pub fn healthy() -> Self {
        Self {
            status: "healthy".to_string(),
            timestamp: chrono::Utc::now().to_rfc3339(),
        }
    }
}
