//! Chain Module
//!
//! Abstract contract over the authoritative ledger. The gateway talks to a
//! `dyn Chain`; the concrete implementation is either the HTTP bridge client
//! or the in-memory chain used for local development and tests.

mod http;
mod memory;
mod types;

pub use http::HttpChain;
pub use memory::MemoryChain;
pub use types::{ActiveFreeWash, ActivityEvent, FreeWashStatus, NftMetadata, TxRef};

use async_trait::async_trait;

use crate::error::Result;
use crate::loyalty::Tier;

// == Chain Trait ==
/// Read/write contract with the authoritative ledger.
///
/// All reads return the chain's current truth; all writes return a
/// transaction reference once committed. Implementations do not retry:
/// retry policy belongs to callers, and a failure here must leave no trace
/// in any cache.
#[async_trait]
pub trait Chain: Send + Sync {
    /// Current point balance for a user. Never negative; implementations
    /// must fail closed (`DataIntegrity`) instead of truncating values that
    /// exceed the representable range.
    async fn get_user_points(&self, address: &str) -> Result<u64>;

    /// The user's NFT metadata record.
    async fn get_nft_metadata(&self, address: &str) -> Result<NftMetadata>;

    /// The user's free-wash coupon state.
    async fn get_free_wash_status(&self, address: &str) -> Result<FreeWashStatus>;

    /// One page of the user's activity log (0-based page index).
    async fn get_activity_log(
        &self,
        address: &str,
        page: u32,
        page_size: u32,
    ) -> Result<Vec<ActivityEvent>>;

    /// The raw admin list, excluding the implicit owner.
    async fn get_admins(&self) -> Result<Vec<String>>;

    /// The contract owner address.
    async fn owner(&self) -> Result<String>;

    /// Records a wash transaction. The chain credits points and grants a
    /// free-wash coupon as side effects.
    async fn record_transaction(&self, address: &str, timestamp: u64) -> Result<TxRef>;

    /// Replaces the user's NFT metadata rendering.
    async fn update_nft_metadata(
        &self,
        address: &str,
        uri: &str,
        tier: Tier,
        points: u64,
    ) -> Result<TxRef>;

    /// Adds an admin address.
    async fn add_admin(&self, address: &str) -> Result<TxRef>;

    /// Removes an admin address.
    async fn remove_admin(&self, address: &str) -> Result<TxRef>;

    /// Deducts points for a package redemption.
    async fn redeem_package(&self, address: &str, package_id: &str, cost: u64) -> Result<TxRef>;

    /// One page of users whose free-wash coupons are currently active.
    async fn get_active_free_wash_users(
        &self,
        page: u32,
        page_size: u32,
    ) -> Result<Vec<ActiveFreeWash>>;
}
