//! Ledger Gateway Module
//!
//! Single point of contact with the authoritative chain. Every read goes
//! through the cache (read-through); every successful write invalidates the
//! affected keys before returning, so a post-write read always reaches the
//! chain. A failed write invalidates nothing: the cache keeps reflecting
//! the last state that actually committed.
//!
//! Cache problems never propagate from here; the chain is consulted on any
//! cache error. Chain problems always propagate as `LedgerUnavailable` and
//! are never retried internally.

use std::future::Future;
use std::sync::Arc;

use serde::de::DeserializeOwned;
use serde::Serialize;
use tracing::debug;

use crate::cache::Cache;
use crate::chain::{ActivityEvent, Chain, FreeWashStatus, NftMetadata, TxRef};
use crate::error::Result;
use crate::ledger::keys;
use crate::loyalty::{Tier, WashPackage};

// == Admin Op ==
/// Direction of an admin set mutation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AdminOp {
    Add,
    Remove,
}

// == Ledger Gateway ==
/// Read-through / write-invalidate mediator between cache and chain.
#[derive(Clone)]
pub struct LedgerGateway {
    cache: Cache,
    chain: Arc<dyn Chain>,
}

impl LedgerGateway {
    /// Creates a gateway over an explicitly injected cache and chain.
    pub fn new(cache: Cache, chain: Arc<dyn Chain>) -> Self {
        Self { cache, chain }
    }

    /// The shared cache handle (used by the stats endpoint).
    pub fn cache(&self) -> &Cache {
        &self.cache
    }

    // == Read-Through Core ==
    /// Cache hit returns the decoded shadow copy; miss (or any cache error)
    /// falls through to the chain and repopulates with the default TTL.
    async fn read_through<T, Fut>(&self, key: &str, fetch: Fut) -> Result<T>
    where
        T: Serialize + DeserializeOwned,
        Fut: Future<Output = Result<T>>,
    {
        if let Some(value) = self.cache.get_json::<T>(key).await {
            debug!(key, "ledger read served from cache");
            return Ok(value);
        }

        let value = fetch.await?;
        self.cache.set_json(key, &value, None).await;
        Ok(value)
    }

    // == Reads ==

    /// Current point balance, shadow-cached under `points:{address}`.
    pub async fn read_points(&self, address: &str) -> Result<u64> {
        let address = keys::normalize_address(address);
        self.read_through(&keys::points_key(&address), self.chain.get_user_points(&address))
            .await
    }

    /// Point balance bypassing the current shadow copy: the cached entry is
    /// dropped first, so the returned value always reflects a chain call
    /// (which repopulates the cache). Used where a stale balance would
    /// change a decision, not just a display.
    pub async fn read_points_fresh(&self, address: &str) -> Result<u64> {
        let address = keys::normalize_address(address);
        self.cache.delete(&keys::points_key(&address)).await;
        self.read_points(&address).await
    }

    /// NFT metadata record, shadow-cached under `nft:{address}`.
    pub async fn read_nft_metadata(&self, address: &str) -> Result<NftMetadata> {
        let address = keys::normalize_address(address);
        self.read_through(&keys::nft_key(&address), self.chain.get_nft_metadata(&address))
            .await
    }

    /// Free-wash coupon status, shadow-cached under `freewash:{address}`.
    pub async fn read_free_wash_status(&self, address: &str) -> Result<FreeWashStatus> {
        let address = keys::normalize_address(address);
        self.read_through(
            &keys::free_wash_key(&address),
            self.chain.get_free_wash_status(&address),
        )
        .await
    }

    /// One activity log page; the pagination parameters are part of the key.
    pub async fn read_activity_log(
        &self,
        address: &str,
        page: u32,
        page_size: u32,
    ) -> Result<Vec<ActivityEvent>> {
        let address = keys::normalize_address(address);
        self.read_through(
            &keys::activity_key(&address, page, page_size),
            self.chain.get_activity_log(&address, page, page_size),
        )
        .await
    }

    /// The admin list with the contract owner folded in as an implicit
    /// admin, cached as one list under a fixed key.
    pub async fn read_admins(&self) -> Result<Vec<String>> {
        self.read_through(keys::ADMINS_KEY, async {
            let mut admins = self.chain.get_admins().await?;
            let owner = self.chain.owner().await?;
            if !admins.iter().any(|a| a.eq_ignore_ascii_case(&owner)) {
                admins.push(owner);
            }
            Ok(admins)
        })
        .await
    }

    /// Case-insensitive admin membership check.
    pub async fn is_admin(&self, address: &str) -> Result<bool> {
        let admins = self.read_admins().await?;
        Ok(admins.iter().any(|a| a.eq_ignore_ascii_case(address)))
    }

    // == Writes ==

    /// Records a wash transaction on the chain.
    ///
    /// On success the points, free-wash, and NFT shadow copies for the
    /// address are invalidated synchronously before this returns, so the
    /// very next read reflects a fresh chain call. The chain also appends
    /// an activity event, so every cached activity page for the address is
    /// swept as well. On failure nothing is invalidated and the error
    /// propagates.
    pub async fn write_transaction(&self, address: &str, timestamp: u64) -> Result<TxRef> {
        let address = keys::normalize_address(address);
        let tx_ref = self.chain.record_transaction(&address, timestamp).await?;

        self.cache.delete(&keys::points_key(&address)).await;
        self.cache.delete(&keys::free_wash_key(&address)).await;
        self.cache.delete(&keys::nft_key(&address)).await;
        self.cache
            .delete_by_pattern(&keys::activity_pattern(&address))
            .await;

        debug!(%address, %tx_ref, "transaction recorded, shadow copies invalidated");
        Ok(tx_ref)
    }

    /// Replaces a user's NFT metadata; invalidates `nft:{address}` on
    /// success only.
    pub async fn write_nft_metadata(
        &self,
        address: &str,
        uri: &str,
        tier: Tier,
        points: u64,
    ) -> Result<TxRef> {
        let address = keys::normalize_address(address);
        let tx_ref = self
            .chain
            .update_nft_metadata(&address, uri, tier, points)
            .await?;

        self.cache.delete(&keys::nft_key(&address)).await;
        Ok(tx_ref)
    }

    /// Mutates the admin set; invalidates the fixed admins key on success
    /// only.
    pub async fn write_admin(&self, op: AdminOp, address: &str) -> Result<TxRef> {
        let address = keys::normalize_address(address);
        let tx_ref = match op {
            AdminOp::Add => self.chain.add_admin(&address).await?,
            AdminOp::Remove => self.chain.remove_admin(&address).await?,
        };

        self.cache.delete(keys::ADMINS_KEY).await;
        Ok(tx_ref)
    }

    /// Deducts a package's cost on the chain. On success only, the points
    /// and NFT shadow copies are invalidated and the cached activity pages
    /// are swept, since the chain also appends a redemption event to the
    /// activity log.
    pub async fn write_redemption(&self, address: &str, package: &WashPackage) -> Result<TxRef> {
        let address = keys::normalize_address(address);
        let tx_ref = self
            .chain
            .redeem_package(&address, package.id, package.cost)
            .await?;

        self.cache.delete(&keys::points_key(&address)).await;
        self.cache.delete(&keys::nft_key(&address)).await;
        self.cache
            .delete_by_pattern(&keys::activity_pattern(&address))
            .await;
        Ok(tx_ref)
    }
}

// == Unit Tests ==
#[cfg(test)]
mod tests {
    use super::*;
    use crate::cache::CacheStore;
    use crate::chain::MemoryChain;
    use crate::error::AppError;
    use crate::loyalty::{now_unix, package_by_id};

    fn gateway_over(chain: Arc<MemoryChain>) -> LedgerGateway {
        let cache = Cache::new(CacheStore::new(1000, 600));
        LedgerGateway::new(cache, chain)
    }

    #[tokio::test]
    async fn test_read_through_idempotence() {
        let chain = Arc::new(MemoryChain::new("0xowner"));
        chain.set_points("0xabc", 950);
        let gateway = gateway_over(Arc::clone(&chain));

        assert_eq!(gateway.read_points("0xabc").await.unwrap(), 950);
        assert_eq!(gateway.read_points("0xabc").await.unwrap(), 950);

        // Second read was a cache hit, not a chain call
        assert_eq!(chain.points_reads(), 1);
    }

    #[tokio::test]
    async fn test_mixed_case_addresses_share_one_entry() {
        let chain = Arc::new(MemoryChain::new("0xowner"));
        chain.set_points("0xabc", 950);
        let gateway = gateway_over(Arc::clone(&chain));

        gateway.read_points("0xABC").await.unwrap();
        gateway.read_points("0xabc").await.unwrap();

        assert_eq!(chain.points_reads(), 1);
    }

    #[tokio::test]
    async fn test_write_invalidate_forces_fresh_read() {
        let chain = Arc::new(MemoryChain::with_points_per_wash("0xowner", 60));
        chain.set_points("0xabc", 950);
        let gateway = gateway_over(Arc::clone(&chain));

        assert_eq!(gateway.read_points("0xabc").await.unwrap(), 950);

        gateway
            .write_transaction("0xabc", now_unix())
            .await
            .unwrap();

        // Next read must reflect a fresh chain call, never the stale shadow
        assert_eq!(gateway.read_points("0xabc").await.unwrap(), 1010);
        assert_eq!(chain.points_reads(), 2);
    }

    #[tokio::test]
    async fn test_failed_write_leaves_cache_untouched() {
        let chain = Arc::new(MemoryChain::new("0xowner"));
        chain.set_points("0xabc", 950);
        let gateway = gateway_over(Arc::clone(&chain));

        assert_eq!(gateway.read_points("0xabc").await.unwrap(), 950);

        chain.set_failing(true);
        let err = gateway
            .write_transaction("0xabc", now_unix())
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::LedgerUnavailable(_)));
        chain.set_failing(false);

        // The cached value still reflects the last committed chain state
        assert_eq!(gateway.read_points("0xabc").await.unwrap(), 950);
        assert_eq!(chain.points_reads(), 1);
    }

    #[tokio::test]
    async fn test_cache_failure_transparency() {
        // Zero-capacity cache: every set fails, every get misses
        let chain = Arc::new(MemoryChain::new("0xowner"));
        chain.set_points("0xabc", 950);
        let cache = Cache::new(CacheStore::new(0, 600));
        let gateway = LedgerGateway::new(cache, chain.clone());

        assert_eq!(gateway.read_points("0xabc").await.unwrap(), 950);
        assert_eq!(gateway.read_points("0xabc").await.unwrap(), 950);

        // Both reads fell through to the chain, no error surfaced
        assert_eq!(chain.points_reads(), 2);
    }

    #[tokio::test]
    async fn test_activity_pages_cached_independently() {
        let chain = Arc::new(MemoryChain::new("0xowner"));
        for i in 0..5 {
            chain.record_transaction("0xabc", i).await.unwrap();
        }
        let gateway = gateway_over(Arc::clone(&chain));

        let page0 = gateway.read_activity_log("0xabc", 0, 2).await.unwrap();
        let page1 = gateway.read_activity_log("0xabc", 1, 2).await.unwrap();
        assert_eq!(page0.len(), 2);
        assert_eq!(page1.len(), 2);
        assert_ne!(page0[0].timestamp, page1[0].timestamp);

        // Same page again hits the cache
        let page0_again = gateway.read_activity_log("0xabc", 0, 2).await.unwrap();
        assert_eq!(page0, page0_again);
    }

    #[tokio::test]
    async fn test_transaction_sweeps_cached_activity_pages() {
        let chain = Arc::new(MemoryChain::new("0xowner"));
        chain.record_transaction("0xabc", 1).await.unwrap();
        let gateway = gateway_over(Arc::clone(&chain));

        let before = gateway.read_activity_log("0xabc", 0, 10).await.unwrap();
        assert_eq!(before.len(), 1);

        gateway.write_transaction("0xabc", 2).await.unwrap();

        // The cached page was swept, not served stale
        let after = gateway.read_activity_log("0xabc", 0, 10).await.unwrap();
        assert_eq!(after.len(), 2);
    }

    #[tokio::test]
    async fn test_fresh_read_bypasses_shadow_copy() {
        let chain = Arc::new(MemoryChain::new("0xowner"));
        chain.set_points("0xabc", 500);
        let gateway = gateway_over(Arc::clone(&chain));

        assert_eq!(gateway.read_points("0xabc").await.unwrap(), 500);

        // The chain moved on without going through the gateway
        chain.set_points("0xabc", 2000);

        // The read-through path still serves the shadow copy
        assert_eq!(gateway.read_points("0xabc").await.unwrap(), 500);

        // The fresh read drops it, hits the chain, and repopulates
        assert_eq!(gateway.read_points_fresh("0xabc").await.unwrap(), 2000);
        assert_eq!(gateway.read_points("0xabc").await.unwrap(), 2000);
        assert_eq!(chain.points_reads(), 2);
    }

    #[tokio::test]
    async fn test_owner_is_implicit_admin() {
        let chain = Arc::new(MemoryChain::new("0xOwNeR"));
        chain.add_admin("0xalice").await.unwrap();
        let gateway = gateway_over(Arc::clone(&chain));

        assert!(gateway.is_admin("0xowner").await.unwrap());
        assert!(gateway.is_admin("0xOWNER").await.unwrap());
        assert!(gateway.is_admin("0xALICE").await.unwrap());
        assert!(!gateway.is_admin("0xbob").await.unwrap());

        // All four checks shared one chain fetch of the admin list
        assert_eq!(chain.admin_reads(), 1);
    }

    #[tokio::test]
    async fn test_admin_write_invalidates_list() {
        let chain = Arc::new(MemoryChain::new("0xowner"));
        let gateway = gateway_over(Arc::clone(&chain));

        assert!(!gateway.is_admin("0xalice").await.unwrap());

        gateway.write_admin(AdminOp::Add, "0xalice").await.unwrap();
        assert!(gateway.is_admin("0xalice").await.unwrap());

        gateway
            .write_admin(AdminOp::Remove, "0xalice")
            .await
            .unwrap();
        assert!(!gateway.is_admin("0xalice").await.unwrap());
    }

    #[tokio::test]
    async fn test_admin_write_normalizes_address() {
        let chain = Arc::new(MemoryChain::new("0xowner"));
        let gateway = gateway_over(Arc::clone(&chain));

        gateway.write_admin(AdminOp::Add, "0xALICE").await.unwrap();

        // The chain only ever sees lowercase addresses
        assert_eq!(chain.get_admins().await.unwrap(), vec!["0xalice"]);

        gateway
            .write_admin(AdminOp::Remove, "0xAlice")
            .await
            .unwrap();
        assert!(chain.get_admins().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_redemption_invalidates_points() {
        let chain = Arc::new(MemoryChain::new("0xowner"));
        chain.set_points("0xabc", 2000);
        let gateway = gateway_over(Arc::clone(&chain));

        assert_eq!(gateway.read_points("0xabc").await.unwrap(), 2000);

        let package = package_by_id("deluxe").unwrap();
        gateway.write_redemption("0xabc", package).await.unwrap();

        assert_eq!(gateway.read_points("0xabc").await.unwrap(), 500);
    }

    #[tokio::test]
    async fn test_redemption_sweeps_cached_activity_pages() {
        let chain = Arc::new(MemoryChain::new("0xowner"));
        chain.set_points("0xabc", 2000);
        chain.record_transaction("0xabc", 1).await.unwrap();
        let gateway = gateway_over(Arc::clone(&chain));

        let before = gateway.read_activity_log("0xabc", 0, 10).await.unwrap();
        assert_eq!(before.len(), 1);

        let package = package_by_id("deluxe").unwrap();
        gateway.write_redemption("0xabc", package).await.unwrap();

        // The redemption event must show up on the next page read
        let after = gateway.read_activity_log("0xabc", 0, 10).await.unwrap();
        assert_eq!(after.len(), 2);
        assert!(after.iter().any(|e| e.event_type == "package_redeemed"));
    }

    #[tokio::test]
    async fn test_free_wash_read_through() {
        let chain = Arc::new(MemoryChain::new("0xowner"));
        chain.record_transaction("0xabc", now_unix()).await.unwrap();
        let gateway = gateway_over(Arc::clone(&chain));

        let status = gateway.read_free_wash_status("0xabc").await.unwrap();
        assert!(status.available);

        gateway.read_free_wash_status("0xabc").await.unwrap();
        assert_eq!(chain.free_wash_reads(), 1);
    }
}
