//! In-Memory Chain
//!
//! A self-contained chain implementation used for local development and
//! tests. It models the contract's observable behavior: recording a
//! transaction credits points, grants a free-wash coupon, and appends an
//! activity event. Read counters and a failure switch let tests assert
//! read-through and rollback behavior.

use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::Mutex;

use async_trait::async_trait;

use crate::chain::{ActiveFreeWash, ActivityEvent, Chain, FreeWashStatus, NftMetadata, TxRef};
use crate::error::{AppError, Result};
use crate::loyalty::{is_active, now_unix, Tier};

/// Coupon validity window granted with each recorded transaction.
const FREE_WASH_VALIDITY_SECS: u64 = 7 * 24 * 60 * 60;

/// Points credited per recorded wash transaction.
pub const DEFAULT_POINTS_PER_WASH: u64 = 50;

#[derive(Debug, Clone, Default)]
struct UserChainState {
    points: u64,
    nft: Option<NftMetadata>,
    free_wash: Option<FreeWashStatus>,
    activity: Vec<ActivityEvent>,
}

// == Memory Chain ==
/// In-memory ledger with configurable per-wash credit.
pub struct MemoryChain {
    users: Mutex<HashMap<String, UserChainState>>,
    admins: Mutex<Vec<String>>,
    owner: String,
    points_per_wash: u64,
    tx_counter: AtomicU64,
    failing: AtomicBool,
    points_reads: AtomicU64,
    nft_reads: AtomicU64,
    free_wash_reads: AtomicU64,
    admin_reads: AtomicU64,
}

impl MemoryChain {
    /// Creates a chain owned by `owner`, crediting the default points per wash.
    pub fn new(owner: impl Into<String>) -> Self {
        Self::with_points_per_wash(owner, DEFAULT_POINTS_PER_WASH)
    }

    /// Creates a chain with a specific per-wash credit.
    pub fn with_points_per_wash(owner: impl Into<String>, points_per_wash: u64) -> Self {
        Self {
            users: Mutex::new(HashMap::new()),
            admins: Mutex::new(Vec::new()),
            owner: owner.into(),
            points_per_wash,
            tx_counter: AtomicU64::new(0),
            failing: AtomicBool::new(false),
            points_reads: AtomicU64::new(0),
            nft_reads: AtomicU64::new(0),
            free_wash_reads: AtomicU64::new(0),
            admin_reads: AtomicU64::new(0),
        }
    }

    /// While set, every chain call fails with `LedgerUnavailable`.
    pub fn set_failing(&self, failing: bool) {
        self.failing.store(failing, Ordering::SeqCst);
    }

    /// Seeds a user's balance directly (test/dev convenience).
    pub fn set_points(&self, address: &str, points: u64) {
        let mut users = self.users.lock().expect("chain state poisoned");
        users.entry(address.to_string()).or_default().points = points;
    }

    /// Seeds a user's coupon state directly (test/dev convenience).
    pub fn set_free_wash(&self, address: &str, status: FreeWashStatus) {
        let mut users = self.users.lock().expect("chain state poisoned");
        users.entry(address.to_string()).or_default().free_wash = Some(status);
    }

    /// Number of `get_user_points` calls that reached the chain.
    pub fn points_reads(&self) -> u64 {
        self.points_reads.load(Ordering::SeqCst)
    }

    /// Number of `get_nft_metadata` calls that reached the chain.
    pub fn nft_reads(&self) -> u64 {
        self.nft_reads.load(Ordering::SeqCst)
    }

    /// Number of `get_free_wash_status` calls that reached the chain.
    pub fn free_wash_reads(&self) -> u64 {
        self.free_wash_reads.load(Ordering::SeqCst)
    }

    /// Number of `get_admins` calls that reached the chain.
    pub fn admin_reads(&self) -> u64 {
        self.admin_reads.load(Ordering::SeqCst)
    }

    fn check_available(&self) -> Result<()> {
        if self.failing.load(Ordering::SeqCst) {
            Err(AppError::LedgerUnavailable(
                "memory chain is offline".to_string(),
            ))
        } else {
            Ok(())
        }
    }

    fn next_tx_ref(&self) -> TxRef {
        let n = self.tx_counter.fetch_add(1, Ordering::SeqCst) + 1;
        TxRef(format!("0xmem{:08x}", n))
    }
}

#[async_trait]
impl Chain for MemoryChain {
    async fn get_user_points(&self, address: &str) -> Result<u64> {
        self.check_available()?;
        self.points_reads.fetch_add(1, Ordering::SeqCst);
        let users = self.users.lock().expect("chain state poisoned");
        Ok(users.get(address).map(|u| u.points).unwrap_or(0))
    }

    async fn get_nft_metadata(&self, address: &str) -> Result<NftMetadata> {
        self.check_available()?;
        self.nft_reads.fetch_add(1, Ordering::SeqCst);
        let users = self.users.lock().expect("chain state poisoned");
        Ok(users
            .get(address)
            .and_then(|u| u.nft.clone())
            .unwrap_or(NftMetadata {
                token_id: 0,
                metadata_uri: String::new(),
                points: 0,
                tier: Tier::Bronze,
                expiry_time: 0,
                exists: false,
            }))
    }

    async fn get_free_wash_status(&self, address: &str) -> Result<FreeWashStatus> {
        self.check_available()?;
        self.free_wash_reads.fetch_add(1, Ordering::SeqCst);
        let users = self.users.lock().expect("chain state poisoned");
        Ok(users
            .get(address)
            .and_then(|u| u.free_wash.clone())
            .unwrap_or(FreeWashStatus {
                available: false,
                used: false,
                expiry_time: 0,
            }))
    }

    async fn get_activity_log(
        &self,
        address: &str,
        page: u32,
        page_size: u32,
    ) -> Result<Vec<ActivityEvent>> {
        self.check_available()?;
        let users = self.users.lock().expect("chain state poisoned");
        let activity = users
            .get(address)
            .map(|u| u.activity.clone())
            .unwrap_or_default();

        let start = (page as usize).saturating_mul(page_size as usize);
        Ok(activity
            .into_iter()
            .skip(start)
            .take(page_size as usize)
            .collect())
    }

    async fn get_admins(&self) -> Result<Vec<String>> {
        self.check_available()?;
        self.admin_reads.fetch_add(1, Ordering::SeqCst);
        Ok(self.admins.lock().expect("chain state poisoned").clone())
    }

    async fn owner(&self) -> Result<String> {
        self.check_available()?;
        Ok(self.owner.clone())
    }

    async fn record_transaction(&self, address: &str, timestamp: u64) -> Result<TxRef> {
        self.check_available()?;
        let mut users = self.users.lock().expect("chain state poisoned");
        let user = users.entry(address.to_string()).or_default();

        user.points += self.points_per_wash;
        user.free_wash = Some(FreeWashStatus {
            available: true,
            used: false,
            expiry_time: timestamp + FREE_WASH_VALIDITY_SECS,
        });
        user.activity.push(ActivityEvent {
            event_type: "transaction_recorded".to_string(),
            user: address.to_string(),
            timestamp,
            data: serde_json::json!({ "points_credited": self.points_per_wash }),
        });

        Ok(self.next_tx_ref())
    }

    async fn update_nft_metadata(
        &self,
        address: &str,
        uri: &str,
        tier: Tier,
        points: u64,
    ) -> Result<TxRef> {
        self.check_available()?;
        let mut users = self.users.lock().expect("chain state poisoned");
        let user = users.entry(address.to_string()).or_default();

        let token_id = user.nft.as_ref().map(|n| n.token_id).unwrap_or(1);
        user.nft = Some(NftMetadata {
            token_id,
            metadata_uri: uri.to_string(),
            points,
            tier,
            expiry_time: now_unix() + 365 * 24 * 60 * 60,
            exists: true,
        });

        Ok(self.next_tx_ref())
    }

    async fn add_admin(&self, address: &str) -> Result<TxRef> {
        self.check_available()?;
        let mut admins = self.admins.lock().expect("chain state poisoned");
        if !admins.iter().any(|a| a.eq_ignore_ascii_case(address)) {
            admins.push(address.to_string());
        }
        Ok(self.next_tx_ref())
    }

    async fn remove_admin(&self, address: &str) -> Result<TxRef> {
        self.check_available()?;
        let mut admins = self.admins.lock().expect("chain state poisoned");
        admins.retain(|a| !a.eq_ignore_ascii_case(address));
        Ok(self.next_tx_ref())
    }

    async fn redeem_package(&self, address: &str, package_id: &str, cost: u64) -> Result<TxRef> {
        self.check_available()?;
        let mut users = self.users.lock().expect("chain state poisoned");
        let user = users.entry(address.to_string()).or_default();

        user.points = user.points.checked_sub(cost).ok_or_else(|| {
            AppError::LedgerUnavailable(format!(
                "chain rejected redemption of '{}': balance below {}",
                package_id, cost
            ))
        })?;
        user.activity.push(ActivityEvent {
            event_type: "package_redeemed".to_string(),
            user: address.to_string(),
            timestamp: now_unix(),
            data: serde_json::json!({ "package_id": package_id, "cost": cost }),
        });

        Ok(self.next_tx_ref())
    }

    async fn get_active_free_wash_users(
        &self,
        page: u32,
        page_size: u32,
    ) -> Result<Vec<ActiveFreeWash>> {
        self.check_available()?;
        let now = now_unix();
        let users = self.users.lock().expect("chain state poisoned");

        let mut active: Vec<ActiveFreeWash> = users
            .iter()
            .filter_map(|(address, state)| {
                let coupon = state.free_wash.as_ref()?;
                if is_active(coupon, now) {
                    Some(ActiveFreeWash {
                        address: address.clone(),
                        expiry_time: coupon.expiry_time,
                    })
                } else {
                    None
                }
            })
            .collect();
        active.sort_by(|a, b| a.address.cmp(&b.address));

        let start = (page as usize).saturating_mul(page_size as usize);
        Ok(active
            .into_iter()
            .skip(start)
            .take(page_size as usize)
            .collect())
    }
}
