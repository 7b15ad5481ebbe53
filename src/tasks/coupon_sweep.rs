//! Coupon Expiry Sweep
//!
//! Background task that watches active free-wash coupons and reports the
//! ones that cross their expiry. The chain only exposes the currently
//! active set, so the sweep keeps the previous snapshot and diffs against
//! it: a coupon that was active, is no longer listed, and whose expiry has
//! passed is reported as expired. A coupon that disappeared for another
//! reason (it was used) is not.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

use crate::chain::Chain;
use crate::error::Result;
use crate::loyalty::now_unix;
use crate::notify::{BroadcastEvent, Broadcaster, Notifier};

/// Coupons fetched per chain call while paging the active set.
pub const SWEEP_PAGE_SIZE: u32 = 100;

// == Coupon Sweep ==
/// Stateful sweep over the chain's active free-wash coupon set.
pub struct CouponSweep {
    chain: Arc<dyn Chain>,
    notifier: Arc<dyn Notifier>,
    broadcaster: Broadcaster,
    /// Active coupons seen in the previous pass, address to expiry
    previously_active: HashMap<String, u64>,
}

impl CouponSweep {
    pub fn new(
        chain: Arc<dyn Chain>,
        notifier: Arc<dyn Notifier>,
        broadcaster: Broadcaster,
    ) -> Self {
        Self {
            chain,
            notifier,
            broadcaster,
            previously_active: HashMap::new(),
        }
    }

    /// Runs one sweep pass and returns how many expirations were reported.
    ///
    /// A ledger error ends the pass with the previous snapshot intact, so
    /// the missed diff is retried on the next pass.
    pub async fn run_pass(&mut self) -> Result<usize> {
        let now = now_unix();

        let mut current = HashMap::new();
        let mut page = 0;
        loop {
            let batch = self
                .chain
                .get_active_free_wash_users(page, SWEEP_PAGE_SIZE)
                .await?;
            let last_page = (batch.len() as u32) < SWEEP_PAGE_SIZE;

            for coupon in batch {
                current.insert(coupon.address, coupon.expiry_time);
            }
            if last_page {
                break;
            }
            page += 1;
        }

        let mut expired = 0;
        for (address, expiry_time) in &self.previously_active {
            if current.contains_key(address) {
                continue;
            }
            // Dropped out of the active set; only report it if the expiry
            // actually passed (a used coupon drops out early)
            if now >= *expiry_time {
                expired += 1;
                self.broadcaster.publish(BroadcastEvent::FreeWashExpired {
                    address: address.clone(),
                    expiry_time: *expiry_time,
                });
                if let Err(err) = self
                    .notifier
                    .notify_free_wash_expired(address, *expiry_time)
                    .await
                {
                    warn!(%address, %err, "free wash expiry notification failed");
                }
            }
        }

        self.previously_active = current;
        Ok(expired)
    }
}

/// Spawns the periodic coupon expiry sweep.
///
/// Ledger errors end the pass, never the task; the returned handle is
/// aborted during graceful shutdown.
pub fn spawn_coupon_sweep(
    chain: Arc<dyn Chain>,
    notifier: Arc<dyn Notifier>,
    broadcaster: Broadcaster,
    sweep_interval_secs: u64,
) -> JoinHandle<()> {
    let interval = Duration::from_secs(sweep_interval_secs);
    let mut sweep = CouponSweep::new(chain, notifier, broadcaster);

    tokio::spawn(async move {
        info!(
            interval_secs = sweep_interval_secs,
            "coupon expiry sweep started"
        );

        loop {
            tokio::time::sleep(interval).await;

            match sweep.run_pass().await {
                Ok(expired) if expired > 0 => {
                    info!(expired, "coupon sweep reported expirations")
                }
                Ok(_) => debug!("coupon sweep found no expirations"),
                Err(err) => warn!(%err, "coupon sweep pass ended on ledger error"),
            }
        }
    })
}
