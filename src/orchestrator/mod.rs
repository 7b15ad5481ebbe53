//! Orchestrator Module
//!
//! The transaction state machine coordinating the store, the ledger
//! gateway, and the notification side effects.
//!
//! Per request the states are strictly sequential:
//! `Initiated -> LocallyPersisted -> ChainConfirmed` on success, or
//! `Initiated -> LocallyPersisted -> RolledBack` when the chain write
//! fails or times out. A pending record never survives a returned call.

mod blob;

pub use blob::{BlobStore, MemoryBlobStore};

use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use serde::Serialize;
use tracing::warn;

use crate::chain::TxRef;
use crate::error::{AppError, Result};
use crate::ledger::keys::normalize_address;
use crate::ledger::LedgerGateway;
use crate::loyalty::{now_unix, package_by_id, Tier};
use crate::notify::{spawn_best_effort, BroadcastEvent, Broadcaster, Notifier};
use crate::store::UserStore;

// == Outcomes ==

/// Result of a confirmed wash transaction.
#[derive(Debug, Clone, Serialize)]
pub struct TransactionOutcome {
    pub transaction_id: u64,
    pub tx_ref: TxRef,
}

/// Result of a successful package redemption.
#[derive(Debug, Clone, Serialize)]
pub struct RedemptionOutcome {
    pub tx_ref: TxRef,
    pub package_id: String,
    pub remaining_points: u64,
}

// == Orchestrator ==
pub struct Orchestrator {
    gateway: LedgerGateway,
    store: Arc<dyn UserStore>,
    notifier: Arc<dyn Notifier>,
    broadcaster: Broadcaster,
    blobs: Arc<dyn BlobStore>,
    chain_timeout: Duration,
}

impl Orchestrator {
    pub fn new(
        gateway: LedgerGateway,
        store: Arc<dyn UserStore>,
        notifier: Arc<dyn Notifier>,
        broadcaster: Broadcaster,
        blobs: Arc<dyn BlobStore>,
        chain_timeout: Duration,
    ) -> Self {
        Self {
            gateway,
            store,
            notifier,
            broadcaster,
            blobs,
            chain_timeout,
        }
    }

    /// A chain call that does not return within the timeout is treated
    /// exactly like an explicit failure.
    async fn with_timeout<T>(&self, future: impl Future<Output = Result<T>>) -> Result<T> {
        match tokio::time::timeout(self.chain_timeout, future).await {
            Ok(result) => result,
            Err(_) => Err(AppError::LedgerUnavailable(format!(
                "chain call timed out after {:?}",
                self.chain_timeout
            ))),
        }
    }

    // == Record Transaction ==
    /// Records a wash transaction for a registered user.
    ///
    /// The chain write carries no idempotency key: a client retry after a
    /// timed-out but actually committed call records a second transaction
    /// on-chain and locally. Callers that retry accept that window.
    pub async fn record_transaction(&self, address: &str) -> Result<TransactionOutcome> {
        let address = normalize_address(address);

        // Initiated: validate the user before persisting anything
        let user = self
            .store
            .find_user_by_address(&address)
            .await?
            .ok_or_else(|| AppError::UserNotFound(address.clone()))?;

        // LocallyPersisted
        let timestamp = now_unix();
        let transaction_id = self
            .store
            .create_pending_transaction(&address, timestamp)
            .await?;

        let tx_ref = match self
            .with_timeout(self.gateway.write_transaction(&address, timestamp))
            .await
        {
            Ok(tx_ref) => tx_ref,
            Err(err) => {
                // RolledBack: the pending record must not survive
                if let Err(rollback_err) =
                    self.store.delete_pending_transaction(transaction_id).await
                {
                    warn!(transaction_id, %rollback_err, "rollback of pending transaction failed");
                }
                return Err(err);
            }
        };

        // ChainConfirmed
        self.store
            .confirm_transaction(transaction_id, tx_ref.clone())
            .await?;

        // Side effects run outside the atomic unit; their failure never
        // reaches the caller of a confirmed transaction.
        spawn_best_effort(
            "post-confirmation-effects",
            Self::post_confirmation_effects(
                self.gateway.clone(),
                Arc::clone(&self.notifier),
                self.broadcaster.clone(),
                Arc::clone(&self.blobs),
                address,
                user.email,
                tx_ref.clone(),
            ),
        );

        Ok(TransactionOutcome {
            transaction_id,
            tx_ref,
        })
    }

    // == Post-Confirmation Effects ==
    async fn post_confirmation_effects(
        gateway: LedgerGateway,
        notifier: Arc<dyn Notifier>,
        broadcaster: Broadcaster,
        blobs: Arc<dyn BlobStore>,
        address: String,
        email: String,
        tx_ref: TxRef,
    ) -> Result<()> {
        // The write just invalidated the shadow copies, so this read is a
        // fresh chain call, never the pre-write cache.
        let points = gateway.read_points(&address).await?;
        let current = Tier::for_points(points);

        // Prior tier comes from the chain's metadata snapshot, which still
        // reflects the state before this transaction's refresh below.
        let metadata = gateway.read_nft_metadata(&address).await?;
        let previous = if metadata.exists {
            metadata.tier
        } else {
            Tier::Bronze
        };

        if Tier::transition(previous, current).is_change() {
            if let Err(err) = notifier.notify_tier_change(&address, points, current).await {
                warn!(%address, %err, "tier change notification failed");
            }

            // The rendering is regenerated for the new tier, never patched
            let rendering = serde_json::json!({
                "address": address,
                "points": points,
                "tier": current,
                "rendered_at": now_unix(),
            });
            let uri = blobs.put_json(&rendering).await?;
            gateway
                .write_nft_metadata(&address, &uri, current, points)
                .await?;

            broadcaster.publish(BroadcastEvent::TierChanged {
                address: address.clone(),
                points,
                previous,
                current,
            });
        }

        let date = chrono::Utc::now().format("%Y-%m-%d").to_string();
        if let Err(err) = notifier.notify_free_wash_activated(&email, &date).await {
            warn!(%address, %err, "free wash notification failed");
        }

        // Published last: subscribers seeing this event can rely on the
        // metadata refresh and notifications having already run
        broadcaster.publish(BroadcastEvent::TransactionRecorded {
            address: address.clone(),
            tx_ref: tx_ref.0,
            points,
        });

        Ok(())
    }

    // == Redeem Package ==
    /// Redeems a wash package against the user's balance.
    ///
    /// The threshold check runs against a fresh ledger read, never a shadow
    /// copy, so a balance that changed since the last cached read neither
    /// blocks a covered redemption nor lets an uncovered one through to the
    /// chain. A balance below the package cost is rejected without any
    /// ledger mutation; the chain remains the final arbiter of the
    /// deduction.
    pub async fn redeem_package(&self, address: &str, package_id: &str) -> Result<RedemptionOutcome> {
        let address = normalize_address(address);

        self.store
            .find_user_by_address(&address)
            .await?
            .ok_or_else(|| AppError::UserNotFound(address.clone()))?;

        let package = package_by_id(package_id).ok_or_else(|| {
            AppError::InvalidRequest(format!("unknown package '{}'", package_id))
        })?;

        let available = self.gateway.read_points_fresh(&address).await?;
        if available < package.cost {
            return Err(AppError::InsufficientPoints {
                required: package.cost,
                available,
            });
        }

        let tx_ref = self
            .with_timeout(self.gateway.write_redemption(&address, package))
            .await?;

        // Fresh read after invalidation
        let remaining_points = self.gateway.read_points(&address).await?;

        Ok(RedemptionOutcome {
            tx_ref,
            package_id: package.id.to_string(),
            remaining_points,
        })
    }
}
