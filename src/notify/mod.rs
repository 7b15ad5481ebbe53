//! Notify Module
//!
//! Email-style notifications and real-time broadcast. Both are
//! fire-and-forget from the orchestrator's point of view: failures are
//! logged on a dedicated path and never affect the primary request.

mod broadcast;

pub use broadcast::{BroadcastEvent, Broadcaster};

use std::future::Future;

use async_trait::async_trait;
use tokio::task::JoinHandle;
use tracing::{info, warn};

use crate::error::Result;
use crate::loyalty::Tier;

// == Notifier Trait ==
/// Outbound notification seam (email or similar).
#[async_trait]
pub trait Notifier: Send + Sync {
    /// Tells a user their tier changed.
    async fn notify_tier_change(&self, address: &str, points: u64, tier: Tier) -> Result<()>;

    /// Tells a user a free-wash coupon was activated for them.
    async fn notify_free_wash_activated(&self, email: &str, date: &str) -> Result<()>;

    /// Tells a user their free-wash coupon expired.
    async fn notify_free_wash_expired(&self, address: &str, expiry_time: u64) -> Result<()>;
}

// == Log Notifier ==
/// Notifier that records deliveries as structured log events. Stands in
/// for the mail provider in local setups.
#[derive(Debug, Default)]
pub struct LogNotifier;

#[async_trait]
impl Notifier for LogNotifier {
    async fn notify_tier_change(&self, address: &str, points: u64, tier: Tier) -> Result<()> {
        info!(address, points, %tier, "tier change notification");
        Ok(())
    }

    async fn notify_free_wash_activated(&self, email: &str, date: &str) -> Result<()> {
        info!(email, date, "free wash activated notification");
        Ok(())
    }

    async fn notify_free_wash_expired(&self, address: &str, expiry_time: u64) -> Result<()> {
        info!(address, expiry_time, "free wash expired notification");
        Ok(())
    }
}

// == Best-Effort Spawn ==
/// Submits a side effect as a background task whose failure is logged and
/// never linked to the submitting request's outcome.
pub fn spawn_best_effort<F>(task: &'static str, future: F) -> JoinHandle<()>
where
    F: Future<Output = Result<()>> + Send + 'static,
{
    tokio::spawn(async move {
        if let Err(err) = future.await {
            warn!(task, %err, "best-effort task failed");
        }
    })
}

// == Unit Tests ==
#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::AppError;

    #[tokio::test]
    async fn test_log_notifier_always_succeeds() {
        let notifier = LogNotifier;
        notifier
            .notify_tier_change("0xabc", 1010, Tier::Silver)
            .await
            .unwrap();
        notifier
            .notify_free_wash_activated("driver@example.com", "2026-08-30")
            .await
            .unwrap();
    }

    #[tokio::test]
    async fn test_spawn_best_effort_absorbs_errors() {
        let handle = spawn_best_effort("failing-effect", async {
            Err(AppError::Internal("boom".to_string()))
        });

        // The task completes without panicking or propagating the error
        handle.await.unwrap();
    }

    #[tokio::test]
    async fn test_spawn_best_effort_runs_to_completion() {
        let (tx, rx) = tokio::sync::oneshot::channel();
        spawn_best_effort("ok-effect", async move {
            let _ = tx.send(42);
            Ok(())
        });

        assert_eq!(rx.await.unwrap(), 42);
    }
}
