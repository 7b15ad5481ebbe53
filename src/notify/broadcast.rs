//! Broadcast Module
//!
//! Typed real-time event fan-out over a tokio broadcast channel. Each event
//! kind carries a fixed payload shape, so subscribers get a typed contract
//! instead of free-form payloads. Delivery is best-effort: publishing with
//! no subscribers, or past a lagging subscriber, is not an error.

use serde::Serialize;
use tokio::sync::broadcast;
use tracing::debug;

use crate::loyalty::Tier;

/// Buffered events per subscriber before the oldest are dropped.
const CHANNEL_CAPACITY: usize = 256;

// == Broadcast Event ==
/// Tagged event payloads pushed to real-time subscribers.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum BroadcastEvent {
    /// A wash transaction was confirmed on the chain.
    TransactionRecorded {
        address: String,
        tx_ref: String,
        points: u64,
    },
    /// A user's tier changed after a fresh points read.
    TierChanged {
        address: String,
        points: u64,
        previous: Tier,
        current: Tier,
    },
    /// A previously active free-wash coupon crossed its expiry.
    FreeWashExpired { address: String, expiry_time: u64 },
}

// == Broadcaster ==
/// Cloneable fan-out handle. Subscriber registration is append-only; no
/// locking beyond the channel's own.
#[derive(Clone)]
pub struct Broadcaster {
    sender: broadcast::Sender<BroadcastEvent>,
}

impl Broadcaster {
    /// Creates a broadcaster with the default per-subscriber buffer.
    pub fn new() -> Self {
        let (sender, _) = broadcast::channel(CHANNEL_CAPACITY);
        Self { sender }
    }

    /// Registers a new subscriber.
    pub fn subscribe(&self) -> broadcast::Receiver<BroadcastEvent> {
        self.sender.subscribe()
    }

    /// Publishes an event to all current subscribers. No delivery
    /// guarantee; an empty subscriber set is not an error.
    pub fn publish(&self, event: BroadcastEvent) {
        match self.sender.send(event) {
            Ok(receivers) => debug!(receivers, "broadcast event published"),
            Err(_) => debug!("broadcast event dropped, no subscribers"),
        }
    }
}

impl Default for Broadcaster {
    fn default() -> Self {
        Self::new()
    }
}

// == Unit Tests ==
#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_publish_reaches_subscriber() {
        let broadcaster = Broadcaster::new();
        let mut rx = broadcaster.subscribe();

        broadcaster.publish(BroadcastEvent::TransactionRecorded {
            address: "0xabc".to_string(),
            tx_ref: "0xfeed".to_string(),
            points: 1010,
        });

        let event = rx.recv().await.unwrap();
        assert_eq!(
            event,
            BroadcastEvent::TransactionRecorded {
                address: "0xabc".to_string(),
                tx_ref: "0xfeed".to_string(),
                points: 1010,
            }
        );
    }

    #[tokio::test]
    async fn test_publish_without_subscribers_is_noop() {
        let broadcaster = Broadcaster::new();
        broadcaster.publish(BroadcastEvent::FreeWashExpired {
            address: "0xabc".to_string(),
            expiry_time: 1,
        });
    }

    #[test]
    fn test_events_serialize_tagged() {
        let event = BroadcastEvent::TierChanged {
            address: "0xabc".to_string(),
            points: 1010,
            previous: Tier::Bronze,
            current: Tier::Silver,
        };
        let json = serde_json::to_value(&event).unwrap();
        assert_eq!(json["type"], "tier_changed");
        assert_eq!(json["previous"], "bronze");
        assert_eq!(json["current"], "silver");
    }
}
