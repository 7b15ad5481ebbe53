//! Tier Engine Module
//!
//! Pure mapping from a point balance to a loyalty tier, plus transition
//! detection between two tiers. Tiers are always recomputed from the
//! freshest available points figure and never cached on their own.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Points at which Silver starts (inclusive).
pub const SILVER_THRESHOLD: u64 = 1000;

/// Points at which Gold starts (inclusive).
pub const GOLD_THRESHOLD: u64 = 5000;

// == Tier ==
/// Loyalty tier derived from a point balance.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Tier {
    Bronze,
    Silver,
    Gold,
}

impl Tier {
    // == For Points ==
    /// Maps a point balance to its tier using closed-open boundaries:
    /// Bronze [0, 1000), Silver [1000, 5000), Gold [5000, ∞).
    pub fn for_points(points: u64) -> Self {
        if points >= GOLD_THRESHOLD {
            Tier::Gold
        } else if points >= SILVER_THRESHOLD {
            Tier::Silver
        } else {
            Tier::Bronze
        }
    }

    // == Transition ==
    /// Compares a previous and a new tier.
    pub fn transition(previous: Tier, current: Tier) -> TierTransition {
        match current.cmp(&previous) {
            std::cmp::Ordering::Greater => TierTransition::Upgraded,
            std::cmp::Ordering::Less => TierTransition::Downgraded,
            std::cmp::Ordering::Equal => TierTransition::Unchanged,
        }
    }
}

impl fmt::Display for Tier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Tier::Bronze => "bronze",
            Tier::Silver => "silver",
            Tier::Gold => "gold",
        };
        write!(f, "{}", name)
    }
}

// == Tier Transition ==
/// Result of comparing a previous tier against a freshly derived one.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum TierTransition {
    Upgraded,
    Downgraded,
    Unchanged,
}

impl TierTransition {
    /// True for upgrades and downgrades, false when the tier is unchanged.
    pub fn is_change(&self) -> bool {
        !matches!(self, TierTransition::Unchanged)
    }
}
