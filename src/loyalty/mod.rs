//! Loyalty Module
//!
//! Tier derivation, free-wash coupon activity, and the wash package catalog.
//! Everything here is pure logic over values the ledger gateway fetches.

mod coupon;
mod packages;
mod tier;

pub use coupon::{is_active, FreeWashView};
pub use packages::{package_by_id, WashPackage, PACKAGES};
pub use tier::{Tier, TierTransition, GOLD_THRESHOLD, SILVER_THRESHOLD};

use std::time::{SystemTime, UNIX_EPOCH};

/// Current Unix timestamp in seconds.
pub fn now_unix() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .expect("Time went backwards")
        .as_secs()
}
