//! Free-Wash Coupon Module
//!
//! Derives coupon activity from the ledger-reported status. The chain grants
//! a coupon as a side effect of a recorded transaction; the API layer only
//! observes it, so the predicate here is the single source of the
//! active/expired decision for both the status endpoint and the expiry
//! notification path.

use serde::Serialize;

use crate::chain::FreeWashStatus;
use crate::loyalty::now_unix;

// == Activity Predicate ==
/// A coupon is active iff it is available, unused, and `now` is strictly
/// before its expiry. Closed lower / open upper, matching the tier
/// boundary convention.
pub fn is_active(coupon: &FreeWashStatus, now: u64) -> bool {
    coupon.available && !coupon.used && now < coupon.expiry_time
}

// == Free-Wash View ==
/// Status endpoint payload: the raw ledger fields plus the derived flag.
#[derive(Debug, Clone, Serialize)]
pub struct FreeWashView {
    pub available: bool,
    pub used: bool,
    pub expiry_time: u64,
    pub active: bool,
}

impl FreeWashView {
    /// Builds a view from a ledger status at a given instant.
    pub fn from_status(status: &FreeWashStatus, now: u64) -> Self {
        Self {
            available: status.available,
            used: status.used,
            expiry_time: status.expiry_time,
            active: is_active(status, now),
        }
    }

    /// Builds a view evaluated at the current wall clock.
    pub fn current(status: &FreeWashStatus) -> Self {
        Self::from_status(status, now_unix())
    }
}
