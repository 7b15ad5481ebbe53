//! Tasks Module
//!
//! Background tasks: periodic TTL cleanup of the cache and the free-wash
//! coupon expiry sweep.

mod cleanup;
mod coupon_sweep;

pub use cleanup::spawn_cleanup_task;
pub use coupon_sweep::{spawn_coupon_sweep, CouponSweep, SWEEP_PAGE_SIZE};
