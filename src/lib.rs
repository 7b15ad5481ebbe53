//! Wash Loyalty - car-wash loyalty program API backend
//!
//! Serves loyalty data (points, tiers, NFT metadata, free-wash coupons)
//! from an authoritative chain ledger through a cache-coherent gateway:
//! reads are cache-first with TTL and LRU bounds, writes invalidate the
//! affected shadow copies before returning.

pub mod api;
pub mod cache;
pub mod chain;
pub mod config;
pub mod error;
pub mod ledger;
pub mod loyalty;
pub mod models;
pub mod notify;
pub mod orchestrator;
pub mod store;
pub mod tasks;

pub use api::AppState;
pub use config::Config;
pub use tasks::{spawn_cleanup_task, spawn_coupon_sweep};
