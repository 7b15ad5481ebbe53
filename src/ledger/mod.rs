//! Ledger Module
//!
//! The read-through / write-invalidate layer between the cache and the
//! authoritative chain.

mod gateway;
pub mod keys;

pub use gateway::{AdminOp, LedgerGateway};
