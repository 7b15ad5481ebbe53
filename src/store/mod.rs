//! Store Module
//!
//! User profiles and transaction history. The orchestrator talks to the
//! `UserStore` trait; the in-memory backend keeps the process
//! self-contained, and a relational backend can slot in behind the same
//! seam.

mod memory;

pub use memory::MemoryStore;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::chain::TxRef;
use crate::error::Result;

// == User Record ==
/// A registered loyalty-program user.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserRecord {
    /// Wallet address, stored lowercased
    pub address: String,
    pub email: String,
    #[serde(default)]
    pub name: Option<String>,
    /// Registration time, Unix seconds
    pub registered_at: u64,
}

// == Transaction State ==
/// Local transaction lifecycle. A record is `Pending` only while an
/// orchestration call is in flight; it is confirmed or deleted before the
/// call returns.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TxState {
    Pending,
    Confirmed,
}

// == Transaction Record ==
/// One locally persisted wash transaction.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TransactionRecord {
    pub id: u64,
    pub address: String,
    pub timestamp: u64,
    pub state: TxState,
    /// Chain reference, present once confirmed
    pub tx_ref: Option<TxRef>,
}

// == User Store Trait ==
/// Persistence seam for users and transactions. All mutations behave as
/// atomic units of work.
#[async_trait]
pub trait UserStore: Send + Sync {
    /// Looks up a user by (case-insensitive) address.
    async fn find_user_by_address(&self, address: &str) -> Result<Option<UserRecord>>;

    /// Registers a new user. Fails if the address is already registered.
    async fn create_user(&self, user: UserRecord) -> Result<UserRecord>;

    /// Persists a not-yet-confirmed transaction and returns its id.
    async fn create_pending_transaction(&self, address: &str, timestamp: u64) -> Result<u64>;

    /// Attaches the chain reference and marks the record confirmed.
    async fn confirm_transaction(&self, id: u64, tx_ref: TxRef) -> Result<()>;

    /// Rolls back a pending record so no trace of the attempt survives.
    async fn delete_pending_transaction(&self, id: u64) -> Result<()>;

    /// All transactions recorded for a user, oldest first.
    async fn transactions_for_user(&self, address: &str) -> Result<Vec<TransactionRecord>>;
}
