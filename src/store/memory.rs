//! In-Memory User Store
//!
//! HashMap-backed `UserStore` implementation. Mutations take the write
//! lock for their whole unit of work, so each operation is atomic with
//! respect to concurrent readers.

use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};

use async_trait::async_trait;
use tokio::sync::RwLock;

use crate::chain::TxRef;
use crate::error::{AppError, Result};
use crate::ledger::keys::normalize_address;
use crate::store::{TransactionRecord, TxState, UserRecord, UserStore};

// == Memory Store ==
#[derive(Default)]
pub struct MemoryStore {
    users: RwLock<HashMap<String, UserRecord>>,
    transactions: RwLock<HashMap<u64, TransactionRecord>>,
    next_tx_id: AtomicU64,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl UserStore for MemoryStore {
    async fn find_user_by_address(&self, address: &str) -> Result<Option<UserRecord>> {
        let users = self.users.read().await;
        Ok(users.get(&normalize_address(address)).cloned())
    }

    async fn create_user(&self, mut user: UserRecord) -> Result<UserRecord> {
        user.address = normalize_address(&user.address);
        let mut users = self.users.write().await;
        if users.contains_key(&user.address) {
            return Err(AppError::InvalidRequest(format!(
                "address {} is already registered",
                user.address
            )));
        }
        users.insert(user.address.clone(), user.clone());
        Ok(user)
    }

    async fn create_pending_transaction(&self, address: &str, timestamp: u64) -> Result<u64> {
        let id = self.next_tx_id.fetch_add(1, Ordering::SeqCst) + 1;
        let record = TransactionRecord {
            id,
            address: normalize_address(address),
            timestamp,
            state: TxState::Pending,
            tx_ref: None,
        };

        let mut transactions = self.transactions.write().await;
        transactions.insert(id, record);
        Ok(id)
    }

    async fn confirm_transaction(&self, id: u64, tx_ref: TxRef) -> Result<()> {
        let mut transactions = self.transactions.write().await;
        let record = transactions
            .get_mut(&id)
            .ok_or_else(|| AppError::Internal(format!("transaction {} not found", id)))?;

        record.state = TxState::Confirmed;
        record.tx_ref = Some(tx_ref);
        Ok(())
    }

    async fn delete_pending_transaction(&self, id: u64) -> Result<()> {
        let mut transactions = self.transactions.write().await;
        transactions.remove(&id);
        Ok(())
    }

    async fn transactions_for_user(&self, address: &str) -> Result<Vec<TransactionRecord>> {
        let address = normalize_address(address);
        let transactions = self.transactions.read().await;
        let mut records: Vec<TransactionRecord> = transactions
            .values()
            .filter(|record| record.address == address)
            .cloned()
            .collect();
        records.sort_by_key(|record| record.id);
        Ok(records)
    }
}
