//! In-memory implementation of TransactionStore.
//!
//! Stands in for the persistence collaborator in tests and local wiring.
//! The state machine check runs on every save, so a terminal status can
//! be re-asserted but never replaced, regardless of caller interleaving.

use async_trait::async_trait;
use chrono::Utc;
use std::collections::HashMap;
use std::sync::Mutex;
use uuid::Uuid;

use crate::domain::{Transaction, TransactionStatus};
use crate::ports::{StoreError, StoreResult, TransactionStore};

#[derive(Default)]
pub struct InMemoryTransactionStore {
    transactions: Mutex<HashMap<Uuid, Transaction>>,
}

impl InMemoryTransactionStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Seeds a transaction, the way order placement would outside this
    /// layer. Not part of the store port.
    pub fn insert(&self, transaction: Transaction) {
        let mut transactions = self
            .transactions
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner());
        transactions.insert(transaction.id, transaction);
    }
}

#[async_trait]
impl TransactionStore for InMemoryTransactionStore {
    async fn save_status(
        &self,
        id: Uuid,
        status: TransactionStatus,
        foreign_id: Option<String>,
    ) -> StoreResult<Transaction> {
        let mut transactions = self
            .transactions
            .lock()
            .map_err(|_| StoreError::Backend("store mutex poisoned".to_string()))?;

        let transaction = transactions.get_mut(&id).ok_or(StoreError::NotFound(id))?;

        if !TransactionStatus::can_become(transaction.status, status) {
            return Err(StoreError::InvalidTransition {
                from: transaction.status,
                to: status,
            });
        }

        transaction.status = Some(status);
        if let Some(foreign_id) = foreign_id {
            transaction.foreign_id = Some(foreign_id);
        }
        transaction.updated_at = Utc::now();

        Ok(transaction.clone())
    }

    async fn by_id(&self, id: Uuid) -> StoreResult<Transaction> {
        let transactions = self
            .transactions
            .lock()
            .map_err(|_| StoreError::Backend("store mutex poisoned".to_string()))?;

        transactions
            .get(&id)
            .cloned()
            .ok_or(StoreError::NotFound(id))
    }
}
