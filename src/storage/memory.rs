//! In-memory backend for the storage port.
//!
//! Non-durable. Used for local development and by the test suites; rows
//! are held in insertion order, which is also timestamp order.

use std::sync::Mutex;

use async_trait::async_trait;
use chrono::Utc;

use super::{
    NewRewardAction, NewTransaction, RewardActionRecord, RewardStore, StoreError, TransactionPage,
    TransactionRecord,
};

#[derive(Default)]
pub struct MemoryStore {
    inner: Mutex<Inner>,
}

#[derive(Default)]
struct Inner {
    reward_actions: Vec<RewardActionRecord>,
    transactions: Vec<TransactionRecord>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, Inner> {
        self.inner.lock().expect("memory store poisoned")
    }
}

#[async_trait]
impl RewardStore for MemoryStore {
    async fn insert_reward_action(&self, row: NewRewardAction) -> Result<bool, StoreError> {
        let mut inner = self.lock();
        if inner
            .reward_actions
            .iter()
            .any(|r| r.transaction_hash == row.transaction_hash)
        {
            return Ok(false);
        }
        inner.reward_actions.push(RewardActionRecord {
            user_address: row.user_address,
            action: row.action,
            reward_amount: row.reward_amount,
            transaction_hash: row.transaction_hash,
            timestamp: Utc::now(),
        });
        Ok(true)
    }

    async fn insert_transaction(&self, row: NewTransaction) -> Result<bool, StoreError> {
        let mut inner = self.lock();
        if inner
            .transactions
            .iter()
            .any(|t| t.transaction_hash == row.transaction_hash)
        {
            return Ok(false);
        }
        inner.transactions.push(TransactionRecord {
            from_address: row.from_address,
            to_address: row.to_address,
            amount: row.amount,
            kind: row.kind,
            action: row.action,
            transaction_hash: row.transaction_hash,
            status: row.status,
            timestamp: Utc::now(),
        });
        Ok(true)
    }

    async fn reward_history(
        &self,
        user_address: &str,
    ) -> Result<Vec<RewardActionRecord>, StoreError> {
        let inner = self.lock();
        Ok(inner
            .reward_actions
            .iter()
            .rev()
            .filter(|r| r.user_address == user_address)
            .cloned()
            .collect())
    }

    async fn transactions_for_address(
        &self,
        address: &str,
        limit: u64,
    ) -> Result<Vec<TransactionRecord>, StoreError> {
        let inner = self.lock();
        Ok(inner
            .transactions
            .iter()
            .rev()
            .filter(|t| t.from_address == address || t.to_address == address)
            .take(limit as usize)
            .cloned()
            .collect())
    }

    async fn transactions_page(
        &self,
        page: u64,
        limit: u64,
    ) -> Result<TransactionPage, StoreError> {
        assert!(page > 0, "Page numbers are 1-based");
        assert!(limit > 0, "Page limit must be positive");

        let inner = self.lock();
        let total = inner.transactions.len() as u64;
        let transactions = inner
            .transactions
            .iter()
            .rev()
            .skip(((page - 1) * limit) as usize)
            .take(limit as usize)
            .cloned()
            .collect();
        Ok(TransactionPage {
            transactions,
            total,
        })
    }

    async fn transaction_by_hash(
        &self,
        hash: &str,
    ) -> Result<Option<TransactionRecord>, StoreError> {
        let inner = self.lock();
        Ok(inner
            .transactions
            .iter()
            .find(|t| t.transaction_hash == hash)
            .cloned())
    }

    async fn ping(&self) -> Result<(), StoreError> {
        Ok(())
    }
}
