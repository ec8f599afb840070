//! Persistence port for the two append-only record kinds.
//!
//! A single [`RewardStore`] trait fronts two interchangeable backends:
//! PostgreSQL via sea-orm for deployments, and an in-process memory store
//! for development and tests. The backend is selected by configuration.

use std::str::FromStr;
use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::Serialize;
use thiserror::Error;
use tracing::info;

use crate::config::{DatabaseConfig, StorageBackend};

pub mod memory;
pub mod postgres;

pub use memory::MemoryStore;
pub use postgres::PostgresStore;

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("database error: {0}")]
    Database(#[from] sea_orm::DbErr),

    #[error("corrupt row: {0}")]
    CorruptRow(String),
}

/// Transfer kind recorded for a transaction row.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum TransactionKind {
    Reward,
    Transfer,
    Mint,
}

impl TransactionKind {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Reward => "reward",
            Self::Transfer => "transfer",
            Self::Mint => "mint",
        }
    }
}

impl FromStr for TransactionKind {
    type Err = StoreError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value {
            "reward" => Ok(Self::Reward),
            "transfer" => Ok(Self::Transfer),
            "mint" => Ok(Self::Mint),
            other => Err(StoreError::CorruptRow(format!(
                "unknown transaction kind {other:?}"
            ))),
        }
    }
}

/// Lifecycle status of a transaction row. Confirmed rows are written as
/// such because the chain call already awaited confirmation; there is no
/// asynchronous status-update path.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum TransactionStatus {
    Pending,
    Confirmed,
    Failed,
}

impl TransactionStatus {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::Confirmed => "confirmed",
            Self::Failed => "failed",
        }
    }
}

impl FromStr for TransactionStatus {
    type Err = StoreError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value {
            "pending" => Ok(Self::Pending),
            "confirmed" => Ok(Self::Confirmed),
            "failed" => Ok(Self::Failed),
            other => Err(StoreError::CorruptRow(format!(
                "unknown transaction status {other:?}"
            ))),
        }
    }
}

/// A persisted reward claim, in API response shape.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RewardActionRecord {
    pub user_address: String,
    pub action: String,
    pub reward_amount: String,
    pub transaction_hash: String,
    pub timestamp: DateTime<Utc>,
}

/// A persisted transaction, in API response shape.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TransactionRecord {
    #[serde(rename = "from")]
    pub from_address: String,
    #[serde(rename = "to")]
    pub to_address: String,
    pub amount: String,
    #[serde(rename = "type")]
    pub kind: TransactionKind,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub action: Option<String>,
    pub transaction_hash: String,
    pub status: TransactionStatus,
    pub timestamp: DateTime<Utc>,
}

/// Insert payload for a reward claim row.
#[derive(Debug, Clone)]
pub struct NewRewardAction {
    pub user_address: String,
    pub action: String,
    pub reward_amount: String,
    pub transaction_hash: String,
}

/// Insert payload for a transaction row.
#[derive(Debug, Clone)]
pub struct NewTransaction {
    pub from_address: String,
    pub to_address: String,
    pub amount: String,
    pub kind: TransactionKind,
    pub action: Option<String>,
    pub transaction_hash: String,
    pub status: TransactionStatus,
}

/// One page of the global transaction listing.
#[derive(Debug, Clone)]
pub struct TransactionPage {
    pub transactions: Vec<TransactionRecord>,
    pub total: u64,
}

/// Storage port. Both record kinds are append-only; inserts are idempotent
/// on the transaction hash (a duplicate insert is a no-op reported as
/// `false`).
#[async_trait]
pub trait RewardStore: Send + Sync {
    /// Insert a reward claim row. Returns `false` when a row with the same
    /// transaction hash already exists.
    async fn insert_reward_action(&self, row: NewRewardAction) -> Result<bool, StoreError>;

    /// Insert a transaction row. Returns `false` when a row with the same
    /// transaction hash already exists.
    async fn insert_transaction(&self, row: NewTransaction) -> Result<bool, StoreError>;

    /// All reward claims for a normalized address, newest first, unbounded.
    async fn reward_history(
        &self,
        user_address: &str,
    ) -> Result<Vec<RewardActionRecord>, StoreError>;

    /// Transactions where the normalized address appears on either side,
    /// newest first, at most `limit` rows.
    async fn transactions_for_address(
        &self,
        address: &str,
        limit: u64,
    ) -> Result<Vec<TransactionRecord>, StoreError>;

    /// One page of the global listing, newest first, plus the total row
    /// count.
    async fn transactions_page(&self, page: u64, limit: u64)
    -> Result<TransactionPage, StoreError>;

    /// Single-row lookup by transaction hash.
    async fn transaction_by_hash(
        &self,
        hash: &str,
    ) -> Result<Option<TransactionRecord>, StoreError>;

    /// Backend liveness probe.
    async fn ping(&self) -> Result<(), StoreError>;
}

/// Connect the configured backend. The PostgreSQL path also applies
/// pending migrations before serving.
pub async fn connect(config: &DatabaseConfig) -> anyhow::Result<Arc<dyn RewardStore>> {
    match config.backend {
        StorageBackend::Postgres => {
            let store = PostgresStore::connect(config).await?;
            info!("Storage backend: PostgreSQL");
            Ok(Arc::new(store))
        }
        StorageBackend::Memory => {
            info!("Storage backend: in-memory (non-durable)");
            Ok(Arc::new(MemoryStore::new()))
        }
    }
}
