//! PostgreSQL backend for the storage port.

use std::time::Duration;

use anyhow::{Context, Result};
use async_trait::async_trait;
use chrono::Utc;
use migration::MigratorTrait;
use sea_orm::sea_query::OnConflict;
use sea_orm::{
    ActiveValue, ColumnTrait, Condition, ConnectOptions, Database, DatabaseConnection, EntityTrait,
    PaginatorTrait, QueryFilter, QueryOrder, QuerySelect,
};

use crate::config::DatabaseConfig;
use crate::entities::{reward_action, transaction};

use super::{
    NewRewardAction, NewTransaction, RewardActionRecord, RewardStore, StoreError, TransactionPage,
    TransactionRecord,
};

pub struct PostgresStore {
    db: DatabaseConnection,
}

impl PostgresStore {
    /// Connect, bounded by the configured pool sizes, and run pending
    /// migrations.
    pub async fn connect(config: &DatabaseConfig) -> Result<Self> {
        let url = config.connection_url()?;
        let mut options = ConnectOptions::new(url);
        options
            .max_connections(config.max_connections)
            .sqlx_logging(true)
            .sqlx_logging_level(tracing::log::LevelFilter::Debug)
            .acquire_timeout(Duration::from_secs(10));

        if let Some(min) = config.min_connections {
            options.min_connections(min);
        }

        assert!(
            config.max_connections >= config.min_connections.unwrap_or(1),
            "Max connections must be >= min connections"
        );
        assert!(
            config.max_connections <= 128,
            "Connection pool oversized"
        );

        let db = Database::connect(options)
            .await
            .context("Failed to connect to PostgreSQL")?;

        migration::Migrator::up(&db, None)
            .await
            .context("Database migrations failed")?;

        Ok(Self { db })
    }
}

#[async_trait]
impl RewardStore for PostgresStore {
    async fn insert_reward_action(&self, row: NewRewardAction) -> Result<bool, StoreError> {
        let model = reward_action::ActiveModel {
            id: ActiveValue::NotSet,
            user_address: ActiveValue::Set(row.user_address),
            action: ActiveValue::Set(row.action),
            reward_amount: ActiveValue::Set(row.reward_amount),
            transaction_hash: ActiveValue::Set(row.transaction_hash),
            timestamp: ActiveValue::Set(Utc::now().fixed_offset()),
        };

        let inserted = reward_action::Entity::insert(model)
            .on_conflict(
                OnConflict::column(reward_action::Column::TransactionHash)
                    .do_nothing()
                    .to_owned(),
            )
            .exec_without_returning(&self.db)
            .await?;
        Ok(inserted > 0)
    }

    async fn insert_transaction(&self, row: NewTransaction) -> Result<bool, StoreError> {
        let model = transaction::ActiveModel {
            id: ActiveValue::NotSet,
            from_address: ActiveValue::Set(row.from_address),
            to_address: ActiveValue::Set(row.to_address),
            amount: ActiveValue::Set(row.amount),
            kind: ActiveValue::Set(row.kind.as_str().to_string()),
            action: ActiveValue::Set(row.action),
            transaction_hash: ActiveValue::Set(row.transaction_hash),
            status: ActiveValue::Set(row.status.as_str().to_string()),
            timestamp: ActiveValue::Set(Utc::now().fixed_offset()),
        };

        let inserted = transaction::Entity::insert(model)
            .on_conflict(
                OnConflict::column(transaction::Column::TransactionHash)
                    .do_nothing()
                    .to_owned(),
            )
            .exec_without_returning(&self.db)
            .await?;
        Ok(inserted > 0)
    }

    async fn reward_history(
        &self,
        user_address: &str,
    ) -> Result<Vec<RewardActionRecord>, StoreError> {
        let rows = reward_action::Entity::find()
            .filter(reward_action::Column::UserAddress.eq(user_address))
            .order_by_desc(reward_action::Column::Timestamp)
            .all(&self.db)
            .await?;

        Ok(rows.into_iter().map(reward_record).collect())
    }

    async fn transactions_for_address(
        &self,
        address: &str,
        limit: u64,
    ) -> Result<Vec<TransactionRecord>, StoreError> {
        assert!(limit > 0, "Address listing limit must be positive");

        let rows = transaction::Entity::find()
            .filter(
                Condition::any()
                    .add(transaction::Column::FromAddress.eq(address))
                    .add(transaction::Column::ToAddress.eq(address)),
            )
            .order_by_desc(transaction::Column::Timestamp)
            .limit(limit)
            .all(&self.db)
            .await?;

        rows.into_iter().map(transaction_record).collect()
    }

    async fn transactions_page(
        &self,
        page: u64,
        limit: u64,
    ) -> Result<TransactionPage, StoreError> {
        assert!(page > 0, "Page numbers are 1-based");
        assert!(limit > 0, "Page limit must be positive");

        let total = transaction::Entity::find().count(&self.db).await?;

        let rows = transaction::Entity::find()
            .order_by_desc(transaction::Column::Timestamp)
            .limit(limit)
            .offset((page - 1) * limit)
            .all(&self.db)
            .await?;

        let transactions = rows
            .into_iter()
            .map(transaction_record)
            .collect::<Result<Vec<_>, _>>()?;
        Ok(TransactionPage {
            transactions,
            total,
        })
    }

    async fn transaction_by_hash(
        &self,
        hash: &str,
    ) -> Result<Option<TransactionRecord>, StoreError> {
        let row = transaction::Entity::find()
            .filter(transaction::Column::TransactionHash.eq(hash))
            .one(&self.db)
            .await?;

        row.map(transaction_record).transpose()
    }

    async fn ping(&self) -> Result<(), StoreError> {
        self.db.ping().await?;
        Ok(())
    }
}

fn reward_record(model: reward_action::Model) -> RewardActionRecord {
    RewardActionRecord {
        user_address: model.user_address,
        action: model.action,
        reward_amount: model.reward_amount,
        transaction_hash: model.transaction_hash,
        timestamp: model.timestamp.with_timezone(&Utc),
    }
}

fn transaction_record(model: transaction::Model) -> Result<TransactionRecord, StoreError> {
    Ok(TransactionRecord {
        from_address: model.from_address,
        to_address: model.to_address,
        amount: model.amount,
        kind: model.kind.parse()?,
        action: model.action,
        transaction_hash: model.transaction_hash,
        status: model.status.parse()?,
        timestamp: model.timestamp.with_timezone(&Utc),
    })
}
