//! Reward action entity: one row per successfully claimed reward.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "reward_actions")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i64,
    /// Claiming wallet address, lowercase-normalized
    #[sea_orm(column_type = "String(StringLen::N(64))")]
    pub user_address: String,
    /// Action identifier the reward was claimed for
    #[sea_orm(column_type = "String(StringLen::N(64))")]
    pub action: String,
    /// Reward amount in smallest units, stored as decimal text
    #[sea_orm(column_type = "String(StringLen::N(80))")]
    pub reward_amount: String,
    /// Hash of the distribution transaction; unique, idempotency key
    #[sea_orm(column_type = "String(StringLen::N(128))", unique)]
    pub transaction_hash: String,
    pub timestamp: DateTimeWithTimeZone,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}
