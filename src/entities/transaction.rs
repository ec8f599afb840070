//! Transaction entity: one row per on-chain transfer the API originates.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "transactions")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i64,
    /// Sending address, lowercase-normalized
    #[sea_orm(column_type = "String(StringLen::N(64))")]
    pub from_address: String,
    /// Receiving address, lowercase-normalized
    #[sea_orm(column_type = "String(StringLen::N(64))")]
    pub to_address: String,
    /// Transfer amount in smallest units, stored as decimal text
    #[sea_orm(column_type = "String(StringLen::N(80))")]
    pub amount: String,
    /// Transfer kind: reward, transfer or mint
    #[sea_orm(column_type = "String(StringLen::N(16))")]
    pub kind: String,
    /// Action identifier, present for reward-type rows
    #[sea_orm(column_type = "String(StringLen::N(64))", nullable)]
    pub action: Option<String>,
    #[sea_orm(column_type = "String(StringLen::N(128))", unique)]
    pub transaction_hash: String,
    /// pending, confirmed or failed
    #[sea_orm(column_type = "String(StringLen::N(16))")]
    pub status: String,
    pub timestamp: DateTimeWithTimeZone,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}
