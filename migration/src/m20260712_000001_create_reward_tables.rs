use sea_orm_migration::prelude::*;
use sea_orm_migration::sea_query::Expr;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        // Reward actions table: one row per successfully claimed action
        manager
            .create_table(
                Table::create()
                    .table(RewardActions::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(RewardActions::Id)
                            .big_integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(
                        ColumnDef::new(RewardActions::UserAddress)
                            .string_len(64)
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(RewardActions::Action)
                            .string_len(64)
                            .not_null(),
                    )
                    // Smallest-unit amount stored as text; 18-decimal values
                    // overflow 64-bit integer columns
                    .col(
                        ColumnDef::new(RewardActions::RewardAmount)
                            .string_len(80)
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(RewardActions::TransactionHash)
                            .string_len(128)
                            .not_null()
                            .unique_key(),
                    )
                    .col(
                        ColumnDef::new(RewardActions::Timestamp)
                            .timestamp_with_time_zone()
                            .not_null()
                            .default(Expr::current_timestamp()),
                    )
                    .index(
                        Index::create()
                            .name("idx_reward_actions_user_address")
                            .col(RewardActions::UserAddress),
                    )
                    .index(
                        Index::create()
                            .name("idx_reward_actions_action")
                            .col(RewardActions::Action),
                    )
                    .index(
                        Index::create()
                            .name("idx_reward_actions_timestamp")
                            .col(RewardActions::Timestamp),
                    )
                    .to_owned(),
            )
            .await?;

        // Transactions table: one row per on-chain transfer the API originates
        manager
            .create_table(
                Table::create()
                    .table(Transactions::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(Transactions::Id)
                            .big_integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(
                        ColumnDef::new(Transactions::FromAddress)
                            .string_len(64)
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(Transactions::ToAddress)
                            .string_len(64)
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(Transactions::Amount)
                            .string_len(80)
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(Transactions::Kind)
                            .string_len(16)
                            .not_null(),
                    )
                    .col(ColumnDef::new(Transactions::Action).string_len(64))
                    .col(
                        ColumnDef::new(Transactions::TransactionHash)
                            .string_len(128)
                            .not_null()
                            .unique_key(),
                    )
                    .col(
                        ColumnDef::new(Transactions::Status)
                            .string_len(16)
                            .not_null()
                            .default("pending"),
                    )
                    .col(
                        ColumnDef::new(Transactions::Timestamp)
                            .timestamp_with_time_zone()
                            .not_null()
                            .default(Expr::current_timestamp()),
                    )
                    .index(
                        Index::create()
                            .name("idx_transactions_from_address")
                            .col(Transactions::FromAddress),
                    )
                    .index(
                        Index::create()
                            .name("idx_transactions_to_address")
                            .col(Transactions::ToAddress),
                    )
                    .index(
                        Index::create()
                            .name("idx_transactions_action")
                            .col(Transactions::Action),
                    )
                    .index(
                        Index::create()
                            .name("idx_transactions_timestamp")
                            .col(Transactions::Timestamp),
                    )
                    .to_owned(),
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(Transactions::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(RewardActions::Table).to_owned())
            .await
    }
}

#[derive(DeriveIden)]
enum RewardActions {
    Table,
    Id,
    UserAddress,
    Action,
    RewardAmount,
    TransactionHash,
    Timestamp,
}

#[derive(DeriveIden)]
enum Transactions {
    Table,
    Id,
    FromAddress,
    ToAddress,
    Amount,
    Kind,
    Action,
    TransactionHash,
    Status,
    Timestamp,
}
