#![allow(unused_imports)]

pub use super::reward_action::Entity as RewardAction;
pub use super::transaction::Entity as Transaction;
