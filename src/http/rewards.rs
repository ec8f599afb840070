//! Reward HTTP handlers: balance lookup, claim distribution, per-user
//! summary and the action catalogue.

use std::collections::BTreeMap;

use axum::extract::{Path, State};
use axum::routing::{get, post};
use axum::{Json, Router};
use serde::{Deserialize, Serialize};
use tracing::{error, info};

use crate::state::AppState;
use crate::storage::{
    NewRewardAction, NewTransaction, RewardActionRecord, TransactionKind, TransactionStatus,
};
use crate::units::format_tokens;
use crate::validation::{normalize_address, validate_address};

use super::ApiError;

/// The fixed catalogue of claimable actions. Rewards are configured on the
/// contract; entries without a configured reward are omitted from the
/// catalogue response.
pub const REWARD_ACTIONS: [&str; 4] = ["signup", "login", "referral", "task_complete"];

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/balance/{address}", get(get_balance))
        .route("/distribute", post(distribute_reward))
        .route("/user/{address}", get(get_user_rewards))
        .route("/actions", get(get_actions))
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BalanceResponse {
    pub address: String,
    /// Token-denominated display string
    pub balance: String,
    /// Smallest-unit decimal string
    pub balance_wei: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DistributeRequest {
    pub user_address: Option<String>,
    pub action: Option<String>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DistributeResponse {
    pub success: bool,
    pub transaction_hash: String,
    pub reward_amount: String,
    pub message: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UserRewardsResponse {
    pub address: String,
    pub total_rewards: String,
    pub total_rewards_wei: String,
    pub reward_history: Vec<RewardActionRecord>,
}

#[derive(Debug, Serialize)]
pub struct ActionsResponse {
    pub actions: BTreeMap<&'static str, String>,
}

async fn get_balance(
    State(state): State<AppState>,
    Path(address): Path<String>,
) -> Result<Json<BalanceResponse>, ApiError> {
    validate_address(&address)?;

    let balance = state.gateway.token_balance(&address).await?;
    Ok(Json(BalanceResponse {
        address,
        balance: format_tokens(balance),
        balance_wei: balance.to_string(),
    }))
}

/// Claim a reward for a completed action.
///
/// The workflow is strictly linear: eligibility checks, then the single
/// irreversible chain call, then persistence. The chain write is the
/// source of truth; a persistence failure after a confirmed distribution
/// is logged and does not fail the request.
async fn distribute_reward(
    State(state): State<AppState>,
    Json(request): Json<DistributeRequest>,
) -> Result<Json<DistributeResponse>, ApiError> {
    let (Some(user_address), Some(action)) = (request.user_address, request.action) else {
        return Err(ApiError::BadRequest(
            "userAddress and action are required".to_string(),
        ));
    };
    if user_address.trim().is_empty() || action.trim().is_empty() {
        return Err(ApiError::BadRequest(
            "userAddress and action are required".to_string(),
        ));
    }
    validate_address(&user_address)?;
    let normalized = normalize_address(&user_address);

    // One in-flight claim per (user, action) pair in this process. The
    // on-chain check below is still racy across processes.
    let _guard = state
        .begin_claim(&normalized, &action)
        .ok_or(ApiError::ClaimInProgress)?;

    if state.gateway.has_claimed(&user_address, &action).await? {
        return Err(ApiError::AlreadyClaimed);
    }

    let reward_amount = state.gateway.action_reward(&action).await?;
    if reward_amount == 0 {
        return Err(ApiError::UnknownAction);
    }

    let outcome = state.gateway.distribute(&user_address, &action).await?;
    assert!(
        !outcome.tx_hash.is_empty(),
        "Distribution produced an empty transaction hash"
    );

    info!(
        "Distributed {} base units to {} for {} (tx: {})",
        reward_amount, normalized, action, outcome.tx_hash
    );

    persist_distribution(&state, &normalized, &action, reward_amount, &outcome.tx_hash).await;

    Ok(Json(DistributeResponse {
        success: true,
        transaction_hash: outcome.tx_hash,
        reward_amount: format_tokens(reward_amount),
        message: "Reward distributed successfully".to_string(),
    }))
}

/// Record the claim and its transfer, keyed by the transaction hash so a
/// replay is a no-op.
async fn persist_distribution(
    state: &AppState,
    user_address: &str,
    action: &str,
    reward_amount: u128,
    tx_hash: &str,
) {
    let claim = NewRewardAction {
        user_address: user_address.to_string(),
        action: action.to_string(),
        reward_amount: reward_amount.to_string(),
        transaction_hash: tx_hash.to_string(),
    };
    if let Err(err) = state.store.insert_reward_action(claim).await {
        error!("Reward {tx_hash} confirmed on chain but claim row was not persisted: {err}");
    }

    let transfer = NewTransaction {
        from_address: normalize_address(state.gateway.reward_contract()),
        to_address: user_address.to_string(),
        amount: reward_amount.to_string(),
        kind: TransactionKind::Reward,
        action: Some(action.to_string()),
        transaction_hash: tx_hash.to_string(),
        status: TransactionStatus::Confirmed,
    };
    if let Err(err) = state.store.insert_transaction(transfer).await {
        error!("Reward {tx_hash} confirmed on chain but transaction row was not persisted: {err}");
    }
}

async fn get_user_rewards(
    State(state): State<AppState>,
    Path(address): Path<String>,
) -> Result<Json<UserRewardsResponse>, ApiError> {
    validate_address(&address)?;

    let total = state.gateway.user_total_rewards(&address).await?;
    let history = state
        .store
        .reward_history(&normalize_address(&address))
        .await?;

    Ok(Json(UserRewardsResponse {
        address,
        total_rewards: format_tokens(total),
        total_rewards_wei: total.to_string(),
        reward_history: history,
    }))
}

async fn get_actions(State(state): State<AppState>) -> Result<Json<ActionsResponse>, ApiError> {
    let mut actions = BTreeMap::new();
    for action in REWARD_ACTIONS {
        let reward = state.gateway.action_reward(action).await?;
        if reward > 0 {
            actions.insert(action, format_tokens(reward));
        }
    }
    Ok(Json(ActionsResponse { actions }))
}
