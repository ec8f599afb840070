//! Transaction history HTTP handlers: paginated global listing,
//! address-scoped listing and single-row lookup by hash.

use axum::extract::{Path, Query, State};
use axum::routing::get;
use axum::{Json, Router};
use serde::{Deserialize, Serialize};

use crate::state::AppState;
use crate::storage::TransactionRecord;
use crate::validation::{normalize_address, validate_address};

use super::ApiError;

const DEFAULT_PAGE_LIMIT: u64 = 50;
const MAX_PAGE_LIMIT: u64 = 500;

/// Cap on the address-scoped listing
const ADDRESS_HISTORY_LIMIT: u64 = 100;

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(list_transactions))
        .route("/{address}", get(get_address_transactions))
        .route("/hash/{hash}", get(get_transaction_by_hash))
}

#[derive(Debug, Deserialize, Default)]
pub struct PageQuery {
    pub page: Option<u64>,
    pub limit: Option<u64>,
}

#[derive(Debug, Serialize)]
pub struct TransactionListResponse {
    pub transactions: Vec<TransactionRecord>,
    pub pagination: Pagination,
}

#[derive(Debug, Serialize)]
pub struct Pagination {
    pub page: u64,
    pub limit: u64,
    pub total: u64,
    pub pages: u64,
}

#[derive(Debug, Serialize)]
pub struct AddressTransactionsResponse {
    pub transactions: Vec<TransactionRecord>,
}

#[derive(Debug, Serialize)]
pub struct TransactionResponse {
    pub transaction: TransactionRecord,
}

async fn list_transactions(
    State(state): State<AppState>,
    Query(query): Query<PageQuery>,
) -> Result<Json<TransactionListResponse>, ApiError> {
    let page = query.page.unwrap_or(1);
    let requested_limit = query.limit.unwrap_or(DEFAULT_PAGE_LIMIT);
    if page == 0 || requested_limit == 0 {
        return Err(ApiError::BadRequest(
            "page and limit must be positive".to_string(),
        ));
    }
    let limit = requested_limit.min(MAX_PAGE_LIMIT);
    let in_range = (page - 1)
        .checked_mul(limit)
        .is_some_and(|offset| offset <= i64::MAX as u64);
    if !in_range {
        return Err(ApiError::BadRequest("page is out of range".to_string()));
    }

    let page_result = state.store.transactions_page(page, limit).await?;
    assert!(
        page_result.transactions.len() as u64 <= limit,
        "Returned more transactions than requested"
    );

    let pages = page_result.total.div_ceil(limit);
    Ok(Json(TransactionListResponse {
        transactions: page_result.transactions,
        pagination: Pagination {
            page,
            limit,
            total: page_result.total,
            pages,
        },
    }))
}

async fn get_address_transactions(
    State(state): State<AppState>,
    Path(address): Path<String>,
) -> Result<Json<AddressTransactionsResponse>, ApiError> {
    validate_address(&address)?;

    let transactions = state
        .store
        .transactions_for_address(&normalize_address(&address), ADDRESS_HISTORY_LIMIT)
        .await?;

    Ok(Json(AddressTransactionsResponse { transactions }))
}

async fn get_transaction_by_hash(
    State(state): State<AppState>,
    Path(hash): Path<String>,
) -> Result<Json<TransactionResponse>, ApiError> {
    let transaction = state
        .store
        .transaction_by_hash(&hash)
        .await?
        .ok_or_else(|| ApiError::NotFound("Transaction not found".to_string()))?;

    Ok(Json(TransactionResponse { transaction }))
}
