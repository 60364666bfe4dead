//! Transaction HTTP surface.

use std::sync::Arc;

use axum::{
    Extension, Json,
    extract::{Path, Query, State},
};
use serde::Deserialize;
use uuid::Uuid;

use crate::auth::AuthenticatedUser;
use crate::gateway::{ApiError, ApiResult, created, ok};
use crate::state::AppState;

use super::models::{
    BatchTransferResponse, CreateBatchTransactionRequest, CreateScheduledTransactionRequest,
    CreateTransactionRequest, Transaction,
};

#[derive(Debug, Deserialize)]
pub struct ListQuery {
    pub wallet_id: String,
    pub limit: Option<i64>,
    pub offset: Option<i64>,
}

/// Create P2P transfer endpoint
///
/// POST /api/v1/transactions
#[utoipa::path(
    post,
    path = "/api/v1/transactions",
    request_body = CreateTransactionRequest,
    responses(
        (status = 201, description = "Transfer completed"),
        (status = 400, description = "Validation, duplicate key, insufficient funds or currency mismatch"),
        (status = 503, description = "Wallet service unavailable; retry with the same idempotency key")
    ),
    tag = "Transaction"
)]
pub async fn create_transaction(
    State(state): State<Arc<AppState>>,
    Extension(_user): Extension<AuthenticatedUser>,
    Json(req): Json<CreateTransactionRequest>,
) -> ApiResult<Transaction> {
    let service = state.transaction_service()?;
    match service.create_p2p_transfer(&req).await {
        Ok(transaction) => created(transaction),
        Err(e) => ApiError::from(e).into_err(),
    }
}

/// Create batch transfer endpoint
///
/// POST /api/v1/transactions/batch
#[utoipa::path(
    post,
    path = "/api/v1/transactions/batch",
    request_body = CreateBatchTransactionRequest,
    responses(
        (status = 201, description = "Batch completed (all-or-nothing)"),
        (status = 400, description = "Validation failure; no item executed")
    ),
    tag = "Transaction"
)]
pub async fn create_batch_transaction(
    State(state): State<Arc<AppState>>,
    Extension(_user): Extension<AuthenticatedUser>,
    Json(req): Json<CreateBatchTransactionRequest>,
) -> ApiResult<BatchTransferResponse> {
    let service = state.transaction_service()?;
    match service.create_batch_transfer(&req).await {
        Ok(response) => created(response),
        Err(e) => ApiError::from(e).into_err(),
    }
}

/// Create scheduled transfer endpoint
///
/// POST /api/v1/transactions/scheduled
#[utoipa::path(
    post,
    path = "/api/v1/transactions/scheduled",
    request_body = CreateScheduledTransactionRequest,
    responses(
        (status = 201, description = "Scheduled; no funds moved yet"),
        (status = 400, description = "Validation or schedule window violation")
    ),
    tag = "Transaction"
)]
pub async fn create_scheduled_transaction(
    State(state): State<Arc<AppState>>,
    Extension(_user): Extension<AuthenticatedUser>,
    Json(req): Json<CreateScheduledTransactionRequest>,
) -> ApiResult<Transaction> {
    let service = state.transaction_service()?;
    match service.create_scheduled_transfer(&req).await {
        Ok(transaction) => created(transaction),
        Err(e) => ApiError::from(e).into_err(),
    }
}

/// Get transaction endpoint
///
/// GET /api/v1/transactions/{id}
#[utoipa::path(
    get,
    path = "/api/v1/transactions/{id}",
    params(("id" = Uuid, Path, description = "Transaction id")),
    responses(
        (status = 200, description = "Transaction"),
        (status = 404, description = "Transaction not found")
    ),
    tag = "Transaction"
)]
pub async fn get_transaction(
    State(state): State<Arc<AppState>>,
    Extension(_user): Extension<AuthenticatedUser>,
    Path(id): Path<Uuid>,
) -> ApiResult<Transaction> {
    let service = state.transaction_service()?;
    match service.get_transaction(id).await {
        Ok(transaction) => ok(transaction),
        Err(e) => ApiError::from(e).into_err(),
    }
}

/// List transactions for a wallet
///
/// GET /api/v1/transactions?wallet_id=...
#[utoipa::path(
    get,
    path = "/api/v1/transactions",
    params(("wallet_id" = String, Query, description = "Wallet id")),
    responses((status = 200, description = "Transactions, newest first")),
    tag = "Transaction"
)]
pub async fn list_transactions(
    State(state): State<Arc<AppState>>,
    Extension(_user): Extension<AuthenticatedUser>,
    Query(query): Query<ListQuery>,
) -> ApiResult<Vec<Transaction>> {
    let service = state.transaction_service()?;
    let limit = query.limit.unwrap_or(50).clamp(1, 200);
    let offset = query.offset.unwrap_or(0).max(0);
    match service
        .list_transactions_by_wallet(&query.wallet_id, limit, offset)
        .await
    {
        Ok(transactions) => ok(transactions),
        Err(e) => ApiError::from(e).into_err(),
    }
}
