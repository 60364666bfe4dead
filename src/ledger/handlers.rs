//! Ledger HTTP surface (read side).

use std::sync::Arc;

use axum::{
    Extension,
    extract::{Path, Query, State},
};
use serde::Deserialize;
use uuid::Uuid;

use crate::auth::AuthenticatedUser;
use crate::gateway::{ApiError, ApiResult, ok};
use crate::state::AppState;

use super::models::{LedgerEntry, LedgerStats, TransactionLedger, WalletLedger};

#[derive(Debug, Deserialize)]
pub struct WalletLedgerQuery {
    pub wallet_id: String,
    pub limit: Option<i64>,
    pub offset: Option<i64>,
}

#[derive(Debug, Deserialize)]
pub struct ListQuery {
    pub limit: Option<i64>,
    pub offset: Option<i64>,
}

/// Paginated audit listing of all ledger entries
///
/// GET /api/v1/ledger
#[utoipa::path(
    get,
    path = "/api/v1/ledger",
    responses((status = 200, description = "Ledger entries, newest first")),
    tag = "Ledger"
)]
pub async fn get_all_entries(
    State(state): State<Arc<AppState>>,
    Extension(_user): Extension<AuthenticatedUser>,
    Query(query): Query<ListQuery>,
) -> ApiResult<Vec<LedgerEntry>> {
    let service = state.ledger_service()?;
    let limit = query.limit.unwrap_or(50).clamp(1, 200);
    let offset = query.offset.unwrap_or(0).max(0);
    match service.get_all_entries(limit, offset).await {
        Ok(entries) => ok(entries),
        Err(e) => ApiError::from(e).into_err(),
    }
}

/// Get one ledger entry
///
/// GET /api/v1/ledger/{id}
#[utoipa::path(
    get,
    path = "/api/v1/ledger/{id}",
    params(("id" = Uuid, Path, description = "Ledger entry id")),
    responses(
        (status = 200, description = "Ledger entry"),
        (status = 404, description = "Entry not found")
    ),
    tag = "Ledger"
)]
pub async fn get_entry(
    State(state): State<Arc<AppState>>,
    Extension(_user): Extension<AuthenticatedUser>,
    Path(id): Path<Uuid>,
) -> ApiResult<LedgerEntry> {
    let service = state.ledger_service()?;
    match service.get_entry(id).await {
        Ok(entry) => ok(entry),
        Err(e) => ApiError::from(e).into_err(),
    }
}

/// Per-transaction ledger with totals
///
/// GET /api/v1/ledger/transaction/{id}
#[utoipa::path(
    get,
    path = "/api/v1/ledger/transaction/{id}",
    params(("id" = String, Path, description = "Transaction id")),
    responses(
        (status = 200, description = "Entries plus debit/credit totals"),
        (status = 404, description = "No entries for transaction")
    ),
    tag = "Ledger"
)]
pub async fn get_transaction_ledger(
    State(state): State<Arc<AppState>>,
    Extension(_user): Extension<AuthenticatedUser>,
    Path(transaction_id): Path<String>,
) -> ApiResult<TransactionLedger> {
    let service = state.ledger_service()?;
    match service.get_transaction_ledger(&transaction_id).await {
        Ok(ledger) => ok(ledger),
        Err(e) => ApiError::from(e).into_err(),
    }
}

/// Per-wallet ledger history
///
/// GET /api/v1/ledger/wallet?wallet_id=...
#[utoipa::path(
    get,
    path = "/api/v1/ledger/wallet",
    params(("wallet_id" = String, Query, description = "Wallet id")),
    responses((status = 200, description = "Entries newest first plus current running balance")),
    tag = "Ledger"
)]
pub async fn get_wallet_ledger(
    State(state): State<Arc<AppState>>,
    Extension(_user): Extension<AuthenticatedUser>,
    Query(query): Query<WalletLedgerQuery>,
) -> ApiResult<WalletLedger> {
    let service = state.ledger_service()?;
    let limit = query.limit.unwrap_or(50).clamp(1, 200);
    let offset = query.offset.unwrap_or(0).max(0);
    match service
        .get_wallet_ledger(&query.wallet_id, limit, offset)
        .await
    {
        Ok(ledger) => ok(ledger),
        Err(e) => ApiError::from(e).into_err(),
    }
}

/// Per-wallet aggregate counters
///
/// GET /api/v1/ledger/wallet/stats?wallet_id=...
#[utoipa::path(
    get,
    path = "/api/v1/ledger/wallet/stats",
    params(("wallet_id" = String, Query, description = "Wallet id")),
    responses((status = 200, description = "Entry/debit/credit counts and sums")),
    tag = "Ledger"
)]
pub async fn get_wallet_stats(
    State(state): State<Arc<AppState>>,
    Extension(_user): Extension<AuthenticatedUser>,
    Query(query): Query<WalletLedgerQuery>,
) -> ApiResult<LedgerStats> {
    let service = state.ledger_service()?;
    match service.get_wallet_stats(&query.wallet_id).await {
        Ok(stats) => ok(stats),
        Err(e) => ApiError::from(e).into_err(),
    }
}
