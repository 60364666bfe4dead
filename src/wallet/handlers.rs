//! Wallet HTTP surface.
//!
//! Public routes require a bearer token and enforce ownership; the internal
//! routes are the service-to-service surface consumed by the transaction
//! engine (mutually authenticated at the transport layer, no user token).

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
    CreateWalletRequest, DepositRequest, TransferRequest, Wallet, WalletEvent, WithdrawRequest,
};

#[derive(Debug, Deserialize)]
pub struct EventsQuery {
    pub limit: Option<i64>,
    pub offset: Option<i64>,
}

/// Create wallet endpoint
///
/// POST /api/v1/wallets
#[utoipa::path(
    post,
    path = "/api/v1/wallets",
    request_body = CreateWalletRequest,
    responses(
        (status = 201, description = "Wallet created"),
        (status = 400, description = "Invalid currency or wallet already exists"),
        (status = 401, description = "Authentication failed")
    ),
    tag = "Wallet"
)]
pub async fn create_wallet(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<AuthenticatedUser>,
    Json(req): Json<CreateWalletRequest>,
) -> ApiResult<Wallet> {
    let service = state.wallet_service()?;
    match service.create_wallet(user.user_id, &req.currency).await {
        Ok(wallet) => created(wallet),
        Err(e) => ApiError::from(e).into_err(),
    }
}

/// Get wallet endpoint
///
/// GET /api/v1/wallets/{id}
#[utoipa::path(
    get,
    path = "/api/v1/wallets/{id}",
    params(("id" = Uuid, Path, description = "Wallet id")),
    responses(
        (status = 200, description = "Wallet"),
        (status = 403, description = "Caller does not own the wallet"),
        (status = 404, description = "Wallet not found")
    ),
    tag = "Wallet"
)]
pub async fn get_wallet(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<AuthenticatedUser>,
    Path(wallet_id): Path<Uuid>,
) -> ApiResult<Wallet> {
    let service = state.wallet_service()?;
    match service.get_wallet(wallet_id).await {
        Ok(wallet) if wallet.user_id != user.user_id => {
            ApiError::forbidden("wallet belongs to another user").into_err()
        }
        Ok(wallet) => ok(wallet),
        Err(e) => ApiError::from(e).into_err(),
    }
}

/// List the authenticated user's wallets
///
/// GET /api/v1/wallets/my-wallets
#[utoipa::path(
    get,
    path = "/api/v1/wallets/my-wallets",
    responses((status = 200, description = "Wallets owned by the caller")),
    tag = "Wallet"
)]
pub async fn my_wallets(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<AuthenticatedUser>,
) -> ApiResult<Vec<Wallet>> {
    let service = state.wallet_service()?;
    match service.get_wallets_by_user(user.user_id).await {
        Ok(wallets) => ok(wallets),
        Err(e) => ApiError::from(e).into_err(),
    }
}

/// Deposit endpoint
///
/// POST /api/v1/wallets/{id}/deposit
#[utoipa::path(
    post,
    path = "/api/v1/wallets/{id}/deposit",
    params(("id" = Uuid, Path, description = "Wallet id")),
    request_body = DepositRequest,
    responses(
        (status = 200, description = "Updated wallet"),
        (status = 400, description = "Validation or duplicate idempotency key"),
        (status = 404, description = "Wallet not found")
    ),
    tag = "Wallet"
)]
pub async fn deposit(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<AuthenticatedUser>,
    Path(wallet_id): Path<Uuid>,
    Json(req): Json<DepositRequest>,
) -> ApiResult<Wallet> {
    let service = state.wallet_service()?;
    if let Err(e) = ensure_owner(service, wallet_id, user.user_id).await {
        return e.into_err();
    }
    match service
        .deposit(
            wallet_id,
            &req.amount,
            req.description.as_deref(),
            &req.idempotency_key,
        )
        .await
    {
        Ok(wallet) => ok(wallet),
        Err(e) => ApiError::from(e).into_err(),
    }
}

/// Withdraw endpoint
///
/// POST /api/v1/wallets/{id}/withdraw
#[utoipa::path(
    post,
    path = "/api/v1/wallets/{id}/withdraw",
    params(("id" = Uuid, Path, description = "Wallet id")),
    request_body = WithdrawRequest,
    responses(
        (status = 200, description = "Updated wallet"),
        (status = 400, description = "Insufficient funds, validation or duplicate key"),
        (status = 404, description = "Wallet not found")
    ),
    tag = "Wallet"
)]
pub async fn withdraw(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<AuthenticatedUser>,
    Path(wallet_id): Path<Uuid>,
    Json(req): Json<WithdrawRequest>,
) -> ApiResult<Wallet> {
    let service = state.wallet_service()?;
    if let Err(e) = ensure_owner(service, wallet_id, user.user_id).await {
        return e.into_err();
    }
    match service
        .withdraw(
            wallet_id,
            &req.amount,
            req.description.as_deref(),
            &req.idempotency_key,
        )
        .await
    {
        Ok(wallet) => ok(wallet),
        Err(e) => ApiError::from(e).into_err(),
    }
}

/// Wallet journal endpoint
///
/// GET /api/v1/wallets/{id}/events
#[utoipa::path(
    get,
    path = "/api/v1/wallets/{id}/events",
    params(("id" = Uuid, Path, description = "Wallet id")),
    responses((status = 200, description = "Wallet events, newest first")),
    tag = "Wallet"
)]
pub async fn wallet_events(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<AuthenticatedUser>,
    Path(wallet_id): Path<Uuid>,
    Query(query): Query<EventsQuery>,
) -> ApiResult<Vec<WalletEvent>> {
    let service = state.wallet_service()?;
    if let Err(e) = ensure_owner(service, wallet_id, user.user_id).await {
        return e.into_err();
    }
    let limit = query.limit.unwrap_or(50).clamp(1, 200);
    let offset = query.offset.unwrap_or(0).max(0);
    match service.get_wallet_events(wallet_id, limit, offset).await {
        Ok(events) => ok(events),
        Err(e) => ApiError::from(e).into_err(),
    }
}

async fn ensure_owner(
    service: &super::WalletService,
    wallet_id: Uuid,
    user_id: Uuid,
) -> Result<(), ApiError> {
    let wallet = service.get_wallet(wallet_id).await.map_err(ApiError::from)?;
    if wallet.user_id != user_id {
        return Err(ApiError::forbidden("wallet belongs to another user"));
    }
    Ok(())
}

// ============================================================================
// Internal surface (service-to-service)
// ============================================================================

/// Internal wallet lookup for peer services
///
/// GET /api/v1/internal/wallets/{id}
pub async fn internal_get_wallet(
    State(state): State<Arc<AppState>>,
    Path(wallet_id): Path<Uuid>,
) -> ApiResult<Wallet> {
    let service = state.wallet_service()?;
    match service.get_wallet(wallet_id).await {
        Ok(wallet) => ok(wallet),
        Err(e) => ApiError::from(e).into_err(),
    }
}

/// Internal transfer primitive for the transaction engine
///
/// POST /api/v1/internal/wallets/transfer
pub async fn internal_transfer(
    State(state): State<Arc<AppState>>,
    Json(req): Json<TransferRequest>,
) -> ApiResult<()> {
    let service = state.wallet_service()?;
    match service.transfer(&req).await {
        Ok(()) => ok(()),
        Err(e) => ApiError::from(e).into_err(),
    }
}
