//! Auth HTTP surface.

use std::sync::Arc;

use axum::{Extension, Json, extract::State};

use crate::gateway::{ApiError, ApiResult, created, ok};
use crate::state::AppState;

use super::middleware::AuthenticatedUser;
use super::models::{AuthResponse, AuthUser, LoginRequest, RefreshRequest, RegisterRequest};

/// Register endpoint
///
/// POST /api/v1/register
#[utoipa::path(
    post,
    path = "/api/v1/register",
    request_body = RegisterRequest,
    responses(
        (status = 201, description = "User created"),
        (status = 400, description = "Validation failure or already registered")
    ),
    tag = "Auth"
)]
pub async fn register(
    State(state): State<Arc<AppState>>,
    Json(req): Json<RegisterRequest>,
) -> ApiResult<AuthUser> {
    let service = state.auth_service()?;
    match service.register(&req).await {
        Ok(user) => created(user),
        Err(e) => ApiError::from(e).into_err(),
    }
}

/// Login endpoint
///
/// POST /api/v1/login
#[utoipa::path(
    post,
    path = "/api/v1/login",
    request_body = LoginRequest,
    responses(
        (status = 200, description = "Token pair"),
        (status = 401, description = "Invalid credentials")
    ),
    tag = "Auth"
)]
pub async fn login(
    State(state): State<Arc<AppState>>,
    Json(req): Json<LoginRequest>,
) -> ApiResult<AuthResponse> {
    let service = state.auth_service()?;
    match service.login(&req).await {
        Ok(response) => ok(response),
        Err(e) => ApiError::from(e).into_err(),
    }
}

/// Refresh endpoint
///
/// POST /api/v1/refresh
#[utoipa::path(
    post,
    path = "/api/v1/refresh",
    request_body = RefreshRequest,
    responses(
        (status = 200, description = "Rotated token pair"),
        (status = 401, description = "Invalid, expired or already-used refresh token")
    ),
    tag = "Auth"
)]
pub async fn refresh(
    State(state): State<Arc<AppState>>,
    Json(req): Json<RefreshRequest>,
) -> ApiResult<AuthResponse> {
    let service = state.auth_service()?;
    match service.refresh(&req.refresh_token).await {
        Ok(response) => ok(response),
        Err(e) => ApiError::from(e).into_err(),
    }
}

/// Current-user endpoint
///
/// GET /api/v1/me
#[utoipa::path(
    get,
    path = "/api/v1/me",
    responses(
        (status = 200, description = "The authenticated user"),
        (status = 401, description = "Missing or invalid token")
    ),
    tag = "Auth"
)]
pub async fn me(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<AuthenticatedUser>,
) -> ApiResult<AuthUser> {
    let service = state.auth_service()?;
    match service.get_user(user.user_id).await {
        Ok(user) => ok(user),
        Err(e) => ApiError::from(e).into_err(),
    }
}
