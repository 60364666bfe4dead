//! Bearer-token middleware.
//!
//! Applied to every public route group; decodes the HS256 JWT with the shared
//! secret and injects [`AuthenticatedUser`] for the handlers. Internal
//! (service-to-service) routes do not pass through here: they are
//! authenticated at the transport layer.

use std::sync::Arc;

use axum::{
    extract::{Request, State},
    http::header::AUTHORIZATION,
    middleware::Next,
    response::Response,
};
use jsonwebtoken::{Algorithm, DecodingKey, Validation, decode};
use uuid::Uuid;

use crate::gateway::{ApiError, error_codes};
use crate::state::AppState;

use super::models::Claims;

/// Identity extracted from a verified token.
#[derive(Debug, Clone)]
pub struct AuthenticatedUser {
    pub user_id: Uuid,
}

pub async fn require_auth(
    State(state): State<Arc<AppState>>,
    mut request: Request,
    next: Next,
) -> Result<Response, ApiError> {
    let header = request
        .headers()
        .get(AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .ok_or_else(|| {
            ApiError::new(
                axum::http::StatusCode::UNAUTHORIZED,
                error_codes::MISSING_AUTH,
                "missing authorization header",
            )
        })?;

    let token = header
        .strip_prefix("Bearer ")
        .ok_or_else(|| ApiError::unauthorized("expected bearer token"))?;

    let decoding_key = DecodingKey::from_secret(state.config.jwt_secret.as_bytes());
    let claims = decode::<Claims>(token, &decoding_key, &Validation::new(Algorithm::HS256))
        .map_err(|_| ApiError::unauthorized("invalid or expired token"))?
        .claims;

    let user_id = Uuid::parse_str(&claims.sub)
        .map_err(|_| ApiError::unauthorized("malformed token subject"))?;

    request
        .extensions_mut()
        .insert(AuthenticatedUser { user_id });

    Ok(next.run(request).await)
}
