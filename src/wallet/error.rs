use thiserror::Error;
use uuid::Uuid;

use crate::gateway::{ApiError, error_codes};
use crate::kv::KvError;
use crate::money::MoneyError;

#[derive(Error, Debug)]
pub enum WalletError {
    #[error("validation failed: {0}")]
    Validation(String),

    #[error("invalid amount: {0}")]
    Amount(#[from] MoneyError),

    #[error("duplicate request: idempotency key already used")]
    Duplicate,

    #[error("wallet already exists for user {user_id} with currency {currency}")]
    AlreadyExists { user_id: Uuid, currency: String },

    #[error("wallet not found")]
    NotFound,

    #[error("wallet is not active")]
    NotActive,

    #[error("insufficient balance")]
    InsufficientFunds,

    #[error("wallet is locked, please try again")]
    Contended,

    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("kv store error: {0}")]
    Kv(#[from] KvError),
}

impl From<WalletError> for ApiError {
    fn from(err: WalletError) -> Self {
        let message = err.to_string();
        match err {
            WalletError::Validation(_) | WalletError::Amount(_) => ApiError::bad_request(message),
            WalletError::Duplicate => ApiError::duplicate(message),
            WalletError::AlreadyExists { .. } => ApiError::bad_request(message),
            WalletError::NotFound => ApiError::not_found(message),
            WalletError::NotActive => ApiError::new(
                axum::http::StatusCode::BAD_REQUEST,
                error_codes::WALLET_UNAVAILABLE,
                message,
            ),
            WalletError::InsufficientFunds => ApiError::new(
                axum::http::StatusCode::BAD_REQUEST,
                error_codes::INSUFFICIENT_FUNDS,
                message,
            ),
            WalletError::Contended => ApiError::service_unavailable(message),
            WalletError::Database(_) | WalletError::Kv(_) => ApiError::internal(message),
        }
    }
}
