use thiserror::Error;

use crate::gateway::{ApiError, error_codes};
use crate::kv::KvError;
use crate::peer::PeerError;

#[derive(Error, Debug)]
pub enum TransactionError {
    #[error("validation failed: {0}")]
    Validation(String),

    #[error("duplicate request: idempotency key already used")]
    Duplicate,

    #[error("transaction not found")]
    NotFound,

    #[error("insufficient balance")]
    InsufficientFunds,

    #[error("currency mismatch: {from} != {to}")]
    CurrencyMismatch { from: String, to: String },

    #[error("wallet unavailable: {0}")]
    WalletUnavailable(String),

    #[error("wallet service unavailable: {0}")]
    Unavailable(String),

    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("kv store error: {0}")]
    Kv(#[from] KvError),
}

impl From<PeerError> for TransactionError {
    fn from(err: PeerError) -> Self {
        if err.is_insufficient_funds() {
            return TransactionError::InsufficientFunds;
        }
        if err.is_duplicate() {
            return TransactionError::Duplicate;
        }
        match err {
            PeerError::NotFound => {
                TransactionError::WalletUnavailable("wallet not found".to_string())
            }
            PeerError::Inactive => {
                TransactionError::WalletUnavailable("wallet is not active".to_string())
            }
            PeerError::Remote { message, .. } => TransactionError::WalletUnavailable(message),
            PeerError::Unavailable(reason) => TransactionError::Unavailable(reason),
        }
    }
}

impl From<TransactionError> for ApiError {
    fn from(err: TransactionError) -> Self {
        let message = err.to_string();
        match err {
            TransactionError::Validation(_) => ApiError::bad_request(message),
            TransactionError::Duplicate => ApiError::duplicate(message),
            TransactionError::NotFound => ApiError::not_found(message),
            TransactionError::InsufficientFunds => ApiError::new(
                axum::http::StatusCode::BAD_REQUEST,
                error_codes::INSUFFICIENT_FUNDS,
                message,
            ),
            TransactionError::CurrencyMismatch { .. } => ApiError::new(
                axum::http::StatusCode::BAD_REQUEST,
                error_codes::CURRENCY_MISMATCH,
                message,
            ),
            TransactionError::WalletUnavailable(_) => ApiError::new(
                axum::http::StatusCode::BAD_REQUEST,
                error_codes::WALLET_UNAVAILABLE,
                message,
            ),
            TransactionError::Unavailable(_) => ApiError::service_unavailable(message),
            TransactionError::Database(_) | TransactionError::Kv(_) => ApiError::internal(message),
        }
    }
}
