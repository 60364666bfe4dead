use thiserror::Error;

use crate::gateway::ApiError;

#[derive(Error, Debug)]
pub enum LedgerError {
    #[error("validation failed: {0}")]
    Validation(String),

    #[error("ledger entry not found")]
    NotFound,

    #[error("no ledger entries found for transaction")]
    NoEntriesForTransaction,

    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),
}

impl From<LedgerError> for ApiError {
    fn from(err: LedgerError) -> Self {
        let message = err.to_string();
        match err {
            LedgerError::Validation(_) => ApiError::bad_request(message),
            LedgerError::NotFound | LedgerError::NoEntriesForTransaction => {
                ApiError::not_found(message)
            }
            LedgerError::Database(_) => ApiError::internal(message),
        }
    }
}
