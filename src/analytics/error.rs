use thiserror::Error;

use crate::gateway::ApiError;
use crate::kv::KvError;

#[derive(Error, Debug)]
pub enum AnalyticsError {
    #[error("validation failed: {0}")]
    Validation(String),

    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("kv store error: {0}")]
    Kv(#[from] KvError),
}

impl From<AnalyticsError> for ApiError {
    fn from(err: AnalyticsError) -> Self {
        let message = err.to_string();
        match err {
            AnalyticsError::Validation(_) => ApiError::bad_request(message),
            AnalyticsError::Database(_) | AnalyticsError::Kv(_) => ApiError::internal(message),
        }
    }
}
