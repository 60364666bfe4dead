use thiserror::Error;

use crate::gateway::ApiError;

#[derive(Error, Debug)]
pub enum AuthError {
    #[error("validation failed: {0}")]
    Validation(String),

    #[error("username or email already taken")]
    AlreadyRegistered,

    #[error("invalid email or password")]
    InvalidCredentials,

    #[error("invalid or expired token")]
    InvalidToken,

    #[error("user not found")]
    NotFound,

    #[error("password hashing failed: {0}")]
    Hash(String),

    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),
}

impl From<AuthError> for ApiError {
    fn from(err: AuthError) -> Self {
        let message = err.to_string();
        match err {
            AuthError::Validation(_) | AuthError::AlreadyRegistered => {
                ApiError::bad_request(message)
            }
            AuthError::InvalidCredentials | AuthError::InvalidToken => {
                ApiError::unauthorized(message)
            }
            AuthError::NotFound => ApiError::not_found(message),
            AuthError::Hash(_) | AuthError::Database(_) => ApiError::internal(message),
        }
    }
}
