//! Authentication and authorization logic.
//!
//! Provides password hashing, JWT issue/verify/revoke, the account store and
//! the checks the HTTP layer runs before a handler body executes.

pub mod accounts;
pub mod guard;
pub mod jwt;
pub mod password;
pub mod revocation;
pub mod users;

use thiserror::Error;

use crate::fields::FieldError;

/// Authentication errors.
#[derive(Debug, Error)]
pub enum AuthError {
    #[error("Token is missing")]
    MissingCredential,

    #[error("{0}")]
    InvalidCredential(String),

    #[error("{0}")]
    InsufficientRole(String),

    #[error("{0}")]
    DuplicateUnique(String),

    #[error("{0}")]
    ValidationError(String),

    #[error("{0}")]
    InvalidId(String),

    #[error("{0}")]
    NotFound(String),

    #[error("Token error: {0}")]
    TokenError(String),

    #[error("Database error: {0}")]
    DbError(#[from] sqlx::Error),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl From<FieldError> for AuthError {
    fn from(e: FieldError) -> Self {
        AuthError::ValidationError(e.to_string())
    }
}
