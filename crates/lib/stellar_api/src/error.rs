//! Application error types.

use axum::{
    Json,
    extract::rejection::QueryRejection,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use stellar_core::audit::AuditError;
use stellar_core::auth::AuthError;
use stellar_core::bodies::BodyError;
use stellar_core::fields::FieldError;
use thiserror::Error;
use tracing::error;

use crate::models::ErrorResponse;

/// Convenience alias for handler return types.
pub type AppResult<T> = Result<T, AppError>;

/// Application-level errors with HTTP status mapping.
#[derive(Debug, Error)]
pub enum AppError {
    #[error("Invalid id: {0}")]
    InvalidId(String),

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Duplicate: {0}")]
    Duplicate(String),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Unauthorized: {0}")]
    Unauthorized(String),

    /// Authenticated, but not allowed. Reported as 401 like every other
    /// authorization failure.
    #[error("Forbidden: {0}")]
    Forbidden(String),

    #[error("Conflict: {0}")]
    Conflict(String),

    #[error("Internal server error")]
    Internal(String),
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, error, message) = match &self {
            AppError::InvalidId(m) => (StatusCode::BAD_REQUEST, "invalid_id", m.as_str()),
            AppError::Validation(m) => (StatusCode::BAD_REQUEST, "validation_error", m.as_str()),
            AppError::Duplicate(m) => (StatusCode::BAD_REQUEST, "duplicate", m.as_str()),
            AppError::NotFound(m) => (StatusCode::NOT_FOUND, "not_found", m.as_str()),
            AppError::Unauthorized(m) => (StatusCode::UNAUTHORIZED, "unauthorized", m.as_str()),
            AppError::Forbidden(m) => (StatusCode::UNAUTHORIZED, "forbidden", m.as_str()),
            AppError::Conflict(m) => (StatusCode::CONFLICT, "concurrent_modification", m.as_str()),
            AppError::Internal(detail) => {
                error!("internal error: {detail}");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "internal_error",
                    "Internal server error",
                )
            }
        };
        let body = Json(ErrorResponse {
            error: error.to_string(),
            message: message.to_string(),
        });
        (status, body).into_response()
    }
}

impl From<sqlx::Error> for AppError {
    fn from(e: sqlx::Error) -> Self {
        AppError::Internal(e.to_string())
    }
}

impl From<FieldError> for AppError {
    fn from(e: FieldError) -> Self {
        AppError::Validation(e.to_string())
    }
}

impl From<AuthError> for AppError {
    fn from(e: AuthError) -> Self {
        match e {
            AuthError::MissingCredential => AppError::Unauthorized(e.to_string()),
            AuthError::InvalidCredential(msg) => AppError::Unauthorized(msg),
            AuthError::InsufficientRole(msg) => AppError::Forbidden(msg),
            AuthError::DuplicateUnique(msg) => AppError::Duplicate(msg),
            AuthError::ValidationError(msg) => AppError::Validation(msg),
            AuthError::InvalidId(msg) => AppError::InvalidId(msg),
            AuthError::NotFound(msg) => AppError::NotFound(msg),
            AuthError::TokenError(msg) => AppError::Internal(msg),
            AuthError::DbError(e) => AppError::from(e),
            AuthError::Internal(msg) => AppError::Internal(msg),
        }
    }
}

impl From<BodyError> for AppError {
    fn from(e: BodyError) -> Self {
        match e {
            BodyError::InvalidId(msg) => AppError::InvalidId(msg),
            BodyError::NotFound(msg) => AppError::NotFound(msg),
            BodyError::Validation(msg) => AppError::Validation(msg),
            BodyError::Forbidden(msg) => AppError::Forbidden(msg),
            BodyError::ConcurrentModification(msg) => AppError::Conflict(msg),
            BodyError::DbError(e) => AppError::from(e),
        }
    }
}

impl From<AuditError> for AppError {
    fn from(e: AuditError) -> Self {
        match e {
            AuditError::InvalidId(msg) => AppError::InvalidId(msg),
            AuditError::NotFound(msg) => AppError::NotFound(msg),
            AuditError::DbError(e) => AppError::from(e),
        }
    }
}

impl From<QueryRejection> for AppError {
    fn from(e: QueryRejection) -> Self {
        AppError::Validation(e.body_text())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn authorization_failures_are_401() {
        for err in [
            AppError::from(AuthError::MissingCredential),
            AppError::from(AuthError::InsufficientRole("no".into())),
            AppError::from(BodyError::Forbidden("no".into())),
        ] {
            assert_eq!(err.into_response().status(), StatusCode::UNAUTHORIZED);
        }
    }

    #[test]
    fn concurrent_modification_is_409() {
        let resp = AppError::from(BodyError::ConcurrentModification("x".into())).into_response();
        assert_eq!(resp.status(), StatusCode::CONFLICT);
    }

    #[test]
    fn store_failure_hides_detail() {
        let resp = AppError::from(BodyError::DbError(sqlx::Error::PoolTimedOut)).into_response();
        assert_eq!(resp.status(), StatusCode::INTERNAL_SERVER_ERROR);
    }
}
