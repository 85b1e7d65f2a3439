//! Auth Error Types
//!
//! This module provides auth-specific error variants that integrate
//! with the unified `kernel::error::AppError` system.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use kernel::error::{app_error::AppError, conversions::classify_sqlx, kind::ErrorKind};
use platform::password::PasswordHashError;
use thiserror::Error;

use crate::domain::entity::user::UserValidationError;

/// Auth-specific result type alias
pub type AuthResult<T> = Result<T, AuthError>;

/// Auth-specific error variants
#[derive(Debug, Error)]
pub enum AuthError {
    /// Request body could not be read or decoded
    #[error("malformed request body: {0}")]
    MalformedRequest(String),

    /// User failed validation
    #[error("{0}")]
    Validation(#[from] UserValidationError),

    /// Email is already registered
    #[error("email has already been taken")]
    DuplicateEmail,

    /// Unknown email or wrong password
    #[error("incorrect email or password")]
    IncorrectEmailOrPassword,

    /// No authenticated user on the session
    #[error("not authenticated")]
    NotAuthenticated,

    /// Lookup miss in a store
    #[error("record not found")]
    RecordNotFound,

    /// Database error
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    /// Password hashing error
    #[error("Password hashing error: {0}")]
    Hashing(#[from] PasswordHashError),

    /// Internal error
    #[error("Internal error: {0}")]
    Internal(String),
}

impl AuthError {
    /// Get the HTTP status code for this error
    pub fn status_code(&self) -> StatusCode {
        StatusCode::from_u16(self.kind().status_code())
            .unwrap_or(StatusCode::INTERNAL_SERVER_ERROR)
    }

    /// Get the ErrorKind for this error
    pub fn kind(&self) -> ErrorKind {
        match self {
            AuthError::MalformedRequest(_) => ErrorKind::BadRequest,
            AuthError::Validation(_) | AuthError::DuplicateEmail => {
                ErrorKind::UnprocessableEntity
            }
            AuthError::IncorrectEmailOrPassword | AuthError::NotAuthenticated => {
                ErrorKind::Unauthorized
            }
            AuthError::RecordNotFound => ErrorKind::NotFound,
            AuthError::Database(e) => classify_sqlx(e),
            AuthError::Hashing(_) | AuthError::Internal(_) => ErrorKind::InternalServerError,
        }
    }

    /// Convert to AppError
    ///
    /// Server-side failures never echo their details to the client.
    pub fn to_app_error(&self) -> AppError {
        match self.kind() {
            ErrorKind::ServiceUnavailable => AppError::service_unavailable("service unavailable"),
            kind if kind.is_server_error() => AppError::internal("internal server error"),
            kind => AppError::new(kind, self.to_string()),
        }
    }

    /// Log the error with appropriate level
    fn log(&self) {
        match self {
            AuthError::Database(e) => {
                tracing::error!(error = %e, "Auth database error");
            }
            AuthError::Hashing(e) => {
                tracing::error!(error = %e, "Password hashing error");
            }
            AuthError::Internal(msg) => {
                tracing::error!(message = %msg, "Auth internal error");
            }
            AuthError::IncorrectEmailOrPassword => {
                tracing::warn!("Invalid login attempt");
            }
            _ => {
                tracing::debug!(error = %self, "Auth error");
            }
        }
    }
}

impl IntoResponse for AuthError {
    fn into_response(self) -> Response {
        self.log();
        self.to_app_error().into_response()
    }
}
