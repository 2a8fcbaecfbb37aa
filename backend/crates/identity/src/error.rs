//! Identity Error Types
//!
//! This module provides identity-specific error variants that integrate
//! with the unified `kernel::error::AppError` system.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use kernel::error::{app_error::AppError, kind::ErrorKind};
use thiserror::Error;

/// Identity-specific result type alias
pub type IdentityResult<T> = Result<T, IdentityError>;

/// Identity-specific error variants
#[derive(Debug, Error)]
pub enum IdentityError {
    /// Bad email/password pair. Deliberately covers both "unknown email"
    /// and "wrong password" so callers cannot enumerate accounts.
    #[error("Invalid credentials")]
    InvalidCredentials,

    /// Credential missing, malformed, expired, denylisted, or pointing to
    /// a deleted identity. Collapsed to one outward-facing reason so that
    /// revocation state does not leak.
    #[error("Unauthenticated")]
    Unauthenticated,

    /// Email already registered
    #[error("Email already registered")]
    EmailTaken,

    /// Identity not found (administrative lookups only, never auth checks)
    #[error("Identity not found")]
    IdentityNotFound,

    /// Email validation error
    #[error("Email validation failed: {0}")]
    EmailValidation(String),

    /// Password validation error
    #[error("Password validation failed: {0}")]
    PasswordValidation(String),

    /// Deactivation cascade failed; the identity row was left in place
    #[error("Deactivation incomplete: {0}")]
    DeactivationIncomplete(String),

    /// Relational store unreachable or failing
    #[error("Identity store unavailable: {0}")]
    Database(#[from] sqlx::Error),

    /// Revocation store unreachable or failing
    #[error("Revocation store unavailable: {0}")]
    Revocation(#[from] redis::RedisError),

    /// Internal error
    #[error("Internal error: {0}")]
    Internal(String),
}

impl IdentityError {
    /// Get the HTTP status code for this error
    pub fn status_code(&self) -> StatusCode {
        match self {
            IdentityError::InvalidCredentials | IdentityError::Unauthenticated => {
                StatusCode::UNAUTHORIZED
            }
            IdentityError::EmailTaken => StatusCode::CONFLICT,
            IdentityError::IdentityNotFound => StatusCode::NOT_FOUND,
            IdentityError::EmailValidation(_) | IdentityError::PasswordValidation(_) => {
                StatusCode::BAD_REQUEST
            }
            IdentityError::DeactivationIncomplete(_) | IdentityError::Internal(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
            // Store unavailability is fatal for the request; no retry here
            IdentityError::Database(_) | IdentityError::Revocation(_) => {
                StatusCode::SERVICE_UNAVAILABLE
            }
        }
    }

    /// Get the ErrorKind for this error
    pub fn kind(&self) -> ErrorKind {
        match self {
            IdentityError::InvalidCredentials | IdentityError::Unauthenticated => {
                ErrorKind::Unauthorized
            }
            IdentityError::EmailTaken => ErrorKind::Conflict,
            IdentityError::IdentityNotFound => ErrorKind::NotFound,
            IdentityError::EmailValidation(_) | IdentityError::PasswordValidation(_) => {
                ErrorKind::BadRequest
            }
            IdentityError::DeactivationIncomplete(_) | IdentityError::Internal(_) => {
                ErrorKind::InternalServerError
            }
            IdentityError::Database(_) | IdentityError::Revocation(_) => {
                ErrorKind::ServiceUnavailable
            }
        }
    }

    /// Convert to AppError
    pub fn to_app_error(&self) -> AppError {
        AppError::new(self.kind(), self.to_string())
    }

    /// Log the error with appropriate level
    fn log(&self) {
        match self {
            IdentityError::Database(e) => {
                tracing::error!(error = %e, "Identity database error");
            }
            IdentityError::Revocation(e) => {
                tracing::error!(error = %e, "Revocation store error");
            }
            IdentityError::Internal(msg) => {
                tracing::error!(message = %msg, "Identity internal error");
            }
            IdentityError::DeactivationIncomplete(msg) => {
                tracing::error!(message = %msg, "Deactivation cascade failed");
            }
            IdentityError::InvalidCredentials => {
                tracing::warn!("Invalid login attempt");
            }
            IdentityError::Unauthenticated => {
                tracing::debug!("Rejected credential");
            }
            _ => {
                tracing::debug!(error = %self, "Identity error");
            }
        }
    }
}

impl IntoResponse for IdentityError {
    fn into_response(self) -> Response {
        self.log();
        self.to_app_error().into_response()
    }
}

impl From<AppError> for IdentityError {
    fn from(err: AppError) -> Self {
        IdentityError::Internal(err.to_string())
    }
}

impl From<crate::token::TokenError> for IdentityError {
    fn from(err: crate::token::TokenError) -> Self {
        match err {
            // Minting failures are a server-side problem
            crate::token::TokenError::Signing(msg) => IdentityError::Internal(msg),
            // Every parse failure collapses to the same outward reason
            _ => IdentityError::Unauthenticated,
        }
    }
}
