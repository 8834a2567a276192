//! Auth Error Types
//!
//! This module provides auth-specific error variants that integrate
//! with the unified `kernel::error::AppError` system.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use kernel::error::{app_error::AppError, kind::ErrorKind};
use platform::http::ServiceClientError;
use thiserror::Error;

/// Auth-specific result type alias
pub type AuthResult<T> = Result<T, AuthError>;

/// Auth-specific error variants
#[derive(Debug, Error)]
pub enum AuthError {
    /// Wrong email or password
    #[error("Invalid email or password")]
    InvalidCredentials,

    /// Email already registered with the identity provider
    #[error("{0}")]
    AccountExists(String),

    /// Input rejected before reaching the backend
    #[error("{0}")]
    Validation(String),

    /// Registration form passwords differ
    #[error("Passwords do not match")]
    PasswordMismatch,

    /// Role that cannot be chosen during self-registration
    #[error("The {0} role cannot be selected during registration")]
    RoleNotSelectable(String),

    /// Identity exists but has no profile row
    #[error("User profile not found")]
    ProfileNotFound,

    /// Session missing, expired, or revoked
    #[error("Session not found or expired")]
    SessionInvalid,

    /// Backend answered with an error
    #[error("{message}")]
    Upstream { status: u16, message: String },

    /// Backend could not be reached in time
    #[error("Authentication service unavailable: {0}")]
    Unavailable(String),

    /// Backend connection settings are missing
    #[error("Authentication service is not configured: {0}")]
    NotConfigured(&'static str),

    /// Internal error
    #[error("Internal error: {0}")]
    Internal(String),
}

impl AuthError {
    /// Get the HTTP status code for this error
    pub fn status_code(&self) -> StatusCode {
        StatusCode::from_u16(self.kind().status_code()).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR)
    }

    /// Get the ErrorKind for this error
    pub fn kind(&self) -> ErrorKind {
        match self {
            AuthError::InvalidCredentials | AuthError::SessionInvalid => ErrorKind::Unauthorized,
            AuthError::AccountExists(_) => ErrorKind::Conflict,
            AuthError::Validation(_) | AuthError::PasswordMismatch => ErrorKind::BadRequest,
            AuthError::RoleNotSelectable(_) => ErrorKind::Forbidden,
            AuthError::ProfileNotFound => ErrorKind::NotFound,
            AuthError::Upstream { status, .. } if *status == 401 => ErrorKind::Unauthorized,
            AuthError::Upstream { status, .. } if *status == 429 => ErrorKind::TooManyRequests,
            AuthError::Upstream { .. } => ErrorKind::BadGateway,
            AuthError::Unavailable(_) | AuthError::NotConfigured(_) => {
                ErrorKind::ServiceUnavailable
            }
            AuthError::Internal(_) => ErrorKind::InternalServerError,
        }
    }

    /// Short human-readable text for a notification
    pub fn user_message(&self) -> String {
        match self {
            AuthError::Unavailable(_) => {
                "The authentication service is unreachable. Please try again.".to_string()
            }
            AuthError::NotConfigured(_) => {
                "The authentication service is not configured.".to_string()
            }
            AuthError::Internal(_) => "Something went wrong. Please try again.".to_string(),
            other => other.to_string(),
        }
    }

    /// What the user can do about it, when there is something
    pub fn action(&self) -> Option<&'static str> {
        match self {
            AuthError::InvalidCredentials => Some("Check your email and password"),
            AuthError::AccountExists(_) => Some("Sign in instead"),
            AuthError::SessionInvalid | AuthError::ProfileNotFound => Some("Please sign in again"),
            AuthError::Unavailable(_) => Some("Try again in a moment"),
            _ => None,
        }
    }

    /// Convert to AppError
    pub fn to_app_error(&self) -> AppError {
        let err = AppError::new(self.kind(), self.user_message());
        match self.action() {
            Some(action) => err.with_action(action),
            None => err,
        }
    }

    /// Log the error with appropriate level
    pub fn log(&self) {
        match self {
            AuthError::Internal(msg) => {
                tracing::error!(message = %msg, "Auth internal error");
            }
            AuthError::NotConfigured(what) => {
                tracing::error!(missing = what, "Auth backend not configured");
            }
            AuthError::Unavailable(reason) => {
                tracing::warn!(reason = %reason, "Auth backend unreachable");
            }
            AuthError::Upstream { status, message } => {
                tracing::warn!(status = status, message = %message, "Auth backend rejected request");
            }
            AuthError::InvalidCredentials => {
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

impl From<AppError> for AuthError {
    fn from(err: AppError) -> Self {
        match err.kind() {
            ErrorKind::BadRequest | ErrorKind::UnprocessableEntity => {
                AuthError::Validation(err.message().to_string())
            }
            _ => AuthError::Internal(err.to_string()),
        }
    }
}

impl From<ServiceClientError> for AuthError {
    fn from(err: ServiceClientError) -> Self {
        match err {
            ServiceClientError::Build(e) => AuthError::Internal(e.to_string()),
            ServiceClientError::Transport(e) if e.is_timeout() => {
                AuthError::Unavailable("request timed out".to_string())
            }
            ServiceClientError::Transport(e) if e.is_decode() => {
                AuthError::Internal(format!("unexpected backend response: {e}"))
            }
            ServiceClientError::Transport(e) => AuthError::Unavailable(e.to_string()),
            ServiceClientError::Upstream(e) => AuthError::Upstream {
                status: e.status.as_u16(),
                message: e.message,
            },
        }
    }
}
