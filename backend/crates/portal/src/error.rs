//! Portal Error Types
//!
//! Portal-specific error variants that integrate with the unified
//! `kernel::error::AppError` system.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use kernel::error::{app_error::AppError, kind::ErrorKind};
use thiserror::Error;

/// Portal-specific result type alias
pub type PortalResult<T> = Result<T, PortalError>;

#[derive(Debug, Error)]
pub enum PortalError {
    /// Report form failed validation
    #[error("{0}")]
    Validation(String),

    /// Uploaded image could not be decoded
    #[error("Invalid image: {0}")]
    InvalidImage(String),

    /// Unknown issue category
    #[error("Unknown category: {0}")]
    UnknownCategory(String),

    /// Internal error
    #[error("Internal error: {0}")]
    Internal(String),
}

impl PortalError {
    /// Get the HTTP status code for this error
    pub fn status_code(&self) -> StatusCode {
        StatusCode::from_u16(self.kind().status_code()).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR)
    }

    /// Get the ErrorKind for this error
    pub fn kind(&self) -> ErrorKind {
        match self {
            PortalError::Validation(_) | PortalError::UnknownCategory(_) => {
                ErrorKind::UnprocessableEntity
            }
            PortalError::InvalidImage(_) => ErrorKind::BadRequest,
            PortalError::Internal(_) => ErrorKind::InternalServerError,
        }
    }

    /// Text shown in a notification
    pub fn user_message(&self) -> String {
        match self {
            PortalError::Internal(_) => {
                "There was an error submitting your report. Please try again.".to_string()
            }
            other => other.to_string(),
        }
    }

    /// Log the error with appropriate level
    pub fn log(&self) {
        match self {
            PortalError::Internal(msg) => {
                tracing::error!(message = %msg, "Portal internal error");
            }
            PortalError::InvalidImage(reason) => {
                tracing::warn!(reason = %reason, "Rejected image upload");
            }
            _ => {
                tracing::debug!(error = %self, "Portal error");
            }
        }
    }
}

impl From<PortalError> for AppError {
    fn from(err: PortalError) -> Self {
        AppError::new(err.kind(), err.user_message())
    }
}

impl From<AppError> for PortalError {
    fn from(err: AppError) -> Self {
        match err.kind() {
            ErrorKind::BadRequest | ErrorKind::UnprocessableEntity => {
                PortalError::Validation(err.message().to_string())
            }
            _ => PortalError::Internal(err.to_string()),
        }
    }
}

impl IntoResponse for PortalError {
    fn into_response(self) -> Response {
        self.log();
        AppError::from(self).into_response()
    }
}
