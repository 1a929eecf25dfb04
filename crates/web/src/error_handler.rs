//! API error handling.
//!
//! Every failure leaves the API as a structured JSON [`ErrorResponse`] with
//! the HTTP status, a category for client-side handling, a human-readable
//! message and a machine-readable code.

use std::fmt;

use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde::{Deserialize, Serialize};
use tracing::error;

/// Error categories for client-side handling.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCategory {
    /// The request itself is malformed (bad number, bad query)
    Validation,
    /// The requested book, chapter or verse does not exist
    NotFound,
    /// Anything else
    Internal,
}

impl fmt::Display for ErrorCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Validation => write!(f, "validation"),
            Self::NotFound => write!(f, "not_found"),
            Self::Internal => write!(f, "internal"),
        }
    }
}

/// Structured error response for HTTP clients.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorResponse {
    /// HTTP status code
    pub status: u16,
    /// Error category for client-side handling
    pub category: String,
    /// Human-readable error message
    pub message: String,
    /// Machine-readable error code
    pub code: String,
}

/// Errors returned by route handlers.
#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    #[error("{message}")]
    Validation { code: &'static str, message: String },

    #[error("{0}")]
    NotFound(String),

    #[error("{0}")]
    Internal(String),
}

impl ApiError {
    pub fn validation(code: &'static str, message: impl Into<String>) -> Self {
        Self::Validation {
            code,
            message: message.into(),
        }
    }

    #[must_use]
    pub const fn category(&self) -> ErrorCategory {
        match self {
            Self::Validation { .. } => ErrorCategory::Validation,
            Self::NotFound(_) => ErrorCategory::NotFound,
            Self::Internal(_) => ErrorCategory::Internal,
        }
    }

    #[must_use]
    pub const fn status_code(&self) -> StatusCode {
        match self {
            Self::Validation { .. } => StatusCode::BAD_REQUEST,
            Self::NotFound(_) => StatusCode::NOT_FOUND,
            Self::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Get error code for machine readability.
    #[must_use]
    pub const fn error_code(&self) -> &'static str {
        match *self {
            Self::Validation { code, .. } => code,
            Self::NotFound(_) => "NOT_FOUND",
            Self::Internal(_) => "INTERNAL_ERROR",
        }
    }

    /// Convert to structured error response.
    #[must_use]
    pub fn to_response(&self) -> ErrorResponse {
        ErrorResponse {
            status: self.status_code().as_u16(),
            category: self.category().to_string(),
            message: self.to_string(),
            code: self.error_code().to_string(),
        }
    }
}

impl From<tanakh_core::Error> for ApiError {
    fn from(err: tanakh_core::Error) -> Self {
        use tanakh_core::Error as Core;

        match err {
            e if e.is_not_found() => Self::NotFound(e.to_string()),
            e @ Core::InvalidNumeral { .. } => Self::validation("INVALID_NUMERAL", e.to_string()),
            e @ Core::InvalidQuery { .. } => Self::validation("INVALID_QUERY", e.to_string()),
            e => Self::Internal(e.to_string()),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        if let Self::Internal(message) = &self {
            error!(error = %message, "Request failed");
        }
        let status = self.status_code();
        (status, Json(self.to_response())).into_response()
    }
}

pub type ApiResult<T> = std::result::Result<T, ApiError>;
