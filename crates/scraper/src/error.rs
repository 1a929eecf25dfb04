//! Scraper errors and their retry classification.

use std::fmt;
use std::path::PathBuf;

use thiserror::Error;

/// Error categories for classification and retry decisions.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCategory {
    /// Connection refused, DNS failure, reset
    Network,
    /// Request did not complete in time
    Timeout,
    /// 5xx - transient
    Server,
    /// 4xx - permanent
    Client,
    /// The API answered but the body was unusable or reported an error
    Response,
    /// Local cache or corpus failure
    Local,
}

impl fmt::Display for ErrorCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Network => write!(f, "network"),
            Self::Timeout => write!(f, "timeout"),
            Self::Server => write!(f, "server"),
            Self::Client => write!(f, "client"),
            Self::Response => write!(f, "response"),
            Self::Local => write!(f, "local"),
        }
    }
}

/// Scraper error type.
#[derive(Debug, Error)]
pub enum Error {
    #[error("HTTP {status} fetching '{reference}': {message}")]
    Http {
        status: u16,
        reference: String,
        message: String,
    },

    #[error("network error fetching '{reference}': {message}")]
    Network { reference: String, message: String },

    #[error("timed out fetching '{reference}'")]
    Timeout { reference: String },

    #[error("invalid response for '{reference}': {reason}")]
    Decode { reference: String, reason: String },

    #[error("API error for '{reference}': {message}")]
    Api { reference: String, message: String },

    #[error("invalid base URL '{url}': {reason}")]
    InvalidUrl { url: String, reason: String },

    #[error("cache error at '{path}': {reason}")]
    Cache { path: PathBuf, reason: String },

    #[error(transparent)]
    Core(#[from] tanakh_core::Error),
}

impl Error {
    pub fn cache(path: impl Into<PathBuf>, reason: impl Into<String>) -> Self {
        Self::Cache {
            path: path.into(),
            reason: reason.into(),
        }
    }

    pub fn invalid_url(url: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::InvalidUrl {
            url: url.into(),
            reason: reason.into(),
        }
    }

    /// Classify a transport failure from reqwest.
    pub fn from_reqwest(reference: &str, err: &reqwest::Error) -> Self {
        if err.is_timeout() {
            Self::Timeout {
                reference: reference.to_string(),
            }
        } else if let Some(status) = err.status() {
            Self::Http {
                status: status.as_u16(),
                reference: reference.to_string(),
                message: err.to_string(),
            }
        } else {
            Self::Network {
                reference: reference.to_string(),
                message: err.to_string(),
            }
        }
    }

    #[must_use]
    pub const fn category(&self) -> ErrorCategory {
        match self {
            Self::Network { .. } => ErrorCategory::Network,
            Self::Timeout { .. } => ErrorCategory::Timeout,
            Self::Http { status, .. } if *status >= 500 => ErrorCategory::Server,
            Self::Http { .. } => ErrorCategory::Client,
            Self::Decode { .. } | Self::Api { .. } => ErrorCategory::Response,
            Self::InvalidUrl { .. } | Self::Cache { .. } | Self::Core(_) => ErrorCategory::Local,
        }
    }

    /// Whether trying again could succeed.
    #[must_use]
    pub const fn is_transient(&self) -> bool {
        matches!(
            self.category(),
            ErrorCategory::Network | ErrorCategory::Timeout | ErrorCategory::Server
        )
    }
}

/// Result type for scraper operations.
pub type Result<T> = std::result::Result<T, Error>;
