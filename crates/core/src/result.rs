//! Result type definition and logging combinators.
//!
//! Optional data sources (commentary, persisted reader state) degrade to a
//! default instead of failing the reader; these helpers make that explicit and
//! leave a trace in the logs.

use crate::error::Error;

/// The standard Result type for reader operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Extension trait for logged fallbacks on Results.
pub trait ResultExt<T> {
    /// Get the value or a default, logging the error as a warning.
    fn or_default_logged(self, default: T) -> T;
}

impl<T> ResultExt<T> for Result<T> {
    fn or_default_logged(self, default: T) -> T {
        match self {
            Ok(value) => value,
            Err(e) => {
                tracing::warn!("Operation failed, using default: {}", e);
                default
            }
        }
    }
}
