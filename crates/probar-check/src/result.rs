//! Result and error types for probar-check.

use serde::ser;
use std::fmt::Display;
use thiserror::Error;

/// Result type for probar-check operations
pub type CheckResult<T> = Result<T, CheckError>;

/// Errors that can occur in probar-check
///
/// Failed checks are not errors: they are recorded against their test unit.
/// These variants cover the fallible edges around them.
#[derive(Debug, Error)]
pub enum CheckError {
    /// One or more checks of a test unit failed
    #[error("{count} check(s) failed in {unit}:\n{report}")]
    Failed {
        /// Test unit name
        unit: String,
        /// Number of failed checks
        count: usize,
        /// Every failure report, in order
        report: String,
    },

    /// Pattern did not compile
    #[error("invalid pattern: {0}")]
    InvalidPattern(#[from] regex::Error),

    /// JSON error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// A `Serialize` impl refused to describe its value
    #[error("reflection failed: {message}")]
    Reflect {
        /// Error message
        message: String,
    },
}

impl ser::Error for CheckError {
    fn custom<T: Display>(msg: T) -> Self {
        Self::Reflect {
            message: msg.to_string(),
        }
    }
}
