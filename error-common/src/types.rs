use serde::{Deserialize, Serialize};
use std::fmt;

/// Broad classification of an error, used for log routing and exit codes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorCategory {
    /// Caller misconfiguration, raised before any query runs
    Configuration,
    /// Negative authentication outcome
    Authentication,
    /// Field validation failure
    Validation,
    /// Data-access failure relayed from the store
    Database,
}

impl ErrorCategory {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Configuration => "configuration",
            Self::Authentication => "authentication",
            Self::Validation => "validation",
            Self::Database => "database",
        }
    }
}

impl fmt::Display for ErrorCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Implemented by every crate-level error enum so callers can branch on a
/// stable code instead of matching message text.
pub trait CodedError: std::error::Error {
    /// Stable error code from [`crate::codes`]
    fn code(&self) -> &'static str;

    /// Category the error belongs to
    fn category(&self) -> ErrorCategory;
}
