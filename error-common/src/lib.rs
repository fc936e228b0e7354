//! Common error handling utilities for Credgate
//!
//! Every crate in the workspace defines its own `thiserror` enum and implements
//! [`CodedError`] on it, so callers get:
//!
//! - **Stable codes**: string codes grouped by area (see [`codes`])
//! - **Categories**: configuration, authentication, validation, database, internal
//! - **Reporting**: [`log_error`] emits a structured `tracing` event with the code
//!
//! # Example
//!
//! ```rust
//! use error_common::{codes, CodedError, ErrorCategory};
//!
//! #[derive(Debug, thiserror::Error)]
//! #[error("no such connection: {0}")]
//! struct UnknownConnection(String);
//!
//! impl CodedError for UnknownConnection {
//!     fn code(&self) -> &'static str {
//!         codes::configuration::UNKNOWN_CONNECTION
//!     }
//!     fn category(&self) -> ErrorCategory {
//!         ErrorCategory::Configuration
//!     }
//! }
//!
//! let err = UnknownConnection("reporting".into());
//! error_common::log_error("connection lookup", &err);
//! assert_eq!(err.code(), "CFG_1003");
//! ```

pub mod codes;
pub mod reporting;
pub mod types;

pub use reporting::*;
pub use types::*;
