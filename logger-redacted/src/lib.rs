//! Logging for Credgate with credential redaction
//!
//! All crates log through `tracing`. This crate owns the two pieces that
//! need to be shared:
//!
//! - [`init_tracing`]: installs a `tracing-subscriber` registry with an
//!   `EnvFilter` and either human-readable or JSON output
//! - [`CredentialRedactor`]: masks credentials, fingerprints identities and
//!   strips quoted literals out of rendered SQL before it is logged
//!
//! # Example
//!
//! ```rust
//! use logger_redacted::{init_tracing, CredentialRedactor, LoggerConfig};
//!
//! init_tracing(&LoggerConfig::default()).unwrap();
//!
//! let redactor = CredentialRedactor::default();
//! tracing::info!(
//!     identity = %redactor.identity("alice"),
//!     expression = %redactor.redact_sql("MD5('secret')"),
//!     "Checking credential"
//! );
//! ```

pub mod config;
pub mod init;
pub mod redactor;

pub use config::*;
pub use init::*;
pub use redactor::*;
