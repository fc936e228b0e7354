//! Record existence validation for Credgate
//!
//! [`RecordExists`] passes when at least one row of the configured table has
//! the validated value in the configured field. An optional [`Exclusion`]
//! skips one row, so editing a record in place does not count its own value.
//!
//! Only the "must exist" direction is provided.
//!
//! ```rust
//! use database_layer::{InMemoryQueryGateway, Row, TableRef};
//! use record_validator::{ExistsCheckConfig, RecordExists, Validator};
//! use serde_json::json;
//! use std::sync::Arc;
//!
//! # #[tokio::main(flavor = "current_thread")]
//! # async fn main() -> record_validator::Result<()> {
//! let gateway = Arc::new(InMemoryQueryGateway::new().with_rows(
//!     "default",
//!     &TableRef::new("users"),
//!     [Row::new().with("email", "a@example.com")],
//! ));
//! let config = ExistsCheckConfig::builder().table("users").field("email").build()?;
//!
//! let mut validator = RecordExists::new(gateway, config);
//! assert!(validator.is_valid(&json!("a@example.com")).await?);
//! # Ok(())
//! # }
//! ```
//!
//! [`Exclusion`]: database_layer::Exclusion

pub mod config;
pub mod error;
pub mod validator;

pub use config::*;
pub use error::*;
pub use validator::*;
