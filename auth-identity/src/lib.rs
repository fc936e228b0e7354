//! Identity and credential verification for Credgate
//!
//! [`DbAuthAdapter`] looks a record up by identity and decides whether a
//! supplied credential matches it. Two matching strategies are available:
//! - **Callback**: a Rust predicate compares the stored value with the supplied
//!   credential (strict equality by default, or argon2 / bcrypt verification)
//! - **Treatment**: the database evaluates an expression such as `MD5(?)` and
//!   returns a match flag per candidate row
//!
//! Authentication failures are returned as [`AuthOutcome`] values. Only
//! configuration and data-access problems are errors.
//!
//! # Example
//!
//! ```rust
//! use auth_identity::{AuthResultCode, DbAuthAdapter};
//! use database_layer::{ColumnSelection, InMemoryQueryGateway, Row, TableRef};
//! use std::sync::Arc;
//!
//! # #[tokio::main(flavor = "current_thread")]
//! # async fn main() -> auth_identity::Result<()> {
//! let gateway = Arc::new(InMemoryQueryGateway::new().with_rows(
//!     "default",
//!     &TableRef::new("users"),
//!     [Row::new().with("username", "alice").with("password", "secret").with("name", "Alice")],
//! ));
//!
//! let mut adapter = DbAuthAdapter::callback_check(gateway, "users", "username", "password", None);
//! adapter.set_identity("alice").set_credential("secret");
//!
//! let outcome = adapter.authenticate().await?;
//! assert_eq!(outcome.code(), AuthResultCode::Success);
//!
//! let name_only = adapter.result_row_object(&ColumnSelection::only(["name"]));
//! assert_eq!(name_only, Some(Row::new().with("name", "Alice")));
//! # Ok(())
//! # }
//! ```

pub mod adapter;
pub mod config;
pub mod error;
pub mod matcher;
pub mod outcome;

pub use adapter::*;
pub use config::*;
pub use error::*;
pub use matcher::*;
pub use outcome::*;
