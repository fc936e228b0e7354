//! Query gateway for Credgate
//!
//! The adapters never talk to a database directly. They describe a
//! single-table lookup as a [`ColumnLookup`] and hand it to a
//! [`QueryGateway`]:
//!
//! - [`PgQueryGateway`] runs it against PostgreSQL through named pools held
//!   by a [`ConnectionManager`]
//! - [`InMemoryQueryGateway`] evaluates it against rows held in memory
//!
//! Caller-supplied values are always bound parameters and identifiers are
//! always quoted. Credential treatments (`MD5(?)`, `crypt(?, password)`) are
//! rendered by [`CredentialTreatment`]; see [`TreatmentMode`] for the one
//! escape hatch that embeds the credential in the SQL text.
//!
//! # Example
//!
//! ```rust
//! use database_layer::{ColumnLookup, InMemoryQueryGateway, QueryGateway, Row, TableRef};
//!
//! # #[tokio::main(flavor = "current_thread")]
//! # async fn main() -> Result<(), database_layer::DatabaseError> {
//! let users = TableRef::new("users");
//! let gateway = InMemoryQueryGateway::new()
//!     .with_rows("default", &users, [Row::new().with("email", "a@example.com")]);
//!
//! let lookup = ColumnLookup::new(users, "email", "a@example.com");
//! assert_eq!(gateway.count("default", &lookup).await?, 1);
//! # Ok(())
//! # }
//! ```

pub mod connection;
pub mod error;
pub mod lookup;
pub mod memory;
pub mod query;
pub mod row;
pub mod treatment;

pub use connection::{ConnectionManager, DatabasePool};
pub use error::{DatabaseError, DatabaseResult};
pub use lookup::{quote_ident, ColumnLookup, Exclusion, TableRef};
pub use memory::InMemoryQueryGateway;
pub use query::{PgQueryGateway, QueryGateway};
pub use row::{ColumnSelection, Row};
pub use treatment::{
    match_flag_set, quote_literal, CredentialTreatment, TreatmentMode, CREDENTIAL_MATCH_COLUMN,
};
