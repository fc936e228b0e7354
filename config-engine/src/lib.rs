//! Layered configuration for Credgate
//!
//! Configuration is read once at bootstrap from:
//! - **Local files**: TOML or YAML
//! - **Environment variables**: `CREDGATE_` prefix, `__` between nested keys
//!
//! Later sources override earlier ones. The only section this crate
//! interprets itself is `database`, the named connection descriptors the
//! query gateway pools are built from. Other crates pull their own sections
//! through [`ConfigEngine::section`].
//!
//! # Example
//!
//! ```rust,no_run
//! use config_engine::ConfigEngine;
//!
//! let engine = ConfigEngine::new().with_file("credgate.toml").with_env();
//! let database = engine.database_settings()?;
//! let default = database.descriptor("")?;
//! println!("default connection: {}", default.redacted_url());
//! # Ok::<(), config_engine::ConfigError>(())
//! ```

pub mod database;
pub mod engine;
pub mod error;

pub use database::*;
pub use engine::*;
pub use error::*;
