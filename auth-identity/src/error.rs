use config_engine::ConfigError;
use database_layer::DatabaseError;
use error_common::{codes, CodedError, ErrorCategory};
use thiserror::Error;

/// Errors raised instead of an authentication outcome.
///
/// Authentication failures are never errors; they are [`crate::AuthOutcome`]
/// values. These are setup problems and data-access failures.
#[derive(Error, Debug)]
pub enum IdentityError {
    #[error("A table must be supplied for the authentication adapter.")]
    MissingTable,

    #[error("An identity column must be supplied for the authentication adapter.")]
    MissingIdentityColumn,

    #[error("A credential column must be supplied for the authentication adapter.")]
    MissingCredentialColumn,

    #[error("A value for the identity was not provided prior to authentication.")]
    MissingIdentity,

    #[error("A credential value was not provided prior to authentication.")]
    MissingCredential,

    #[error("Invalid credential validation callback: {0}")]
    InvalidCallback(String),

    #[error("Invalid authentication settings: {0}")]
    InvalidSettings(String),

    #[error(transparent)]
    Database(#[from] DatabaseError),

    #[error(transparent)]
    Configuration(#[from] ConfigError),
}

impl IdentityError {
    /// True for errors the caller can fix by configuring the adapter
    pub fn is_configuration(&self) -> bool {
        self.category() == ErrorCategory::Configuration
    }
}

impl CodedError for IdentityError {
    fn code(&self) -> &'static str {
        match self {
            Self::MissingTable
            | Self::MissingIdentityColumn
            | Self::MissingCredentialColumn
            | Self::MissingIdentity
            | Self::MissingCredential => codes::configuration::MISSING_SETTING,
            Self::InvalidCallback(_) | Self::InvalidSettings(_) => {
                codes::configuration::INVALID_SETTING
            }
            Self::Database(err) => err.code(),
            Self::Configuration(err) => err.code(),
        }
    }

    fn category(&self) -> ErrorCategory {
        match self {
            Self::Database(err) => err.category(),
            _ => ErrorCategory::Configuration,
        }
    }
}

pub type Result<T> = std::result::Result<T, IdentityError>;
