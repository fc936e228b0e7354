use config_engine::ConfigError;
use error_common::{codes, CodedError, ErrorCategory};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum DatabaseError {
    #[error("Connection failed: {0}")]
    ConnectionFailed(String),

    #[error("Query failed: {0}")]
    QueryFailed(String),

    #[error("Unknown connection: {0}")]
    UnknownConnection(String),

    #[error("Invalid identifier: {0:?}")]
    InvalidIdentifier(String),

    #[error("Unsupported operation: {0}")]
    Unsupported(String),

    #[error("Configuration error: {0}")]
    Configuration(#[from] ConfigError),

    #[error("Database error: {0}")]
    SqlxError(#[from] sqlx::Error),
}

impl DatabaseError {
    /// Separate an unreachable store from a failing statement
    pub fn from_sqlx(err: sqlx::Error) -> Self {
        match err {
            sqlx::Error::Io(_)
            | sqlx::Error::Tls(_)
            | sqlx::Error::PoolTimedOut
            | sqlx::Error::PoolClosed
            | sqlx::Error::WorkerCrashed => Self::ConnectionFailed(err.to_string()),
            other => Self::SqlxError(other),
        }
    }
}

impl CodedError for DatabaseError {
    fn code(&self) -> &'static str {
        match self {
            Self::ConnectionFailed(_) => codes::database::CONNECTION_FAILED,
            Self::QueryFailed(_) | Self::SqlxError(_) => codes::database::QUERY_FAILED,
            Self::Unsupported(_) => codes::database::UNSUPPORTED_OPERATION,
            Self::UnknownConnection(_) => codes::configuration::UNKNOWN_CONNECTION,
            Self::InvalidIdentifier(_) => codes::configuration::INVALID_SETTING,
            Self::Configuration(err) => err.code(),
        }
    }

    fn category(&self) -> ErrorCategory {
        match self {
            Self::UnknownConnection(_) | Self::InvalidIdentifier(_) | Self::Configuration(_) => {
                ErrorCategory::Configuration
            }
            _ => ErrorCategory::Database,
        }
    }
}

pub type DatabaseResult<T> = Result<T, DatabaseError>;
