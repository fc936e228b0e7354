use error_common::{codes, CodedError, ErrorCategory};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Configuration parsing failed: {0}")]
    ParseError(#[from] Box<figment::Error>),

    #[error("Configuration file not found: {0}")]
    FileNotFound(String),

    #[error("Configuration validation failed: {0}")]
    ValidationError(String),

    #[error("Unknown connection: {0}")]
    UnknownConnection(String),

    #[error("Unsupported database driver: {0}")]
    UnsupportedDriver(String),
}

impl From<figment::Error> for ConfigError {
    fn from(err: figment::Error) -> Self {
        Self::ParseError(Box::new(err))
    }
}

impl CodedError for ConfigError {
    fn code(&self) -> &'static str {
        match self {
            Self::ParseError(_) | Self::ValidationError(_) | Self::UnsupportedDriver(_) => {
                codes::configuration::INVALID_SETTING
            }
            Self::UnknownConnection(_) => codes::configuration::UNKNOWN_CONNECTION,
            Self::FileNotFound(_) => codes::configuration::MISSING_SETTING,
        }
    }

    fn category(&self) -> ErrorCategory {
        ErrorCategory::Configuration
    }
}

pub type Result<T> = std::result::Result<T, ConfigError>;
