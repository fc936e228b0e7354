use database_layer::DatabaseError;
use error_common::{codes, CodedError, ErrorCategory};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ValidatorError {
    #[error("Table or Schema option missing!")]
    MissingTable,

    #[error("Field option missing!")]
    MissingField,

    #[error(transparent)]
    Database(#[from] DatabaseError),
}

impl CodedError for ValidatorError {
    fn code(&self) -> &'static str {
        match self {
            Self::MissingTable | Self::MissingField => codes::configuration::MISSING_SETTING,
            Self::Database(err) => err.code(),
        }
    }

    fn category(&self) -> ErrorCategory {
        match self {
            Self::MissingTable | Self::MissingField => ErrorCategory::Configuration,
            Self::Database(err) => err.category(),
        }
    }
}

pub type Result<T> = std::result::Result<T, ValidatorError>;
