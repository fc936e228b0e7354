// Authentication outcomes
use database_layer::Row;
use error_common::{codes, ErrorCategory};
use serde::Serialize;

pub const MSG_IDENTITY_NOT_FOUND: &str = "A record with the supplied identity could not be found.";
pub const MSG_IDENTITY_AMBIGUOUS: &str = "More than one record matches the supplied identity.";
pub const MSG_CREDENTIAL_INVALID: &str = "Supplied credential is invalid.";
pub const MSG_SUCCESS: &str = "Authentication successful.";

/// Result codes with their conventional numeric values
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
#[repr(i8)]
pub enum AuthResultCode {
    Success = 1,
    /// Generic failure
    Failure = 0,
    FailureIdentityNotFound = -1,
    FailureIdentityAmbiguous = -2,
    FailureCredentialInvalid = -3,
    /// The comparison itself failed
    FailureUncategorized = -4,
}

impl AuthResultCode {
    pub fn is_valid(self) -> bool {
        self == Self::Success
    }

    pub fn as_i8(self) -> i8 {
        self as i8
    }

    /// Stable error code for failures, `None` on success
    pub fn error_code(self) -> Option<&'static str> {
        match self {
            Self::Success => None,
            Self::Failure | Self::FailureCredentialInvalid => {
                Some(codes::authentication::INVALID_CREDENTIALS)
            }
            Self::FailureIdentityNotFound => Some(codes::authentication::IDENTITY_NOT_FOUND),
            Self::FailureIdentityAmbiguous => Some(codes::authentication::IDENTITY_AMBIGUOUS),
            Self::FailureUncategorized => Some(codes::authentication::UNCATEGORIZED),
        }
    }

    /// Every failure is an authentication outcome, `None` on success
    pub fn category(self) -> Option<ErrorCategory> {
        (!self.is_valid()).then_some(ErrorCategory::Authentication)
    }
}

/// Outcome of one `authenticate` call
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AuthOutcome {
    code: AuthResultCode,
    identity: String,
    messages: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    row: Option<Row>,
}

impl AuthOutcome {
    pub fn new(code: AuthResultCode, identity: impl Into<String>, messages: Vec<String>) -> Self {
        Self {
            code,
            identity: identity.into(),
            messages,
            row: None,
        }
    }

    #[must_use]
    pub(crate) fn with_row(mut self, row: Row) -> Self {
        self.row = Some(row);
        self
    }

    pub fn code(&self) -> AuthResultCode {
        self.code
    }

    pub fn is_valid(&self) -> bool {
        self.code.is_valid()
    }

    pub fn identity(&self) -> &str {
        &self.identity
    }

    pub fn messages(&self) -> &[String] {
        &self.messages
    }

    /// The matched record on success, without credential or match flag columns
    pub fn row(&self) -> Option<&Row> {
        self.row.as_ref()
    }
}
