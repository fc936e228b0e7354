use base64::{engine::general_purpose, Engine as _};
use lazy_static::lazy_static;
use regex::Regex;
use sha2::{Digest, Sha256};

lazy_static! {
    // Single-quoted SQL literal, with '' as the embedded quote escape
    static ref SQL_LITERAL_REGEX: Regex = Regex::new(r"'(?:[^']|'')*'").unwrap();
}

/// Replacement used for credentials in every log line
pub const REDACTED: &str = "[REDACTED]";

/// Redacts credentials and identities before they reach a log sink.
///
/// Credentials are always masked. Identities are replaced by a short
/// correlation fingerprint when redaction is enabled, so repeated attempts
/// for the same identity can still be grouped.
#[derive(Debug, Clone, Copy)]
pub struct CredentialRedactor {
    enabled: bool,
}

impl Default for CredentialRedactor {
    fn default() -> Self {
        Self::new(true)
    }
}

impl CredentialRedactor {
    pub fn new(enabled: bool) -> Self {
        Self { enabled }
    }

    pub fn is_enabled(&self) -> bool {
        self.enabled
    }

    /// Credentials never appear in clear text, regardless of configuration
    pub fn mask(&self, _credential: &str) -> &'static str {
        REDACTED
    }

    /// Value to log for an identity
    pub fn identity(&self, identity: &str) -> String {
        if self.enabled {
            format!("ID[{}]", fingerprint(identity))
        } else {
            identity.to_string()
        }
    }

    /// Replace every quoted literal in a rendered SQL expression.
    ///
    /// Raw credential treatments embed the credential as a literal, so
    /// statements are passed through here before being logged.
    pub fn redact_sql(&self, sql: &str) -> String {
        SQL_LITERAL_REGEX.replace_all(sql, "'***'").into_owned()
    }
}

/// Short, stable correlation token: base64 of the first 8 bytes of SHA-256
pub fn fingerprint(value: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(value.as_bytes());
    let result = hasher.finalize();
    general_purpose::STANDARD.encode(&result[..8])
}
