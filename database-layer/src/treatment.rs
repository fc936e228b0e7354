// Credential treatment expressions, e.g. `MD5(?)` or `crypt(?, password)`
use crate::row::Row;
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Name of the computed column carrying the per-row match flag
pub const CREDENTIAL_MATCH_COLUMN: &str = "credgate_credential_match";

/// Placeholder standing for the supplied credential
pub const PLACEHOLDER: &str = "?";

/// How the credential reaches the database inside a treatment expression
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TreatmentMode {
    /// The placeholder becomes a bind parameter
    #[default]
    Parameterized,
    /// The placeholder becomes an escaped string literal embedded in the SQL text.
    ///
    /// Only for engines or expressions that cannot take a bind parameter.
    /// The credential ends up in the statement text, so this mode is unsafe
    /// against anything that records statements.
    Raw,
}

/// A SQL expression template applied to the supplied credential before it is
/// compared with the stored credential column.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "TreatmentRepr")]
pub struct CredentialTreatment {
    template: String,
    mode: TreatmentMode,
}

#[derive(Deserialize)]
struct TreatmentRepr {
    #[serde(default)]
    template: String,
    #[serde(default)]
    mode: TreatmentMode,
}

impl From<TreatmentRepr> for CredentialTreatment {
    fn from(repr: TreatmentRepr) -> Self {
        Self::new(repr.template).with_mode(repr.mode)
    }
}

impl Default for CredentialTreatment {
    fn default() -> Self {
        Self::new(PLACEHOLDER)
    }
}

impl CredentialTreatment {
    /// An empty template, or one without a placeholder, is treated as a bare `?`
    pub fn new(template: impl Into<String>) -> Self {
        let template = template.into();
        let template = if template.trim().is_empty() || !template.contains(PLACEHOLDER) {
            PLACEHOLDER.to_string()
        } else {
            template
        };
        Self {
            template,
            mode: TreatmentMode::default(),
        }
    }

    #[must_use]
    pub fn with_mode(mut self, mode: TreatmentMode) -> Self {
        self.mode = mode;
        self
    }

    pub fn template(&self) -> &str {
        &self.template
    }

    pub fn mode(&self) -> TreatmentMode {
        self.mode
    }

    pub fn is_identity(&self) -> bool {
        self.template == PLACEHOLDER
    }

    /// Text before and after the first placeholder. Later `?` are left alone.
    pub fn split(&self) -> (&str, &str) {
        self.template
            .split_once(PLACEHOLDER)
            .unwrap_or((self.template.as_str(), ""))
    }

    /// The expression with the credential embedded as a quoted literal
    pub fn render_literal(&self, credential: &str) -> String {
        let (before, after) = self.split();
        format!("{before}{}{after}", quote_literal(credential))
    }
}

/// Single-quoted SQL string literal with embedded quotes doubled
pub fn quote_literal(value: &str) -> String {
    format!("'{}'", value.replace('\'', "''"))
}

/// Whether a row returned by a credential-match query has its flag set.
///
/// Drivers disagree on the type, so `1`, `"1"` and `true` all count.
pub fn match_flag_set(row: &Row) -> bool {
    match row.get(CREDENTIAL_MATCH_COLUMN) {
        Some(Value::Number(n)) => n.as_i64() == Some(1),
        Some(Value::String(s)) => s == "1",
        Some(Value::Bool(b)) => *b,
        _ => false,
    }
}
