use crate::error::{IdentityError, Result};
use crate::matcher::{CredentialCallback, CredentialMatcher};
use config_engine::{ConfigEngine, DatabaseSettings, DEFAULT_CONNECTION};
use database_layer::{CredentialTreatment, TreatmentMode};
use logger_redacted::LoggerConfig;
use serde::{Deserialize, Serialize};

/// The `authentication` section
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuthSettings {
    #[serde(default = "default_connection")]
    pub connection: String,
    pub table: String,
    pub identity_column: String,
    pub credential_column: String,
    #[serde(default)]
    pub ambiguity_identity: bool,
    /// Named in-process comparison: `strict`, `argon2` or `bcrypt`
    #[serde(default)]
    pub callback: Option<String>,
    /// Database-side treatment such as `MD5(?)`
    #[serde(default)]
    pub treatment: Option<String>,
    #[serde(default)]
    pub treatment_mode: TreatmentMode,
}

fn default_connection() -> String {
    DEFAULT_CONNECTION.to_string()
}

impl AuthSettings {
    /// Strict comparison when neither a callback nor a treatment is configured
    pub fn matcher(&self) -> Result<CredentialMatcher> {
        match (&self.callback, &self.treatment) {
            (Some(_), Some(_)) => Err(IdentityError::InvalidSettings(
                "callback and treatment are mutually exclusive".to_string(),
            )),
            (Some(name), None) => Ok(CredentialMatcher::Callback(CredentialCallback::named(name)?)),
            (None, Some(template)) => Ok(CredentialMatcher::Treatment(
                CredentialTreatment::new(template.as_str()).with_mode(self.treatment_mode),
            )),
            (None, None) => Ok(CredentialMatcher::default()),
        }
    }
}

/// Everything `credcheck` reads at startup
#[derive(Debug, Default, Deserialize)]
pub struct AppConfig {
    #[serde(default)]
    pub database: DatabaseSettings,
    #[serde(default)]
    pub logging: LoggerConfig,
    #[serde(default)]
    pub authentication: Option<AuthSettings>,
}

impl AppConfig {
    pub fn load(engine: &ConfigEngine) -> Result<Self> {
        let config: AppConfig = engine.load()?;
        config.database.validate()?;
        Ok(config)
    }
}
