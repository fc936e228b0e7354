// Layered configuration: defaults < file < environment
use crate::database::DatabaseSettings;
use crate::error::{ConfigError, Result};
use figment::providers::{Env, Format, Toml, Yaml};
use figment::Figment;
use serde::de::DeserializeOwned;
use std::path::{Path, PathBuf};
use tracing::debug;

/// Prefix for environment overrides, e.g. `CREDGATE_DATABASE__DEFAULT`
pub const ENV_PREFIX: &str = "CREDGATE_";

/// Builds the "current configuration" out of a file and the environment.
///
/// Nested keys in environment variables are separated by `__`.
#[derive(Debug, Default)]
pub struct ConfigEngine {
    file: Option<PathBuf>,
    env: bool,
}

impl ConfigEngine {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a TOML or YAML file, picked by extension (`.yaml`/`.yml` are YAML).
    ///
    /// The file must exist when the configuration is loaded.
    pub fn with_file(mut self, path: impl AsRef<Path>) -> Self {
        self.file = Some(path.as_ref().to_path_buf());
        self
    }

    /// Let `CREDGATE_*` environment variables override file values
    pub fn with_env(mut self) -> Self {
        self.env = true;
        self
    }

    fn figment(&self) -> Result<Figment> {
        let mut figment = Figment::new();

        if let Some(path) = &self.file {
            if !path.is_file() {
                return Err(ConfigError::FileNotFound(path.display().to_string()));
            }
            let is_yaml = path
                .extension()
                .and_then(|ext| ext.to_str())
                .is_some_and(|ext| ext.eq_ignore_ascii_case("yaml") || ext.eq_ignore_ascii_case("yml"));
            debug!(path = %path.display(), yaml = is_yaml, "Loading configuration file");
            figment = if is_yaml {
                figment.merge(Yaml::file(path))
            } else {
                figment.merge(Toml::file(path))
            };
        }

        if self.env {
            figment = figment.merge(Env::prefixed(ENV_PREFIX).split("__"));
        }

        Ok(figment)
    }

    /// Deserialize the whole configuration tree
    pub fn load<T: DeserializeOwned>(&self) -> Result<T> {
        Ok(self.figment()?.extract()?)
    }

    /// Deserialize one section by dotted key path, e.g. `"validators.unique_email"`
    pub fn section<T: DeserializeOwned>(&self, key: &str) -> Result<T> {
        Ok(self.figment()?.extract_inner(key)?)
    }

    /// The `database` section, validated
    pub fn database_settings(&self) -> Result<DatabaseSettings> {
        let settings: DatabaseSettings = self.section("database")?;
        settings.validate()?;
        Ok(settings)
    }
}
