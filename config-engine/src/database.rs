// Named connection descriptors consumed once at bootstrap
use crate::error::{ConfigError, Result};
use secrecy::SecretString;
use serde::Deserialize;
use std::collections::BTreeMap;

/// Token naming the connection used when a caller does not pick one
pub const DEFAULT_CONNECTION: &str = "default";

const SUPPORTED_DRIVERS: &[&str] = &["postgres", "postgresql", "pgsql"];

/// Host, credentials and driver for one relational connection
#[derive(Debug, Deserialize)]
pub struct ConnectionDescriptor {
    #[serde(default = "default_driver")]
    pub driver: String,

    #[serde(default = "default_host")]
    pub host: String,

    #[serde(default = "default_port")]
    pub port: u16,

    pub database: String,

    pub username: String,

    #[serde(default)]
    pub password: Option<SecretString>,

    #[serde(default = "default_max_connections")]
    pub max_connections: u32,
}

fn default_driver() -> String {
    "postgres".to_string()
}

fn default_host() -> String {
    "localhost".to_string()
}

fn default_port() -> u16 {
    5432
}

fn default_max_connections() -> u32 {
    10
}

impl ConnectionDescriptor {
    /// Reject drivers the query gateway cannot speak
    pub fn validate(&self) -> Result<()> {
        let driver = self.driver.to_ascii_lowercase();
        if !SUPPORTED_DRIVERS.contains(&driver.as_str()) {
            return Err(ConfigError::UnsupportedDriver(self.driver.clone()));
        }
        if self.database.is_empty() {
            return Err(ConfigError::ValidationError(
                "database name must not be empty".to_string(),
            ));
        }
        Ok(())
    }

    /// Connection URL without the password, safe to log
    pub fn redacted_url(&self) -> String {
        format!(
            "postgres://{}@{}:{}/{}",
            self.username, self.host, self.port, self.database
        )
    }
}

/// The `database` section: every named connection plus the default name
#[derive(Debug, Deserialize)]
pub struct DatabaseSettings {
    #[serde(default = "default_connection_name")]
    pub default: String,

    #[serde(default)]
    pub connections: BTreeMap<String, ConnectionDescriptor>,
}

fn default_connection_name() -> String {
    DEFAULT_CONNECTION.to_string()
}

impl Default for DatabaseSettings {
    fn default() -> Self {
        Self {
            default: default_connection_name(),
            connections: BTreeMap::new(),
        }
    }
}

impl DatabaseSettings {
    /// Resolve a connection name; an empty name means the default connection
    pub fn resolve_name<'a>(&'a self, name: &'a str) -> &'a str {
        if name.is_empty() {
            &self.default
        } else {
            name
        }
    }

    pub fn descriptor(&self, name: &str) -> Result<&ConnectionDescriptor> {
        let resolved = self.resolve_name(name);
        self.connections
            .get(resolved)
            .ok_or_else(|| ConfigError::UnknownConnection(resolved.to_string()))
    }

    /// Validate every configured descriptor
    pub fn validate(&self) -> Result<()> {
        for (name, descriptor) in &self.connections {
            descriptor.validate().map_err(|e| match e {
                ConfigError::ValidationError(msg) => {
                    ConfigError::ValidationError(format!("connection '{name}': {msg}"))
                }
                other => other,
            })?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn descriptor(driver: &str) -> ConnectionDescriptor {
        ConnectionDescriptor {
            driver: driver.to_string(),
            host: "db.internal".to_string(),
            port: 5433,
            database: "accounts".to_string(),
            username: "svc".to_string(),
            password: Some(SecretString::new("s3cret".to_string())),
            max_connections: 4,
        }
    }

    #[test]
    fn test_redacted_url_omits_password() {
        let url = descriptor("postgres").redacted_url();
        assert_eq!(url, "postgres://svc@db.internal:5433/accounts");
        assert!(!url.contains("s3cret"));
    }

    #[test]
    fn test_pgsql_alias_accepted() {
        assert!(descriptor("pgsql").validate().is_ok());
        assert!(descriptor("PostgreSQL").validate().is_ok());
    }

    #[test]
    fn test_unsupported_driver_rejected() {
        let err = descriptor("mysql").validate().unwrap_err();
        assert!(matches!(err, ConfigError::UnsupportedDriver(d) if d == "mysql"));
    }

    #[test]
    fn test_empty_name_resolves_to_default() {
        let mut settings = DatabaseSettings::default();
        settings
            .connections
            .insert(DEFAULT_CONNECTION.to_string(), descriptor("postgres"));

        assert_eq!(settings.resolve_name(""), "default");
        assert!(settings.descriptor("").is_ok());
        assert!(matches!(
            settings.descriptor("reporting"),
            Err(ConfigError::UnknownConnection(name)) if name == "reporting"
        ));
    }
}
