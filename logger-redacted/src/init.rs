// Tracing subscriber bootstrap
use crate::config::{LogFormat, LoggerConfig};
use thiserror::Error;
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

#[derive(Error, Debug)]
pub enum LoggerError {
    #[error("Invalid log filter '{0}': {1}")]
    InvalidFilter(String, String),
}

/// Install the global tracing subscriber.
///
/// `RUST_LOG` wins over the configured level. Calling this again after a
/// subscriber is already installed is a no-op.
pub fn init_tracing(config: &LoggerConfig) -> Result<(), LoggerError> {
    let env_filter = match EnvFilter::try_from_default_env() {
        Ok(filter) => filter,
        Err(_) => EnvFilter::try_new(&config.log_level)
            .map_err(|e| LoggerError::InvalidFilter(config.log_level.clone(), e.to_string()))?,
    };

    let registry = tracing_subscriber::registry().with(env_filter);

    let installed = match config.format {
        LogFormat::Pretty => registry
            .with(fmt::layer().with_target(true).with_ansi(false))
            .try_init(),
        LogFormat::Json => registry
            .with(fmt::layer().with_target(false).json())
            .try_init(),
    };

    if installed.is_err() {
        tracing::debug!("Tracing subscriber already installed");
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_init_twice_is_harmless() {
        let config = LoggerConfig::default();
        assert!(init_tracing(&config).is_ok());
        assert!(init_tracing(&config).is_ok());
    }

    #[test]
    fn test_invalid_level_rejected() {
        if std::env::var("RUST_LOG").is_ok() {
            return;
        }
        let config = LoggerConfig {
            log_level: "credgate=loudest".to_string(),
            ..LoggerConfig::default()
        };
        assert!(matches!(
            init_tracing(&config),
            Err(LoggerError::InvalidFilter(_, _))
        ));
    }
}
