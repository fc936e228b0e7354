// Database connection management
use crate::error::{DatabaseError, DatabaseResult};
use config_engine::{ConnectionDescriptor, DatabaseSettings};
use secrecy::ExposeSecret;
use sqlx::postgres::{PgConnectOptions, PgPoolOptions};
use sqlx::PgPool;
use std::collections::BTreeMap;
use std::time::Duration;
use tracing::{debug, info, warn};

/// Named connection pool
#[derive(Clone)]
pub struct DatabasePool {
    name: String,
    pool: PgPool,
}

impl DatabasePool {
    /// Build a lazily connecting pool from a descriptor.
    ///
    /// No connection is opened until the first query, so this needs a Tokio
    /// runtime but not a reachable server.
    pub fn from_descriptor(name: &str, descriptor: &ConnectionDescriptor) -> DatabaseResult<Self> {
        descriptor.validate()?;

        let mut options = PgConnectOptions::new()
            .host(&descriptor.host)
            .port(descriptor.port)
            .username(&descriptor.username)
            .database(&descriptor.database);
        if let Some(password) = &descriptor.password {
            options = options.password(password.expose_secret());
        }

        let pool = PgPoolOptions::new()
            .max_connections(descriptor.max_connections)
            .acquire_timeout(Duration::from_secs(30))
            .idle_timeout(Duration::from_secs(600))
            .max_lifetime(Duration::from_secs(1800))
            .connect_lazy_with(options);

        debug!(connection = %name, url = %descriptor.redacted_url(), "Connection pool configured");

        Ok(Self {
            name: name.to_string(),
            pool,
        })
    }

    pub fn from_pool(name: impl Into<String>, pool: PgPool) -> Self {
        Self {
            name: name.into(),
            pool,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Get the underlying PgPool
    pub fn pool(&self) -> &PgPool {
        &self.pool
    }

    /// Round-trip `SELECT 1`
    pub async fn ping(&self) -> DatabaseResult<()> {
        sqlx::query("SELECT 1")
            .fetch_one(&self.pool)
            .await
            .map(|_| ())
            .map_err(|e| match DatabaseError::from_sqlx(e) {
                DatabaseError::SqlxError(e) => DatabaseError::ConnectionFailed(e.to_string()),
                other => other,
            })
    }

    /// Check if the pool is healthy
    pub async fn is_healthy(&self) -> bool {
        match self.ping().await {
            Ok(()) => true,
            Err(e) => {
                warn!(connection = %self.name, "Database health check failed: {}", e);
                false
            }
        }
    }

    /// Close the pool
    pub async fn close(&self) {
        self.pool.close().await;
        info!(connection = %self.name, "Database connection pool closed");
    }
}

/// Registry of named pools, resolved by the name each adapter carries.
///
/// An empty name resolves to the configured default connection.
#[derive(Clone)]
pub struct ConnectionManager {
    default: String,
    pools: BTreeMap<String, DatabasePool>,
}

impl ConnectionManager {
    pub fn new(default: impl Into<String>) -> Self {
        Self {
            default: default.into(),
            pools: BTreeMap::new(),
        }
    }

    pub fn from_settings(settings: &DatabaseSettings) -> DatabaseResult<Self> {
        settings.validate()?;

        let mut manager = Self::new(settings.default.clone());
        for (name, descriptor) in &settings.connections {
            manager.register(DatabasePool::from_descriptor(name, descriptor)?);
        }

        info!(
            connections = manager.pools.len(),
            default = %manager.default,
            "Connection manager initialized"
        );
        Ok(manager)
    }

    pub fn register(&mut self, pool: DatabasePool) {
        self.pools.insert(pool.name().to_string(), pool);
    }

    pub fn default_name(&self) -> &str {
        &self.default
    }

    pub fn resolve<'a>(&'a self, name: &'a str) -> &'a str {
        if name.is_empty() {
            &self.default
        } else {
            name
        }
    }

    pub fn pool(&self, name: &str) -> DatabaseResult<&DatabasePool> {
        let name = self.resolve(name);
        self.pools
            .get(name)
            .ok_or_else(|| DatabaseError::UnknownConnection(name.to_string()))
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.pools.keys().map(String::as_str)
    }

    pub async fn is_healthy(&self, name: &str) -> DatabaseResult<bool> {
        Ok(self.pool(name)?.is_healthy().await)
    }

    pub async fn close_all(&self) {
        for pool in self.pools.values() {
            pool.close().await;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use config_engine::DEFAULT_CONNECTION;

    fn descriptor(database: &str, username: &str) -> ConnectionDescriptor {
        ConnectionDescriptor {
            driver: "postgres".to_string(),
            host: "localhost".to_string(),
            port: 5432,
            database: database.to_string(),
            username: username.to_string(),
            password: None,
            max_connections: 2,
        }
    }

    fn settings() -> DatabaseSettings {
        let mut settings = DatabaseSettings::default();
        settings
            .connections
            .insert(DEFAULT_CONNECTION.to_string(), descriptor("app", "app"));
        settings
            .connections
            .insert("reporting".to_string(), descriptor("reports", "reader"));
        settings
    }

    #[tokio::test]
    async fn test_resolves_named_and_default_pools() {
        let manager = ConnectionManager::from_settings(&settings()).unwrap();

        assert_eq!(manager.pool("").unwrap().name(), DEFAULT_CONNECTION);
        assert_eq!(manager.pool("reporting").unwrap().name(), "reporting");
        assert_eq!(manager.names().collect::<Vec<_>>(), vec!["default", "reporting"]);
    }

    #[tokio::test]
    async fn test_unknown_connection() {
        let manager = ConnectionManager::from_settings(&settings()).unwrap();
        let err = manager.pool("archive").err().unwrap();
        assert!(matches!(err, DatabaseError::UnknownConnection(name) if name == "archive"));
    }

    #[tokio::test]
    async fn test_unreachable_pool_reports_connection_failed() {
        let options = PgConnectOptions::new()
            .host("127.0.0.1")
            .port(1)
            .username("app")
            .database("app");
        let pool = PgPoolOptions::new()
            .acquire_timeout(Duration::from_secs(2))
            .connect_lazy_with(options);
        let pool = DatabasePool::from_pool(DEFAULT_CONNECTION, pool);

        assert!(matches!(pool.ping().await, Err(DatabaseError::ConnectionFailed(_))));
        assert!(!pool.is_healthy().await);
    }
}
