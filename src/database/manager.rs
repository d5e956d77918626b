use std::time::Duration;

use async_trait::async_trait;
use sqlx::postgres::{PgConnectOptions, PgPoolOptions, PgSslMode};
use sqlx::PgPool;
use thiserror::Error;
use tokio::sync::OnceCell;
use tracing::info;

use crate::config::DatabaseConfig;
use crate::secrets::{CredentialResolver, Credentials, SecretError};

/// Errors from pool acquisition and queries
#[derive(Debug, Error)]
pub enum DatabaseError {
    #[error(transparent)]
    Secret(#[from] SecretError),

    #[error("Connection timeout: timed out acquiring a database connection")]
    ConnectionTimeout,

    #[error(transparent)]
    Sqlx(sqlx::Error),
}

impl From<sqlx::Error> for DatabaseError {
    fn from(err: sqlx::Error) -> Self {
        match err {
            // acquire_timeout is the only timeout configured on the pool
            sqlx::Error::PoolTimedOut => DatabaseError::ConnectionTimeout,
            other => DatabaseError::Sqlx(other),
        }
    }
}

/// Builds a pool of type `P` from resolved credentials
#[async_trait]
pub trait PoolBuilder<P>: Send + Sync {
    async fn build(&self, credentials: Credentials) -> Result<P, DatabaseError>;
}

/// Where a pool comes from: the credential secret and the builder
struct PoolSource<P> {
    resolver: CredentialResolver,
    secret_id: Option<String>,
    builder: Box<dyn PoolBuilder<P>>,
}

/// Process-wide owner of a single lazily built connection pool.
///
/// The first `get()` resolves credentials and builds the pool; concurrent
/// callers during that build wait on the same attempt. A failed attempt leaves
/// the manager unbuilt so the next call starts over.
pub struct PoolManager<P> {
    source: Option<PoolSource<P>>,
    pool: OnceCell<P>,
}

impl<P: Send + Sync> PoolManager<P> {
    pub fn new(
        resolver: CredentialResolver,
        secret_id: Option<String>,
        builder: impl PoolBuilder<P> + 'static,
    ) -> Self {
        Self {
            source: Some(PoolSource {
                resolver,
                secret_id,
                builder: Box::new(builder),
            }),
            pool: OnceCell::new(),
        }
    }

    /// Manager around an already built pool; `get()` never resolves credentials
    pub fn with_pool(pool: P) -> Self {
        Self {
            source: None,
            pool: OnceCell::new_with(Some(pool)),
        }
    }

    /// Get the shared pool, building it on first use
    pub async fn get(&self) -> Result<&P, DatabaseError> {
        self.pool
            .get_or_try_init(|| async {
                let source = self
                    .source
                    .as_ref()
                    .ok_or(SecretError::NotConfigured("DB_SECRET_ARN"))?;

                let credentials = source.resolver.resolve(source.secret_id.as_deref()).await?;
                info!(
                    "Building database pool for {}@{}:{}/{}",
                    credentials.username,
                    credentials.host,
                    credentials.port,
                    credentials.database()
                );
                let pool = source.builder.build(credentials).await?;
                Ok::<P, DatabaseError>(pool)
            })
            .await
    }

    /// Whether the pool has been built in this process
    pub fn is_ready(&self) -> bool {
        self.pool.initialized()
    }
}

/// Postgres pool sized for a serverless instance
#[derive(Debug, Clone)]
pub struct PgPoolBuilder {
    max_connections: u32,
    idle_timeout: Duration,
    connect_timeout: Duration,
    ssl_mode: PgSslMode,
}

impl PgPoolBuilder {
    pub fn from_config(config: &DatabaseConfig) -> Self {
        Self {
            max_connections: config.max_connections,
            idle_timeout: Duration::from_secs(config.idle_timeout_secs),
            connect_timeout: Duration::from_millis(config.connect_timeout_ms),
            // Require encrypts without verifying the server certificate
            ssl_mode: if config.require_tls { PgSslMode::Require } else { PgSslMode::Prefer },
        }
    }

    fn connect_options(&self, credentials: &Credentials) -> PgConnectOptions {
        PgConnectOptions::new()
            .host(&credentials.host)
            .port(credentials.port)
            .database(credentials.database())
            .username(&credentials.username)
            .password(&credentials.password)
            .ssl_mode(self.ssl_mode)
    }

    fn pool_options(&self) -> PgPoolOptions {
        PgPoolOptions::new()
            .max_connections(self.max_connections)
            .min_connections(0)
            .idle_timeout(self.idle_timeout)
            .acquire_timeout(self.connect_timeout)
    }
}

#[async_trait]
impl PoolBuilder<PgPool> for PgPoolBuilder {
    async fn build(&self, credentials: Credentials) -> Result<PgPool, DatabaseError> {
        // Connections are opened on first checkout, not here
        Ok(self
            .pool_options()
            .connect_lazy_with(self.connect_options(&credentials)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn credentials() -> Credentials {
        serde_json::from_str(
            r#"{"host":"db.internal","port":5432,"dbname":"notes","username":"app","password":"pw"}"#,
        )
        .unwrap()
    }

    fn config(require_tls: bool) -> DatabaseConfig {
        DatabaseConfig {
            max_connections: 2,
            idle_timeout_secs: 30,
            connect_timeout_ms: 2000,
            require_tls,
        }
    }

    #[test]
    fn maps_pool_timeout_to_connection_timeout() {
        let err: DatabaseError = sqlx::Error::PoolTimedOut.into();
        assert!(matches!(err, DatabaseError::ConnectionTimeout));

        let err: DatabaseError = sqlx::Error::RowNotFound.into();
        assert!(matches!(err, DatabaseError::Sqlx(_)));
    }

    #[test]
    fn tls_mode_follows_config() {
        assert!(matches!(PgPoolBuilder::from_config(&config(true)).ssl_mode, PgSslMode::Require));
        assert!(matches!(PgPoolBuilder::from_config(&config(false)).ssl_mode, PgSslMode::Prefer));
    }

    #[tokio::test]
    async fn builds_lazy_pool_with_budget() {
        let pool = PgPoolBuilder::from_config(&config(true))
            .build(credentials())
            .await
            .unwrap();

        let options = pool.options();
        assert_eq!(options.get_max_connections(), 2);
        assert_eq!(options.get_idle_timeout(), Some(Duration::from_secs(30)));
        assert_eq!(options.get_acquire_timeout(), Duration::from_millis(2000));
        // Nothing connected yet
        assert_eq!(pool.size(), 0);
    }

    #[tokio::test]
    async fn prebuilt_manager_is_ready_without_credentials() {
        let manager = PoolManager::with_pool(7u32);
        assert!(manager.is_ready());
        assert_eq!(*manager.get().await.unwrap(), 7);
    }
}
