use crate::config::DatabaseConfig;
use crate::error::{AppError, Result};
use sqlx::postgres::{PgConnectOptions, PgPool, PgPoolOptions, PgSslMode};
use std::time::Duration;
use tracing::{error, info};

#[derive(Clone)]
pub struct DatabaseManager {
    pool: PgPool,
}

impl DatabaseManager {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Builds the pool and verifies the server answers before returning.
    pub async fn connect(config: &DatabaseConfig) -> Result<Self> {
        let manager = Self::new(get_database_pool(config)?);

        manager.health_check().await.map_err(|e| {
            error!("Failed to ping database: {}", e);
            AppError::from(e)
        })?;

        info!("Database connection pool ready");
        Ok(manager)
    }

    pub async fn health_check(&self) -> std::result::Result<(), sqlx::Error> {
        sqlx::query("SELECT 1").execute(&self.pool).await?;
        Ok(())
    }

    pub async fn close(&self) {
        self.pool.close().await;
        info!("Database connection pool closed");
    }
}

pub fn connect_options(config: &DatabaseConfig) -> Result<PgConnectOptions> {
    let ssl_mode: PgSslMode = config
        .ssl_mode
        .parse()
        .map_err(|_| {
            AppError::Configuration(format!("unsupported ssl mode: {}", config.ssl_mode))
        })?;

    let mut options = PgConnectOptions::new()
        .host(&config.host)
        .port(config.port)
        .username(&config.user)
        .database(&config.name)
        .ssl_mode(ssl_mode);

    if !config.password.is_empty() {
        options = options.password(&config.password);
    }

    Ok(options)
}

/// Creates the connection pool without opening a connection.
pub fn get_database_pool(config: &DatabaseConfig) -> Result<PgPool> {
    info!(
        "Configuring database pool for {}:{}/{}",
        config.host, config.port, config.name
    );

    let pool = PgPoolOptions::new()
        .max_connections(config.max_open_connections)
        .min_connections(config.max_idle_connections.min(config.max_open_connections))
        .acquire_timeout(Duration::from_secs(config.acquire_timeout_seconds))
        .max_lifetime(Duration::from_secs(config.connection_max_lifetime_minutes * 60))
        .connect_lazy_with(connect_options(config)?);

    Ok(pool)
}
