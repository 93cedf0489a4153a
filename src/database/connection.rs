//! Database connection management

use async_trait::async_trait;
use sqlx::{PgPool, Pool, Postgres};
use std::time::Duration;

use crate::database::store::HealthProbe;
use crate::utils::errors::ChurchAdminError;

pub type DatabasePool = Pool<Postgres>;

#[derive(Debug, Clone)]
pub struct DatabaseConfig {
    pub url: String,
    pub max_connections: u32,
    pub min_connections: u32,
    pub acquire_timeout: Duration,
    pub idle_timeout: Option<Duration>,
    pub max_lifetime: Option<Duration>,
}

impl DatabaseConfig {
    /// Pool settings from the application configuration, with default timeouts
    pub fn from_settings(settings: &crate::config::DatabaseConfig) -> Self {
        Self {
            url: settings.url.clone(),
            max_connections: settings.max_connections,
            min_connections: settings.min_connections,
            ..Self::default()
        }
    }
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            url: "postgresql://localhost/church_management".to_string(),
            max_connections: 10,
            min_connections: 1,
            acquire_timeout: Duration::from_secs(30),
            idle_timeout: Some(Duration::from_secs(600)),
            max_lifetime: Some(Duration::from_secs(1800)),
        }
    }
}

/// Create a new database connection pool
pub async fn create_pool(config: &DatabaseConfig) -> Result<DatabasePool, ChurchAdminError> {
    let pool = sqlx::postgres::PgPoolOptions::new()
        .max_connections(config.max_connections)
        .min_connections(config.min_connections)
        .acquire_timeout(config.acquire_timeout)
        .idle_timeout(config.idle_timeout)
        .max_lifetime(config.max_lifetime)
        .connect(&config.url)
        .await?;

    // Test the connection
    sqlx::query("SELECT 1")
        .execute(&pool)
        .await?;

    tracing::info!("Database connection pool created successfully");
    Ok(pool)
}

/// Run database migrations
pub async fn run_migrations(pool: &DatabasePool) -> Result<(), ChurchAdminError> {
    tracing::info!("Running database migrations...");

    sqlx::migrate!("./migrations")
        .run(pool)
        .await?;

    tracing::info!("Database migrations completed successfully");
    Ok(())
}

/// Check database health
pub async fn health_check(pool: &DatabasePool) -> Result<(), ChurchAdminError> {
    sqlx::query("SELECT 1")
        .execute(pool)
        .await?;

    Ok(())
}

#[async_trait]
impl HealthProbe for PgPool {
    async fn ping(&self) -> Result<(), ChurchAdminError> {
        health_check(self).await
    }
}
