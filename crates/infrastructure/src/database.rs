use std::env;

use sqlx::PgPool;
use sqlx::postgres::PgPoolOptions;
use tracing::info;

use labrix_core::{AppError, AppResult};

/// Connection settings for the PostgreSQL-backed repositories.
#[derive(Debug, Clone)]
pub struct DatabaseConfig {
    /// PostgreSQL connection string.
    pub database_url: String,
    /// Upper bound for the connection pool.
    pub max_connections: u32,
}

impl DatabaseConfig {
    /// Loads settings from the environment.
    ///
    /// `DATABASE_URL` is required. `DATABASE_MAX_CONNECTIONS` is optional and
    /// defaults to 10.
    pub fn load() -> AppResult<Self> {
        let database_url = env::var("DATABASE_URL")
            .map_err(|_| AppError::Validation("DATABASE_URL is required".to_owned()))?;
        let max_connections = env::var("DATABASE_MAX_CONNECTIONS")
            .ok()
            .and_then(|value| value.parse::<u32>().ok())
            .unwrap_or(10);

        Ok(Self {
            database_url,
            max_connections,
        })
    }
}

/// Connects to PostgreSQL and applies pending migrations.
pub async fn connect_and_migrate(config: &DatabaseConfig) -> AppResult<PgPool> {
    let pool = PgPoolOptions::new()
        .max_connections(config.max_connections)
        .connect(config.database_url.as_str())
        .await
        .map_err(|error| AppError::Internal(format!("failed to connect to database: {error}")))?;

    sqlx::migrate!("./migrations")
        .run(&pool)
        .await
        .map_err(|error| AppError::Internal(format!("failed to run migrations: {error}")))?;

    info!(
        max_connections = config.max_connections,
        "database connected and migrated"
    );

    Ok(pool)
}
