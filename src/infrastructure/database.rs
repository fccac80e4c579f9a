//! PostgreSQL connection pool lifecycle.

use anyhow::{Context, Result};
use sqlx::PgPool;
use sqlx::postgres::PgPoolOptions;
use std::time::Duration;

use crate::config::{Config, mask_connection_string};

/// Opens a connection pool sized and timed from `config`.
///
/// # Errors
///
/// Returns an error if no database URL is configured or the first
/// connection cannot be established.
pub async fn connect(config: &Config) -> Result<PgPool> {
    let url = config
        .database_url
        .as_deref()
        .context("DATABASE_URL is not configured")?;

    let pool = PgPoolOptions::new()
        .max_connections(config.db_max_connections)
        .acquire_timeout(Duration::from_secs(config.db_connect_timeout))
        .idle_timeout(Duration::from_secs(config.db_idle_timeout))
        .max_lifetime(Duration::from_secs(config.db_max_lifetime))
        .connect(url)
        .await
        .with_context(|| format!("Failed to connect to {}", mask_connection_string(url)))?;

    tracing::info!("Connected to database");
    Ok(pool)
}

/// Applies the embedded migrations from `./migrations`.
pub async fn migrate(pool: &PgPool) -> Result<()> {
    sqlx::migrate!("./migrations")
        .run(pool)
        .await
        .context("Failed to run migrations")?;

    tracing::info!("Migrations applied");
    Ok(())
}

/// Closes every pooled connection, waiting for checked-out ones to return.
pub async fn close(pool: &PgPool) {
    pool.close().await;
    tracing::info!("Database pool closed");
}
