//! Database connection pool management.

use std::time::Duration;

use anyhow::{Context, Result};
use sqlx::postgres::{PgPool, PgPoolOptions};

use crate::config::Config;

/// Upper bound on the health-check connectivity probe.
pub const HEALTH_PROBE_TIMEOUT: Duration = Duration::from_secs(3);

/// Create a PostgreSQL connection pool.
pub async fn create_pool(config: &Config) -> Result<PgPool> {
    let pool = PgPoolOptions::new()
        .max_connections(config.database_max_connections)
        .connect(&config.database_url)
        .await
        .context("failed to connect to PostgreSQL")?;

    Ok(pool)
}

/// Create a pool without establishing a connection.
///
/// Used by integration tests that exercise routes which never touch the
/// database (middleware, rate limiting, validation paths).
pub fn create_lazy_pool(config: &Config) -> Result<PgPool> {
    let pool = PgPoolOptions::new()
        .max_connections(config.database_max_connections)
        .connect_lazy(&config.database_url)
        .context("invalid PostgreSQL connection URL")?;

    Ok(pool)
}

/// Apply embedded migrations.
pub async fn run_migrations(pool: &PgPool) -> Result<()> {
    sqlx::migrate!("./migrations")
        .run(pool)
        .await
        .context("failed to run migrations")?;

    Ok(())
}

/// Outcome of the best-effort datastore connectivity probe.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DatabaseStatus {
    /// Probe query completed.
    Connected,
    /// Probe query failed (connection refused, auth failure, ...).
    Error,
    /// Probe did not complete within [`HEALTH_PROBE_TIMEOUT`].
    Unreachable,
}

impl DatabaseStatus {
    pub fn as_str(self) -> &'static str {
        match self {
            DatabaseStatus::Connected => "connected",
            DatabaseStatus::Error => "error",
            DatabaseStatus::Unreachable => "unreachable",
        }
    }
}

/// Probe database connectivity, bounded by [`HEALTH_PROBE_TIMEOUT`].
pub async fn probe(pool: &PgPool) -> DatabaseStatus {
    match tokio::time::timeout(HEALTH_PROBE_TIMEOUT, sqlx::query("SELECT 1").execute(pool)).await {
        Ok(Ok(_)) => DatabaseStatus::Connected,
        Ok(Err(_)) => DatabaseStatus::Error,
        Err(_) => DatabaseStatus::Unreachable,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn database_status_strings() {
        assert_eq!(DatabaseStatus::Connected.as_str(), "connected");
        assert_eq!(DatabaseStatus::Error.as_str(), "error");
        assert_eq!(DatabaseStatus::Unreachable.as_str(), "unreachable");
    }
}
