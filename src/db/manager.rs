//! Database manager implementation
//!
//! This module provides database connection management with:
//! - Postgres connection pool via sqlx
//! - Connection retries at startup
//! - Connectivity probe for the health endpoint
//! - Error handling integration with AppError

use crate::core::error::{AppError, Result};
use sqlx::postgres::{PgPool, PgPoolOptions};
use std::time::Duration;
use tracing::{info, warn};

/// Database manager with connection pool
pub struct DatabaseManager {
    pool: PgPool,
}

impl DatabaseManager {
    /// Connect to the database with retry logic.
    ///
    /// A managed database occasionally takes a moment to accept connections
    /// after a cold start, so the initial connect is retried before the
    /// process gives up and exits.
    pub async fn connect(
        database_url: &str,
        max_connections: u32,
        retries: u32,
        retry_delay: Duration,
    ) -> Result<Self> {
        let mut attempt = 0;

        loop {
            attempt += 1;

            match PgPoolOptions::new()
                .max_connections(max_connections)
                .acquire_timeout(Duration::from_secs(30))
                .connect(database_url)
                .await
            {
                Ok(pool) => {
                    info!(max_connections, "Database connection pool established");
                    return Ok(Self { pool });
                }
                Err(e) if attempt <= retries => {
                    warn!(
                        attempt,
                        retries,
                        error = %e,
                        "Database connection failed, retrying in {}s",
                        retry_delay.as_secs()
                    );
                    tokio::time::sleep(retry_delay).await;
                }
                Err(e) => {
                    return Err(AppError::InitializationError(format!(
                        "failed to connect to database after {} attempts: {}",
                        attempt, e
                    )));
                }
            }
        }
    }

    /// Get a reference to the connection pool
    pub fn pool(&self) -> &PgPool {
        &self.pool
    }

    /// Probe database connectivity
    pub async fn ping(&self) -> Result<()> {
        sqlx::query("SELECT 1").execute(&self.pool).await?;
        Ok(())
    }

    /// Close the pool, waiting for checked-out connections to be returned
    pub async fn close(&self) {
        self.pool.close().await;
    }
}
