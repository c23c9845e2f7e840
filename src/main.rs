//! Article Generator Backend
//!
//! REST API for the Article Generator with Postgres persistence, API key
//! authentication, and per-IP rate limiting.

use article_generator::{api, core, db};

use anyhow::Result;
use std::sync::Arc;
use std::time::Duration;
use tracing::info;

#[tokio::main]
async fn main() -> Result<()> {
    // Load configuration (handles CLI args, env vars, and config file)
    let config = match core::config::Config::load() {
        Ok(cfg) => cfg,
        Err(e) => {
            // Print error to stderr since logging isn't initialized yet
            eprintln!("Failed to load configuration: {}", e);
            return Err(e.into());
        }
    };

    // Initialize logging system based on configuration
    let _logger = match core::Logger::init(&config.logging) {
        Ok(logger) => logger,
        Err(e) => {
            eprintln!("Failed to initialize logging: {}", e);
            return Err(e);
        }
    };

    info!("Starting Article Generator Backend v{}", env!("CARGO_PKG_VERSION"));
    info!(
        host = %config.server.host,
        port = config.server.port,
        "Server configuration"
    );
    info!(
        auth_enabled = !config.security.api_key.is_empty(),
        rate_limit_enabled = config.security.rate_limit_enabled,
        rate_limit_per_minute = config.security.rate_limit_per_minute,
        rate_limit_per_hour = config.security.rate_limit_per_hour,
        "Security configuration"
    );

    let database_url = config.database_url().map_err(|e| {
        anyhow::anyhow!("Database configuration error: {}", e)
    })?;
    // Log only the portion after the credentials
    if let Some(host_part) = database_url.split('@').next_back() {
        info!(database = %host_part, "Database configuration");
    }

    info!("Connecting to database...");
    let db = Arc::new(
        db::DatabaseManager::connect(
            &database_url,
            config.database.max_connections,
            config.database.connect_retries,
            Duration::from_secs(config.database.connect_retry_delay),
        )
        .await?,
    );
    info!("Database connection established");

    let server_url = format!("http://{}:{}", config.server.host, config.server.port);
    let server = api::ApiServer::new(config, db)?;

    info!(url = %server_url, "Server ready - starting to serve requests");

    // Start serving (this will block until shutdown signal)
    server.serve().await?;

    Ok(())
}
