//! Database connection pool management.

use flix_config::DatabaseConfig;
use flix_core::{FlixError, FlixResult};
use sqlx::sqlite::{SqliteConnectOptions, SqlitePool, SqlitePoolOptions};
use sqlx::ConnectOptions;
use std::str::FromStr;
use tracing::{info, warn};

/// SQLite connection pool wrapper.
#[derive(Clone)]
pub struct DatabasePool {
    pool: SqlitePool,
}

impl DatabasePool {
    /// Creates a new database pool from configuration.
    ///
    /// In-memory URLs get exactly one connection that never idles out or
    /// expires: SQLite discards an in-memory database with its last
    /// connection.
    pub async fn new(config: &DatabaseConfig) -> FlixResult<Self> {
        info!("Connecting to SQLite database at {}", config.url);

        let mut options = SqliteConnectOptions::from_str(&config.url)
            .map_err(|e| FlixError::Configuration(format!("Invalid database URL: {}", e)))?
            .create_if_missing(true);
        if !config.echo {
            options = options.disable_statement_logging();
        }

        let mut pool_options = SqlitePoolOptions::new().acquire_timeout(config.connect_timeout());
        pool_options = if config.is_in_memory() {
            pool_options
                .min_connections(1)
                .max_connections(1)
                .idle_timeout(None)
                .max_lifetime(None)
        } else {
            pool_options
                .min_connections(config.min_connections)
                .max_connections(config.max_connections)
        };

        let pool = pool_options.connect_with(options).await.map_err(|e| {
            warn!("Failed to connect to database: {}", e);
            FlixError::Database(format!("Failed to connect: {}", e))
        })?;

        info!("SQLite connection pool established");
        Ok(Self { pool })
    }

    /// Returns a reference to the underlying pool.
    #[must_use]
    pub fn inner(&self) -> &SqlitePool {
        &self.pool
    }

    /// Checks if the database connection is healthy.
    pub async fn health_check(&self) -> FlixResult<()> {
        sqlx::query("SELECT 1")
            .execute(&self.pool)
            .await
            .map_err(|e| FlixError::Database(format!("Health check failed: {}", e)))?;
        Ok(())
    }

    /// Closes the database pool.
    pub async fn close(&self) {
        info!("Closing database connection pool...");
        self.pool.close().await;
        info!("Database connection pool closed");
    }
}

impl std::fmt::Debug for DatabasePool {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DatabasePool")
            .field("size", &self.pool.size())
            .field("num_idle", &self.pool.num_idle())
            .finish()
    }
}
