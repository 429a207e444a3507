//! Configuration validation.
//!
//! Collects every problem in the configuration up front so startup fails
//! with a complete report instead of the first error hit at runtime.

use crate::{AppConfig, RepositoryBackend};
use std::fmt;

/// Configuration validation error variants.
#[derive(Debug, Clone, PartialEq)]
pub enum ConfigValidationError {
    /// Port number is invalid (must be 1-65535).
    InvalidPort { value: u16 },
    /// Pool size configuration is invalid (min must be <= max).
    InvalidPoolSize { min: u32, max: u32 },
    /// Pool must allow at least one connection.
    EmptyPool,
    /// Database URL is missing or uses an unsupported scheme.
    InvalidDatabaseUrl { message: String },
    /// The CSV data path is empty.
    MissingDataPath,
    /// Timeout value must be positive.
    NonPositiveTimeout { name: String },
    /// Log level is invalid.
    InvalidLogLevel { value: String },
}

impl fmt::Display for ConfigValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::InvalidPort { value } => {
                write!(f, "Invalid server port: {} (must be 1-65535)", value)
            }
            Self::InvalidPoolSize { min, max } => {
                write!(
                    f,
                    "Invalid pool size: min ({}) cannot be greater than max ({})",
                    min, max
                )
            }
            Self::EmptyPool => write!(f, "max_connections must be at least 1"),
            Self::InvalidDatabaseUrl { message } => {
                write!(f, "Invalid database URL: {}", message)
            }
            Self::MissingDataPath => write!(f, "repository.data_path cannot be empty"),
            Self::NonPositiveTimeout { name } => {
                write!(f, "Timeout '{}' must be positive", name)
            }
            Self::InvalidLogLevel { value } => {
                write!(
                    f,
                    "Invalid log level: '{}' (valid: trace, debug, info, warn, error)",
                    value
                )
            }
        }
    }
}

impl std::error::Error for ConfigValidationError {}

/// Configuration validator.
pub struct ConfigValidator;

impl ConfigValidator {
    /// Valid log levels.
    const VALID_LOG_LEVELS: &'static [&'static str] = &["trace", "debug", "info", "warn", "error"];

    /// Validates the entire application configuration.
    ///
    /// Returns Ok(()) if valid, or Err with all validation errors found.
    pub fn validate(config: &AppConfig) -> Result<(), Vec<ConfigValidationError>> {
        let mut errors = Vec::new();

        if config.server.port == 0 {
            errors.push(ConfigValidationError::InvalidPort {
                value: config.server.port,
            });
        }

        let db = &config.database;
        // The database section only matters when the relational backend is selected.
        if config.repository.backend == RepositoryBackend::Database {
            if db.url.is_empty() {
                errors.push(ConfigValidationError::InvalidDatabaseUrl {
                    message: "URL cannot be empty".to_string(),
                });
            } else if !db.url.starts_with("sqlite:") {
                errors.push(ConfigValidationError::InvalidDatabaseUrl {
                    message: format!("unsupported scheme in '{}' (expected sqlite:)", db.url),
                });
            }
            if db.max_connections == 0 {
                errors.push(ConfigValidationError::EmptyPool);
            }
            if db.min_connections > db.max_connections {
                errors.push(ConfigValidationError::InvalidPoolSize {
                    min: db.min_connections,
                    max: db.max_connections,
                });
            }
            if db.connect_timeout_secs == 0 {
                errors.push(ConfigValidationError::NonPositiveTimeout {
                    name: "connect_timeout_secs".to_string(),
                });
            }
        }

        if config.repository.data_path.as_os_str().is_empty() {
            errors.push(ConfigValidationError::MissingDataPath);
        }

        let level = config.observability.log_level.to_lowercase();
        if !Self::VALID_LOG_LEVELS.contains(&level.as_str()) {
            errors.push(ConfigValidationError::InvalidLogLevel {
                value: config.observability.log_level.clone(),
            });
        }

        if errors.is_empty() {
            Ok(())
        } else {
            Err(errors)
        }
    }
}
