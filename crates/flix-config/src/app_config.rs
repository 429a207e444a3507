//! Application configuration structures.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::PathBuf;
use std::time::Duration;

/// Root application configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AppConfig {
    /// Application name and metadata.
    #[serde(default)]
    pub app: AppMetadata,

    /// HTTP server configuration.
    #[serde(default)]
    pub server: ServerConfig,

    /// Relational store configuration.
    #[serde(default)]
    pub database: DatabaseConfig,

    /// Repository backend selection and data import.
    #[serde(default)]
    pub repository: RepositoryConfig,

    /// Observability configuration.
    #[serde(default)]
    pub observability: ObservabilityConfig,
}

/// Application metadata.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AppMetadata {
    /// Application name.
    pub name: String,
    /// Application version.
    pub version: String,
    /// Environment (development, testing, production).
    pub environment: String,
}

impl Default for AppMetadata {
    fn default() -> Self {
        Self {
            name: "flix".to_string(),
            version: env!("CARGO_PKG_VERSION").to_string(),
            environment: "development".to_string(),
        }
    }
}

/// HTTP server configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    /// Bind host.
    pub host: String,
    /// Bind port.
    pub port: u16,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 8080,
        }
    }
}

impl ServerConfig {
    /// Returns the bind address.
    #[must_use]
    pub fn addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

/// Relational store configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct DatabaseConfig {
    /// Connection string, e.g. `sqlite://flix.db` or `sqlite::memory:`.
    pub url: String,
    /// Log every SQL statement.
    pub echo: bool,
    /// Minimum connection pool size.
    pub min_connections: u32,
    /// Maximum connection pool size.
    pub max_connections: u32,
    /// Connection timeout in seconds.
    pub connect_timeout_secs: u64,
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            url: "sqlite://flix.db".to_string(),
            echo: false,
            min_connections: 1,
            max_connections: 8,
            connect_timeout_secs: 30,
        }
    }
}

impl DatabaseConfig {
    /// Configuration for a private in-memory SQLite database.
    #[must_use]
    pub fn in_memory() -> Self {
        Self {
            url: "sqlite::memory:".to_string(),
            max_connections: 1,
            ..Self::default()
        }
    }

    /// Returns true if the URL points at an in-memory SQLite database.
    #[must_use]
    pub fn is_in_memory(&self) -> bool {
        self.url.contains(":memory:") || self.url.contains("mode=memory")
    }

    /// Returns the connect timeout as a Duration.
    #[must_use]
    pub const fn connect_timeout(&self) -> Duration {
        Duration::from_secs(self.connect_timeout_secs)
    }
}

/// Which repository implementation serves requests.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RepositoryBackend {
    /// Process-memory repository; state is lost on restart.
    Memory,
    /// Relational repository backed by the configured database.
    #[default]
    Database,
}

impl fmt::Display for RepositoryBackend {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Memory => write!(f, "memory"),
            Self::Database => write!(f, "database"),
        }
    }
}

/// Repository configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct RepositoryConfig {
    /// Selected backend.
    pub backend: RepositoryBackend,
    /// CSV file the catalogue is populated from.
    pub data_path: PathBuf,
    /// Rebuild and repopulate the schema on every start.
    pub testing: bool,
}

impl Default for RepositoryConfig {
    fn default() -> Self {
        Self {
            backend: RepositoryBackend::Database,
            data_path: PathBuf::from("data/movies.csv"),
            testing: false,
        }
    }
}

/// Observability configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ObservabilityConfig {
    /// Log level (trace, debug, info, warn, error).
    pub log_level: String,
    /// Log format (json, pretty).
    pub log_format: String,
}

impl Default for ObservabilityConfig {
    fn default() -> Self {
        Self {
            log_level: "info".to_string(),
            log_format: "pretty".to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = AppConfig::default();
        assert_eq!(config.server.addr(), "0.0.0.0:8080");
        assert_eq!(config.repository.backend, RepositoryBackend::Database);
        assert!(!config.repository.testing);
        assert!(!config.database.echo);
    }

    #[test]
    fn test_in_memory_database() {
        let db = DatabaseConfig::in_memory();
        assert!(db.is_in_memory());
        assert_eq!(db.max_connections, 1);
        assert!(!DatabaseConfig::default().is_in_memory());
    }

    #[test]
    fn test_backend_deserializes_lowercase() {
        let backend: RepositoryBackend = serde_json::from_str("\"memory\"").unwrap();
        assert_eq!(backend, RepositoryBackend::Memory);
        assert_eq!(backend.to_string(), "memory");
    }
}
