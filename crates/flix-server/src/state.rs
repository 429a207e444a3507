//! Application state for Axum handlers.

use flix_repository::{CatalogRepository, DatabasePool};
use flix_security::PasswordHasher;
use std::sync::Arc;

/// Shared application state.
#[derive(Clone)]
pub struct AppState {
    pub repository: Arc<dyn CatalogRepository>,
    pub password_hasher: PasswordHasher,
    /// Present only for the database backend; checked by `/health`.
    pub pool: Option<DatabasePool>,
}

impl AppState {
    /// Creates a new application state.
    pub fn new(repository: Arc<dyn CatalogRepository>, password_hasher: PasswordHasher) -> Self {
        Self {
            repository,
            password_hasher,
            pool: None,
        }
    }

    /// Attaches the connection pool checked by the health endpoint.
    #[must_use]
    pub fn with_pool(mut self, pool: Option<DatabasePool>) -> Self {
        self.pool = pool;
        self
    }
}
