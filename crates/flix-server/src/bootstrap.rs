//! Repository construction at startup.
//!
//! The composition root picks one backend from configuration and hands the
//! resulting repository to the router.

use flix_config::{AppConfig, RepositoryBackend};
use flix_core::FlixResult;
use flix_repository::{
    populate, CatalogRepository, DatabasePool, InMemoryCatalogRepository, MappingRegistry,
    SchemaManager, SqlCatalogRepository, CATALOGUE_MAPPING,
};
use std::sync::Arc;
use tracing::info;

/// The repository selected at startup, with the pool behind it when the
/// database backend is in use.
#[derive(Clone)]
pub struct Backend {
    pub repository: Arc<dyn CatalogRepository>,
    pub pool: Option<DatabasePool>,
}

impl Backend {
    fn memory(repository: InMemoryCatalogRepository) -> Self {
        Self {
            repository: Arc::new(repository),
            pool: None,
        }
    }

    fn database(repository: SqlCatalogRepository, pool: DatabasePool) -> Self {
        Self {
            repository: Arc::new(repository),
            pool: Some(pool),
        }
    }
}

/// Builds the configured repository, populating it from the data file when
/// it starts out empty.
///
/// The database backend rebuilds the schema when it is empty or when
/// `repository.testing` is set; otherwise the existing rows are served as-is.
pub async fn build_repository(
    config: &AppConfig,
    registry: &MappingRegistry,
) -> FlixResult<Backend> {
    info!("Repository backend: {}", config.repository.backend);

    match config.repository.backend {
        RepositoryBackend::Memory => {
            let repository = InMemoryCatalogRepository::new();
            let summary = populate(&repository, &config.repository.data_path).await?;
            info!("In-memory catalogue loaded: {} movies", summary.movies);
            Ok(Backend::memory(repository))
        }
        RepositoryBackend::Database => {
            let pool = DatabasePool::new(&config.database).await?;
            let schema = SchemaManager::new(&pool, &CATALOGUE_MAPPING);

            if config.repository.testing || schema.is_empty().await? {
                info!("Reinitialising catalogue schema");
                registry.clear();
                schema.create_all().await?;
                schema.delete_all().await?;
                registry.register()?;

                let repository = SqlCatalogRepository::new(&pool, registry)?;
                let summary = populate(&repository, &config.repository.data_path).await?;
                info!("Database catalogue populated: {} movies", summary.movies);
                Ok(Backend::database(repository, pool))
            } else {
                registry.register()?;
                info!("Using existing catalogue schema");
                let repository = SqlCatalogRepository::new(&pool, registry)?;
                Ok(Backend::database(repository, pool))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use flix_config::DatabaseConfig;
    use flix_core::FlixError;
    use std::path::PathBuf;

    fn data_path() -> PathBuf {
        PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("../../data/movies.csv")
    }

    fn config(backend: RepositoryBackend) -> AppConfig {
        let mut config = AppConfig::default();
        config.repository.backend = backend;
        config.repository.data_path = data_path();
        config.database = DatabaseConfig::in_memory();
        config
    }

    #[tokio::test]
    async fn test_memory_backend_is_populated() {
        let registry = MappingRegistry::new();
        let backend = build_repository(&config(RepositoryBackend::Memory), &registry)
            .await
            .unwrap();

        assert!(!backend.repository.get_movies().await.unwrap().is_empty());
        assert!(backend.pool.is_none());
        assert!(!registry.is_registered());
    }

    #[tokio::test]
    async fn test_database_backend_registers_and_populates() {
        let registry = MappingRegistry::new();
        let backend = build_repository(&config(RepositoryBackend::Database), &registry)
            .await
            .unwrap();
        let repository = backend.repository;

        assert!(registry.is_registered());
        let movies = repository.get_movies().await.unwrap();
        assert!(!movies.is_empty());
        assert_eq!(
            repository.get_movie_title(&movies[0].id).await.unwrap(),
            Some(movies[0].title.clone())
        );

        let pool = backend.pool.unwrap();
        pool.health_check().await.unwrap();
        pool.close().await;
        assert!(pool.health_check().await.is_err());
    }

    #[tokio::test]
    async fn test_database_backend_reuses_existing_rows() {
        let dir = tempfile::tempdir().unwrap();
        let mut config = config(RepositoryBackend::Database);
        config.database.url = format!("sqlite://{}", dir.path().join("flix.db").display());

        let first = build_repository(&config, &MappingRegistry::new()).await.unwrap();
        let count = first.repository.get_movies().await.unwrap().len();

        config.repository.data_path = dir.path().join("absent.csv");
        let second = build_repository(&config, &MappingRegistry::new()).await.unwrap();
        assert_eq!(second.repository.get_movies().await.unwrap().len(), count);

        config.repository.testing = true;
        let err = build_repository(&config, &MappingRegistry::new()).await.err().unwrap();
        assert!(matches!(err, FlixError::Import(_)));
    }

    #[tokio::test]
    async fn test_registered_mapping_blocks_reuse() {
        let dir = tempfile::tempdir().unwrap();
        let mut config = config(RepositoryBackend::Database);
        config.database.url = format!("sqlite://{}", dir.path().join("flix.db").display());

        let registry = MappingRegistry::new();
        build_repository(&config, &registry).await.unwrap();

        let err = build_repository(&config, &registry).await.err().unwrap();
        assert!(matches!(err, FlixError::MappingAlreadyRegistered));
    }
}
