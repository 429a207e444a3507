//! Process-memory repository.

mod repository;

pub use repository::InMemoryCatalogRepository;
