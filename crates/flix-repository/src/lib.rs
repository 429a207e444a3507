//! # Flix Repository
//!
//! Persistence for the movie catalogue behind one contract,
//! [`CatalogRepository`], with two implementations:
//!
//! ```text
//! Handlers
//!   ↓  Arc<dyn CatalogRepository>
//! InMemoryCatalogRepository       SqlCatalogRepository
//!   (Vecs behind a RwLock)          ↓  Session (one transaction per call)
//!                                 SQLite (sqlx), tables from CATALOGUE_MAPPING
//! ```
//!
//! [`populate`] fills either implementation from the movie CSV file.

pub mod datafiles;
pub mod mapping;
pub mod memory;
pub mod pool;
pub mod populate;
pub mod schema;
pub mod session;
pub mod sqlite;
pub mod traits;

pub use datafiles::MovieFileCsvReader;
pub use mapping::{Mapping, MappingRegistry, CATALOGUE_MAPPING};
pub use memory::InMemoryCatalogRepository;
pub use pool::*;
pub use populate::{populate, PopulateSummary};
pub use schema::SchemaManager;
pub use session::{Session, SessionFactory};
pub use sqlite::SqlCatalogRepository;
pub use traits::*;
