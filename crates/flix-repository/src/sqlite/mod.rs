//! Relational repository over SQLite.

mod repository;
mod rows;

pub use repository::SqlCatalogRepository;

use flix_core::{FlixError, FlixResult};
use tracing::error;

/// Reduces the rows of a key lookup to at most one entity.
///
/// Lookups fetch up to two rows; a second row means a uniqueness invariant
/// of the schema is broken.
pub(crate) fn at_most_one<T>(
    mut rows: Vec<T>,
    resource_type: &'static str,
    key: &str,
) -> FlixResult<Option<T>> {
    match rows.len() {
        0 => Ok(None),
        1 => Ok(rows.pop()),
        matches => {
            error!(
                resource_type,
                key,
                matches,
                "Lookup matched more than one row"
            );
            Err(FlixError::AmbiguousMatch {
                resource_type,
                key: key.to_string(),
                matches,
            })
        }
    }
}
