//! Genre entity.

use crate::{Entity, GenreId};
use serde::{Deserialize, Serialize};

/// A movie genre. Names are unique across the catalogue.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Genre {
    pub id: GenreId,
    pub name: String,
}

impl Genre {
    /// Creates a genre.
    #[must_use]
    pub fn new(id: GenreId, name: impl Into<String>) -> Self {
        Self {
            id,
            name: name.into(),
        }
    }
}

impl Entity for Genre {
    type Id = GenreId;

    fn id(&self) -> &GenreId {
        &self.id
    }
}
