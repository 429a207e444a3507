//! Director entity.

use crate::{DirectorId, Entity};
use serde::{Deserialize, Serialize};

/// A movie director. Referenced by zero or more movies.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Director {
    pub id: DirectorId,
    pub first_name: String,
    pub last_name: Option<String>,
}

impl Director {
    /// Creates a director.
    #[must_use]
    pub fn new(id: DirectorId, first_name: impl Into<String>, last_name: Option<String>) -> Self {
        Self {
            id,
            first_name: first_name.into(),
            last_name,
        }
    }

    /// Returns the director's full name.
    #[must_use]
    pub fn full_name(&self) -> String {
        match &self.last_name {
            Some(last) => format!("{} {}", self.first_name, last),
            None => self.first_name.clone(),
        }
    }
}

impl Entity for Director {
    type Id = DirectorId;

    fn id(&self) -> &DirectorId {
        &self.id
    }
}
