//! Actor entity.

use crate::{ActorId, Entity};
use serde::{Deserialize, Serialize};

/// An actor credited in one or more movies.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Actor {
    pub id: ActorId,
    pub first_name: String,
    pub middle_names: Option<String>,
    pub last_name: Option<String>,
}

impl Actor {
    /// Creates an actor.
    #[must_use]
    pub fn new(
        id: ActorId,
        first_name: impl Into<String>,
        middle_names: Option<String>,
        last_name: Option<String>,
    ) -> Self {
        Self {
            id,
            first_name: first_name.into(),
            middle_names,
            last_name,
        }
    }

    /// Returns the actor's full name.
    #[must_use]
    pub fn full_name(&self) -> String {
        [
            Some(self.first_name.as_str()),
            self.middle_names.as_deref(),
            self.last_name.as_deref(),
        ]
        .into_iter()
        .flatten()
        .collect::<Vec<_>>()
        .join(" ")
    }
}

impl Entity for Actor {
    type Id = ActorId;

    fn id(&self) -> &ActorId {
        &self.id
    }
}
