//! Movie entity.

use super::{Actor, Director, Genre};
use crate::{Entity, MovieId};
use serde::{Deserialize, Serialize};
use validator::Validate;

/// A movie in the catalogue.
///
/// `genres` and `actors` keep the order in which they were attached; adding a
/// genre or actor that is already present is a no-op.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Validate)]
pub struct Movie {
    /// Unique, immutable identifier.
    pub id: MovieId,

    #[validate(length(min = 1, max = 255))]
    pub title: String,

    #[validate(range(min = 1888, max = 2100))]
    pub release_year: i32,

    pub runtime_minutes: u32,

    pub description: Option<String>,

    /// Position in the source ranking, if any.
    pub rank: Option<u32>,

    pub director: Option<Director>,

    pub genres: Vec<Genre>,

    pub actors: Vec<Actor>,
}

impl Movie {
    /// Creates a movie with no director, genres, or actors.
    #[must_use]
    pub fn new(
        id: impl Into<MovieId>,
        title: impl Into<String>,
        release_year: i32,
        runtime_minutes: u32,
    ) -> Self {
        Self {
            id: id.into(),
            title: title.into(),
            release_year,
            runtime_minutes,
            description: None,
            rank: None,
            director: None,
            genres: Vec::new(),
            actors: Vec::new(),
        }
    }

    /// Sets the description.
    #[must_use]
    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    /// Sets the rank.
    #[must_use]
    pub fn with_rank(mut self, rank: u32) -> Self {
        self.rank = Some(rank);
        self
    }

    /// Sets the director.
    #[must_use]
    pub fn with_director(mut self, director: Director) -> Self {
        self.director = Some(director);
        self
    }

    /// Attaches a genre unless one with the same name is already attached.
    pub fn add_genre(&mut self, genre: Genre) {
        if !self.genres.iter().any(|g| g.name == genre.name) {
            self.genres.push(genre);
        }
    }

    /// Attaches an actor unless already credited.
    pub fn add_actor(&mut self, actor: Actor) {
        if !self.actors.iter().any(|a| a.id == actor.id) {
            self.actors.push(actor);
        }
    }
}

impl Entity for Movie {
    type Id = MovieId;

    fn id(&self) -> &MovieId {
        &self.id
    }
}
