//! Watchlist entity.

use super::Movie;
use crate::{Entity, MovieId, UserId, WatchlistId};
use serde::{Deserialize, Serialize};

/// A user's watchlist: a set of movies kept in insertion order.
///
/// Each user owns at most one watchlist.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Watchlist {
    pub id: WatchlistId,
    pub user_id: UserId,
    pub movies: Vec<Movie>,
}

impl Watchlist {
    /// Creates an empty watchlist owned by `user_id`.
    #[must_use]
    pub fn new(id: WatchlistId, user_id: UserId) -> Self {
        Self {
            id,
            user_id,
            movies: Vec::new(),
        }
    }

    /// Returns true if the movie is on the watchlist.
    #[must_use]
    pub fn contains(&self, movie_id: &MovieId) -> bool {
        self.movies.iter().any(|m| &m.id == movie_id)
    }

    /// Appends a movie; returns false if it was already present.
    pub fn add_movie(&mut self, movie: Movie) -> bool {
        if self.contains(&movie.id) {
            return false;
        }
        self.movies.push(movie);
        true
    }

    /// Number of movies on the watchlist.
    #[must_use]
    pub fn size(&self) -> usize {
        self.movies.len()
    }
}

impl Entity for Watchlist {
    type Id = WatchlistId;

    fn id(&self) -> &WatchlistId {
        &self.id
    }
}
