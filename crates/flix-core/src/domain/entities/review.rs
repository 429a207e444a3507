//! Review entity.

use crate::{Entity, ReviewId, UserId};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use validator::Validate;

/// A user's review of a movie.
///
/// The movie is referenced by title; it must exist when the review is stored.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Validate)]
pub struct Review {
    pub id: ReviewId,

    #[validate(length(min = 1, max = 255))]
    pub movie_title: String,

    pub user_id: UserId,

    #[validate(length(min = 1, max = 4096))]
    pub text: String,

    /// Rating from 1 to 10.
    #[validate(range(min = 1, max = 10))]
    pub rating: u8,

    pub timestamp: DateTime<Utc>,
}

impl Review {
    /// Creates a review stamped with the current time.
    #[must_use]
    pub fn new(
        id: ReviewId,
        movie_title: impl Into<String>,
        user_id: UserId,
        text: impl Into<String>,
        rating: u8,
    ) -> Self {
        Self {
            id,
            movie_title: movie_title.into(),
            user_id,
            text: text.into(),
            rating,
            timestamp: Utc::now(),
        }
    }

    /// Overrides the creation timestamp.
    #[must_use]
    pub fn with_timestamp(mut self, timestamp: DateTime<Utc>) -> Self {
        self.timestamp = timestamp;
        self
    }
}

impl Entity for Review {
    type Id = ReviewId;

    fn id(&self) -> &ReviewId {
        &self.id
    }
}
