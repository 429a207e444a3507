//! Database row representations and their conversion to entities.
//!
//! Field names follow the column names of the table mapping.

use chrono::{DateTime, Utc};
use flix_core::{
    Actor, ActorId, Director, DirectorId, FlixError, Genre, GenreId, Movie, MovieId, Review,
    ReviewId, User, UserId, WatchlistId,
};
use sqlx::FromRow;

pub(crate) fn to_u32(value: i64, column: &str) -> Result<u32, FlixError> {
    u32::try_from(value)
        .map_err(|_| FlixError::Database(format!("Column '{}' holds out-of-range value {}", column, value)))
}

#[derive(Debug, FromRow)]
pub(crate) struct DirectorRow {
    id: i64,
    first_name: String,
    last_name: Option<String>,
}

impl From<DirectorRow> for Director {
    fn from(row: DirectorRow) -> Self {
        Director::new(DirectorId::new(row.id), row.first_name, row.last_name)
    }
}

#[derive(Debug, FromRow)]
pub(crate) struct ActorRow {
    id: i64,
    first_name: String,
    middle_names: Option<String>,
    last_name: Option<String>,
}

impl From<ActorRow> for Actor {
    fn from(row: ActorRow) -> Self {
        Actor::new(ActorId::new(row.id), row.first_name, row.middle_names, row.last_name)
    }
}

#[derive(Debug, FromRow)]
pub(crate) struct GenreRow {
    id: i64,
    name: String,
}

impl From<GenreRow> for Genre {
    fn from(row: GenreRow) -> Self {
        Genre::new(GenreId::new(row.id), row.name)
    }
}

/// Scalar columns of a movie; relationships are loaded separately.
#[derive(Debug, FromRow)]
pub(crate) struct MovieRow {
    pub(crate) id: String,
    title: String,
    year: i64,
    runtime: i64,
    description: Option<String>,
    ranking: Option<i64>,
    pub(crate) director_id: Option<i64>,
}

impl TryFrom<MovieRow> for Movie {
    type Error = FlixError;

    fn try_from(row: MovieRow) -> Result<Self, Self::Error> {
        let year = i32::try_from(row.year)
            .map_err(|_| FlixError::Database(format!("Column 'year' holds out-of-range value {}", row.year)))?;
        let mut movie = Movie::new(MovieId::new(row.id), row.title, year, to_u32(row.runtime, "runtime")?);
        movie.description = row.description;
        movie.rank = row.ranking.map(|r| to_u32(r, "ranking")).transpose()?;
        Ok(movie)
    }
}

#[derive(Debug, FromRow)]
pub(crate) struct UserRow {
    id: i64,
    first_name: String,
    last_name: String,
    username: String,
    password: String,
    email: String,
    age: Option<i64>,
    consent: bool,
}

impl TryFrom<UserRow> for User {
    type Error = FlixError;

    fn try_from(row: UserRow) -> Result<Self, Self::Error> {
        Ok(User {
            id: UserId::new(row.id),
            first_name: row.first_name,
            last_name: row.last_name,
            username: row.username,
            password_hash: row.password,
            email: row.email,
            age: row.age.map(|a| to_u32(a, "age")).transpose()?,
            consent: row.consent,
        })
    }
}

#[derive(Debug, FromRow)]
pub(crate) struct ReviewRow {
    id: i64,
    movie_title: String,
    user_id: i64,
    review_text: String,
    rating: i64,
    created_at: DateTime<Utc>,
}

impl TryFrom<ReviewRow> for Review {
    type Error = FlixError;

    fn try_from(row: ReviewRow) -> Result<Self, Self::Error> {
        let rating = u8::try_from(row.rating)
            .map_err(|_| FlixError::Database(format!("Column 'rating' holds out-of-range value {}", row.rating)))?;

        Ok(Review::new(
            ReviewId::new(row.id),
            row.movie_title,
            UserId::new(row.user_id),
            row.review_text,
            rating,
        )
        .with_timestamp(row.created_at))
    }
}

#[derive(Debug, FromRow)]
pub(crate) struct WatchlistRow {
    pub(crate) id: i64,
    pub(crate) user_id: i64,
}

impl WatchlistRow {
    pub(crate) fn ids(&self) -> (WatchlistId, UserId) {
        (WatchlistId::new(self.id), UserId::new(self.user_id))
    }
}
