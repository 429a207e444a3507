//! Repository trait definitions.

use chrono::{DateTime, Utc};
use flix_core::{
    Actor, ActorId, Director, DirectorId, FlixResult, Genre, GenreId, Movie, MovieId, Review,
    ReviewId, User, UserId, Watchlist,
};
use async_trait::async_trait;

/// Storage-agnostic contract for the movie catalogue.
///
/// Lookups return `Ok(None)` when nothing matches; `Err` is reserved for
/// faults (storage errors, ambiguous matches, violated write invariants).
/// The attribute accessors are provided on top of the entity lookups and
/// may be overridden with narrower queries.
#[async_trait]
pub trait CatalogRepository: Send + Sync {
    // ----- Movies -----

    /// Stores a movie together with its director, genres and actors.
    async fn add_movie(&self, movie: &Movie) -> FlixResult<()>;

    /// Finds a movie by ID.
    async fn get_movie(&self, id: &MovieId) -> FlixResult<Option<Movie>>;

    /// Returns every movie in the order it was added.
    async fn get_movies(&self) -> FlixResult<Vec<Movie>>;

    // ----- Actors -----

    /// Stores an actor.
    async fn add_actor(&self, actor: &Actor) -> FlixResult<()>;

    /// Finds an actor by ID.
    async fn get_actor(&self, id: ActorId) -> FlixResult<Option<Actor>>;

    /// Returns every actor.
    async fn get_actors(&self) -> FlixResult<Vec<Actor>>;

    // ----- Directors -----

    /// Stores a director.
    async fn add_director(&self, director: &Director) -> FlixResult<()>;

    /// Finds a director by ID.
    async fn get_director(&self, id: DirectorId) -> FlixResult<Option<Director>>;

    /// Returns every director.
    async fn get_directors(&self) -> FlixResult<Vec<Director>>;

    // ----- Genres -----

    /// Stores a genre. A genre whose name is already stored collapses onto
    /// the stored row; a different name under a taken ID is a conflict.
    async fn add_genre(&self, genre: &Genre) -> FlixResult<()>;

    /// Finds a genre by ID.
    async fn get_genre(&self, id: GenreId) -> FlixResult<Option<Genre>>;

    /// Finds a genre by its unique name.
    async fn get_genre_by_name(&self, name: &str) -> FlixResult<Option<Genre>>;

    /// Returns every genre.
    async fn get_genres(&self) -> FlixResult<Vec<Genre>>;

    // ----- Reviews -----

    /// Stores a review. The reviewed movie (by title) and the user must exist.
    async fn add_review(&self, review: &Review) -> FlixResult<()>;

    /// Finds a review by ID.
    async fn get_review(&self, id: ReviewId) -> FlixResult<Option<Review>>;

    /// Returns every review.
    async fn get_reviews(&self) -> FlixResult<Vec<Review>>;

    // ----- Users -----

    /// Registers a user. Usernames are unique.
    async fn add_user(&self, user: &User) -> FlixResult<()>;

    /// Finds a user by username.
    async fn get_user(&self, username: &str) -> FlixResult<Option<User>>;

    /// Finds a user by ID.
    async fn get_user_by_id(&self, id: UserId) -> FlixResult<Option<User>>;

    /// Returns every registered user.
    async fn get_users(&self) -> FlixResult<Vec<User>>;

    /// Returns the reviews written by a user, or `None` for an unknown user.
    async fn get_user_reviews(&self, username: &str) -> FlixResult<Option<Vec<Review>>>;

    /// Returns the movies a user has watched, or `None` for an unknown user.
    async fn get_user_watched_movies(&self, username: &str) -> FlixResult<Option<Vec<Movie>>>;

    /// Records that a user watched a movie. Recording it twice is a no-op.
    async fn add_watched_movie(&self, user_id: UserId, movie_id: &MovieId) -> FlixResult<()>;

    // ----- Watchlists -----

    /// Stores a watchlist. The owner must exist and must not already own one.
    async fn add_watchlist(&self, watchlist: &Watchlist) -> FlixResult<()>;

    /// Returns the watchlist owned by a user.
    async fn get_watchlist(&self, user_id: UserId) -> FlixResult<Option<Watchlist>>;

    /// Returns every watchlist.
    async fn get_watchlists(&self) -> FlixResult<Vec<Watchlist>>;

    /// Appends a movie to a user's watchlist. Adding a present movie is a no-op.
    async fn add_movie_to_watchlist(&self, user_id: UserId, movie_id: &MovieId) -> FlixResult<()>;

    // ----- Movie attributes -----

    async fn get_movie_title(&self, id: &MovieId) -> FlixResult<Option<String>> {
        Ok(self.get_movie(id).await?.map(|m| m.title))
    }

    async fn get_movie_release_year(&self, id: &MovieId) -> FlixResult<Option<i32>> {
        Ok(self.get_movie(id).await?.map(|m| m.release_year))
    }

    async fn get_movie_runtime(&self, id: &MovieId) -> FlixResult<Option<u32>> {
        Ok(self.get_movie(id).await?.map(|m| m.runtime_minutes))
    }

    /// Returns the movie's director; `None` if the movie is unknown or has none.
    async fn get_movie_director(&self, id: &MovieId) -> FlixResult<Option<Director>> {
        Ok(self.get_movie(id).await?.and_then(|m| m.director))
    }

    async fn get_movie_genres(&self, id: &MovieId) -> FlixResult<Option<Vec<Genre>>> {
        Ok(self.get_movie(id).await?.map(|m| m.genres))
    }

    async fn get_movie_actors(&self, id: &MovieId) -> FlixResult<Option<Vec<Actor>>> {
        Ok(self.get_movie(id).await?.map(|m| m.actors))
    }

    async fn get_movie_description(&self, id: &MovieId) -> FlixResult<Option<String>> {
        Ok(self.get_movie(id).await?.and_then(|m| m.description))
    }

    async fn get_movie_rank(&self, id: &MovieId) -> FlixResult<Option<u32>> {
        Ok(self.get_movie(id).await?.and_then(|m| m.rank))
    }

    // ----- Actor attributes -----

    async fn get_actor_firstname(&self, id: ActorId) -> FlixResult<Option<String>> {
        Ok(self.get_actor(id).await?.map(|a| a.first_name))
    }

    async fn get_actor_middlenames(&self, id: ActorId) -> FlixResult<Option<String>> {
        Ok(self.get_actor(id).await?.and_then(|a| a.middle_names))
    }

    async fn get_actor_lastname(&self, id: ActorId) -> FlixResult<Option<String>> {
        Ok(self.get_actor(id).await?.and_then(|a| a.last_name))
    }

    // ----- Director attributes -----

    async fn get_director_firstname(&self, id: DirectorId) -> FlixResult<Option<String>> {
        Ok(self.get_director(id).await?.map(|d| d.first_name))
    }

    async fn get_director_lastname(&self, id: DirectorId) -> FlixResult<Option<String>> {
        Ok(self.get_director(id).await?.and_then(|d| d.last_name))
    }

    // ----- Review attributes -----

    async fn get_review_text(&self, id: ReviewId) -> FlixResult<Option<String>> {
        Ok(self.get_review(id).await?.map(|r| r.text))
    }

    async fn get_review_rating(&self, id: ReviewId) -> FlixResult<Option<u8>> {
        Ok(self.get_review(id).await?.map(|r| r.rating))
    }

    async fn get_review_movie_title(&self, id: ReviewId) -> FlixResult<Option<String>> {
        Ok(self.get_review(id).await?.map(|r| r.movie_title))
    }

    async fn get_review_timestamp(&self, id: ReviewId) -> FlixResult<Option<DateTime<Utc>>> {
        Ok(self.get_review(id).await?.map(|r| r.timestamp))
    }

    // ----- User attributes -----

    async fn get_user_firstname(&self, id: UserId) -> FlixResult<Option<String>> {
        Ok(self.get_user_by_id(id).await?.map(|u| u.first_name))
    }

    async fn get_user_lastname(&self, id: UserId) -> FlixResult<Option<String>> {
        Ok(self.get_user_by_id(id).await?.map(|u| u.last_name))
    }

    /// Returns the stored password hash.
    async fn get_user_password(&self, username: &str) -> FlixResult<Option<String>> {
        Ok(self.get_user(username).await?.map(|u| u.password_hash))
    }

    async fn get_user_id(&self, username: &str) -> FlixResult<Option<UserId>> {
        Ok(self.get_user(username).await?.map(|u| u.id))
    }

    async fn get_user_age(&self, username: &str) -> FlixResult<Option<u32>> {
        Ok(self.get_user(username).await?.and_then(|u| u.age))
    }

    async fn get_user_email(&self, username: &str) -> FlixResult<Option<String>> {
        Ok(self.get_user(username).await?.map(|u| u.email))
    }

    async fn get_user_consent(&self, username: &str) -> FlixResult<Option<bool>> {
        Ok(self.get_user(username).await?.map(|u| u.consent))
    }
}
