//! In-memory catalogue repository.

use crate::CatalogRepository;
use async_trait::async_trait;
use flix_core::{
    find_by_id, Actor, ActorId, Director, DirectorId, FlixError, FlixResult, Genre, GenreId,
    Movie, MovieId, Review, ReviewId, User, UserId, ValidateExt, Watchlist,
};
use parking_lot::RwLock;
use std::collections::HashMap;
use tracing::debug;

#[derive(Debug, Default)]
struct CatalogStore {
    movies: Vec<Movie>,
    actors: Vec<Actor>,
    directors: Vec<Director>,
    genres: Vec<Genre>,
    reviews: Vec<Review>,
    users: Vec<User>,
    watchlists: Vec<Watchlist>,
    /// Movies watched per user, in viewing order.
    watched: HashMap<UserId, Vec<MovieId>>,
    movie_index: HashMap<MovieId, usize>,
    username_index: HashMap<String, usize>,
}

impl CatalogStore {
    fn movie(&self, id: &MovieId) -> Option<&Movie> {
        self.movie_index.get(id).map(|&i| &self.movies[i])
    }

    fn user(&self, username: &str) -> Option<&User> {
        self.username_index.get(username).map(|&i| &self.users[i])
    }

    fn require_user(&self, id: UserId) -> FlixResult<&User> {
        find_by_id(&self.users, &id).ok_or_else(|| FlixError::not_found("user", id))
    }

    fn require_movie(&self, id: &MovieId) -> FlixResult<&Movie> {
        self.movie(id).ok_or_else(|| FlixError::not_found("movie", id))
    }

    fn genre_by_name(&self, name: &str) -> Option<&Genre> {
        self.genres.iter().find(|g| g.name == name)
    }

    /// Returns the stored genre for `genre`, or `None` if it would be new.
    fn resolve_genre(&self, genre: &Genre) -> FlixResult<Option<Genre>> {
        if let Some(stored) = self.genre_by_name(&genre.name) {
            return Ok(Some(stored.clone()));
        }
        if let Some(taken) = find_by_id(&self.genres, &genre.id) {
            return Err(FlixError::conflict(format!(
                "Genre id {} is already used by '{}'",
                genre.id, taken.name
            )));
        }
        Ok(None)
    }

    /// Rejects a genre list in which a new genre reuses the ID of a stored
    /// genre or of an earlier genre in the same list under another name.
    fn check_new_genres(&self, genres: &[Genre]) -> FlixResult<()> {
        let mut accepted: Vec<&Genre> = Vec::new();
        for genre in genres {
            if self.resolve_genre(genre)?.is_some() {
                continue;
            }
            if let Some(taken) = accepted.iter().find(|g| g.id == genre.id && g.name != genre.name) {
                return Err(FlixError::conflict(format!(
                    "Genre id {} is already used by '{}'",
                    genre.id, taken.name
                )));
            }
            accepted.push(genre);
        }
        Ok(())
    }

    /// Stores the director unless its ID is taken; returns the stored row.
    fn insert_director(&mut self, director: &Director) -> Director {
        if let Some(stored) = find_by_id(&self.directors, &director.id) {
            return stored.clone();
        }
        self.directors.push(director.clone());
        director.clone()
    }

    /// Stores the actor unless its ID is taken; returns the stored row.
    fn insert_actor(&mut self, actor: &Actor) -> Actor {
        if let Some(stored) = find_by_id(&self.actors, &actor.id) {
            return stored.clone();
        }
        self.actors.push(actor.clone());
        actor.clone()
    }

    fn insert_genre(&mut self, genre: Genre) -> Genre {
        match self.genre_by_name(&genre.name) {
            Some(stored) => stored.clone(),
            None => {
                self.genres.push(genre.clone());
                genre
            }
        }
    }
}

/// Catalogue repository that keeps everything in process memory.
///
/// Entities are kept in insertion order. The lock is held only for the
/// duration of a single operation.
#[derive(Debug, Default)]
pub struct InMemoryCatalogRepository {
    store: RwLock<CatalogStore>,
}

impl InMemoryCatalogRepository {
    /// Creates an empty repository.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl CatalogRepository for InMemoryCatalogRepository {
    async fn add_movie(&self, movie: &Movie) -> FlixResult<()> {
        debug!("Adding movie: {}", movie.id);
        movie.validate_entity()?;

        let mut store = self.store.write();
        if store.movie_index.contains_key(&movie.id) {
            return Err(FlixError::conflict(format!("Movie {} already exists", movie.id)));
        }
        store.check_new_genres(&movie.genres)?;

        let mut stored = movie.clone();
        stored.genres = movie
            .genres
            .iter()
            .map(|genre| store.insert_genre(genre.clone()))
            .collect();

        stored.director = movie
            .director
            .as_ref()
            .map(|director| store.insert_director(director));
        stored.actors = movie
            .actors
            .iter()
            .map(|actor| store.insert_actor(actor))
            .collect();

        let index = store.movies.len();
        store.movie_index.insert(stored.id.clone(), index);
        store.movies.push(stored);
        Ok(())
    }

    async fn get_movie(&self, id: &MovieId) -> FlixResult<Option<Movie>> {
        Ok(self.store.read().movie(id).cloned())
    }

    async fn get_movies(&self) -> FlixResult<Vec<Movie>> {
        Ok(self.store.read().movies.clone())
    }

    async fn add_actor(&self, actor: &Actor) -> FlixResult<()> {
        let mut store = self.store.write();
        if find_by_id(&store.actors, &actor.id).is_some() {
            return Err(FlixError::conflict(format!("Actor {} already exists", actor.id)));
        }
        store.actors.push(actor.clone());
        Ok(())
    }

    async fn get_actor(&self, id: ActorId) -> FlixResult<Option<Actor>> {
        Ok(find_by_id(&self.store.read().actors, &id).cloned())
    }

    async fn get_actors(&self) -> FlixResult<Vec<Actor>> {
        Ok(self.store.read().actors.clone())
    }

    async fn add_director(&self, director: &Director) -> FlixResult<()> {
        let mut store = self.store.write();
        if find_by_id(&store.directors, &director.id).is_some() {
            return Err(FlixError::conflict(format!(
                "Director {} already exists",
                director.id
            )));
        }
        store.directors.push(director.clone());
        Ok(())
    }

    async fn get_director(&self, id: DirectorId) -> FlixResult<Option<Director>> {
        Ok(find_by_id(&self.store.read().directors, &id).cloned())
    }

    async fn get_directors(&self) -> FlixResult<Vec<Director>> {
        Ok(self.store.read().directors.clone())
    }

    async fn add_genre(&self, genre: &Genre) -> FlixResult<()> {
        let mut store = self.store.write();
        if store.resolve_genre(genre)?.is_some() {
            debug!("Genre '{}' already stored", genre.name);
            return Ok(());
        }
        store.genres.push(genre.clone());
        Ok(())
    }

    async fn get_genre(&self, id: GenreId) -> FlixResult<Option<Genre>> {
        Ok(find_by_id(&self.store.read().genres, &id).cloned())
    }

    async fn get_genre_by_name(&self, name: &str) -> FlixResult<Option<Genre>> {
        Ok(self.store.read().genre_by_name(name).cloned())
    }

    async fn get_genres(&self) -> FlixResult<Vec<Genre>> {
        Ok(self.store.read().genres.clone())
    }

    async fn add_review(&self, review: &Review) -> FlixResult<()> {
        debug!("Adding review {} for '{}'", review.id, review.movie_title);
        review.validate_entity()?;

        let mut store = self.store.write();
        store.require_user(review.user_id)?;
        if !store.movies.iter().any(|m| m.title == review.movie_title) {
            return Err(FlixError::not_found("movie", &review.movie_title));
        }
        if find_by_id(&store.reviews, &review.id).is_some() {
            return Err(FlixError::conflict(format!("Review {} already exists", review.id)));
        }
        store.reviews.push(review.clone());
        Ok(())
    }

    async fn get_review(&self, id: ReviewId) -> FlixResult<Option<Review>> {
        Ok(find_by_id(&self.store.read().reviews, &id).cloned())
    }

    async fn get_reviews(&self) -> FlixResult<Vec<Review>> {
        Ok(self.store.read().reviews.clone())
    }

    async fn add_user(&self, user: &User) -> FlixResult<()> {
        debug!("Adding user: {}", user.username);
        user.validate_entity()?;

        let mut store = self.store.write();
        if store.username_index.contains_key(&user.username) {
            return Err(FlixError::conflict(format!(
                "Username '{}' is already taken",
                user.username
            )));
        }
        if find_by_id(&store.users, &user.id).is_some() {
            return Err(FlixError::conflict(format!("User {} already exists", user.id)));
        }

        let index = store.users.len();
        store.username_index.insert(user.username.clone(), index);
        store.users.push(user.clone());
        Ok(())
    }

    async fn get_user(&self, username: &str) -> FlixResult<Option<User>> {
        Ok(self.store.read().user(username).cloned())
    }

    async fn get_user_by_id(&self, id: UserId) -> FlixResult<Option<User>> {
        Ok(find_by_id(&self.store.read().users, &id).cloned())
    }

    async fn get_users(&self) -> FlixResult<Vec<User>> {
        Ok(self.store.read().users.clone())
    }

    async fn get_user_reviews(&self, username: &str) -> FlixResult<Option<Vec<Review>>> {
        let store = self.store.read();
        Ok(store.user(username).map(|user| {
            store
                .reviews
                .iter()
                .filter(|r| r.user_id == user.id)
                .cloned()
                .collect()
        }))
    }

    async fn get_user_watched_movies(&self, username: &str) -> FlixResult<Option<Vec<Movie>>> {
        let store = self.store.read();
        Ok(store.user(username).map(|user| {
            store
                .watched
                .get(&user.id)
                .into_iter()
                .flatten()
                .filter_map(|id| store.movie(id).cloned())
                .collect()
        }))
    }

    async fn add_watched_movie(&self, user_id: UserId, movie_id: &MovieId) -> FlixResult<()> {
        let mut store = self.store.write();
        store.require_user(user_id)?;
        store.require_movie(movie_id)?;

        let watched = store.watched.entry(user_id).or_default();
        if !watched.contains(movie_id) {
            watched.push(movie_id.clone());
        }
        Ok(())
    }

    async fn add_watchlist(&self, watchlist: &Watchlist) -> FlixResult<()> {
        let mut store = self.store.write();
        store.require_user(watchlist.user_id)?;
        if store.watchlists.iter().any(|w| w.user_id == watchlist.user_id) {
            return Err(FlixError::conflict(format!(
                "User {} already owns a watchlist",
                watchlist.user_id
            )));
        }
        if find_by_id(&store.watchlists, &watchlist.id).is_some() {
            return Err(FlixError::conflict(format!(
                "Watchlist {} already exists",
                watchlist.id
            )));
        }
        for movie in &watchlist.movies {
            store.require_movie(&movie.id)?;
        }

        store.watchlists.push(watchlist.clone());
        Ok(())
    }

    async fn get_watchlist(&self, user_id: UserId) -> FlixResult<Option<Watchlist>> {
        Ok(self
            .store
            .read()
            .watchlists
            .iter()
            .find(|w| w.user_id == user_id)
            .cloned())
    }

    async fn get_watchlists(&self) -> FlixResult<Vec<Watchlist>> {
        Ok(self.store.read().watchlists.clone())
    }

    async fn add_movie_to_watchlist(&self, user_id: UserId, movie_id: &MovieId) -> FlixResult<()> {
        let mut store = self.store.write();
        let movie = store.require_movie(movie_id)?.clone();
        let watchlist = store
            .watchlists
            .iter_mut()
            .find(|w| w.user_id == user_id)
            .ok_or_else(|| FlixError::not_found("watchlist", user_id))?;

        if !watchlist.add_movie(movie) {
            debug!("Movie {} already on watchlist of user {}", movie_id, user_id);
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use flix_core::WatchlistId;

    fn inception() -> Movie {
        let mut movie = Movie::new("m1", "Inception", 2010, 148)
            .with_director(Director::new(DirectorId::new(1), "Christopher", Some("Nolan".into())));
        movie.add_genre(Genre::new(GenreId::new(1), "Sci-Fi"));
        movie.add_actor(Actor::new(ActorId::new(1), "Leonardo", None, Some("DiCaprio".into())));
        movie
    }

    #[tokio::test]
    async fn test_add_movie_registers_backrefs() {
        let repo = InMemoryCatalogRepository::new();
        repo.add_movie(&inception()).await.unwrap();

        assert_eq!(repo.get_directors().await.unwrap().len(), 1);
        assert_eq!(repo.get_actors().await.unwrap().len(), 1);
        assert!(repo.get_genre_by_name("Sci-Fi").await.unwrap().is_some());
    }

    #[tokio::test]
    async fn test_movie_genres_resolve_to_stored_rows() {
        let repo = InMemoryCatalogRepository::new();
        repo.add_genre(&Genre::new(GenreId::new(7), "Sci-Fi")).await.unwrap();
        repo.add_movie(&inception()).await.unwrap();

        let movie = repo.get_movie(&MovieId::new("m1")).await.unwrap().unwrap();
        assert_eq!(movie.genres, vec![Genre::new(GenreId::new(7), "Sci-Fi")]);
        assert_eq!(repo.get_genres().await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_duplicate_movie_leaves_store_untouched() {
        let repo = InMemoryCatalogRepository::new();
        repo.add_movie(&inception()).await.unwrap();

        let err = repo.add_movie(&inception()).await.unwrap_err();
        assert!(matches!(err, FlixError::Conflict(_)));
        assert_eq!(repo.get_movies().await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_watched_movie_requires_user() {
        let repo = InMemoryCatalogRepository::new();
        repo.add_movie(&inception()).await.unwrap();

        let err = repo
            .add_watched_movie(UserId::new(9), &MovieId::new("m1"))
            .await
            .unwrap_err();
        assert!(matches!(err, FlixError::NotFound { resource_type: "user", .. }));
    }

    #[tokio::test]
    async fn test_watchlist_with_unknown_movie_is_rejected() {
        let repo = InMemoryCatalogRepository::new();
        repo.add_user(&User::new(UserId::new(1), "alice", "hash", "alice@example.com"))
            .await
            .unwrap();

        let mut watchlist = Watchlist::new(WatchlistId::new(1), UserId::new(1));
        watchlist.add_movie(inception());

        assert!(repo.add_watchlist(&watchlist).await.is_err());
        assert!(repo.get_watchlist(UserId::new(1)).await.unwrap().is_none());
    }
}
