//! Common test infrastructure for repository integration tests.
//!
//! The `check_*` functions exercise the repository contract and are run
//! against every implementation.

#![allow(dead_code)]

use chrono::{TimeZone, Utc};
use flix_config::DatabaseConfig;
use flix_core::{
    Actor, ActorId, Director, DirectorId, FlixError, Genre, GenreId, Movie, MovieId, Review,
    ReviewId, User, UserId, Watchlist, WatchlistId,
};
use flix_repository::{
    CatalogRepository, DatabasePool, MappingRegistry, SchemaManager, SqlCatalogRepository,
    CATALOGUE_MAPPING,
};
use std::path::PathBuf;

/// In-memory SQLite database with the catalogue schema created.
pub struct TestDatabase {
    pool: DatabasePool,
    registry: MappingRegistry,
    schema: SchemaManager,
}

impl TestDatabase {
    pub async fn new() -> Self {
        let pool = DatabasePool::new(&DatabaseConfig::in_memory())
            .await
            .expect("Failed to open in-memory database");

        let registry = MappingRegistry::new();
        let mapping = registry.register().expect("Failed to register mapping");

        let schema = SchemaManager::new(&pool, mapping);
        schema.create_all().await.expect("Failed to create schema");

        Self {
            pool,
            registry,
            schema,
        }
    }

    pub fn pool(&self) -> &DatabasePool {
        &self.pool
    }

    pub fn schema(&self) -> &SchemaManager {
        &self.schema
    }

    pub fn repository(&self) -> SqlCatalogRepository {
        SqlCatalogRepository::new(&self.pool, &self.registry).expect("Failed to build repository")
    }
}

/// Path of the sample data file.
pub fn fixture_path() -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("tests/fixtures/movies.csv")
}

/// Facts about the sample data file.
pub const FIXTURE_MOVIES: usize = 6;
pub const FIXTURE_DIRECTORS: usize = 5;
pub const FIXTURE_GENRES: usize = 11;
pub const FIXTURE_ACTORS: usize = 23;

pub fn nolan() -> Director {
    Director::new(DirectorId::new(1), "Christopher", Some("Nolan".to_string()))
}

pub fn inception() -> Movie {
    let mut movie = Movie::new("m1", "Inception", 2010, 148)
        .with_rank(1)
        .with_description("A thief steals corporate secrets through dream-sharing.")
        .with_director(nolan());
    movie.add_genre(Genre::new(GenreId::new(1), "Action"));
    movie.add_genre(Genre::new(GenreId::new(2), "Sci-Fi"));
    movie.add_actor(Actor::new(ActorId::new(1), "Leonardo", None, Some("DiCaprio".to_string())));
    movie.add_actor(Actor::new(
        ActorId::new(2),
        "Joseph",
        Some("Gordon".to_string()),
        Some("Levitt".to_string()),
    ));
    movie
}

pub fn interstellar() -> Movie {
    let mut movie = Movie::new("m2", "Interstellar", 2014, 169).with_director(nolan());
    movie.add_genre(Genre::new(GenreId::new(2), "Sci-Fi"));
    movie
}

pub fn heat() -> Movie {
    Movie::new("m3", "Heat", 1995, 170)
}

pub fn alice() -> User {
    User::new(UserId::new(1), "alice", "$argon2id$hash", "alice@example.com")
        .with_names("Alice", "Liddell")
        .with_age(30)
        .with_consent(true)
}

pub fn review_of(id: i64, title: &str, user_id: UserId, rating: u8) -> Review {
    Review::new(ReviewId::new(id), title, user_id, "Worth watching.", rating)
        .with_timestamp(Utc.with_ymd_and_hms(2024, 3, 1, 12, 30, 0).unwrap())
}

pub async fn check_movie_round_trip(repo: &dyn CatalogRepository) {
    let movie = inception();
    repo.add_movie(&movie).await.expect("Failed to add movie");

    let found = repo
        .get_movie(&movie.id)
        .await
        .expect("Query failed")
        .expect("Movie not found");
    assert_eq!(found, movie);
    assert_eq!(repo.get_movies().await.unwrap(), vec![movie]);
}

pub async fn check_movie_backrefs(repo: &dyn CatalogRepository) {
    repo.add_movie(&inception()).await.unwrap();
    repo.add_movie(&interstellar()).await.unwrap();

    assert_eq!(repo.get_directors().await.unwrap(), vec![nolan()]);
    assert_eq!(repo.get_actors().await.unwrap().len(), 2);
    assert_eq!(repo.get_genres().await.unwrap().len(), 2);
    assert_eq!(
        repo.get_actor(ActorId::new(2)).await.unwrap().map(|a| a.full_name()),
        Some("Joseph Gordon Levitt".to_string())
    );
}

pub async fn check_entity_round_trips(repo: &dyn CatalogRepository) {
    let actor = Actor::new(ActorId::new(10), "Cher", None, None);
    repo.add_actor(&actor).await.unwrap();
    assert_eq!(repo.get_actor(actor.id).await.unwrap(), Some(actor));

    let director = Director::new(DirectorId::new(10), "Ava", Some("DuVernay".to_string()));
    repo.add_director(&director).await.unwrap();
    assert_eq!(repo.get_director(director.id).await.unwrap(), Some(director));

    let genre = Genre::new(GenreId::new(10), "Western");
    repo.add_genre(&genre).await.unwrap();
    assert_eq!(repo.get_genre(genre.id).await.unwrap(), Some(genre.clone()));
    assert_eq!(repo.get_genre_by_name("Western").await.unwrap(), Some(genre));

    let user = alice();
    repo.add_user(&user).await.unwrap();
    assert_eq!(repo.get_user("alice").await.unwrap(), Some(user.clone()));
    assert_eq!(repo.get_user_by_id(user.id).await.unwrap(), Some(user.clone()));
    assert_eq!(repo.get_users().await.unwrap(), vec![user.clone()]);

    repo.add_movie(&heat()).await.unwrap();
    let review = review_of(1, "Heat", user.id, 9);
    repo.add_review(&review).await.unwrap();
    assert_eq!(repo.get_review(review.id).await.unwrap(), Some(review.clone()));
    assert_eq!(repo.get_reviews().await.unwrap(), vec![review]);
}

pub async fn check_unknown_ids_are_none(repo: &dyn CatalogRepository) {
    assert!(repo.get_movie(&MovieId::new("m404")).await.unwrap().is_none());
    assert!(repo.get_actor(ActorId::new(404)).await.unwrap().is_none());
    assert!(repo.get_director(DirectorId::new(404)).await.unwrap().is_none());
    assert!(repo.get_genre(GenreId::new(404)).await.unwrap().is_none());
    assert!(repo.get_genre_by_name("Nope").await.unwrap().is_none());
    assert!(repo.get_review(ReviewId::new(404)).await.unwrap().is_none());
    assert!(repo.get_user("nouser").await.unwrap().is_none());
    assert!(repo.get_user_by_id(UserId::new(404)).await.unwrap().is_none());
    assert!(repo.get_user_reviews("nouser").await.unwrap().is_none());
    assert!(repo.get_user_watched_movies("nouser").await.unwrap().is_none());
    assert!(repo.get_watchlist(UserId::new(404)).await.unwrap().is_none());
    assert!(repo.get_movie_title(&MovieId::new("m404")).await.unwrap().is_none());
    assert!(repo.get_user_password("nouser").await.unwrap().is_none());
    assert!(repo.get_user_id("nouser").await.unwrap().is_none());
}

pub async fn check_genre_names_collapse(repo: &dyn CatalogRepository) {
    repo.add_genre(&Genre::new(GenreId::new(1), "Drama")).await.unwrap();
    repo.add_genre(&Genre::new(GenreId::new(2), "Drama")).await.unwrap();

    let genres = repo.get_genres().await.unwrap();
    assert_eq!(genres, vec![Genre::new(GenreId::new(1), "Drama")]);
    assert!(repo.get_genre(GenreId::new(2)).await.unwrap().is_none());

    let err = repo
        .add_genre(&Genre::new(GenreId::new(1), "Comedy"))
        .await
        .unwrap_err();
    assert!(matches!(err, FlixError::Conflict(_)));
}

pub async fn check_inception_scenario(repo: &dyn CatalogRepository) {
    repo.add_movie(&Movie::new("m1", "Inception", 2010, 148)).await.unwrap();

    let id = MovieId::new("m1");
    assert_eq!(repo.get_movie_title(&id).await.unwrap().as_deref(), Some("Inception"));
    assert_eq!(repo.get_movie_runtime(&id).await.unwrap(), Some(148));
    assert_eq!(repo.get_movie_release_year(&id).await.unwrap(), Some(2010));
    assert_eq!(repo.get_movie_director(&id).await.unwrap(), None);
    assert_eq!(repo.get_movie_genres(&id).await.unwrap(), Some(vec![]));
    assert!(repo.get_user("nouser").await.unwrap().is_none());
}

pub async fn check_attribute_accessors(repo: &dyn CatalogRepository) {
    let movie = inception();
    repo.add_movie(&movie).await.unwrap();
    let user = alice();
    repo.add_user(&user).await.unwrap();
    let review = review_of(5, "Inception", user.id, 8);
    repo.add_review(&review).await.unwrap();

    assert_eq!(repo.get_movie_rank(&movie.id).await.unwrap(), Some(1));
    assert_eq!(repo.get_movie_description(&movie.id).await.unwrap(), movie.description);
    assert_eq!(repo.get_movie_director(&movie.id).await.unwrap(), Some(nolan()));
    assert_eq!(repo.get_movie_actors(&movie.id).await.unwrap(), Some(movie.actors.clone()));

    let joseph = ActorId::new(2);
    assert_eq!(repo.get_actor_firstname(joseph).await.unwrap().as_deref(), Some("Joseph"));
    assert_eq!(repo.get_actor_middlenames(joseph).await.unwrap().as_deref(), Some("Gordon"));
    assert_eq!(repo.get_actor_lastname(joseph).await.unwrap().as_deref(), Some("Levitt"));
    assert_eq!(
        repo.get_director_firstname(DirectorId::new(1)).await.unwrap().as_deref(),
        Some("Christopher")
    );
    assert_eq!(
        repo.get_director_lastname(DirectorId::new(1)).await.unwrap().as_deref(),
        Some("Nolan")
    );

    assert_eq!(repo.get_review_text(review.id).await.unwrap(), Some(review.text.clone()));
    assert_eq!(repo.get_review_rating(review.id).await.unwrap(), Some(8));
    assert_eq!(
        repo.get_review_movie_title(review.id).await.unwrap().as_deref(),
        Some("Inception")
    );
    assert_eq!(repo.get_review_timestamp(review.id).await.unwrap(), Some(review.timestamp));

    assert_eq!(repo.get_user_firstname(user.id).await.unwrap().as_deref(), Some("Alice"));
    assert_eq!(repo.get_user_lastname(user.id).await.unwrap().as_deref(), Some("Liddell"));
    assert_eq!(repo.get_user_password("alice").await.unwrap(), Some(user.password_hash.clone()));
    assert_eq!(repo.get_user_id("alice").await.unwrap(), Some(user.id));
    assert_eq!(repo.get_user_age("alice").await.unwrap(), Some(30));
    assert_eq!(
        repo.get_user_email("alice").await.unwrap().as_deref(),
        Some("alice@example.com")
    );
    assert_eq!(repo.get_user_consent("alice").await.unwrap(), Some(true));
}

pub async fn check_user_reviews(repo: &dyn CatalogRepository) {
    repo.add_movie(&inception()).await.unwrap();
    repo.add_movie(&heat()).await.unwrap();
    repo.add_user(&alice()).await.unwrap();
    let bob = User::new(UserId::new(2), "bob", "hash", "bob@example.com");
    repo.add_user(&bob).await.unwrap();

    repo.add_review(&review_of(1, "Inception", UserId::new(1), 9)).await.unwrap();
    repo.add_review(&review_of(2, "Heat", UserId::new(2), 6)).await.unwrap();
    repo.add_review(&review_of(3, "Heat", UserId::new(1), 7)).await.unwrap();

    let reviews = repo.get_user_reviews("alice").await.unwrap().unwrap();
    let ids: Vec<ReviewId> = reviews.iter().map(|r| r.id).collect();
    assert_eq!(ids, vec![ReviewId::new(1), ReviewId::new(3)]);

    assert_eq!(repo.get_user_reviews("bob").await.unwrap().unwrap().len(), 1);
}

pub async fn check_review_requires_movie_and_user(repo: &dyn CatalogRepository) {
    repo.add_movie(&heat()).await.unwrap();
    repo.add_user(&alice()).await.unwrap();

    let err = repo
        .add_review(&review_of(1, "Unknown Film", UserId::new(1), 5))
        .await
        .unwrap_err();
    assert!(matches!(err, FlixError::NotFound { resource_type: "movie", .. }));

    let err = repo
        .add_review(&review_of(2, "Heat", UserId::new(99), 5))
        .await
        .unwrap_err();
    assert!(matches!(err, FlixError::NotFound { resource_type: "user", .. }));

    let err = repo
        .add_review(&review_of(3, "Heat", UserId::new(1), 11))
        .await
        .unwrap_err();
    assert!(matches!(err, FlixError::Validation(_)));

    assert!(repo.get_reviews().await.unwrap().is_empty());
}

pub async fn check_duplicate_username_conflicts(repo: &dyn CatalogRepository) {
    repo.add_user(&alice()).await.unwrap();

    let impostor = User::new(UserId::new(2), "alice", "hash", "other@example.com");
    let err = repo.add_user(&impostor).await.unwrap_err();
    assert!(matches!(err, FlixError::Conflict(_)));
    assert!(repo.get_user_by_id(UserId::new(2)).await.unwrap().is_none());
}

pub async fn check_watchlist_order(repo: &dyn CatalogRepository) {
    repo.add_movie(&inception()).await.unwrap();
    repo.add_movie(&interstellar()).await.unwrap();
    repo.add_movie(&heat()).await.unwrap();
    repo.add_user(&alice()).await.unwrap();

    let owner = UserId::new(1);
    repo.add_watchlist(&Watchlist::new(WatchlistId::new(1), owner))
        .await
        .unwrap();

    for id in ["m3", "m1", "m3", "m2"] {
        repo.add_movie_to_watchlist(owner, &MovieId::new(id)).await.unwrap();
    }

    let watchlist = repo.get_watchlist(owner).await.unwrap().unwrap();
    let ids: Vec<&str> = watchlist.movies.iter().map(|m| m.id.as_str()).collect();
    assert_eq!(ids, vec!["m3", "m1", "m2"]);
    assert_eq!(watchlist.movies[1], inception());
    assert_eq!(repo.get_watchlists().await.unwrap(), vec![watchlist]);
}

pub async fn check_watchlist_ownership(repo: &dyn CatalogRepository) {
    repo.add_movie(&heat()).await.unwrap();

    let err = repo
        .add_watchlist(&Watchlist::new(WatchlistId::new(1), UserId::new(1)))
        .await
        .unwrap_err();
    assert!(matches!(err, FlixError::NotFound { resource_type: "user", .. }));

    repo.add_user(&alice()).await.unwrap();
    let mut first = Watchlist::new(WatchlistId::new(1), UserId::new(1));
    first.add_movie(heat());
    repo.add_watchlist(&first).await.unwrap();
    assert_eq!(repo.get_watchlist(UserId::new(1)).await.unwrap(), Some(first));

    let err = repo
        .add_watchlist(&Watchlist::new(WatchlistId::new(2), UserId::new(1)))
        .await
        .unwrap_err();
    assert!(matches!(err, FlixError::Conflict(_)));

    let err = repo
        .add_movie_to_watchlist(UserId::new(1), &MovieId::new("m404"))
        .await
        .unwrap_err();
    assert!(matches!(err, FlixError::NotFound { resource_type: "movie", .. }));

    let err = repo
        .add_movie_to_watchlist(UserId::new(2), &MovieId::new("m3"))
        .await
        .unwrap_err();
    assert!(matches!(err, FlixError::NotFound { resource_type: "watchlist", .. }));
}

pub async fn check_watched_movies(repo: &dyn CatalogRepository) {
    repo.add_movie(&inception()).await.unwrap();
    repo.add_movie(&heat()).await.unwrap();
    repo.add_user(&alice()).await.unwrap();

    assert_eq!(repo.get_user_watched_movies("alice").await.unwrap(), Some(vec![]));

    let user = UserId::new(1);
    repo.add_watched_movie(user, &MovieId::new("m3")).await.unwrap();
    repo.add_watched_movie(user, &MovieId::new("m1")).await.unwrap();
    repo.add_watched_movie(user, &MovieId::new("m3")).await.unwrap();

    let watched = repo.get_user_watched_movies("alice").await.unwrap().unwrap();
    assert_eq!(watched, vec![heat(), inception()]);

    let err = repo
        .add_watched_movie(user, &MovieId::new("m404"))
        .await
        .unwrap_err();
    assert!(matches!(err, FlixError::NotFound { resource_type: "movie", .. }));
}

pub async fn check_duplicate_movie_conflicts(repo: &dyn CatalogRepository) {
    repo.add_movie(&inception()).await.unwrap();

    let mut retitled = inception();
    retitled.title = "Inception (Director's Cut)".to_string();
    let err = repo.add_movie(&retitled).await.unwrap_err();
    assert!(matches!(err, FlixError::Conflict(_)));

    let stored = repo.get_movie(&MovieId::new("m1")).await.unwrap().unwrap();
    assert_eq!(stored.title, "Inception");
    assert_eq!(repo.get_movies().await.unwrap().len(), 1);
}

pub async fn check_movie_keeps_stored_people(repo: &dyn CatalogRepository) {
    let stored_actor = Actor::new(ActorId::new(1), "Stored", None, None);
    let stored_director = Director::new(DirectorId::new(1), "Stored", None);
    repo.add_actor(&stored_actor).await.unwrap();
    repo.add_director(&stored_director).await.unwrap();

    repo.add_movie(&inception()).await.unwrap();

    let movie = repo.get_movie(&MovieId::new("m1")).await.unwrap().unwrap();
    assert_eq!(movie.director, Some(stored_director.clone()));
    assert_eq!(movie.actors[0], stored_actor);
    assert_eq!(repo.get_actor(ActorId::new(1)).await.unwrap(), Some(stored_actor));
    assert_eq!(repo.get_director(DirectorId::new(1)).await.unwrap(), Some(stored_director));
    assert_eq!(repo.get_actors().await.unwrap().len(), 2);
}

pub async fn check_genre_id_clash_within_movie(repo: &dyn CatalogRepository) {
    let mut movie = heat();
    movie.genres = vec![
        Genre::new(GenreId::new(50), "Crime"),
        Genre::new(GenreId::new(50), "Thriller"),
    ];

    let err = repo.add_movie(&movie).await.unwrap_err();
    assert!(matches!(err, FlixError::Conflict(_)));

    assert!(repo.get_genre(GenreId::new(50)).await.unwrap().is_none());
    assert!(repo.get_genres().await.unwrap().is_empty());
    assert!(repo.get_movie(&MovieId::new("m3")).await.unwrap().is_none());
}
