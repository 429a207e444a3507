//! Integration tests for SqlCatalogRepository.
//!
//! These tests run against a private in-memory SQLite database.

mod common;

use common::TestDatabase;
use flix_core::{Actor, ActorId, Director, DirectorId, FlixError, Movie, MovieId};
use flix_repository::{CatalogRepository, MappingRegistry, SessionFactory, SqlCatalogRepository};

#[tokio::test]
async fn test_movie_round_trip() {
    let db = TestDatabase::new().await;
    common::check_movie_round_trip(&db.repository()).await;
}

#[tokio::test]
async fn test_movie_backrefs() {
    let db = TestDatabase::new().await;
    common::check_movie_backrefs(&db.repository()).await;
}

#[tokio::test]
async fn test_entity_round_trips() {
    let db = TestDatabase::new().await;
    common::check_entity_round_trips(&db.repository()).await;
}

#[tokio::test]
async fn test_unknown_ids_are_none() {
    let db = TestDatabase::new().await;
    common::check_unknown_ids_are_none(&db.repository()).await;
}

#[tokio::test]
async fn test_genre_names_collapse() {
    let db = TestDatabase::new().await;
    common::check_genre_names_collapse(&db.repository()).await;
}

#[tokio::test]
async fn test_inception_scenario() {
    let db = TestDatabase::new().await;
    common::check_inception_scenario(&db.repository()).await;
}

#[tokio::test]
async fn test_attribute_accessors() {
    let db = TestDatabase::new().await;
    common::check_attribute_accessors(&db.repository()).await;
}

#[tokio::test]
async fn test_user_reviews() {
    let db = TestDatabase::new().await;
    common::check_user_reviews(&db.repository()).await;
}

#[tokio::test]
async fn test_review_requires_movie_and_user() {
    let db = TestDatabase::new().await;
    common::check_review_requires_movie_and_user(&db.repository()).await;
}

#[tokio::test]
async fn test_duplicate_username_conflicts() {
    let db = TestDatabase::new().await;
    common::check_duplicate_username_conflicts(&db.repository()).await;
}

#[tokio::test]
async fn test_watchlist_order() {
    let db = TestDatabase::new().await;
    common::check_watchlist_order(&db.repository()).await;
}

#[tokio::test]
async fn test_watchlist_ownership() {
    let db = TestDatabase::new().await;
    common::check_watchlist_ownership(&db.repository()).await;
}

#[tokio::test]
async fn test_watched_movies() {
    let db = TestDatabase::new().await;
    common::check_watched_movies(&db.repository()).await;
}

#[tokio::test]
async fn test_duplicate_movie_conflicts() {
    let db = TestDatabase::new().await;
    common::check_duplicate_movie_conflicts(&db.repository()).await;
}

#[tokio::test]
async fn test_movie_keeps_stored_people() {
    let db = TestDatabase::new().await;
    common::check_movie_keeps_stored_people(&db.repository()).await;
}

#[tokio::test]
async fn test_genre_id_clash_within_movie() {
    let db = TestDatabase::new().await;
    common::check_genre_id_clash_within_movie(&db.repository()).await;
}

#[tokio::test]
async fn test_repository_requires_registered_mapping() {
    let db = TestDatabase::new().await;
    let registry = MappingRegistry::new();

    let err = SqlCatalogRepository::new(db.pool(), &registry).unwrap_err();
    assert!(matches!(err, FlixError::MappingNotRegistered));
}

#[tokio::test]
async fn test_uncommitted_session_leaves_no_rows() {
    let db = TestDatabase::new().await;
    let sessions = SessionFactory::new(db.pool());

    {
        let mut session = sessions.begin();
        sqlx::query(r#"INSERT INTO "genre" ("id", "name") VALUES (1, 'Drama')"#)
            .execute(session.connection().await.unwrap())
            .await
            .unwrap();
    }

    let repo = db.repository();
    assert!(repo.get_genres().await.unwrap().is_empty());
}

#[tokio::test]
async fn test_failed_add_movie_is_rolled_back() {
    let db = TestDatabase::new().await;
    let repo = db.repository();
    repo.add_movie(&common::inception()).await.unwrap();

    // New director and actor, but the movie id is taken.
    let mut clash = Movie::new("m1", "Tenet", 2020, 150)
        .with_director(Director::new(DirectorId::new(7), "Someone", None));
    clash.add_actor(Actor::new(ActorId::new(7), "John", None, Some("Washington".into())));

    let err = repo.add_movie(&clash).await.unwrap_err();
    assert!(matches!(err, FlixError::Conflict(_)));
    assert_eq!(repo.get_directors().await.unwrap().len(), 1);
    assert_eq!(repo.get_actors().await.unwrap().len(), 2);
    assert_eq!(
        repo.get_movie_title(&MovieId::new("m1")).await.unwrap().as_deref(),
        Some("Inception")
    );
}

#[tokio::test]
async fn test_duplicate_rows_are_ambiguous() {
    let db = TestDatabase::new().await;
    // Rebuild "user" without its unique constraint to simulate a corrupted schema.
    for table in ["user_watched_movie", "watchlist_movie", "watchlist", "review", "user"] {
        sqlx::query(&format!("DROP TABLE \"{}\"", table))
            .execute(db.pool().inner())
            .await
            .unwrap();
    }
    sqlx::query(
        r#"CREATE TABLE "user" ("id" INTEGER, "first_name" TEXT, "last_name" TEXT, "username" TEXT,
           "password" TEXT, "email" TEXT, "age" INTEGER, "consent" BOOLEAN)"#,
    )
    .execute(db.pool().inner())
    .await
    .unwrap();
    sqlx::query(
        r#"INSERT INTO "user" VALUES (1, '', '', 'twin', 'h', 'a@example.com', NULL, 0),
                                     (2, '', '', 'twin', 'h', 'b@example.com', NULL, 0)"#,
    )
    .execute(db.pool().inner())
    .await
    .unwrap();

    let repo = db.repository();
    let err = repo.get_user("twin").await.unwrap_err();
    assert!(matches!(
        err,
        FlixError::AmbiguousMatch { resource_type: "user", matches: 2, .. }
    ));
}

#[tokio::test]
async fn test_delete_all_empties_tables() {
    let db = TestDatabase::new().await;
    let repo = db.repository();
    repo.add_movie(&common::inception()).await.unwrap();
    repo.add_user(&common::alice()).await.unwrap();

    db.schema().delete_all().await.unwrap();

    assert!(repo.get_movies().await.unwrap().is_empty());
    assert!(repo.get_genres().await.unwrap().is_empty());
    assert!(repo.get_user("alice").await.unwrap().is_none());
}
