//! User accounts, their reviews, watched movies and watchlists.
//!
//! Every route under `/users/:user` shares one parameter name. The reviews and
//! watched routes read it as a username; the watchlist routes as a user ID.

use super::next_id;
use crate::{
    extractors::ValidatedJson,
    responses::{created, found, ok, ApiResponse, ApiResult, AppError},
    state::AppState,
};
use axum::{
    extract::{Path, State},
    http::StatusCode,
    routing::{get, post},
    Json, Router,
};
use flix_core::{FlixError, Movie, MovieId, Review, User, UserId, Watchlist, WatchlistId};
use flix_security::validate_password_strength;
use serde::Deserialize;
use tracing::{debug, info, warn};
use validator::Validate;

/// Body of `POST /register`.
#[derive(Debug, Deserialize, Validate)]
pub struct RegisterRequest {
    #[validate(length(min = 1, max = 64))]
    pub username: String,
    pub password: String,
    #[validate(email)]
    pub email: String,
    #[serde(default)]
    #[validate(length(max = 64))]
    pub first_name: String,
    #[serde(default)]
    #[validate(length(max = 64))]
    pub last_name: String,
    #[validate(range(max = 150))]
    pub age: Option<u32>,
    #[serde(default)]
    pub consent: bool,
}

/// Body of `POST /login`.
#[derive(Debug, Deserialize, Validate)]
pub struct LoginRequest {
    #[validate(length(min = 1))]
    pub username: String,
    #[validate(length(min = 1))]
    pub password: String,
}

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/register", post(register))
        .route("/login", post(login))
        .route("/users/:user/reviews", get(user_reviews))
        .route("/users/:user/watched", get(watched_movies))
        .route("/users/:user/watched/:movie_id", post(add_watched_movie))
        .route("/users/:user/watchlist", get(watchlist))
        .route("/users/:user/watchlist/:movie_id", post(add_to_watchlist))
}

fn parse_user_id(raw: &str) -> Result<UserId, AppError> {
    raw.parse::<i64>()
        .map(UserId::new)
        .map_err(|_| AppError(FlixError::validation(format!("'{}' is not a user id", raw))))
}

pub async fn register(
    State(state): State<AppState>,
    ValidatedJson(request): ValidatedJson<RegisterRequest>,
) -> Result<(StatusCode, Json<ApiResponse<User>>), AppError> {
    debug!("Register request for: {}", request.username);

    if let Err(problems) = validate_password_strength(&request.password) {
        return Err(AppError(FlixError::validation(format!(
            "password: {}",
            problems.join("; ")
        ))));
    }

    let repo = &state.repository;
    if repo.get_user(&request.username).await?.is_some() {
        return Err(AppError(FlixError::conflict(format!(
            "Username '{}' is already taken",
            request.username
        ))));
    }

    let password_hash = state.password_hasher.hash(&request.password)?;
    let id = next_id(repo.get_users().await?.iter().map(|u| u.id.into_inner()));

    let mut user = User::new(UserId::new(id), request.username, password_hash, request.email)
        .with_names(request.first_name, request.last_name)
        .with_consent(request.consent);
    if let Some(age) = request.age {
        user = user.with_age(age);
    }
    repo.add_user(&user).await?;

    info!("Registered user {} ({})", user.username, user.id);
    Ok(created(user))
}

pub async fn login(
    State(state): State<AppState>,
    ValidatedJson(request): ValidatedJson<LoginRequest>,
) -> ApiResult<User> {
    debug!("Login request for: {}", request.username);

    let Some(user) = state.repository.get_user(&request.username).await? else {
        warn!("Login for unknown user: {}", request.username);
        return Err(AppError(FlixError::InvalidCredentials));
    };
    if !state
        .password_hasher
        .verify(&request.password, &user.password_hash)?
    {
        warn!("Wrong password for user: {}", request.username);
        return Err(AppError(FlixError::InvalidCredentials));
    }

    ok(user)
}

pub async fn user_reviews(
    State(state): State<AppState>,
    Path(username): Path<String>,
) -> ApiResult<Vec<Review>> {
    let reviews = state.repository.get_user_reviews(&username).await?;
    ok(found(reviews, "user", username)?)
}

pub async fn watched_movies(
    State(state): State<AppState>,
    Path(username): Path<String>,
) -> ApiResult<Vec<Movie>> {
    let movies = state.repository.get_user_watched_movies(&username).await?;
    ok(found(movies, "user", username)?)
}

pub async fn add_watched_movie(
    State(state): State<AppState>,
    Path((username, movie_id)): Path<(String, String)>,
) -> ApiResult<Vec<Movie>> {
    debug!("User {} watched {}", username, movie_id);
    let repo = &state.repository;

    let user = found(repo.get_user(&username).await?, "user", &username)?;
    repo.add_watched_movie(user.id, &MovieId::new(movie_id)).await?;

    let movies = repo.get_user_watched_movies(&username).await?;
    ok(found(movies, "user", username)?)
}

pub async fn watchlist(
    State(state): State<AppState>,
    Path(user): Path<String>,
) -> ApiResult<Watchlist> {
    let user_id = parse_user_id(&user)?;
    let watchlist = state.repository.get_watchlist(user_id).await?;
    ok(found(watchlist, "watchlist", user_id)?)
}

/// Adds a movie to the user's watchlist, creating the watchlist on first use.
pub async fn add_to_watchlist(
    State(state): State<AppState>,
    Path((user, movie_id)): Path<(String, String)>,
) -> ApiResult<Watchlist> {
    let user_id = parse_user_id(&user)?;
    debug!("Add {} to watchlist of user {}", movie_id, user_id);
    let repo = &state.repository;

    if repo.get_watchlist(user_id).await?.is_none() {
        found(repo.get_user_by_id(user_id).await?, "user", user_id)?;
        let id = next_id(repo.get_watchlists().await?.iter().map(|w| w.id.into_inner()));
        repo.add_watchlist(&Watchlist::new(WatchlistId::new(id), user_id))
            .await?;
        info!("Created watchlist {} for user {}", id, user_id);
    }

    repo.add_movie_to_watchlist(user_id, &MovieId::new(movie_id))
        .await?;

    let watchlist = repo.get_watchlist(user_id).await?;
    ok(found(watchlist, "watchlist", user_id)?)
}
