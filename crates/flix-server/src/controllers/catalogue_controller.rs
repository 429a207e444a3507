//! Catalogue browsing endpoints.

use crate::{
    responses::{found, ok, ApiResult},
    state::AppState,
};
use axum::{
    extract::{Path, State},
    routing::get,
    Router,
};
use flix_core::{Actor, Director, Genre, Movie, MovieId, Review, Watchlist};
use serde::Serialize;
use tracing::debug;

/// Everything in the catalogue, one list per entity.
#[derive(Debug, Serialize)]
pub struct CatalogueOverview {
    pub movies: Vec<Movie>,
    pub actors: Vec<Actor>,
    pub directors: Vec<Director>,
    pub genres: Vec<Genre>,
    pub reviews: Vec<Review>,
    pub watchlists: Vec<Watchlist>,
}

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(overview))
        .route("/movies/:id", get(get_movie))
}

pub async fn overview(State(state): State<AppState>) -> ApiResult<CatalogueOverview> {
    debug!("Catalogue overview requested");
    let repo = &state.repository;

    ok(CatalogueOverview {
        movies: repo.get_movies().await?,
        actors: repo.get_actors().await?,
        directors: repo.get_directors().await?,
        genres: repo.get_genres().await?,
        reviews: repo.get_reviews().await?,
        watchlists: repo.get_watchlists().await?,
    })
}

pub async fn get_movie(State(state): State<AppState>, Path(id): Path<String>) -> ApiResult<Movie> {
    debug!("Get movie request: {}", id);
    let movie = state.repository.get_movie(&MovieId::new(id.as_str())).await?;
    ok(found(movie, "movie", id)?)
}
