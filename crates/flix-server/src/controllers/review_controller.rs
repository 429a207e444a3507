//! Review submission.

use super::next_id;
use crate::{
    extractors::ValidatedJson,
    responses::{created, found, ApiResponse, AppError},
    state::AppState,
};
use axum::{extract::State, http::StatusCode, routing::post, Json, Router};
use flix_core::{Review, ReviewId};
use serde::Deserialize;
use tracing::{debug, info};
use validator::Validate;

/// Body of `POST /reviews`.
#[derive(Debug, Deserialize, Validate)]
pub struct ReviewRequest {
    #[validate(length(min = 1, max = 64))]
    pub username: String,
    #[validate(length(min = 1, max = 255))]
    pub movie_title: String,
    #[validate(length(min = 1, max = 4096))]
    pub text: String,
    #[validate(range(min = 1, max = 10))]
    pub rating: u8,
}

pub fn router() -> Router<AppState> {
    Router::new().route("/reviews", post(add_review))
}

pub async fn add_review(
    State(state): State<AppState>,
    ValidatedJson(request): ValidatedJson<ReviewRequest>,
) -> Result<(StatusCode, Json<ApiResponse<Review>>), AppError> {
    debug!("Review of '{}' by {}", request.movie_title, request.username);
    let repo = &state.repository;

    let user = found(repo.get_user(&request.username).await?, "user", &request.username)?;
    let id = next_id(repo.get_reviews().await?.iter().map(|r| r.id.into_inner()));

    let review = Review::new(
        ReviewId::new(id),
        request.movie_title,
        user.id,
        request.text,
        request.rating,
    );
    repo.add_review(&review).await?;

    info!("Review {} stored for user {}", review.id, user.username);
    Ok(created(review))
}
