//! Main application router.

use crate::{
    controllers::{catalogue_controller, health_controller, review_controller, user_controller},
    middleware::logging_middleware,
    state::AppState,
};
use axum::{middleware, Router};
use tower_http::{
    request_id::{MakeRequestUuid, PropagateRequestIdLayer, SetRequestIdLayer},
    trace::TraceLayer,
};
use tracing::info;

/// Creates the application router over the given state.
pub fn create_router(state: AppState) -> Router {
    let router = Router::new()
        .merge(health_controller::router())
        .merge(catalogue_controller::router())
        .merge(user_controller::router())
        .merge(review_controller::router())
        .layer(PropagateRequestIdLayer::x_request_id())
        .layer(TraceLayer::new_for_http())
        .layer(middleware::from_fn(logging_middleware))
        .layer(SetRequestIdLayer::x_request_id(MakeRequestUuid))
        .with_state(state);

    info!("Router created with catalogue, user and review endpoints");
    router
}
