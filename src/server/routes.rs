//! Router configuration for the annotation server.

use axum::{
    routing::{get, post},
    Router,
};
use tower_http::cors::CorsLayer;

use super::handlers;
use super::AppState;

/// Create the main router with all routes.
pub fn create_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(handlers::health))
        // Model-backed annotation
        .route("/sentsplit", post(handlers::sentsplit))
        .route("/xpos", post(handlers::xpos))
        .route("/dep", post(handlers::dep))
        // Random baselines
        .route("/random/sentence", post(handlers::random_sentence))
        .route("/random/head", post(handlers::random_head))
        .route("/api/status", get(handlers::api_status))
        .layer(CorsLayer::permissive())
        .with_state(state)
}
