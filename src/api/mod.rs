//! HTTP API server

use std::path::Path;

use axum::{
    routing::{get, post},
    Router,
};
use tower_http::{cors::CorsLayer, services::ServeDir, trace::TraceLayer};

pub mod handlers;
pub mod state;

pub use state::AppState;

/// Build the API router without the static UI, as tests and embedded
/// deployments use it.
pub fn create_api_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(handlers::health))
        .route("/predict", post(handlers::predict))
        .with_state(state)
}

/// Build the full router: API routes plus the drawing UI served from
/// `static_root` (requests not matching a route fall through to it).
pub fn create_router(state: AppState, static_root: impl AsRef<Path>) -> Router {
    create_api_router(state)
        .fallback_service(ServeDir::new(static_root.as_ref()))
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
}
