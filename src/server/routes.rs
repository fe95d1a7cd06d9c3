//! Route definitions for the web server.

use axum::routing::{get, post};
use axum::Router;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

use super::handlers;
use super::AppState;

/// Create the router with all routes.
pub fn create_router(state: AppState) -> Router {
    let ajax_path = state.ajax_path.clone();

    Router::new()
        .route("/", get(handlers::index))
        .route("/health", get(handlers::health))
        .route("/grids/:slug", get(handlers::grid_page))
        .route(&ajax_path, post(handlers::fragment))
        .route("/api/taxonomies", get(handlers::list_taxonomies))
        .route("/static/grid.js", get(handlers::grid_script))
        .route("/static/default-term.svg", get(handlers::default_image))
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
