//! API route definitions

use super::handlers::{self, ApiState};
use axum::{
    routing::{get, post},
    Router,
};
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

/// Create the web UI / API router
pub fn create_router(state: ApiState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        // Health check
        .route("/health", get(handlers::health))
        // HTML pages
        .route("/", get(handlers::index))
        .route("/pathway", get(handlers::pathway_page))
        // JSON API
        .route(
            "/api/pathways/{name}/proteins",
            get(handlers::pathway_proteins),
        )
        .route("/api/genes/{symbol}/similar", get(handlers::similar_genes))
        .route("/api/proteins/common", post(handlers::common_proteins))
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .with_state(state)
}
