//! HTTP file-serving adapter
//!
//! Depends only on core/. Serves stored file bytes (originals and
//! generated previews) to API key holders via Axum.

pub mod access;
pub mod error;
pub mod handlers;
pub mod middleware;
pub mod state;

pub use access::{FileAccess, FileRecord, StoreFileAccess};
pub use handlers::*;
pub use state::AppState;

use axum::{middleware as axum_middleware, routing::get, Router};
use tower_http::cors::CorsLayer;

/// Build the API router
///
/// - `GET /health`
/// - `GET /datafiles/static/:file_id?apikey=..&original=..`
pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health_handler))
        .route("/datafiles/static/:file_id", get(serve_file_handler))
        .layer(axum_middleware::from_fn(middleware::log_request))
        .layer(CorsLayer::permissive())
        .with_state(state)
}
