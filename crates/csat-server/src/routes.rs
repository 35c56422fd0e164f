// ABOUTME: Route definitions for the csatd HTTP API.
// ABOUTME: Assembles API routes, CORS and tracing layers, and an optional static dashboard fallback.

use std::path::PathBuf;

use axum::Router;
use axum::http::Method;
use axum::routing::{get, post};
use tower_http::cors::{Any, CorsLayer};
use tower_http::services::{ServeDir, ServeFile};
use tower_http::trace::TraceLayer;

use crate::api;
use crate::app_state::SharedState;

/// Build the complete Axum router with all routes and shared state.
/// When `static_dir` is set, unknown paths fall through to files in it, with
/// `index.html` served for anything not found.
pub fn create_router(state: SharedState, static_dir: Option<PathBuf>) -> Router {
    let router = Router::new()
        .route("/health", get(api::system::health))
        .route("/api/system-info", get(api::system::system_info))
        .route(
            "/api/csat",
            get(api::csat::list_responses).post(api::csat::create_response),
        )
        .route("/api/csat/stats", get(api::csat::get_stats))
        .route("/api/csat/export", get(api::csat::export_csv))
        .route("/api/csat/storage-info", get(api::csat::storage_info))
        .route("/api/csat/test-persistence", post(api::csat::test_persistence))
        .with_state(state);

    let router = match static_dir {
        Some(dir) => {
            let index = dir.join("index.html");
            router.fallback_service(ServeDir::new(dir).fallback(ServeFile::new(index)))
        }
        None => router,
    };

    router.layer(TraceLayer::new_for_http()).layer(
        CorsLayer::new()
            .allow_origin(Any)
            .allow_headers(Any)
            .allow_methods([Method::GET, Method::POST, Method::OPTIONS]),
    )
}
