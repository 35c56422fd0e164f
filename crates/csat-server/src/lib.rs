// ABOUTME: HTTP server for csatd, exposing survey collection and reporting endpoints.
// ABOUTME: Uses Axum with a single injected ResponseStore shared by every handler.

pub mod api;
pub mod app_state;
pub mod config;
pub mod routes;

pub use app_state::{AppState, SharedState};
pub use config::{ConfigError, CsatConfig};
pub use routes::create_router;
