// ABOUTME: API module containing the HTTP handlers for the csatd REST API.
// ABOUTME: Also defines the JSON error response and the helper that runs store calls off the async runtime.

pub mod csat;
pub mod system;

use std::sync::Arc;

use axum::Json;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use csat_store::{ResponseStore, StoreError};
use thiserror::Error;

use crate::app_state::SharedState;

/// Errors a handler can return. Rendered as `{"error": "..."}`.
#[derive(Debug, Error)]
pub enum ApiError {
    #[error("{0}")]
    Validation(String),

    #[error("store error: {0}")]
    Store(#[from] StoreError),

    #[error("internal error: {0}")]
    Internal(String),
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, message) = match self {
            ApiError::Validation(msg) => (StatusCode::BAD_REQUEST, msg),
            ApiError::Store(e) => {
                tracing::error!("store operation failed: {}", e);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "internal server error".to_string(),
                )
            }
            ApiError::Internal(msg) => {
                tracing::error!("{}", msg);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "internal server error".to_string(),
                )
            }
        };

        (status, Json(serde_json::json!({ "error": message }))).into_response()
    }
}

/// Run a store operation on the blocking pool. Store calls hold a mutex and
/// may fsync, so they must not run on an async worker thread.
pub(crate) async fn with_store<T, F>(state: &SharedState, op: F) -> Result<T, ApiError>
where
    F: FnOnce(&dyn ResponseStore) -> Result<T, StoreError> + Send + 'static,
    T: Send + 'static,
{
    let store = Arc::clone(&state.store);
    tokio::task::spawn_blocking(move || op(store.as_ref()))
        .await
        .map_err(|e| ApiError::Internal(format!("store task failed: {}", e)))?
        .map_err(ApiError::from)
}
