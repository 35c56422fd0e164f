// ABOUTME: Health and system-information handlers for operators and uptime checks.
// ABOUTME: Both report the store's metadata and current statistics alongside process details.

use axum::Json;
use axum::extract::State;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde_json::json;

use crate::api::{ApiError, with_store};
use crate::app_state::SharedState;

/// GET /health - 200 with storage details when the store answers, 500 otherwise.
pub async fn health(State(state): State<SharedState>) -> Response {
    match with_store(&state, |store| Ok((store.info()?, store.stats()?))).await {
        Ok((storage, stats)) => Json(json!({
            "status": "healthy",
            "storage": storage,
            "stats": stats,
        }))
        .into_response(),
        Err(e) => {
            tracing::error!("health check failed: {}", e);
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(json!({ "status": "unhealthy", "error": e.to_string() })),
            )
                .into_response()
        }
    }
}

/// GET /api/system-info - Build and storage details.
pub async fn system_info(
    State(state): State<SharedState>,
) -> Result<Json<serde_json::Value>, ApiError> {
    let (storage, stats) = with_store(&state, |store| Ok((store.info()?, store.stats()?))).await?;

    Ok(Json(json!({
        "system": {
            "name": env!("CARGO_PKG_NAME"),
            "version": env!("CARGO_PKG_VERSION"),
            "storage_type": storage.storage_type,
            "storage_home": state.csat_home.display().to_string(),
        },
        "storage": storage,
        "stats": stats,
    })))
}
