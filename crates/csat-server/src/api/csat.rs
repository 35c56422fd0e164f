// ABOUTME: Survey response API handlers: submit, list, statistics, CSV export, and storage info.
// ABOUTME: Validates submissions before they reach the store and maps store results to HTTP responses.

use axum::Json;
use axum::extract::State;
use axum::extract::rejection::JsonRejection;
use axum::http::{StatusCode, header};
use axum::response::IntoResponse;
use chrono::Local;
use csat_core::{NewResponse, Record, Stats, StorageInfo};
use csat_store::StoreError;
use serde::Serialize;
use serde_json::Value;

use crate::api::{ApiError, with_store};
use crate::app_state::SharedState;

/// Response body after saving a survey response.
#[derive(Debug, Serialize)]
pub struct CreateResponseBody {
    pub message: String,
    pub id: u64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub storage_info: Option<StorageInfo>,
}

/// Response body after inserting the canned persistence-check responses.
#[derive(Debug, Serialize)]
pub struct TestPersistenceBody {
    pub message: String,
    pub added_ids: Vec<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub storage_info: Option<StorageInfo>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub current_stats: Option<Stats>,
}

/// Validate a submission body into a NewResponse.
///
/// `rating` must be present and be a JSON integer in 1..=5. `context` and
/// `comment` are optional strings; null is treated as absent.
pub fn parse_submission(body: &Value) -> Result<NewResponse, ApiError> {
    let obj = body
        .as_object()
        .ok_or_else(|| ApiError::Validation("rating is required".to_string()))?;

    let rating = obj
        .get("rating")
        .filter(|v| !v.is_null())
        .ok_or_else(|| ApiError::Validation("rating is required".to_string()))?;

    let rating = rating
        .as_i64()
        .filter(|r| (1..=5).contains(r))
        .ok_or_else(|| {
            ApiError::Validation("rating must be an integer between 1 and 5".to_string())
        })?;

    Ok(NewResponse {
        rating,
        context: optional_string(obj.get("context"), "context")?,
        comment: optional_string(obj.get("comment"), "comment")?,
    })
}

/// Metadata read after a successful write. A failure here must not turn a
/// durable save into an error response, so it is logged and dropped.
fn after_save<T>(result: Result<T, StoreError>, what: &str) -> Option<T> {
    match result {
        Ok(value) => Some(value),
        Err(e) => {
            tracing::warn!("saved, but could not read {}: {}", what, e);
            None
        }
    }
}

fn optional_string(value: Option<&Value>, field: &str) -> Result<Option<String>, ApiError> {
    match value {
        None | Some(Value::Null) => Ok(None),
        Some(Value::String(s)) => Ok(Some(s.clone())),
        Some(_) => Err(ApiError::Validation(format!("{} must be a string", field))),
    }
}

/// POST /api/csat - Save a new survey response.
pub async fn create_response(
    State(state): State<SharedState>,
    body: Result<Json<Value>, JsonRejection>,
) -> Result<impl IntoResponse, ApiError> {
    let Json(body) = body.map_err(|e| {
        tracing::debug!("rejected submission body: {}", e);
        ApiError::Validation("rating is required".to_string())
    })?;
    let response = parse_submission(&body)?;

    let (id, storage_info) = with_store(&state, move |store| {
        let id = store.add(response)?;
        Ok((id, after_save(store.info(), "storage info")))
    })
    .await?;

    tracing::info!("saved survey response {}", id);

    Ok((
        StatusCode::CREATED,
        Json(CreateResponseBody {
            message: "response saved".to_string(),
            id,
            storage_info,
        }),
    ))
}

/// GET /api/csat - All responses, most recent first.
pub async fn list_responses(
    State(state): State<SharedState>,
) -> Result<Json<Vec<Record>>, ApiError> {
    let records = with_store(&state, |store| store.list()).await?;
    Ok(Json(records))
}

/// GET /api/csat/stats - Aggregate statistics.
pub async fn get_stats(State(state): State<SharedState>) -> Result<Json<Stats>, ApiError> {
    let stats = with_store(&state, |store| store.stats()).await?;
    Ok(Json(stats))
}

/// GET /api/csat/export - CSV download of every response.
pub async fn export_csv(State(state): State<SharedState>) -> Result<impl IntoResponse, ApiError> {
    let csv = with_store(&state, |store| store.export_csv()).await?;

    let filename = format!(
        "attachment; filename=csat_avaliacoes_{}.csv",
        Local::now().format("%Y%m%d_%H%M%S")
    );

    Ok((
        [
            (header::CONTENT_TYPE, "text/csv; charset=utf-8".to_string()),
            (header::CONTENT_DISPOSITION, filename),
        ],
        csv,
    ))
}

/// GET /api/csat/storage-info - Storage backend metadata.
pub async fn storage_info(
    State(state): State<SharedState>,
) -> Result<Json<StorageInfo>, ApiError> {
    let info = with_store(&state, |store| store.info()).await?;
    Ok(Json(info))
}

/// POST /api/csat/test-persistence - Insert three sample responses and
/// report the resulting storage state.
pub async fn test_persistence(
    State(state): State<SharedState>,
) -> Result<impl IntoResponse, ApiError> {
    let samples = [
        NewResponse::new(5)
            .with_context("Compra")
            .with_comment("Teste de persistência - Excelente!"),
        NewResponse::new(4)
            .with_context("Suporte/Assistência")
            .with_comment("Teste de persistência - Muito bom!"),
        NewResponse::new(3)
            .with_context("Devolução")
            .with_comment("Teste de persistência - Regular"),
    ];

    let body = with_store(&state, move |store| {
        let mut added_ids = Vec::with_capacity(samples.len());
        for sample in samples {
            added_ids.push(store.add(sample)?);
        }
        Ok(TestPersistenceBody {
            message: "test responses added".to_string(),
            added_ids,
            storage_info: after_save(store.info(), "storage info"),
            current_stats: after_save(store.stats(), "stats"),
        })
    })
    .await?;

    Ok((StatusCode::CREATED, Json(body)))
}
