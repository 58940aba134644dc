//! Translation status and model metadata handlers.

use axum::extract::{Path, State};
use axum::Json;
use cadview_forge::is_valid_urn;
use serde::Serialize;
use serde_json::Value;

use crate::error::{ApiError, ApiResult};
use crate::state::AppState;

/// Manifest summary returned to pollers.
#[derive(Debug, Serialize)]
pub struct StatusResponse {
    pub status: String,
    pub progress: String,
    pub region: Option<String>,
    pub derivatives: Vec<Value>,
    pub success: bool,
}

fn checked_urn(urn: &str) -> ApiResult<&str> {
    if is_valid_urn(urn) {
        Ok(urn)
    } else {
        Err(ApiError::bad_request("Invalid URN"))
    }
}

/// `GET /api/status/{urn}`
///
/// An unknown URN answers 404; a job still running answers 200 with
/// `status` `pending` or `inprogress`.
pub async fn get_status(
    State(state): State<AppState>,
    Path(urn): Path<String>,
) -> ApiResult<Json<StatusResponse>> {
    let manifest = state.forge.manifest(checked_urn(&urn)?).await?;
    let success = manifest.is_success();

    Ok(Json(StatusResponse {
        status: manifest.status,
        progress: manifest.progress,
        region: manifest.region,
        derivatives: manifest.derivatives,
        success,
    }))
}

/// `GET /api/model/{urn}/metadata`
pub async fn get_metadata(
    State(state): State<AppState>,
    Path(urn): Path<String>,
) -> ApiResult<Json<Value>> {
    let metadata = state.forge.metadata(checked_urn(&urn)?).await?;
    Ok(Json(metadata))
}
