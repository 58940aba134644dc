//! Health, readiness and server info handlers.

use std::time::Instant;

use axum::extract::State;
use axum::http::StatusCode;
use axum::Json;
use chrono::Utc;
use serde::Serialize;

use crate::formats::SUPPORTED_EXTENSIONS;
use crate::state::AppState;

/// Health response.
#[derive(Serialize)]
pub struct HealthResponse {
    pub status: String,
    pub version: String,
    pub timestamp: String,
}

/// Health check endpoint (liveness probe).
pub async fn health() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "healthy".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        timestamp: Utc::now().to_rfc3339(),
    })
}

/// Client-facing health response.
#[derive(Serialize)]
pub struct ApiHealthResponse {
    pub status: String,
    pub timestamp: String,
    pub environment: String,
    pub bucket: String,
}

/// `GET /api/health`
pub async fn api_health(State(state): State<AppState>) -> Json<ApiHealthResponse> {
    Json(ApiHealthResponse {
        status: "OK".to_string(),
        timestamp: Utc::now().to_rfc3339(),
        environment: state.config.environment.clone(),
        bucket: state.forge.bucket_key().to_string(),
    })
}

/// Readiness check response.
#[derive(Serialize)]
pub struct ReadinessResponse {
    pub status: String,
    pub checks: ReadinessChecks,
}

#[derive(Serialize)]
pub struct ReadinessChecks {
    pub forge: CheckStatus,
}

#[derive(Serialize)]
pub struct CheckStatus {
    pub status: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub latency_ms: Option<u64>,
}

impl CheckStatus {
    fn ok(latency_ms: u64) -> Self {
        Self {
            status: "ok".to_string(),
            error: None,
            latency_ms: Some(latency_ms),
        }
    }

    fn error(msg: impl Into<String>) -> Self {
        Self {
            status: "error".to_string(),
            error: Some(msg.into()),
            latency_ms: None,
        }
    }
}

/// Readiness check endpoint (readiness probe).
/// Ready once Forge accepts our credentials.
pub async fn ready(
    State(state): State<AppState>,
) -> Result<Json<ReadinessResponse>, (StatusCode, Json<ReadinessResponse>)> {
    let start = Instant::now();
    let forge_check = match state.forge.access_token().await {
        Ok(_) => CheckStatus::ok(start.elapsed().as_millis() as u64),
        Err(e) => CheckStatus::error(e.to_string()),
    };

    let all_ok = forge_check.status == "ok";
    let response = ReadinessResponse {
        status: if all_ok { "ready" } else { "degraded" }.to_string(),
        checks: ReadinessChecks { forge: forge_check },
    };

    if all_ok {
        Ok(Json(response))
    } else {
        Err((StatusCode::SERVICE_UNAVAILABLE, Json(response)))
    }
}

/// Server info response.
#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct InfoResponse {
    pub server: String,
    pub version: String,
    pub environment: String,
    pub forge: ForgeInfo,
    pub supported_formats: Vec<String>,
    pub max_file_size: String,
    pub status: String,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ForgeInfo {
    pub bucket_key: String,
    pub base_url: String,
}

/// `GET /api/info`
pub async fn info(State(state): State<AppState>) -> Json<InfoResponse> {
    Json(InfoResponse {
        server: "CAD Viewer Server".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        environment: state.config.environment.clone(),
        forge: ForgeInfo {
            bucket_key: state.forge.bucket_key().to_string(),
            base_url: state.forge.config().base_url.clone(),
        },
        supported_formats: SUPPORTED_EXTENSIONS.iter().map(|s| s.to_string()).collect(),
        max_file_size: format!("{}MB", state.config.max_upload_mb()),
        status: "running".to_string(),
    })
}
