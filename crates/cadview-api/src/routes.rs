//! API routes.

use axum::extract::{DefaultBodyLimit, OriginalUri};
use axum::http::StatusCode;
use axum::middleware;
use axum::routing::{get, post};
use axum::{Json, Router};
use metrics_exporter_prometheus::PrometheusHandle;
use serde_json::{json, Value};
use tower_http::timeout::TimeoutLayer;

use crate::handlers::{
    api_health, get_metadata, get_status, health, info, issue_token, ready, upload_file,
};
use crate::metrics::metrics_middleware;
use crate::middleware::{
    cors_layer, mask_internal_errors, request_id, request_logging, security_headers,
};
use crate::state::AppState;

/// Room for multipart boundaries and part headers on top of the file itself.
const MULTIPART_OVERHEAD: usize = 64 * 1024;

/// Create the API router.
pub fn create_router(state: AppState, metrics_handle: Option<PrometheusHandle>) -> Router {
    // Overflow surfaces as a multipart error, so the handler answers with the JSON 413
    let upload_routes = Router::new()
        .route("/upload", post(upload_file))
        .layer(DefaultBodyLimit::max(
            state.config.max_upload_size + MULTIPART_OVERHEAD,
        ));

    let api_routes = Router::new()
        .route("/health", get(api_health))
        .route("/info", get(info))
        .route("/auth/token", post(issue_token))
        .route("/status/:urn", get(get_status))
        .route("/model/:urn/metadata", get(get_metadata))
        .merge(upload_routes);

    let health_routes = Router::new()
        .route("/health", get(health))
        .route("/healthz", get(health))
        .route("/ready", get(ready));

    // Metrics endpoint (if enabled)
    let metrics_routes = if let Some(handle) = metrics_handle {
        Router::new().route("/metrics", get(move || async move { handle.render() }))
    } else {
        Router::new()
    };

    Router::new()
        .nest("/api", api_routes)
        .merge(health_routes)
        .merge(metrics_routes)
        .fallback(route_not_found)
        .layer(TimeoutLayer::new(state.config.request_timeout))
        .layer(middleware::from_fn_with_state(
            state.clone(),
            mask_internal_errors,
        ))
        .layer(middleware::from_fn(metrics_middleware))
        .layer(middleware::from_fn(security_headers))
        .layer(middleware::from_fn(request_id))
        .layer(middleware::from_fn(request_logging))
        .layer(cors_layer(&state.config.cors_origins))
        .with_state(state)
}

async fn route_not_found(OriginalUri(uri): OriginalUri) -> (StatusCode, Json<Value>) {
    (
        StatusCode::NOT_FOUND,
        Json(json!({
            "error": "Route not found",
            "path": uri.to_string(),
        })),
    )
}
