//! Axum HTTP API server.
//!
//! This crate provides:
//! - CAD upload endpoint that stores the file in Forge and starts translation
//! - Translation status polling and model metadata passthrough
//! - Viewer access tokens
//! - Health, readiness, info and Prometheus endpoints

pub mod config;
pub mod error;
pub mod formats;
pub mod handlers;
pub mod metrics;
pub mod middleware;
pub mod routes;
pub mod state;

pub use config::ApiConfig;
pub use error::{ApiError, ApiResult};
pub use routes::create_router;
pub use state::AppState;
