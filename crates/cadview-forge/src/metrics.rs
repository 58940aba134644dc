//! Forge metrics collection.
//!
//! Provides standardized metrics for monitoring Forge operations:
//! - Request counters by operation and status
//! - Latency histograms
//! - Token refresh counter

use metrics::{counter, histogram};

// =============================================================================
// Metric Names
// =============================================================================

/// Metric name constants for consistency.
pub mod names {
    /// Total Forge requests by operation and status.
    pub const REQUESTS_TOTAL: &str = "forge_requests_total";

    /// Request latency in seconds by operation.
    pub const LATENCY_SECONDS: &str = "forge_latency_seconds";

    /// Total client-credentials exchanges.
    pub const TOKEN_REFRESHES_TOTAL: &str = "forge_token_refreshes_total";

    /// Bucket provisioning outcomes.
    pub const BUCKET_PROVISION_TOTAL: &str = "forge_bucket_provision_total";
}

// =============================================================================
// Recording Functions
// =============================================================================

/// Record metrics for a completed Forge request.
pub fn record_request(operation: &str, status: u16, latency_ms: f64) {
    let status_str = status.to_string();

    counter!(
        names::REQUESTS_TOTAL,
        "operation" => operation.to_string(),
        "status" => status_str
    )
    .increment(1);

    histogram!(
        names::LATENCY_SECONDS,
        "operation" => operation.to_string()
    )
    .record(latency_ms / 1000.0);
}

/// Record a token exchange.
pub fn record_token_refresh() {
    counter!(names::TOKEN_REFRESHES_TOTAL).increment(1);
}

/// Record a bucket provisioning outcome.
pub fn record_bucket_provision(outcome: &'static str) {
    counter!(names::BUCKET_PROVISION_TOTAL, "outcome" => outcome).increment(1);
}

// =============================================================================
// Tests
// =============================================================================
