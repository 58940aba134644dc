//! Prometheus metrics for the API server.

use std::time::Instant;

use axum::body::Body;
use axum::extract::MatchedPath;
use axum::http::{Request, Response};
use axum::middleware::Next;
use metrics::{counter, gauge, histogram};
use metrics_exporter_prometheus::{BuildError, PrometheusBuilder, PrometheusHandle};

/// Initialize the Prometheus metrics recorder.
/// Returns a handle that can be used to render metrics.
pub fn init_metrics() -> Result<PrometheusHandle, BuildError> {
    PrometheusBuilder::new().install_recorder()
}

/// Metric names as constants for consistency.
pub mod names {
    // HTTP metrics
    pub const HTTP_REQUESTS_TOTAL: &str = "cadview_http_requests_total";
    pub const HTTP_REQUEST_DURATION_SECONDS: &str = "cadview_http_request_duration_seconds";
    pub const HTTP_REQUESTS_IN_FLIGHT: &str = "cadview_http_requests_in_flight";

    // Upload metrics
    pub const UPLOADS_TOTAL: &str = "cadview_uploads_total";
    pub const UPLOAD_BYTES: &str = "cadview_upload_bytes";
}

/// Path label for requests that matched no route.
pub const UNMATCHED_PATH: &str = "unmatched";

/// Record an HTTP request. `path` is the route template, never the raw URI.
pub fn record_http_request(method: &str, path: &str, status: u16, duration_secs: f64) {
    let labels = [
        ("method", method.to_string()),
        ("path", path.to_string()),
        ("status", status.to_string()),
    ];

    counter!(names::HTTP_REQUESTS_TOTAL, &labels).increment(1);
    histogram!(names::HTTP_REQUEST_DURATION_SECONDS, &labels).record(duration_secs);
}

/// Record an accepted upload.
pub fn record_upload(extension: &str, bytes: usize) {
    let labels = [("extension", extension.to_string())];
    counter!(names::UPLOADS_TOTAL, &labels).increment(1);
    histogram!(names::UPLOAD_BYTES, &labels).record(bytes as f64);
}

/// Route template for the label, so URNs and unknown paths stay bounded.
fn path_label<B>(request: &Request<B>) -> String {
    request
        .extensions()
        .get::<MatchedPath>()
        .map(|p| p.as_str().to_string())
        .unwrap_or_else(|| UNMATCHED_PATH.to_string())
}

/// Metrics middleware for HTTP requests.
pub async fn metrics_middleware(request: Request<Body>, next: Next) -> Response<Body> {
    let method = request.method().to_string();
    let path = path_label(&request);
    let start = Instant::now();

    gauge!(names::HTTP_REQUESTS_IN_FLIGHT).increment(1.0);

    let response = next.run(request).await;

    gauge!(names::HTTP_REQUESTS_IN_FLIGHT).decrement(1.0);

    let status = response.status().as_u16();
    let duration = start.elapsed().as_secs_f64();

    record_http_request(&method, &path, status, duration);

    response
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_path_label_without_route_is_unmatched() {
        let request = Request::builder()
            .uri("/api/status/dXJuOmFkc2sub2JqZWN0cw")
            .body(())
            .unwrap();
        assert_eq!(path_label(&request), UNMATCHED_PATH);

        let request = Request::builder().uri("/wp-login.php").body(()).unwrap();
        assert_eq!(path_label(&request), UNMATCHED_PATH);
    }
}
