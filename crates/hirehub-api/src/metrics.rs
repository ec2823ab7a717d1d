//! Prometheus metrics for the API server.

use std::time::Instant;

use axum::body::Body;
use axum::http::{Request, Response};
use axum::middleware::Next;
use metrics::{counter, gauge, histogram};
use metrics_exporter_prometheus::{PrometheusBuilder, PrometheusHandle};
use uuid::Uuid;

/// Initialize the Prometheus metrics recorder.
/// Returns a handle that can be used to render metrics.
pub fn init_metrics() -> PrometheusHandle {
    PrometheusBuilder::new()
        .install_recorder()
        .expect("Failed to install Prometheus recorder")
}

/// Metric names as constants for consistency.
pub mod names {
    pub const HTTP_REQUESTS_TOTAL: &str = "hirehub_http_requests_total";
    pub const HTTP_REQUEST_DURATION_SECONDS: &str = "hirehub_http_request_duration_seconds";
    pub const HTTP_REQUESTS_IN_FLIGHT: &str = "hirehub_http_requests_in_flight";

    pub const APPLICATIONS_SUBMITTED_TOTAL: &str = "hirehub_applications_submitted_total";
    pub const STATUS_TRANSITIONS_TOTAL: &str = "hirehub_status_transitions_total";
    pub const PRESIGNED_URLS_TOTAL: &str = "hirehub_presigned_urls_total";

    pub const RATE_LIMIT_HITS_TOTAL: &str = "hirehub_rate_limit_hits_total";
}

/// Record an HTTP request.
pub fn record_http_request(method: &str, path: &str, status: u16, duration_secs: f64) {
    let labels = [
        ("method", method.to_string()),
        ("path", sanitize_path(path)),
        ("status", status.to_string()),
    ];

    counter!(names::HTTP_REQUESTS_TOTAL, &labels).increment(1);
    histogram!(names::HTTP_REQUEST_DURATION_SECONDS, &labels).record(duration_secs);
}

/// Record an application submission.
pub fn record_application_submitted() {
    counter!(names::APPLICATIONS_SUBMITTED_TOTAL).increment(1);
}

/// Record an application status transition.
pub fn record_status_transition(to: &str) {
    let labels = [("to", to.to_string())];
    counter!(names::STATUS_TRANSITIONS_TOTAL, &labels).increment(1);
}

/// Record a presigned upload URL being issued.
pub fn record_presigned_url() {
    counter!(names::PRESIGNED_URLS_TOTAL).increment(1);
}

/// Record rate limit hit.
pub fn record_rate_limit_hit(endpoint: &str) {
    let labels = [("endpoint", sanitize_path(endpoint))];
    counter!(names::RATE_LIMIT_HITS_TOTAL, &labels).increment(1);
}

/// Sanitize path for metrics labels so per-id routes collapse into one series.
fn sanitize_path(path: &str) -> String {
    path.split('/')
        .map(|segment| {
            if Uuid::parse_str(segment).is_ok() || looks_like_doc_id(segment) {
                ":id"
            } else {
                segment
            }
        })
        .collect::<Vec<_>>()
        .join("/")
}

// Document ids are prefixed hashes (u_..., a_...) or long hex runs.
fn looks_like_doc_id(segment: &str) -> bool {
    if segment.starts_with("u_") || segment.starts_with("a_") {
        return segment.len() > 8;
    }
    segment.len() >= 16 && segment.chars().all(|c| c.is_ascii_hexdigit())
}

/// Metrics middleware for HTTP requests.
pub async fn metrics_middleware(request: Request<Body>, next: Next) -> Response<Body> {
    let method = request.method().to_string();
    let path = request.uri().path().to_string();
    let start = Instant::now();

    gauge!(names::HTTP_REQUESTS_IN_FLIGHT).increment(1.0);

    let response = next.run(request).await;

    gauge!(names::HTTP_REQUESTS_IN_FLIGHT).decrement(1.0);

    let status = response.status().as_u16();
    let duration = start.elapsed().as_secs_f64();

    record_http_request(&method, &path, status, duration);

    response
}
