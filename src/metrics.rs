/// Metrics and telemetry for the gallery service
///
/// Provides Prometheus-compatible metrics for monitoring:
/// - HTTP request counts and latencies
/// - Photo uploads
/// - Photo deletions and blob key lookups
use crate::error::{GalleryError, GalleryResult};
use lazy_static::lazy_static;
use prometheus::{
    register_histogram_vec, register_int_counter_vec, Encoder, HistogramVec, IntCounterVec,
    TextEncoder,
};

lazy_static! {
    // ========== HTTP Metrics ==========

    /// Total HTTP requests by method and status
    pub static ref HTTP_REQUESTS_TOTAL: IntCounterVec = register_int_counter_vec!(
        "gallery_http_requests_total",
        "Total number of HTTP requests",
        &["method", "status"]
    )
    .unwrap();

    /// HTTP request duration in seconds
    pub static ref HTTP_REQUEST_DURATION_SECONDS: HistogramVec = register_histogram_vec!(
        "gallery_http_request_duration_seconds",
        "HTTP request latencies in seconds",
        &["method"],
        vec![0.001, 0.005, 0.01, 0.025, 0.05, 0.1, 0.25, 0.5, 1.0, 2.5, 5.0, 10.0]
    )
    .unwrap();

    // ========== Gallery Metrics ==========

    /// Photo uploads by content type
    pub static ref PHOTO_UPLOADS_TOTAL: IntCounterVec = register_int_counter_vec!(
        "gallery_photo_uploads_total",
        "Total number of photos uploaded",
        &["content_type"]
    )
    .unwrap();

    /// Photo deletions by outcome (success, failure, cancelled, busy)
    pub static ref PHOTO_DELETIONS_TOTAL: IntCounterVec = register_int_counter_vec!(
        "gallery_photo_deletions_total",
        "Total number of photo deletion attempts",
        &["outcome"]
    )
    .unwrap();

    /// Blob delete attempts per candidate key (deleted, missing, error)
    pub static ref BLOB_KEY_ATTEMPTS_TOTAL: IntCounterVec = register_int_counter_vec!(
        "gallery_blob_key_attempts_total",
        "Blob deletion attempts against candidate storage keys",
        &["result"]
    )
    .unwrap();
}

/// Render metrics in Prometheus text format
pub fn render_metrics() -> GalleryResult<String> {
    let encoder = TextEncoder::new();
    let metric_families = prometheus::gather();
    let mut buffer = Vec::new();
    encoder
        .encode(&metric_families, &mut buffer)
        .map_err(|e| GalleryError::Internal(format!("Failed to encode metrics: {}", e)))?;
    String::from_utf8(buffer)
        .map_err(|e| GalleryError::Internal(format!("Metrics are not UTF-8: {}", e)))
}

/// Record an HTTP request
pub fn record_http_request(method: &str, status: u16, duration: f64) {
    HTTP_REQUESTS_TOTAL
        .with_label_values(&[method, &status.to_string()])
        .inc();
    HTTP_REQUEST_DURATION_SECONDS
        .with_label_values(&[method])
        .observe(duration);
}

/// Record a photo upload
pub fn record_photo_upload(content_type: &str) {
    PHOTO_UPLOADS_TOTAL.with_label_values(&[content_type]).inc();
}

/// Record a photo deletion outcome
pub fn record_photo_deletion(outcome: &str) {
    PHOTO_DELETIONS_TOTAL.with_label_values(&[outcome]).inc();
}

/// Record one candidate key attempt
pub fn record_blob_key_attempt(result: &str) {
    BLOB_KEY_ATTEMPTS_TOTAL.with_label_values(&[result]).inc();
}
