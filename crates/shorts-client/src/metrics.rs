//! Service client metrics.
//!
//! - Request counters by operation and status
//! - Latency histograms
//! - Retrieval polling attempts

use metrics::{counter, histogram};

/// Metric name constants for consistency.
pub mod names {
    /// Total service requests by operation and status.
    pub const REQUESTS_TOTAL: &str = "shorts_service_requests_total";

    /// Request latency in seconds by operation.
    pub const LATENCY_SECONDS: &str = "shorts_service_latency_seconds";

    /// Retrieval GET attempts by outcome.
    pub const RETRIEVAL_ATTEMPTS_TOTAL: &str = "shorts_retrieval_attempts_total";
}

/// Record metrics for a completed service request.
pub fn record_request(operation: &str, status: u16, latency_ms: f64) {
    counter!(
        names::REQUESTS_TOTAL,
        "operation" => operation.to_string(),
        "status" => status.to_string()
    )
    .increment(1);

    histogram!(
        names::LATENCY_SECONDS,
        "operation" => operation.to_string()
    )
    .record(latency_ms / 1000.0);
}

/// Record one retrieval attempt.
pub fn record_retrieval_attempt(found: bool) {
    counter!(
        names::RETRIEVAL_ATTEMPTS_TOTAL,
        "outcome" => if found { "found" } else { "missing" }
    )
    .increment(1);
}
