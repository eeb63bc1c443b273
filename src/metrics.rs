//! Prometheus metrics for request and bootstrap monitoring.

use metrics::{counter, describe_counter};

// === Metric Name Constants ===

/// Requests served counter metric name.
pub const METRIC_HTTP_REQUESTS: &str = "http_requests_total";
/// Query failures counter metric name.
pub const METRIC_QUERY_FAILURES: &str = "query_failures_total";
/// Bootstrap attempts counter metric name.
pub const METRIC_BOOTSTRAP_ATTEMPTS: &str = "bootstrap_attempts_total";

/// Initialize all metric descriptions.
/// Call this once at startup to register metrics with descriptions.
pub fn init_metrics() {
    describe_counter!(METRIC_HTTP_REQUESTS, "Total number of HTTP requests served");
    describe_counter!(
        METRIC_QUERY_FAILURES,
        "Total number of database queries that failed"
    );
    describe_counter!(
        METRIC_BOOTSTRAP_ATTEMPTS,
        "Total number of bootstrap connection attempts"
    );
}

/// Record one served request for a route.
pub fn record_request(route: &'static str) {
    counter!(METRIC_HTTP_REQUESTS, "route" => route).increment(1);
}

/// Record one failed query.
pub fn record_query_failure() {
    counter!(METRIC_QUERY_FAILURES).increment(1);
}

/// Record one bootstrap connection attempt.
pub fn record_bootstrap_attempt() {
    counter!(METRIC_BOOTSTRAP_ATTEMPTS).increment(1);
}
