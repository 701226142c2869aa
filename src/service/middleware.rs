//! Service middleware for request metrics and page build tracking.
//!
//! ## Metrics Exposed
//!
//! - `request` - request count and latency by path pattern, method, status
//! - `page_build` - time spent building an uncached page
//! - `reload` - pages dropped by a cache reload

use axum::{
    extract::Request,
    middleware::Next,
    response::Response,
};
use std::sync::OnceLock;
use std::time::Instant;
use tracing::info;

/// Metrics middleware that records request counts and latency.
///
/// Uses tracing; the log sink aggregates the `aco_atlas::metrics` target.
pub async fn metrics_middleware(request: Request, next: Next) -> Response {
    let start = Instant::now();
    let method = request.method().clone();
    let path = normalize_path(request.uri().path());

    let response = next.run(request).await;

    let latency = start.elapsed();
    let status = response.status().as_u16();

    info!(
        target: "aco_atlas::metrics",
        metric_type = "request",
        path = %path,
        method = %method,
        status = status,
        latency_ms = latency.as_millis() as u64,
        "request_metric"
    );

    response
}

/// Normalize path for metrics to avoid high cardinality.
///
/// Collapses the reference segment of `/api/osis/<reference>` into a placeholder.
fn normalize_path(path: &str) -> String {
    static OSIS_PATH: OnceLock<regex_lite::Regex> = OnceLock::new();
    let osis_regex = OSIS_PATH
        .get_or_init(|| regex_lite::Regex::new(r"^/api/osis/[^/]+$").unwrap());

    osis_regex.replace(path, "/api/osis/:reference").to_string()
}

/// Record how long an uncached page took to build.
pub fn record_page_build(page: &str, latency_ms: u64) {
    info!(
        target: "aco_atlas::metrics",
        metric_type = "page_build",
        page = page,
        latency_ms = latency_ms,
        "page_build_metric"
    );
}

/// Record a cache reload.
pub fn record_reload(cleared: usize, generation: u64) {
    info!(
        target: "aco_atlas::metrics",
        metric_type = "reload",
        cleared = cleared,
        generation = generation,
        "reload_metric"
    );
}
