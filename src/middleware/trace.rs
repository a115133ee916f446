//! Per-request access log.

use std::time::Duration;

use tracing::{info, warn};

/// Emits the access-log event for a finished request. Server-side failures
/// are logged at `warn` so they stand out under the default filter.
pub(crate) fn record(method: &http::Method, path: &str, status: u16, elapsed: Duration) {
    let latency_ms = elapsed.as_secs_f64() * 1000.0;
    if status >= 500 {
        warn!(%method, path, status, latency_ms, "request");
    } else {
        info!(%method, path, status, latency_ms, "request");
    }
}
