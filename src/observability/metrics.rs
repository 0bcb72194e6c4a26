//! Metrics collection and exposition.
//!
//! # Metrics
//! - `drr_admission_reviews_total` (counter): reviews by operation, verdict
//! - `drr_admission_violations_total` (counter): rejected checks by violation kind
//! - `drr_admission_duration_seconds` (histogram): time to reach a verdict
//!
//! # Design Decisions
//! - Recording without an installed exporter is a no-op
//! - Prometheus exporter runs its own HTTP listener

use std::net::SocketAddr;
use std::time::Instant;

use metrics::{counter, histogram};
use metrics_exporter_prometheus::{BuildError, PrometheusBuilder};

/// Install the Prometheus recorder and its scrape endpoint.
pub fn init_metrics(addr: SocketAddr) -> Result<(), BuildError> {
    PrometheusBuilder::new().with_http_listener(addr).install()?;
    tracing::info!(address = %addr, "Metrics endpoint listening");
    Ok(())
}

/// Record one admission verdict.
pub fn record_review(operation: &'static str, allowed: bool, start_time: Instant) {
    let allowed = if allowed { "true" } else { "false" };
    counter!("drr_admission_reviews_total", "operation" => operation, "allowed" => allowed).increment(1);
    histogram!("drr_admission_duration_seconds", "operation" => operation)
        .record(start_time.elapsed().as_secs_f64());
}

/// Record one failed check.
pub fn record_violation(kind: &'static str) {
    counter!("drr_admission_violations_total", "kind" => kind).increment(1);
}
