//! Prometheus metrics for poll cycles and probe latency.
//!
//! This module provides metrics for:
//! - Poll cycles run and failed
//! - Per-probe request latency
//! - Last observed liveness/readiness flags

use std::time::Instant;

use metrics::{counter, describe_counter, describe_gauge, describe_histogram, gauge, histogram};
use metrics_exporter_prometheus::{BuildError, PrometheusBuilder, PrometheusHandle};
use tracing::debug;

use crate::monitor::HealthStatus;
use crate::probe::ProbeKind;

// === Metric Name Constants ===

/// Poll cycles counter metric name.
pub const METRIC_POLL_CYCLES: &str = "health_poll_cycles_total";
/// Failed poll cycles counter metric name.
pub const METRIC_POLL_FAILURES: &str = "health_poll_failures_total";
/// Probe request latency metric name.
pub const METRIC_PROBE_LATENCY: &str = "health_probe_latency_ms";
/// Probe up gauge metric name.
pub const METRIC_PROBE_UP: &str = "health_probe_up";

/// Install the Prometheus recorder and register metric descriptions.
/// Call this once at startup.
pub fn init_metrics() -> Result<PrometheusHandle, BuildError> {
    let handle = PrometheusBuilder::new().install_recorder()?;

    describe_counter!(METRIC_POLL_CYCLES, "Total number of settled poll cycles");
    describe_counter!(
        METRIC_POLL_FAILURES,
        "Total number of poll cycles where a health query failed"
    );
    describe_histogram!(
        METRIC_PROBE_LATENCY,
        "Health endpoint request latency in milliseconds"
    );
    describe_gauge!(
        METRIC_PROBE_UP,
        "1 if the probe reported UP in the last cycle, 0 otherwise"
    );

    debug!("Metrics initialized");
    Ok(handle)
}

/// Record latency of one probe request.
pub fn record_probe_latency(start: Instant, kind: ProbeKind) {
    let latency_ms = start.elapsed().as_secs_f64() * 1000.0;
    histogram!(METRIC_PROBE_LATENCY, "probe" => kind.to_string()).record(latency_ms);
}

/// Record the outcome of a settled poll cycle.
pub fn record_cycle(status: &HealthStatus) {
    counter!(METRIC_POLL_CYCLES).increment(1);
    if status.error().is_some() {
        counter!(METRIC_POLL_FAILURES).increment(1);
    }

    for (kind, up) in [
        (ProbeKind::Liveness, status.live()),
        (ProbeKind::Readiness, status.ready()),
    ] {
        gauge!(METRIC_PROBE_UP, "probe" => kind.to_string()).set(if up { 1.0 } else { 0.0 });
    }
}
