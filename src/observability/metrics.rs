//! Metrics collection and exposition.
//!
//! # Metrics
//! - `workflow_executions_total` (counter): sagas by outcome
//! - `workflow_duration_seconds` (histogram): end-to-end saga latency
//! - `workflow_stage_total` (counter): per-stage outcomes
//! - `dependency_calls_total` (counter): outbound calls by dependency, outcome
//! - `dependency_call_duration_seconds` (histogram): outbound call latency
//! - `circuit_breaker_transitions_total` (counter): breaker state changes
//!
//! # Design Decisions
//! - Recording helpers keep call sites to one line
//! - Labels carry dependency/stage names, never per-request IDs
//! - Exposition via a Prometheus endpoint on its own listener

use metrics::{counter, histogram};
use metrics_exporter_prometheus::PrometheusBuilder;
use std::net::SocketAddr;
use std::time::Instant;

/// Install the Prometheus exporter on its own listener.
///
/// Must run inside the Tokio runtime; failure is logged and the service
/// continues without exposition.
pub fn init_metrics(addr: SocketAddr) {
    match PrometheusBuilder::new().with_http_listener(addr).install() {
        Ok(()) => tracing::info!(address = %addr, "metrics exporter listening"),
        Err(e) => tracing::error!(error = %e, "failed to install metrics exporter"),
    }
}

pub fn record_workflow(outcome: &'static str, start: Instant) {
    counter!("workflow_executions_total", "outcome" => outcome).increment(1);
    histogram!("workflow_duration_seconds", "outcome" => outcome)
        .record(start.elapsed().as_secs_f64());
}

pub fn record_stage(stage: &'static str, success: bool) {
    let outcome = if success { "success" } else { "failure" };
    counter!("workflow_stage_total", "stage" => stage, "outcome" => outcome).increment(1);
}

pub fn record_dependency_call(dependency: &str, outcome: &'static str, start: Instant) {
    counter!(
        "dependency_calls_total",
        "dependency" => dependency.to_string(),
        "outcome" => outcome
    )
    .increment(1);
    histogram!(
        "dependency_call_duration_seconds",
        "dependency" => dependency.to_string()
    )
    .record(start.elapsed().as_secs_f64());
}

pub fn record_breaker_transition(dependency: &str, to: &'static str) {
    counter!(
        "circuit_breaker_transitions_total",
        "dependency" => dependency.to_string(),
        "to" => to
    )
    .increment(1);
}
