// Copyright (c) 2025 Erick Bourgeois, firestoned
// SPDX-License-Identifier: MIT

//! Prometheus metrics for the silence operator.
//!
//! All metrics live under the `silence_operator` namespace and are exposed
//! via the `/metrics` endpoint served from `main.rs`.
//!
//! # Example
//!
//! ```rust,no_run
//! use silence_operator::metrics::record_reconciliation_success;
//!
//! record_reconciliation_success("Silence", std::time::Duration::from_millis(40));
//! ```

use prometheus::{CounterVec, Encoder, HistogramOpts, HistogramVec, Opts, Registry, TextEncoder};
use std::sync::LazyLock;
use std::time::Duration;

/// Namespace prefix for all operator metrics
const METRICS_NAMESPACE: &str = "silence_operator";

/// Global Prometheus metrics registry.
pub static METRICS_REGISTRY: LazyLock<Registry> = LazyLock::new(Registry::new);

/// Total number of reconciliations by resource type and outcome.
///
/// Labels:
/// - `resource_type`: kind of resource (`Silence`, `RecurringSilence`)
/// - `status`: outcome (`success`, `error`)
pub static RECONCILIATION_TOTAL: LazyLock<CounterVec> = LazyLock::new(|| {
    let opts = Opts::new(
        format!("{METRICS_NAMESPACE}_reconciliations_total"),
        "Total number of reconciliations by resource type and status",
    );
    let counter = CounterVec::new(opts, &["resource_type", "status"]).unwrap();
    METRICS_REGISTRY
        .register(Box::new(counter.clone()))
        .unwrap();
    counter
});

/// Duration of reconciliations in seconds by resource type.
pub static RECONCILIATION_DURATION_SECONDS: LazyLock<HistogramVec> = LazyLock::new(|| {
    let opts = HistogramOpts::new(
        format!("{METRICS_NAMESPACE}_reconciliation_duration_seconds"),
        "Duration of reconciliations in seconds by resource type",
    )
    .buckets(vec![0.001, 0.01, 0.1, 0.5, 1.0, 2.0, 5.0, 10.0, 30.0, 60.0]);
    let histogram = HistogramVec::new(opts, &["resource_type"]).unwrap();
    METRICS_REGISTRY
        .register(Box::new(histogram.clone()))
        .unwrap();
    histogram
});

/// Total number of Alertmanager API requests by operation and outcome.
///
/// Labels:
/// - `operation`: API call performed (`list`, `create`, `update`, `delete`)
/// - `outcome`: `success` or `error`
pub static ALERTMANAGER_REQUESTS_TOTAL: LazyLock<CounterVec> = LazyLock::new(|| {
    let opts = Opts::new(
        format!("{METRICS_NAMESPACE}_alertmanager_requests_total"),
        "Total number of Alertmanager API requests by operation and outcome",
    );
    let counter = CounterVec::new(opts, &["operation", "outcome"]).unwrap();
    METRICS_REGISTRY
        .register(Box::new(counter.clone()))
        .unwrap();
    counter
});

/// Total number of silences materialized by the recurring scheduler.
pub static SILENCES_MATERIALIZED_TOTAL: LazyLock<CounterVec> = LazyLock::new(|| {
    let opts = Opts::new(
        format!("{METRICS_NAMESPACE}_silences_materialized_total"),
        "Total number of child silences materialized by RecurringSilence schedules",
    );
    let counter = CounterVec::new(opts, &["namespace"]).unwrap();
    METRICS_REGISTRY
        .register(Box::new(counter.clone()))
        .unwrap();
    counter
});

/// Record a successful reconciliation and its duration.
pub fn record_reconciliation_success(resource_type: &str, duration: Duration) {
    RECONCILIATION_TOTAL
        .with_label_values(&[resource_type, "success"])
        .inc();
    RECONCILIATION_DURATION_SECONDS
        .with_label_values(&[resource_type])
        .observe(duration.as_secs_f64());
}

/// Record a failed reconciliation and its duration.
pub fn record_reconciliation_error(resource_type: &str, duration: Duration) {
    RECONCILIATION_TOTAL
        .with_label_values(&[resource_type, "error"])
        .inc();
    RECONCILIATION_DURATION_SECONDS
        .with_label_values(&[resource_type])
        .observe(duration.as_secs_f64());
}

/// Record an Alertmanager API request and its outcome.
pub fn record_alertmanager_request(operation: &str, success: bool) {
    let outcome = if success { "success" } else { "error" };
    ALERTMANAGER_REQUESTS_TOTAL
        .with_label_values(&[operation, outcome])
        .inc();
}

/// Record a child silence materialization.
pub fn record_silence_materialized(namespace: &str) {
    SILENCES_MATERIALIZED_TOTAL
        .with_label_values(&[namespace])
        .inc();
}

/// Render all registered metrics in the Prometheus text format.
///
/// # Errors
///
/// Returns an error when encoding fails or the buffer is not valid UTF-8.
pub fn gather_metrics() -> Result<String, Box<dyn std::error::Error>> {
    let encoder = TextEncoder::new();
    let metric_families = METRICS_REGISTRY.gather();
    let mut buffer = Vec::new();
    encoder.encode(&metric_families, &mut buffer)?;
    Ok(String::from_utf8(buffer)?)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn recording_and_gathering_round_trips() {
        record_reconciliation_success("Silence", Duration::from_millis(5));
        record_reconciliation_error("RecurringSilence", Duration::from_millis(7));
        record_alertmanager_request("list", true);
        record_alertmanager_request("create", false);
        record_silence_materialized("org-acme");

        let rendered = gather_metrics().unwrap();
        assert!(rendered.contains("silence_operator_reconciliations_total"));
        assert!(rendered.contains("silence_operator_reconciliation_duration_seconds"));
        assert!(rendered.contains("silence_operator_alertmanager_requests_total"));
        assert!(rendered.contains("silence_operator_silences_materialized_total"));
    }

    #[test]
    fn alertmanager_request_outcomes_are_labelled() {
        record_alertmanager_request("delete", true);
        record_alertmanager_request("delete", false);

        let rendered = gather_metrics().unwrap();
        assert!(rendered.contains("operation=\"delete\",outcome=\"success\""));
        assert!(rendered.contains("operation=\"delete\",outcome=\"error\""));
    }
}
