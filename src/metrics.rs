// Copyright (c) 2025 Erick Bourgeois, firestoned
// SPDX-License-Identifier: MIT

//! Prometheus metrics for zt-routes runs.
//!
//! All metrics use the namespace prefix `zt_routes_`. A run is a one-shot
//! process, so metrics are not served over HTTP. When `--metrics-file` is given
//! they are written in the Prometheus text format at the end of the run, ready
//! for a node-exporter textfile collector.
//!
//! # Example
//!
//! ```rust,no_run
//! use zt_routes::metrics::{record_run_success, gather_metrics};
//!
//! record_run_success("lookup", std::time::Duration::from_secs(1), 12);
//! let text = gather_metrics().unwrap();
//! ```

use crate::constants::METRICS_NAMESPACE;
use prometheus::{CounterVec, Encoder, GaugeVec, IntCounter, Opts, Registry, TextEncoder};
use std::path::Path;
use std::sync::LazyLock;
use std::time::Duration;

// ============================================================================
// Global Metrics Registry
// ============================================================================

/// Global Prometheus metrics registry
pub static METRICS_REGISTRY: LazyLock<Registry> = LazyLock::new(Registry::new);

// ============================================================================
// Run Metrics
// ============================================================================

/// Total number of runs by command and status
///
/// Labels:
/// - `command`: `sync` (network file), `lookup`, `add`, `clone`
/// - `status`: `success` or `error`
pub static RUNS_TOTAL: LazyLock<CounterVec> = LazyLock::new(|| {
    let opts = Opts::new(
        format!("{METRICS_NAMESPACE}_runs_total"),
        "Total number of runs by command and status",
    );
    let counter = CounterVec::new(opts, &["command", "status"]).unwrap();
    METRICS_REGISTRY
        .register(Box::new(counter.clone()))
        .unwrap();
    counter
});

/// Duration of the last run in seconds
///
/// Labels:
/// - `command`: The command that ran
pub static RUN_DURATION_SECONDS: LazyLock<GaugeVec> = LazyLock::new(|| {
    let opts = Opts::new(
        format!("{METRICS_NAMESPACE}_run_duration_seconds"),
        "Duration of the last run in seconds by command",
    );
    let gauge = GaugeVec::new(opts, &["command"]).unwrap();
    METRICS_REGISTRY.register(Box::new(gauge.clone())).unwrap();
    gauge
});

/// Unix timestamp of the last successful run
///
/// Labels:
/// - `command`: The command that ran
pub static LAST_SUCCESS_TIMESTAMP_SECONDS: LazyLock<GaugeVec> = LazyLock::new(|| {
    let opts = Opts::new(
        format!("{METRICS_NAMESPACE}_last_success_timestamp_seconds"),
        "Unix timestamp of the last successful run by command",
    );
    let gauge = GaugeVec::new(opts, &["command"]).unwrap();
    METRICS_REGISTRY.register(Box::new(gauge.clone())).unwrap();
    gauge
});

/// Number of routes in the table produced by the last successful run
///
/// Labels:
/// - `command`: The command that ran
pub static ROUTES: LazyLock<GaugeVec> = LazyLock::new(|| {
    let opts = Opts::new(
        format!("{METRICS_NAMESPACE}_routes"),
        "Number of routes in the table produced by the last successful run",
    );
    let gauge = GaugeVec::new(opts, &["command"]).unwrap();
    METRICS_REGISTRY.register(Box::new(gauge.clone())).unwrap();
    gauge
});

/// Total number of errors by kind
///
/// Labels:
/// - `kind`: Error category (e.g., `resolution_error`, `controller_error`)
pub static ERRORS_TOTAL: LazyLock<CounterVec> = LazyLock::new(|| {
    let opts = Opts::new(
        format!("{METRICS_NAMESPACE}_errors_total"),
        "Total number of errors by kind",
    );
    let counter = CounterVec::new(opts, &["kind"]).unwrap();
    METRICS_REGISTRY
        .register(Box::new(counter.clone()))
        .unwrap();
    counter
});

// ============================================================================
// Resolution Metrics
// ============================================================================

/// Total number of domains resolved
pub static DOMAINS_RESOLVED_TOTAL: LazyLock<IntCounter> = LazyLock::new(|| {
    let counter = IntCounter::new(
        format!("{METRICS_NAMESPACE}_domains_resolved_total"),
        "Total number of domains resolved",
    )
    .unwrap();
    METRICS_REGISTRY
        .register(Box::new(counter.clone()))
        .unwrap();
    counter
});

/// Total number of IPv6 addresses discarded during resolution
pub static IPV6_SKIPPED_TOTAL: LazyLock<IntCounter> = LazyLock::new(|| {
    let counter = IntCounter::new(
        format!("{METRICS_NAMESPACE}_ipv6_skipped_total"),
        "Total number of IPv6 addresses discarded during resolution",
    )
    .unwrap();
    METRICS_REGISTRY
        .register(Box::new(counter.clone()))
        .unwrap();
    counter
});

// ============================================================================
// Helper Functions
// ============================================================================

/// Record a successful run
///
/// # Arguments
/// * `command` - The command that ran
/// * `duration` - How long the run took
/// * `routes` - Number of routes in the resulting table
#[allow(clippy::cast_precision_loss)]
pub fn record_run_success(command: &str, duration: Duration, routes: usize) {
    RUNS_TOTAL.with_label_values(&[command, "success"]).inc();
    RUN_DURATION_SECONDS
        .with_label_values(&[command])
        .set(duration.as_secs_f64());
    LAST_SUCCESS_TIMESTAMP_SECONDS
        .with_label_values(&[command])
        .set(chrono::Utc::now().timestamp() as f64);
    ROUTES.with_label_values(&[command]).set(routes as f64);
}

/// Record a failed run
///
/// # Arguments
/// * `command` - The command that ran
/// * `duration` - How long the run took
/// * `kind` - Error category
pub fn record_run_error(command: &str, duration: Duration, kind: &str) {
    RUNS_TOTAL.with_label_values(&[command, "error"]).inc();
    RUN_DURATION_SECONDS
        .with_label_values(&[command])
        .set(duration.as_secs_f64());
    ERRORS_TOTAL.with_label_values(&[kind]).inc();
}

/// Record one resolved domain
pub fn record_domain_resolved() {
    DOMAINS_RESOLVED_TOTAL.inc();
}

/// Record one discarded IPv6 address
pub fn record_ipv6_skipped() {
    IPV6_SKIPPED_TOTAL.inc();
}

/// Gather and encode all metrics in Prometheus text format
///
/// # Returns
/// Prometheus-formatted metrics as a String
///
/// # Errors
/// Returns error if encoding fails
pub fn gather_metrics() -> Result<String, prometheus::Error> {
    let encoder = TextEncoder::new();
    let metric_families = METRICS_REGISTRY.gather();
    let mut buffer = Vec::new();
    encoder.encode(&metric_families, &mut buffer)?;
    String::from_utf8(buffer).map_err(|e| prometheus::Error::Msg(format!("UTF-8 error: {e}")))
}

/// Write all metrics to `path` in Prometheus text format
///
/// # Errors
/// Returns error if encoding fails or the file cannot be written
pub async fn write_metrics_file(path: &Path) -> anyhow::Result<()> {
    let text = gather_metrics()?;
    tokio::fs::write(path, text).await?;
    Ok(())
}
