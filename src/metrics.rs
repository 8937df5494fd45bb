// Copyright (c) 2025 Erick Bourgeois, firestoned
// SPDX-License-Identifier: MIT

//! Prometheus metrics and the probe server for the msop operator.
//!
//! All metrics carry the namespace prefix `msop`.
//!
//! # Metrics Categories
//!
//! - **Reconciliation Metrics** - Track reconciliation passes and their outcomes
//! - **Resource Lifecycle Metrics** - Track external creates, updates, replaces and deletes
//! - **Error Metrics** - Track errors by condition reason
//! - **Control Plane Metrics** - Track HTTP calls to the control plane
//! - **Leader Election Metrics** - Track leadership state changes
//!
//! The same HTTP listener serves `/metrics`, `/healthz` and `/readyz`.
//!
//! # Example
//!
//! ```rust,no_run
//! use msop::metrics::record_reconciliation_success;
//!
//! record_reconciliation_success("PostgreSQL", std::time::Duration::from_secs(1));
//! ```

use axum::{http::StatusCode, response::IntoResponse, routing::get, Router};
use prometheus::{
    CounterVec, Encoder, GaugeVec, HistogramOpts, HistogramVec, Opts, Registry, TextEncoder,
};
use std::net::SocketAddr;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::LazyLock;
use std::time::Duration;
use tracing::{error, info};

use crate::constants::{METRICS_SERVER_BIND_ADDRESS, METRICS_SERVER_PATH};

// ============================================================================
// Metric Name Constants
// ============================================================================

/// Namespace prefix for all msop metrics
const METRICS_NAMESPACE: &str = "msop";

// ============================================================================
// Global Metrics Registry
// ============================================================================

/// Global Prometheus metrics registry
///
/// All metrics are registered in this registry and exposed via `/metrics` endpoint.
pub static METRICS_REGISTRY: LazyLock<Registry> = LazyLock::new(Registry::new);

fn register_counter(name: &str, help: &str, labels: &[&str]) -> CounterVec {
    let opts = Opts::new(format!("{METRICS_NAMESPACE}_{name}"), help);
    let counter = CounterVec::new(opts, labels).unwrap();
    METRICS_REGISTRY
        .register(Box::new(counter.clone()))
        .unwrap();
    counter
}

// ============================================================================
// Reconciliation Metrics
// ============================================================================

/// Total number of reconciliations by kind and result
///
/// Labels:
/// - `kind`: Resource kind (e.g., `PostgreSQL`, `KafkaACL`)
/// - `result`: Outcome (`success`, `error`, `requeue`)
pub static RECONCILIATION_TOTAL: LazyLock<CounterVec> = LazyLock::new(|| {
    register_counter(
        "reconciliations_total",
        "Total number of reconciliations by kind and result",
        &["kind", "result"],
    )
});

/// Duration of reconciliations in seconds
pub static RECONCILIATION_DURATION_SECONDS: LazyLock<HistogramVec> = LazyLock::new(|| {
    let opts = HistogramOpts::new(
        format!("{METRICS_NAMESPACE}_reconciliation_duration_seconds"),
        "Duration of reconciliations in seconds by kind",
    )
    .buckets(vec![0.01, 0.1, 0.5, 1.0, 2.0, 5.0, 10.0, 30.0, 60.0, 120.0]);
    let histogram = HistogramVec::new(opts, &["kind"]).unwrap();
    METRICS_REGISTRY
        .register(Box::new(histogram.clone()))
        .unwrap();
    histogram
});

/// Total number of requeues
///
/// Labels:
/// - `kind`: Resource kind
/// - `reason`: Condition reason or `poll` while waiting for readiness
pub static REQUEUE_TOTAL: LazyLock<CounterVec> = LazyLock::new(|| {
    register_counter(
        "requeues_total",
        "Total number of requeue operations by kind and reason",
        &["kind", "reason"],
    )
});

// ============================================================================
// Resource Lifecycle Metrics
// ============================================================================

/// Total number of external resources created
pub static RESOURCES_CREATED_TOTAL: LazyLock<CounterVec> = LazyLock::new(|| {
    register_counter(
        "resources_created_total",
        "Total number of external resources created by kind",
        &["kind"],
    )
});

/// Total number of external resources updated in place
pub static RESOURCES_UPDATED_TOTAL: LazyLock<CounterVec> = LazyLock::new(|| {
    register_counter(
        "resources_updated_total",
        "Total number of external resources updated by kind",
        &["kind"],
    )
});

/// Total number of external resources replaced (delete then create)
pub static RESOURCES_REPLACED_TOTAL: LazyLock<CounterVec> = LazyLock::new(|| {
    register_counter(
        "resources_replaced_total",
        "Total number of external resources replaced by kind",
        &["kind"],
    )
});

/// Total number of external resources confirmed deleted
pub static RESOURCES_DELETED_TOTAL: LazyLock<CounterVec> = LazyLock::new(|| {
    register_counter(
        "resources_deleted_total",
        "Total number of external resources deleted by kind",
        &["kind"],
    )
});

// ============================================================================
// Error Metrics
// ============================================================================

/// Total number of errors by kind and condition reason
///
/// Labels:
/// - `kind`: Resource kind
/// - `reason`: Condition reason (`RetryLater`, `Rejected`, `TransportError`, ...)
pub static ERRORS_TOTAL: LazyLock<CounterVec> = LazyLock::new(|| {
    register_counter(
        "errors_total",
        "Total number of errors by kind and reason",
        &["kind", "reason"],
    )
});

// ============================================================================
// Control Plane Metrics
// ============================================================================

/// Total number of control plane HTTP requests
///
/// Labels:
/// - `method`: HTTP method
/// - `status`: Status class (`2xx`, `4xx`, `5xx`, `other`, `error`)
pub static CONTROL_PLANE_REQUESTS_TOTAL: LazyLock<CounterVec> = LazyLock::new(|| {
    register_counter(
        "control_plane_requests_total",
        "Total number of control plane HTTP requests by method and status class",
        &["method", "status"],
    )
});

// ============================================================================
// Leader Election Metrics
// ============================================================================

/// Total number of leader election events
///
/// Labels:
/// - `status`: Event type (`acquired`, `lost`)
pub static LEADER_ELECTIONS_TOTAL: LazyLock<CounterVec> = LazyLock::new(|| {
    register_counter(
        "leader_elections_total",
        "Total number of leader election events by status",
        &["status"],
    )
});

/// Current leader election status (1 = leader, 0 = follower)
pub static LEADER_STATUS: LazyLock<GaugeVec> = LazyLock::new(|| {
    let opts = Opts::new(
        format!("{METRICS_NAMESPACE}_leader_status"),
        "Current leader election status (1 = leader, 0 = follower)",
    );
    let gauge = GaugeVec::new(opts, &["pod_name"]).unwrap();
    METRICS_REGISTRY.register(Box::new(gauge.clone())).unwrap();
    gauge
});

// ============================================================================
// Helper Functions
// ============================================================================

/// Record a successful reconciliation
pub fn record_reconciliation_success(kind: &str, duration: Duration) {
    RECONCILIATION_TOTAL
        .with_label_values(&[kind, "success"])
        .inc();
    RECONCILIATION_DURATION_SECONDS
        .with_label_values(&[kind])
        .observe(duration.as_secs_f64());
}

/// Record a failed reconciliation
pub fn record_reconciliation_error(kind: &str, duration: Duration) {
    RECONCILIATION_TOTAL
        .with_label_values(&[kind, "error"])
        .inc();
    RECONCILIATION_DURATION_SECONDS
        .with_label_values(&[kind])
        .observe(duration.as_secs_f64());
}

/// Record a reconciliation requeue
///
/// # Arguments
/// * `kind` - The kind of resource reconciled
/// * `reason` - Condition reason, or `poll` while waiting for readiness
pub fn record_reconciliation_requeue(kind: &str, reason: &str) {
    RECONCILIATION_TOTAL
        .with_label_values(&[kind, "requeue"])
        .inc();
    REQUEUE_TOTAL.with_label_values(&[kind, reason]).inc();
}

/// Record an external create
pub fn record_resource_created(kind: &str) {
    RESOURCES_CREATED_TOTAL.with_label_values(&[kind]).inc();
}

/// Record an external in-place update
pub fn record_resource_updated(kind: &str) {
    RESOURCES_UPDATED_TOTAL.with_label_values(&[kind]).inc();
}

/// Record an external replace
pub fn record_resource_replaced(kind: &str) {
    RESOURCES_REPLACED_TOTAL.with_label_values(&[kind]).inc();
}

/// Record an external delete confirmed by a not-found read
pub fn record_resource_deleted(kind: &str) {
    RESOURCES_DELETED_TOTAL.with_label_values(&[kind]).inc();
}

/// Record an error by its condition reason
pub fn record_error(kind: &str, reason: &str) {
    ERRORS_TOTAL.with_label_values(&[kind, reason]).inc();
}

/// Record one control plane HTTP request
pub fn record_control_plane_request(method: &str, status: &str) {
    CONTROL_PLANE_REQUESTS_TOTAL
        .with_label_values(&[method, status])
        .inc();
}

/// Record leader election acquired
pub fn record_leader_elected(pod_name: &str) {
    LEADER_ELECTIONS_TOTAL
        .with_label_values(&["acquired"])
        .inc();
    LEADER_STATUS.with_label_values(&[pod_name]).set(1.0);
}

/// Record leader election lost
pub fn record_leader_lost(pod_name: &str) {
    LEADER_ELECTIONS_TOTAL.with_label_values(&["lost"]).inc();
    LEADER_STATUS.with_label_values(&[pod_name]).set(0.0);
}

/// Gather and encode all metrics in Prometheus text format
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

// ============================================================================
// Probe Server
// ============================================================================

/// Set once controllers are running (after leader election when enabled).
static READY: AtomicBool = AtomicBool::new(false);

/// Mark the operator ready or not ready for `/readyz`.
pub fn set_ready(ready: bool) {
    READY.store(ready, Ordering::SeqCst);
}

async fn metrics_handler() -> impl IntoResponse {
    match gather_metrics() {
        Ok(body) => (StatusCode::OK, body),
        Err(e) => (StatusCode::INTERNAL_SERVER_ERROR, e.to_string()),
    }
}

async fn readyz_handler() -> impl IntoResponse {
    if READY.load(Ordering::SeqCst) {
        (StatusCode::OK, "ready")
    } else {
        (StatusCode::SERVICE_UNAVAILABLE, "not ready")
    }
}

/// Routes served on the metrics port.
pub fn router() -> Router {
    Router::new()
        .route(METRICS_SERVER_PATH, get(metrics_handler))
        .route("/healthz", get(|| async { "ok" }))
        .route("/readyz", get(readyz_handler))
}

/// Serve metrics and probes until the process exits.
///
/// # Errors
/// Returns error if the address is invalid, the port cannot be bound or the server fails
pub async fn serve(port: u16) -> anyhow::Result<()> {
    let addr: SocketAddr = format!("{METRICS_SERVER_BIND_ADDRESS}:{port}").parse()?;
    let listener = tokio::net::TcpListener::bind(addr).await.map_err(|e| {
        error!(error = %e, port = port, "Failed to bind metrics port");
        e
    })?;
    info!(addr = %addr, "Metrics and probe server started");
    axum::serve(listener, router()).await?;
    Ok(())
}
