// Copyright (c) 2025 Erick Bourgeois, firestoned
// SPDX-License-Identifier: MIT

//! Operator configuration from command-line flags and environment variables.
//!
//! Every flag has an environment fallback so that the operator can be configured from
//! a Deployment manifest without arguments. Configuration is read once at startup and
//! shared read-only afterwards.

use crate::constants::{
    DEFAULT_API_RETRY_WINDOW_SECS, DEFAULT_API_URL, DEFAULT_CONCURRENCY,
    DEFAULT_CREATION_TIMEOUT_SECS, DEFAULT_DELETION_TIMEOUT_SECS, DEFAULT_LEASE_DURATION_SECS,
    DEFAULT_LEASE_NAME, DEFAULT_LEASE_NAMESPACE, DEFAULT_MAX_TRANSIENT_FAILURES,
    DEFAULT_POLL_INTERVAL_SECS, DEFAULT_READY_REQUEUE_SECS, METRICS_SERVER_PORT,
    TRANSIENT_BACKOFF_BASE_SECS,
};
use clap::Parser;
use std::time::Duration;

/// msop - reconciles managed-service custom resources against a control plane API
#[derive(Parser, Debug, Clone)]
#[command(name = "msop", version, about, long_about = None)]
pub struct OperatorConfig {
    /// Control plane API base URL
    #[arg(long, env = "MSOP_API_URL", default_value = DEFAULT_API_URL)]
    pub api_url: String,

    /// Control plane API token
    #[arg(long, env = "MSOP_API_TOKEN", hide_env_values = true)]
    pub api_token: String,

    /// Maximum number of concurrent reconciles per kind
    #[arg(long, env = "MSOP_CONCURRENCY", default_value_t = DEFAULT_CONCURRENCY)]
    pub concurrency: u16,

    /// Requeue interval while waiting for readiness or on retryable errors
    #[arg(long, env = "MSOP_POLL_INTERVAL_SECS", default_value_t = DEFAULT_POLL_INTERVAL_SECS)]
    pub poll_interval_secs: u64,

    /// Resync interval for converged records
    #[arg(long, env = "MSOP_READY_REQUEUE_SECS", default_value_t = DEFAULT_READY_REQUEUE_SECS)]
    pub ready_requeue_secs: u64,

    /// Time budget for a create or update to converge
    #[arg(long, env = "MSOP_CREATION_TIMEOUT_SECS", default_value_t = DEFAULT_CREATION_TIMEOUT_SECS)]
    pub creation_timeout_secs: u64,

    /// Time after which a stuck deletion is surfaced on the Error condition
    #[arg(long, env = "MSOP_DELETION_TIMEOUT_SECS", default_value_t = DEFAULT_DELETION_TIMEOUT_SECS)]
    pub deletion_timeout_secs: u64,

    /// Consecutive transport failures before escalating to a terminal error
    #[arg(long, env = "MSOP_MAX_TRANSIENT_FAILURES", default_value_t = DEFAULT_MAX_TRANSIENT_FAILURES)]
    pub max_transient_failures: u32,

    /// Window for in-call retries of 429 and 5xx responses
    #[arg(long, env = "MSOP_API_RETRY_WINDOW_SECS", default_value_t = DEFAULT_API_RETRY_WINDOW_SECS)]
    pub api_retry_window_secs: u64,

    /// Port for /metrics, /healthz and /readyz
    #[arg(long, env = "MSOP_METRICS_PORT", default_value_t = METRICS_SERVER_PORT)]
    pub metrics_port: u16,

    /// Run controllers only while holding the leader lease
    #[arg(long, env = "MSOP_LEADER_ELECTION", default_value_t = false)]
    pub leader_election: bool,

    /// Name of the leader election Lease
    #[arg(long, env = "MSOP_LEASE_NAME", default_value = DEFAULT_LEASE_NAME)]
    pub lease_name: String,

    /// Namespace of the leader election Lease
    #[arg(long, env = "POD_NAMESPACE", default_value = DEFAULT_LEASE_NAMESPACE)]
    pub lease_namespace: String,

    /// Lease duration in seconds
    #[arg(long, env = "MSOP_LEASE_DURATION_SECS", default_value_t = DEFAULT_LEASE_DURATION_SECS)]
    pub lease_duration_secs: u64,

    /// Leader election identity, defaults to the hostname
    #[arg(long, env = "POD_NAME")]
    pub identity: Option<String>,
}

/// Timing knobs of the generic reconciler.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ReconcileSettings {
    pub poll_interval: Duration,
    pub ready_requeue: Duration,
    pub creation_timeout: Duration,
    pub deletion_timeout: Duration,
    pub max_transient_failures: u32,
    pub transient_backoff_base: Duration,
}

impl Default for ReconcileSettings {
    fn default() -> Self {
        Self {
            poll_interval: Duration::from_secs(DEFAULT_POLL_INTERVAL_SECS),
            ready_requeue: Duration::from_secs(DEFAULT_READY_REQUEUE_SECS),
            creation_timeout: Duration::from_secs(DEFAULT_CREATION_TIMEOUT_SECS),
            deletion_timeout: Duration::from_secs(DEFAULT_DELETION_TIMEOUT_SECS),
            max_transient_failures: DEFAULT_MAX_TRANSIENT_FAILURES,
            transient_backoff_base: Duration::from_secs(TRANSIENT_BACKOFF_BASE_SECS),
        }
    }
}

impl OperatorConfig {
    /// Check cross-field constraints clap cannot express.
    ///
    /// # Errors
    ///
    /// Returns a description of the first violated constraint.
    pub fn validate(&self) -> Result<(), String> {
        let non_zero = [
            ("concurrency", u64::from(self.concurrency)),
            ("poll-interval-secs", self.poll_interval_secs),
            ("ready-requeue-secs", self.ready_requeue_secs),
            ("creation-timeout-secs", self.creation_timeout_secs),
            ("deletion-timeout-secs", self.deletion_timeout_secs),
            ("max-transient-failures", u64::from(self.max_transient_failures)),
            ("lease-duration-secs", self.lease_duration_secs),
        ];
        if let Some((name, _)) = non_zero.iter().find(|(_, value)| *value == 0) {
            return Err(format!("--{name} must be greater than zero"));
        }

        if self.poll_interval_secs > self.creation_timeout_secs {
            return Err(format!(
                "--poll-interval-secs ({}) must not exceed --creation-timeout-secs ({})",
                self.poll_interval_secs, self.creation_timeout_secs
            ));
        }
        if self.poll_interval_secs > self.deletion_timeout_secs {
            return Err(format!(
                "--poll-interval-secs ({}) must not exceed --deletion-timeout-secs ({})",
                self.poll_interval_secs, self.deletion_timeout_secs
            ));
        }
        if self.api_token.trim().is_empty() {
            return Err("--api-token must not be empty".to_string());
        }

        Ok(())
    }

    /// Reconciler timing derived from the flags.
    #[must_use]
    pub fn settings(&self) -> ReconcileSettings {
        ReconcileSettings {
            poll_interval: Duration::from_secs(self.poll_interval_secs),
            ready_requeue: Duration::from_secs(self.ready_requeue_secs),
            creation_timeout: Duration::from_secs(self.creation_timeout_secs),
            deletion_timeout: Duration::from_secs(self.deletion_timeout_secs),
            max_transient_failures: self.max_transient_failures,
            transient_backoff_base: Duration::from_secs(TRANSIENT_BACKOFF_BASE_SECS),
        }
    }

    /// In-call retry window of the control plane client.
    #[must_use]
    pub fn api_retry_window(&self) -> Duration {
        Duration::from_secs(self.api_retry_window_secs)
    }

    /// Leader election identity: `--identity`, then `HOSTNAME`, then a fixed fallback.
    #[must_use]
    pub fn leader_identity(&self) -> String {
        self.identity
            .clone()
            .or_else(|| std::env::var("HOSTNAME").ok())
            .filter(|id| !id.is_empty())
            .unwrap_or_else(|| "msop".to_string())
    }
}

#[cfg(test)]
#[path = "config_tests.rs"]
mod config_tests;
