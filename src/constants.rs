// Copyright (c) 2025 Erick Bourgeois, firestoned
// SPDX-License-Identifier: MIT

//! Global constants for the msop operator.
//!
//! This module contains all numeric and string constants used throughout the codebase.
//! Constants are organized by category for easy maintenance.

// ============================================================================
// API Constants
// ============================================================================

/// API group for all msop CRDs
pub const API_GROUP: &str = "msop.dev";

/// API version for all msop CRDs
pub const API_VERSION: &str = "v1alpha1";

/// Fully qualified API version (group/version)
pub const API_GROUP_VERSION: &str = "msop.dev/v1alpha1";

/// Kind name for `PostgreSQL` resource
pub const KIND_POSTGRESQL: &str = "PostgreSQL";

/// Kind name for `Kafka` resource
pub const KIND_KAFKA: &str = "Kafka";

/// Kind name for `ServiceUser` resource
pub const KIND_SERVICE_USER: &str = "ServiceUser";

/// Kind name for `Database` resource
pub const KIND_DATABASE: &str = "Database";

/// Kind name for `ConnectionPool` resource
pub const KIND_CONNECTION_POOL: &str = "ConnectionPool";

/// Kind name for `KafkaTopic` resource
pub const KIND_KAFKA_TOPIC: &str = "KafkaTopic";

/// Kind name for `KafkaACL` resource
pub const KIND_KAFKA_ACL: &str = "KafkaACL";

/// Kind name for `ProjectVPC` resource
pub const KIND_PROJECT_VPC: &str = "ProjectVPC";

/// Kind name for `ServiceIntegration` resource
pub const KIND_SERVICE_INTEGRATION: &str = "ServiceIntegration";

// ============================================================================
// Control Plane API Constants
// ============================================================================

/// Default base URL of the managed-service control plane
pub const DEFAULT_API_URL: &str = "https://api.aiven.io/v1";

/// Timeout for a single control plane HTTP request
pub const API_REQUEST_TIMEOUT_SECS: u64 = 30;

/// Default window for in-process retries of 429/5xx responses
pub const DEFAULT_API_RETRY_WINDOW_SECS: u64 = 30;

/// User-Agent sent with every control plane request
pub const USER_AGENT: &str = concat!("msop/", env!("CARGO_PKG_VERSION"));

/// External service state reported once a service has converged
pub const SERVICE_STATE_RUNNING: &str = "RUNNING";

/// External service state reported for a powered-off service
pub const SERVICE_STATE_POWEROFF: &str = "POWEROFF";

/// External state reported by topics and VPCs that are usable
pub const STATE_ACTIVE: &str = "ACTIVE";

/// External VPC state reported after deletion completed
pub const VPC_STATE_DELETED: &str = "DELETED";

/// Service type identifier for `PostgreSQL` services
pub const SERVICE_TYPE_POSTGRESQL: &str = "pg";

/// Service type identifier for `Kafka` services
pub const SERVICE_TYPE_KAFKA: &str = "kafka";

/// Integration state reported once a service integration is usable
pub const INTEGRATION_STATE_ACTIVE: &str = "active";

/// Pool size used when a `ConnectionPool` does not set one
pub const DEFAULT_POOL_SIZE: u32 = 10;

/// SSL mode written to secrets when the control plane does not report one
pub const DEFAULT_SSLMODE: &str = "require";

// ============================================================================
// Reconciliation Timing Constants
// ============================================================================

/// Default polling interval for not-yet-converged resources and retryable failures
pub const DEFAULT_POLL_INTERVAL_SECS: u64 = 15;

/// Default requeue interval for converged resources (5 minutes)
pub const DEFAULT_READY_REQUEUE_SECS: u64 = 300;

/// Default upper bound for a create or update to converge (20 minutes)
pub const DEFAULT_CREATION_TIMEOUT_SECS: u64 = 1200;

/// Default upper bound for external deletion to be confirmed (10 minutes)
pub const DEFAULT_DELETION_TIMEOUT_SECS: u64 = 600;

/// Consecutive transport failures tolerated before escalating to terminal
pub const DEFAULT_MAX_TRANSIENT_FAILURES: u32 = 10;

/// Default number of concurrent reconciles per kind
pub const DEFAULT_CONCURRENCY: u16 = 8;

/// Base delay for transport-failure requeues
pub const TRANSIENT_BACKOFF_BASE_SECS: u64 = 5;

// ============================================================================
// Controller Error Handling Constants
// ============================================================================

/// Requeue duration for controller errors (30 seconds)
pub const ERROR_REQUEUE_DURATION_SECS: u64 = 30;

// ============================================================================
// Secret Constants
// ============================================================================

/// Field manager used for server-side apply of materialized secrets
pub const FIELD_MANAGER: &str = "msop";

/// Default key holding a password in a source secret
pub const DEFAULT_PASSWORD_KEY: &str = "password";

// ============================================================================
// Leader Election Constants
// ============================================================================

/// Default leader election lease name
pub const DEFAULT_LEASE_NAME: &str = "msop-leader";

/// Default namespace holding the leader election lease
pub const DEFAULT_LEASE_NAMESPACE: &str = "msop-system";

/// Default leader election lease duration (15 seconds)
pub const DEFAULT_LEASE_DURATION_SECS: u64 = 15;

// ============================================================================
// Runtime Constants
// ============================================================================

/// Number of worker threads for Tokio runtime
pub const TOKIO_WORKER_THREADS: usize = 4;

// ============================================================================
// Metrics Server Constants
// ============================================================================

/// Port for Prometheus metrics HTTP server
pub const METRICS_SERVER_PORT: u16 = 8080;

/// Path for Prometheus metrics endpoint
pub const METRICS_SERVER_PATH: &str = "/metrics";

/// Bind address for metrics HTTP server
pub const METRICS_SERVER_BIND_ADDRESS: &str = "0.0.0.0";
