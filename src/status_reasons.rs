// Copyright (c) 2025 Erick Bourgeois, firestoned
// SPDX-License-Identifier: MIT

//! Standard Kubernetes status condition types and reasons for msop resources.
//!
//! Reasons are programmatic identifiers in CamelCase that explain why a condition has
//! a particular status.
//!
//! # Condition Types
//!
//! Every managed resource carries two conditions:
//!
//! - **`Running`** - `True` once the external resource has converged to the declared spec
//! - **`Error`** - `True` while the last reconcile attempt failed
//!
//! # Example Status
//!
//! ```yaml
//! status:
//!   state: REBUILDING
//!   conditions:
//!     - type: Running
//!       status: "False"
//!       reason: Provisioning
//!       message: "Waiting for PostgreSQL orders-db to become ready (state: REBUILDING)"
//!     - type: Error
//!       status: "False"
//!       reason: Reconciled
//!       message: ""
//! ```

// ============================================================================
// Condition Types
// ============================================================================

/// Condition type reporting convergence of the external resource.
pub const CONDITION_TYPE_RUNNING: &str = "Running";

/// Condition type reporting the last reconcile failure.
pub const CONDITION_TYPE_ERROR: &str = "Error";

// ============================================================================
// Running Reasons
// ============================================================================

/// External resource converged and connection info is materialized.
pub const REASON_RUNNING: &str = "Running";

/// A create, update or replace was accepted and the external system is converging.
pub const REASON_PROVISIONING: &str = "Provisioning";

/// Nothing has been created externally yet.
pub const REASON_PENDING: &str = "Pending";

/// Deletion was requested and external cleanup is in progress.
pub const REASON_DELETING: &str = "Deleting";

/// The external resource disappeared out-of-band and will be re-created.
pub const REASON_EXTERNALLY_DELETED: &str = "ExternallyDeleted";

// ============================================================================
// Error Reasons
// ============================================================================

/// The last reconcile attempt succeeded.
pub const REASON_RECONCILED: &str = "Reconciled";

/// The control plane asked to retry later (busy, conflict, rate limit).
pub const REASON_RETRY_LATER: &str = "RetryLater";

/// The control plane rejected the request (validation, quota, immutable field).
///
/// Retries stop until the record's generation changes.
pub const REASON_REJECTED: &str = "Rejected";

/// The record itself is invalid in a way the control plane never sees.
pub const REASON_INVALID_SPEC: &str = "InvalidSpec";

/// A referenced record exists but is not `Running` yet.
pub const REASON_DEPENDENCY_NOT_READY: &str = "DependencyNotReady";

/// A reference does not resolve to any record or external resource.
pub const REASON_DEPENDENCY_MISSING: &str = "DependencyMissing";

/// A create collided with an existing external resource that does not match the record.
pub const REASON_ADOPTION_REFUSED: &str = "AdoptionRefused";

/// Network failure or unexpected response from the control plane.
pub const REASON_TRANSPORT_ERROR: &str = "TransportError";

/// Too many consecutive transport failures.
pub const REASON_TRANSPORT_EXHAUSTED: &str = "TransportRetriesExhausted";

/// The Kubernetes API server rejected or failed a request.
pub const REASON_KUBERNETES_ERROR: &str = "KubernetesError";

/// A create or update did not converge within the creation timeout.
pub const REASON_TIMEOUT: &str = "Timeout";

/// External deletion was not confirmed within the deletion timeout.
pub const REASON_DELETION_TIMEOUT: &str = "DeletionTimeout";

/// External resource reported not-found where it was expected to exist.
pub const REASON_NOT_FOUND: &str = "NotFound";
