// Copyright (c) 2025 Erick Bourgeois, firestoned
// SPDX-License-Identifier: MIT

//! Common label, annotation and finalizer constants used across all reconcilers.
//!
//! This module defines standard Kubernetes labels and msop-specific labels/annotations
//! to ensure consistency across all resources written by the controller.

// ============================================================================
// Kubernetes Standard Labels
// https://kubernetes.io/docs/concepts/overview/working-with-objects/common-labels/
// ============================================================================

/// Standard label for the tool being used to manage the operation of an application
pub const K8S_MANAGED_BY: &str = "app.kubernetes.io/managed-by";

/// Standard label for the name of a higher-level application this one is part of
pub const K8S_PART_OF: &str = "app.kubernetes.io/part-of";

// ============================================================================
// Kubernetes Standard Label Values
// ============================================================================

/// Value for `app.kubernetes.io/managed-by` on secrets written by the operator
pub const MANAGED_BY_MSOP: &str = "msop";

// ============================================================================
// msop-Specific Labels
// ============================================================================

/// Label carrying the kind of the record that owns a materialized secret
pub const MSOP_OWNER_KIND_LABEL: &str = "msop.dev/owner-kind";

/// Label carrying the name of the record that owns a materialized secret
pub const MSOP_OWNER_NAME_LABEL: &str = "msop.dev/owner-name";

// ============================================================================
// msop-Specific Annotations
// ============================================================================

/// Annotation set to "true" once the external resource converged
pub const INSTANCE_IS_RUNNING_ANNOTATION: &str = "controllers.msop.dev/instance-is-running";

/// Annotation holding the generation whose mutation was applied externally
pub const GENERATION_WAS_PROCESSED_ANNOTATION: &str =
    "controllers.msop.dev/generation-was-processed";

// ============================================================================
// Finalizers
// ============================================================================

/// Finalizer shared by every managed resource kind
pub const FINALIZER: &str = "msop.dev/finalizer";
