// Copyright (c) 2025 Erick Bourgeois, firestoned
// SPDX-License-Identifier: MIT

//! Classified error taxonomy for reconciliation.
//!
//! Every adapter returns an [`OperatorError`]. The generic reconciler alone decides what
//! to do with it, based on [`OperatorError::class`]:
//!
//! | Class | Variants | Reconciler behaviour |
//! |-------|----------|----------------------|
//! | [`ErrorClass::NotFound`] | `NotFound` | Benign on delete and get-after-delete paths |
//! | [`ErrorClass::Retryable`] | `RetryLater`, `DependencyNotReady` | Requeue on the polling interval until the creation timeout |
//! | [`ErrorClass::Terminal`] | `Rejected`, `InvalidSpec`, `DependencyMissing`, `AdoptionRefused`, `Timeout` | Surface on `Error` condition, wait for a new generation |
//! | [`ErrorClass::Transient`] | `Transport` | Exponential requeue, escalated after repeated failure |
//!
//! `AlreadyExists` is never surfaced to users; the reconciler turns it into an adoption attempt.

use crate::status_reasons::{
    REASON_ADOPTION_REFUSED, REASON_DEPENDENCY_MISSING, REASON_DEPENDENCY_NOT_READY,
    REASON_INVALID_SPEC, REASON_KUBERNETES_ERROR, REASON_NOT_FOUND, REASON_REJECTED,
    REASON_RETRY_LATER, REASON_TIMEOUT, REASON_TRANSPORT_ERROR,
};
use thiserror::Error;

/// How the generic reconciler reacts to an error.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorClass {
    /// The resource is absent. Success on delete paths.
    NotFound,
    /// External system busy, conflicting, or a dependency not yet converged.
    Retryable,
    /// The spec cannot succeed as written. Stop until the generation changes.
    Terminal,
    /// Network or unexpected failure. Retry with backoff, escalate when repeated.
    Transient,
}

/// Errors returned by the control plane client, adapters and secret machinery.
#[derive(Error, Debug)]
pub enum OperatorError {
    /// The external resource (or its parent) does not exist.
    #[error("{resource} not found")]
    NotFound {
        /// Human-readable resource description (e.g. "service orders-db")
        resource: String,
    },

    /// A create collided with an existing external resource.
    #[error("{resource} already exists")]
    AlreadyExists {
        /// Human-readable resource description
        resource: String,
    },

    /// The control plane asked to try again later (busy, conflict, rate limited).
    #[error("control plane asked to retry later (HTTP {status}): {message}")]
    RetryLater {
        /// HTTP status code
        status: u16,
        /// Message returned by the control plane
        message: String,
    },

    /// The control plane rejected the request as invalid.
    #[error("rejected by control plane (HTTP {status}): {message}")]
    Rejected {
        /// HTTP status code
        status: u16,
        /// Message returned by the control plane
        message: String,
    },

    /// The declared record cannot be reconciled as written.
    #[error("invalid spec: {message}")]
    InvalidSpec {
        /// Explanation of what is invalid
        message: String,
    },

    /// A referenced record exists but has not converged.
    #[error("dependency not ready: {message}")]
    DependencyNotReady {
        /// Which dependency and why
        message: String,
    },

    /// A reference resolves to nothing at all.
    #[error("dependency missing: {message}")]
    DependencyMissing {
        /// Which dependency was not found
        message: String,
    },

    /// An existing external resource collided with the record but does not match it.
    #[error("refusing to adopt existing {resource}: {message}")]
    AdoptionRefused {
        /// Human-readable resource description
        resource: String,
        /// What differs
        message: String,
    },

    /// Network failure or unexpected response.
    #[error("transport error: {message}")]
    Transport {
        /// Underlying failure
        message: String,
    },

    /// An operation did not complete within its time budget.
    #[error("timed out: {message}")]
    Timeout {
        /// What timed out
        message: String,
    },

    /// The Kubernetes API server rejected or failed a request.
    #[error("Kubernetes API error: {0}")]
    Kube(#[from] kube::Error),
}

impl OperatorError {
    /// Classify this error for the reconciler.
    #[must_use]
    pub fn class(&self) -> ErrorClass {
        match self {
            Self::NotFound { .. } => ErrorClass::NotFound,
            Self::AlreadyExists { .. } | Self::RetryLater { .. } | Self::DependencyNotReady { .. } => {
                ErrorClass::Retryable
            }
            Self::Rejected { .. }
            | Self::InvalidSpec { .. }
            | Self::DependencyMissing { .. }
            | Self::AdoptionRefused { .. }
            | Self::Timeout { .. } => ErrorClass::Terminal,
            Self::Transport { .. } => ErrorClass::Transient,
            Self::Kube(err) => classify_kube_error(err),
        }
    }

    /// Condition reason written to `status.conditions` for this error.
    #[must_use]
    pub fn reason(&self) -> &'static str {
        match self {
            Self::NotFound { .. } => REASON_NOT_FOUND,
            Self::AlreadyExists { .. } | Self::RetryLater { .. } => REASON_RETRY_LATER,
            Self::Rejected { .. } => REASON_REJECTED,
            Self::InvalidSpec { .. } => REASON_INVALID_SPEC,
            Self::DependencyNotReady { .. } => REASON_DEPENDENCY_NOT_READY,
            Self::DependencyMissing { .. } => REASON_DEPENDENCY_MISSING,
            Self::AdoptionRefused { .. } => REASON_ADOPTION_REFUSED,
            Self::Transport { .. } => REASON_TRANSPORT_ERROR,
            Self::Timeout { .. } => REASON_TIMEOUT,
            Self::Kube(_) => REASON_KUBERNETES_ERROR,
        }
    }

    /// Returns true if this error means the resource is absent.
    #[must_use]
    pub fn is_not_found(&self) -> bool {
        self.class() == ErrorClass::NotFound
    }

    /// Returns true for a create collision.
    #[must_use]
    pub fn is_already_exists(&self) -> bool {
        matches!(self, Self::AlreadyExists { .. })
    }

    /// Shorthand for [`OperatorError::NotFound`].
    pub fn not_found(resource: impl Into<String>) -> Self {
        Self::NotFound {
            resource: resource.into(),
        }
    }

    /// Shorthand for [`OperatorError::InvalidSpec`].
    pub fn invalid_spec(message: impl Into<String>) -> Self {
        Self::InvalidSpec {
            message: message.into(),
        }
    }

    /// Shorthand for [`OperatorError::DependencyNotReady`].
    pub fn dependency_not_ready(message: impl Into<String>) -> Self {
        Self::DependencyNotReady {
            message: message.into(),
        }
    }

    /// Shorthand for [`OperatorError::DependencyMissing`].
    pub fn dependency_missing(message: impl Into<String>) -> Self {
        Self::DependencyMissing {
            message: message.into(),
        }
    }

    /// Shorthand for [`OperatorError::Transport`].
    pub fn transport(message: impl Into<String>) -> Self {
        Self::Transport {
            message: message.into(),
        }
    }
}

/// Classify a Kubernetes API error by its HTTP status code.
fn classify_kube_error(err: &kube::Error) -> ErrorClass {
    match err {
        kube::Error::Api(api_err) => match api_err.code {
            404 => ErrorClass::NotFound,
            409 | 429 => ErrorClass::Retryable,
            code if code >= 500 => ErrorClass::Retryable,
            code if code >= 400 => ErrorClass::Terminal,
            _ => ErrorClass::Transient,
        },
        _ => ErrorClass::Transient,
    }
}

#[cfg(test)]
#[path = "errors_tests.rs"]
mod errors_tests;
