// Copyright (c) 2025 Erick Bourgeois, firestoned
// SPDX-License-Identifier: MIT

//! Lifecycle phases and the pure step planner.
//!
//! [`plan`] decides what a reconcile pass does from the stored status alone, so the
//! decision is reproducible and testable without a cluster or a control plane.

use crate::crd::ResourceStatus;
use crate::reconcilers::status::{condition_reason, is_condition_true};
use crate::status_reasons::{CONDITION_TYPE_ERROR, CONDITION_TYPE_RUNNING, REASON_DEPENDENCY_MISSING};
use std::fmt;

/// Externally visible lifecycle of a declared record.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    /// Not yet created externally.
    Pending,
    /// A create or update was accepted, the external system is converging.
    Provisioning,
    /// Converged.
    Running,
    /// The last attempt failed.
    Degraded,
    /// Deletion requested, external cleanup pending.
    Deleting,
    /// External resource confirmed absent, finalizer released.
    Gone,
}

impl Phase {
    /// Derive the phase from stored status.
    #[must_use]
    pub fn of(status: &ResourceStatus, deletion_requested: bool) -> Self {
        if deletion_requested {
            Self::Deleting
        } else if is_condition_true(&status.conditions, CONDITION_TYPE_ERROR) {
            Self::Degraded
        } else if is_condition_true(&status.conditions, CONDITION_TYPE_RUNNING) {
            Self::Running
        } else if status.observed_generation.is_some() {
            Self::Provisioning
        } else {
            Self::Pending
        }
    }
}

impl fmt::Display for Phase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Pending => "Pending",
            Self::Provisioning => "Provisioning",
            Self::Running => "Running",
            Self::Degraded => "Degraded",
            Self::Deleting => "Deleting",
            Self::Gone => "Gone",
        };
        f.write_str(name)
    }
}

/// What one reconcile pass does.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Step {
    Create,
    Update,
    Replace,
    AwaitReady,
    Observe,
    Delete,
    /// A terminal failure for this generation; wait for a spec change.
    Blocked,
}

impl fmt::Display for Step {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Create => "create",
            Self::Update => "update",
            Self::Replace => "replace",
            Self::AwaitReady => "await-ready",
            Self::Observe => "observe",
            Self::Delete => "delete",
            Self::Blocked => "blocked",
        };
        f.write_str(name)
    }
}

/// Facts about the declared record that are not part of its status.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Observation {
    /// `metadata.generation`
    pub generation: i64,
    /// `metadata.deletionTimestamp` is set
    pub deletion_requested: bool,
    /// Fingerprint of the current source-secret value, if the record has a source
    pub source_fingerprint: Option<String>,
}

/// Choose the next step.
///
/// `replace_on_update` is set for kinds whose spec changes are realised as
/// delete-then-create.
#[must_use]
pub fn plan(status: &ResourceStatus, observation: &Observation, replace_on_update: bool) -> Step {
    if observation.deletion_requested {
        return Step::Delete;
    }

    if status.failed_generation == Some(observation.generation)
        && condition_reason(&status.conditions, CONDITION_TYPE_ERROR)
            != Some(REASON_DEPENDENCY_MISSING)
    {
        return Step::Blocked;
    }

    let Some(observed) = status.observed_generation else {
        return Step::Create;
    };
    if status.id.is_none() {
        return Step::Create;
    }

    if observed != observation.generation {
        return if replace_on_update {
            Step::Replace
        } else {
            Step::Update
        };
    }

    if observation.source_fingerprint.is_some()
        && observation.source_fingerprint != status.source_fingerprint
    {
        return Step::Update;
    }

    if is_condition_true(&status.conditions, CONDITION_TYPE_RUNNING) {
        Step::Observe
    } else {
        Step::AwaitReady
    }
}

#[cfg(test)]
#[path = "phase_tests.rs"]
mod phase_tests;
