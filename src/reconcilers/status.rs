// Copyright (c) 2025 Erick Bourgeois, firestoned
// SPDX-License-Identifier: MIT

//! Status condition helpers.
//!
//! Every kind carries the same two conditions:
//! - `Running`: `True` once the external resource is converged
//! - `Error`: `True` when the last reconcile attempt failed
//!
//! # Condition Format
//!
//! - `type`: The aspect of the resource being reported
//! - `status`: "True", "False", or "Unknown"
//! - `reason`: A programmatic identifier (CamelCase)
//! - `message`: A human-readable explanation
//! - `lastTransitionTime`: RFC3339 timestamp of the last `status` flip
//!
//! # Example
//!
//! ```rust
//! use msop::reconcilers::status::{is_condition_true, update_condition_in_memory};
//!
//! let mut conditions = Vec::new();
//! update_condition_in_memory(
//!     &mut conditions,
//!     "Running",
//!     "True",
//!     "Running",
//!     "external state is RUNNING",
//!     "2025-01-01T00:00:00+00:00",
//! );
//! assert!(is_condition_true(&conditions, "Running"));
//! ```

use crate::crd::{Condition, ResourceStatus};
use crate::errors::OperatorError;
use crate::labels::{GENERATION_WAS_PROCESSED_ANNOTATION, INSTANCE_IS_RUNNING_ANNOTATION};
use crate::reconcilers::retry::retry_api_call;
use crate::resource::ManagedResource;
use crate::status_reasons::CONDITION_TYPE_RUNNING;
use kube::api::{Patch, PatchParams};
use kube::{Api, Client, ResourceExt};
use serde_json::json;
use std::collections::BTreeMap;
use tracing::debug;

/// Create a new condition stamped with `now`.
#[must_use]
pub fn create_condition(
    condition_type: &str,
    status: &str,
    reason: &str,
    message: &str,
    now: &str,
) -> Condition {
    Condition {
        r#type: condition_type.to_string(),
        status: status.to_string(),
        reason: Some(reason.to_string()),
        message: Some(message.to_string()),
        last_transition_time: Some(now.to_string()),
    }
}

/// Find a condition by type.
#[must_use]
pub fn find_condition<'a>(
    conditions: &'a [Condition],
    condition_type: &str,
) -> Option<&'a Condition> {
    conditions.iter().find(|c| c.r#type == condition_type)
}

/// True when the condition exists and its status is `True`.
#[must_use]
pub fn is_condition_true(conditions: &[Condition], condition_type: &str) -> bool {
    find_condition(conditions, condition_type).is_some_and(|c| c.status == "True")
}

/// Reason of a condition, if present.
#[must_use]
pub fn condition_reason<'a>(conditions: &'a [Condition], condition_type: &str) -> Option<&'a str> {
    find_condition(conditions, condition_type).and_then(|c| c.reason.as_deref())
}

/// Update or add a condition in a mutable conditions list (in-memory, no API call).
///
/// `lastTransitionTime` is preserved while `status` stays the same and set to `now`
/// when it flips.
pub fn update_condition_in_memory(
    conditions: &mut Vec<Condition>,
    condition_type: &str,
    status: &str,
    reason: &str,
    message: &str,
    now: &str,
) {
    if let Some(existing) = conditions.iter_mut().find(|c| c.r#type == condition_type) {
        let last_transition_time = if existing.status == status {
            existing
                .last_transition_time
                .clone()
                .unwrap_or_else(|| now.to_string())
        } else {
            now.to_string()
        };

        existing.status = status.to_string();
        existing.reason = Some(reason.to_string());
        existing.message = Some(message.to_string());
        existing.last_transition_time = Some(last_transition_time);
    } else {
        conditions.push(create_condition(
            condition_type,
            status,
            reason,
            message,
            now,
        ));
    }
}

/// Compare two condition lists ignoring `lastTransitionTime`.
#[must_use]
pub fn conditions_equal(current: &[Condition], new: &[Condition]) -> bool {
    if current.len() != new.len() {
        return false;
    }

    new.iter().all(|new_cond| {
        current.iter().any(|curr_cond| {
            curr_cond.r#type == new_cond.r#type
                && curr_cond.status == new_cond.status
                && curr_cond.reason == new_cond.reason
                && curr_cond.message == new_cond.message
        })
    })
}

/// True when `new` differs from `current` in anything a reader would care about.
///
/// Condition timestamps alone never justify a write.
#[must_use]
pub fn resource_status_changed(current: Option<&ResourceStatus>, new: &ResourceStatus) -> bool {
    let Some(current) = current else {
        return true;
    };

    !conditions_equal(&current.conditions, &new.conditions)
        || current.state != new.state
        || current.id != new.id
        || current.observed_generation != new.observed_generation
        || current.failed_generation != new.failed_generation
        || current.operation_started_at != new.operation_started_at
        || current.deletion_started_at != new.deletion_started_at
        || current.source_fingerprint != new.source_fingerprint
        || current.failed_attempts != new.failed_attempts
}

/// Write the whole status as a JSON merge patch on the status subresource.
///
/// `None` fields serialize as `null` and clear the stored value.
///
/// # Errors
///
/// Returns an error if the patch fails after retries.
pub async fn patch_status<K: ManagedResource>(
    client: &Client,
    record: &K,
    status: &ResourceStatus,
) -> Result<(), OperatorError> {
    let namespace = record.record_namespace();
    let name = record.name_any();
    let api: Api<K> = Api::namespaced(client.clone(), &namespace);
    let patch = json!({ "status": status });

    retry_api_call(
        || async {
            api.patch_status(&name, &PatchParams::default(), &Patch::Merge(&patch))
                .await
        },
        &format!("patch status of {} {namespace}/{name}", K::KIND),
    )
    .await?;

    debug!(
        kind = K::KIND,
        namespace = %namespace,
        name = %name,
        state = ?status.state,
        "Patched status"
    );
    Ok(())
}

/// Marker annotations describing `status`.
///
/// `generation-was-processed` is omitted until a mutation has been accepted.
#[must_use]
pub fn marker_annotations(status: &ResourceStatus) -> BTreeMap<String, String> {
    let mut markers = BTreeMap::from([(
        INSTANCE_IS_RUNNING_ANNOTATION.to_string(),
        is_condition_true(&status.conditions, CONDITION_TYPE_RUNNING).to_string(),
    )]);
    if let Some(generation) = status.observed_generation {
        markers.insert(
            GENERATION_WAS_PROCESSED_ANNOTATION.to_string(),
            generation.to_string(),
        );
    }
    markers
}

/// True when any marker differs from the record's current annotations.
#[must_use]
pub fn markers_changed<K: ManagedResource>(record: &K, markers: &BTreeMap<String, String>) -> bool {
    let current = record.annotations();
    markers
        .iter()
        .any(|(key, value)| current.get(key) != Some(value))
}

/// Merge the marker annotations into the record's metadata.
///
/// # Errors
///
/// Returns an error if the patch fails after retries.
pub async fn patch_markers<K: ManagedResource>(
    client: &Client,
    record: &K,
    markers: &BTreeMap<String, String>,
) -> Result<(), OperatorError> {
    let namespace = record.record_namespace();
    let name = record.name_any();
    let api: Api<K> = Api::namespaced(client.clone(), &namespace);
    let patch = json!({ "metadata": { "annotations": markers } });

    retry_api_call(
        || async {
            api.patch(&name, &PatchParams::default(), &Patch::Merge(&patch))
                .await
        },
        &format!("patch annotations of {} {namespace}/{name}", K::KIND),
    )
    .await?;
    Ok(())
}

#[cfg(test)]
#[path = "status_tests.rs"]
mod status_tests;
