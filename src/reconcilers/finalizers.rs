// Copyright (c) 2025 Erick Bourgeois, firestoned
// SPDX-License-Identifier: MIT

//! Finalizer management for declared records.
//!
//! Every record carries [`FINALIZER`] from its first reconcile until the external
//! resource is confirmed absent, so deleting the record can never orphan it.
//!
//! # Example
//!
//! ```rust,no_run
//! use msop::crd::PostgreSQL;
//! use msop::labels::FINALIZER;
//! use msop::reconcilers::finalizers::{ensure_finalizer, remove_finalizer};
//! use kube::Client;
//!
//! async fn example(client: Client, pg: PostgreSQL) -> Result<(), msop::errors::OperatorError> {
//!     if pg.metadata.deletion_timestamp.is_none() {
//!         ensure_finalizer(&client, &pg, FINALIZER).await?;
//!     } else {
//!         // ...delete the external resource, then:
//!         remove_finalizer(&client, &pg, FINALIZER).await?;
//!     }
//!     Ok(())
//! }
//! ```
//!
//! [`FINALIZER`]: crate::labels::FINALIZER

use crate::errors::OperatorError;
use crate::reconcilers::retry::retry_api_call;
use crate::resource::ManagedResource;
use kube::api::{Patch, PatchParams};
use kube::{Api, Client, Resource, ResourceExt};
use serde_json::json;
use tracing::info;

/// True when `finalizer` is present on the resource.
#[must_use]
pub fn has_finalizer<T: Resource>(resource: &T, finalizer: &str) -> bool {
    resource
        .meta()
        .finalizers
        .as_ref()
        .is_some_and(|f| f.iter().any(|existing| existing == finalizer))
}

/// The resource's finalizers with `finalizer` appended, or `None` if already present.
#[must_use]
pub fn finalizers_with<T: Resource>(resource: &T, finalizer: &str) -> Option<Vec<String>> {
    if has_finalizer(resource, finalizer) {
        return None;
    }
    let mut finalizers = resource.meta().finalizers.clone().unwrap_or_default();
    finalizers.push(finalizer.to_string());
    Some(finalizers)
}

/// The resource's finalizers without `finalizer`, or `None` if it was absent.
#[must_use]
pub fn finalizers_without<T: Resource>(resource: &T, finalizer: &str) -> Option<Vec<String>> {
    if !has_finalizer(resource, finalizer) {
        return None;
    }
    let mut finalizers = resource.meta().finalizers.clone().unwrap_or_default();
    finalizers.retain(|f| f != finalizer);
    Some(finalizers)
}

/// Add a finalizer to a record if not already present.
///
/// Idempotent: nothing is written when the finalizer is already there.
///
/// # Errors
///
/// Returns an error if the API patch fails after retries.
pub async fn ensure_finalizer<K: ManagedResource>(
    client: &Client,
    record: &K,
    finalizer: &str,
) -> Result<(), OperatorError> {
    let Some(finalizers) = finalizers_with(record, finalizer) else {
        return Ok(());
    };

    let namespace = record.record_namespace();
    let name = record.name_any();
    info!("Adding finalizer {finalizer} to {} {namespace}/{name}", K::KIND);

    patch_finalizers::<K>(client, &namespace, &name, finalizers).await
}

/// Remove a finalizer from a record.
///
/// Idempotent: nothing is written when the finalizer is already absent. A record that
/// has already disappeared counts as success.
///
/// # Errors
///
/// Returns an error if the API patch fails after retries.
pub async fn remove_finalizer<K: ManagedResource>(
    client: &Client,
    record: &K,
    finalizer: &str,
) -> Result<(), OperatorError> {
    let Some(finalizers) = finalizers_without(record, finalizer) else {
        return Ok(());
    };

    let namespace = record.record_namespace();
    let name = record.name_any();
    info!("Removing finalizer {finalizer} from {} {namespace}/{name}", K::KIND);

    match patch_finalizers::<K>(client, &namespace, &name, finalizers).await {
        Err(OperatorError::Kube(kube::Error::Api(e))) if e.code == 404 => Ok(()),
        other => other,
    }
}

async fn patch_finalizers<K: ManagedResource>(
    client: &Client,
    namespace: &str,
    name: &str,
    finalizers: Vec<String>,
) -> Result<(), OperatorError> {
    let api: Api<K> = Api::namespaced(client.clone(), namespace);
    let patch = json!({ "metadata": { "finalizers": finalizers } });

    retry_api_call(
        || async {
            api.patch(name, &PatchParams::default(), &Patch::Merge(&patch))
                .await
        },
        &format!("patch finalizers of {} {namespace}/{name}", K::KIND),
    )
    .await?;
    Ok(())
}

#[cfg(test)]
#[path = "finalizers_tests.rs"]
mod finalizers_tests;
