// Copyright (c) 2025 Erick Bourgeois, firestoned
// SPDX-License-Identifier: MIT

//! Connection-info secret materialization.
//!
//! The secret is named after `connInfoSecretTarget.name` (or the record), every key is
//! `<PREFIX><KEY>`, and it carries a controller owner reference so Kubernetes removes it
//! together with the record. Writes are server-side applies, which makes them upserts.

use crate::reconcilers::adapter::ConnectionInfo;
use crate::constants::FIELD_MANAGER;
use crate::errors::OperatorError;
use crate::labels::{K8S_MANAGED_BY, MANAGED_BY_MSOP, MSOP_OWNER_KIND_LABEL, MSOP_OWNER_NAME_LABEL};
use crate::reconcilers::retry::retry_api_call;
use crate::resource::ManagedResource;
use k8s_openapi::api::core::v1::Secret;
use k8s_openapi::apimachinery::pkg::apis::meta::v1::ObjectMeta;
use k8s_openapi::ByteString;
use kube::api::{Patch, PatchParams};
use kube::{Api, Client, ResourceExt};
use std::collections::BTreeMap;
use tracing::{debug, info};

/// Name of the secret written for `record`.
#[must_use]
pub fn secret_name<K: ManagedResource>(record: &K) -> String {
    record
        .conn_info_secret_target()
        .and_then(|target| target.name.clone())
        .unwrap_or_else(|| record.name_any())
}

/// Key prefix for `record`, or `None` if its kind writes no secret.
#[must_use]
pub fn key_prefix<K: ManagedResource>(record: &K) -> Option<String> {
    let default = K::SECRET_PREFIX?;
    Some(
        record
            .conn_info_secret_target()
            .and_then(|target| target.prefix.clone())
            .unwrap_or_else(|| default.to_string()),
    )
}

/// True when a secret should be written for `record`.
#[must_use]
pub fn should_materialize<K: ManagedResource>(record: &K) -> bool {
    K::SECRET_PREFIX.is_some() && !record.conn_info_secret_target_disabled()
}

/// Render the secret for `record`, or `None` if none should be written.
///
/// User labels are kept, but the ownership labels always win.
#[must_use]
pub fn build_secret<K: ManagedResource>(record: &K, info: &ConnectionInfo) -> Option<Secret> {
    if !should_materialize(record) {
        return None;
    }
    let prefix = key_prefix(record)?;
    let target = record.conn_info_secret_target();

    let mut labels = target
        .and_then(|t| t.labels.clone())
        .unwrap_or_default();
    labels.insert(K8S_MANAGED_BY.to_string(), MANAGED_BY_MSOP.to_string());
    labels.insert(MSOP_OWNER_KIND_LABEL.to_string(), K::KIND.to_string());
    labels.insert(MSOP_OWNER_NAME_LABEL.to_string(), record.name_any());

    let annotations = target.and_then(|t| t.annotations.clone());

    let data: BTreeMap<String, ByteString> = info
        .iter()
        .map(|(key, value)| {
            (
                format!("{prefix}{key}"),
                ByteString(value.as_bytes().to_vec()),
            )
        })
        .collect();

    Some(Secret {
        metadata: ObjectMeta {
            name: Some(secret_name(record)),
            namespace: Some(record.record_namespace()),
            labels: Some(labels),
            annotations,
            owner_references: record.controller_owner_ref(&()).map(|owner| vec![owner]),
            ..Default::default()
        },
        data: Some(data),
        type_: Some("Opaque".to_string()),
        ..Default::default()
    })
}

/// Write the connection-info secret for `record`.
///
/// Returns the name of the secret written, or `None` when materialization is disabled.
///
/// # Errors
///
/// Returns an error if the server-side apply fails after retries.
pub async fn materialize<K: ManagedResource>(
    client: &Client,
    record: &K,
    info: &ConnectionInfo,
) -> Result<Option<String>, OperatorError> {
    let Some(secret) = build_secret(record, info) else {
        debug!(
            kind = K::KIND,
            name = %record.name_any(),
            "Secret materialization disabled"
        );
        return Ok(None);
    };

    let namespace = record.record_namespace();
    let name = secret_name(record);
    let api: Api<Secret> = Api::namespaced(client.clone(), &namespace);

    retry_api_call(
        || async {
            api.patch(
                &name,
                &PatchParams::apply(FIELD_MANAGER).force(),
                &Patch::Apply(&secret),
            )
            .await
        },
        &format!("apply Secret {namespace}/{name}"),
    )
    .await?;

    // Keys only: values are credentials.
    info!(
        kind = K::KIND,
        namespace = %namespace,
        secret = %name,
        keys = info.len(),
        "Materialized connection secret"
    );
    Ok(Some(name))
}

#[cfg(test)]
#[path = "materialize_tests.rs"]
mod materialize_tests;
