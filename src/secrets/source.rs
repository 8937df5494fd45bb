// Copyright (c) 2025 Erick Bourgeois, firestoned
// SPDX-License-Identifier: MIT

//! Credential values taken from an existing secret.
//!
//! The value is read fresh on every pass that needs it and is never cached or logged.
//! Only its fingerprint, salted with the record uid, is kept in status.

use crate::crd::ConnInfoSecretSource;
use crate::errors::OperatorError;
use crate::reconcilers::retry::retry_api_call;
use crate::resource::ManagedResource;
use k8s_openapi::api::core::v1::Secret;
use kube::{Api, Client, ResourceExt};
use sha2::{Digest, Sha256};

/// A credential read from a source secret.
#[derive(Clone, PartialEq, Eq)]
pub struct SourceValue {
    pub value: String,
    pub fingerprint: String,
}

impl std::fmt::Debug for SourceValue {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SourceValue")
            .field("value", &"<redacted>")
            .field("fingerprint", &self.fingerprint)
            .finish()
    }
}

/// Salted SHA-256 of a source value, hex encoded.
#[must_use]
pub fn fingerprint(uid: &str, value: &str) -> String {
    let digest = Sha256::new()
        .chain_update(uid.as_bytes())
        .chain_update(b":")
        .chain_update(value.as_bytes())
        .finalize();
    format!("{digest:x}")
}

/// Namespace the source secret is read from.
#[must_use]
pub fn source_namespace(source: &ConnInfoSecretSource, record_namespace: &str) -> String {
    source
        .namespace
        .clone()
        .unwrap_or_else(|| record_namespace.to_string())
}

/// Extract `key` from a fetched secret.
///
/// # Errors
///
/// Returns `DependencyNotReady` when the key is absent or empty and `InvalidSpec` when
/// the value is not UTF-8.
pub fn extract_value(secret: &Secret, key: &str) -> Result<String, OperatorError> {
    let name = secret.name_any();
    let bytes = secret
        .data
        .as_ref()
        .and_then(|data| data.get(key))
        .map(|value| value.0.clone())
        .or_else(|| {
            secret
                .string_data
                .as_ref()
                .and_then(|data| data.get(key))
                .map(|value| value.clone().into_bytes())
        })
        .filter(|bytes| !bytes.is_empty())
        .ok_or_else(|| {
            OperatorError::dependency_not_ready(format!("secret {name} has no key {key}"))
        })?;

    String::from_utf8(bytes)
        .map_err(|_| OperatorError::invalid_spec(format!("key {key} of secret {name} is not UTF-8")))
}

/// Read the source value `record` declares, if it declares one.
///
/// # Errors
///
/// Returns `DependencyNotReady` when the secret or key does not exist yet, or the
/// Kubernetes error if the read fails after retries.
pub async fn read_source<K: ManagedResource>(
    client: &Client,
    record: &K,
) -> Result<Option<SourceValue>, OperatorError> {
    let Some(source) = record.conn_info_secret_source() else {
        return Ok(None);
    };

    let namespace = source_namespace(source, &record.record_namespace());
    let api: Api<Secret> = Api::namespaced(client.clone(), &namespace);
    let secret = retry_api_call(
        || api.get_opt(&source.name),
        &format!("get Secret {namespace}/{}", source.name),
    )
    .await?
    .ok_or_else(|| {
        OperatorError::dependency_not_ready(format!(
            "source secret {namespace}/{} does not exist",
            source.name
        ))
    })?;

    let value = extract_value(&secret, &source.password_key)?;
    let uid = record.uid().unwrap_or_default();
    Ok(Some(SourceValue {
        fingerprint: fingerprint(&uid, &value),
        value,
    }))
}

#[cfg(test)]
#[path = "source_tests.rs"]
mod source_tests;
