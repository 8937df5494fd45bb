// Copyright (c) 2025 Erick Bourgeois, firestoned
// SPDX-License-Identifier: MIT

//! Per-kind adapters plugging each resource kind into the generic reconciler.
//!
//! | Kind | Adapter | Identity |
//! |------|---------|----------|
//! | `PostgreSQL`, `Kafka` | [`service::ServiceAdapter`] | service name |
//! | `ServiceUser` | [`service_user::ServiceUserAdapter`] | user name |
//! | `Database` | [`database::DatabaseAdapter`] | database name |
//! | `ConnectionPool` | [`connection_pool::ConnectionPoolAdapter`] | pool name |
//! | `KafkaTopic` | [`kafka_topic::KafkaTopicAdapter`] | topic name |
//! | `KafkaACL` | [`kafka_acl::KafkaAclAdapter`] | server-assigned id |
//! | `ProjectVPC` | [`project_vpc::ProjectVpcAdapter`] | server-assigned id |
//! | `ServiceIntegration` | [`service_integration::ServiceIntegrationAdapter`] | server-assigned id |
//!
//! Every adapter holds a [`ClusterLookup`], which carries both the Kubernetes client
//! (dependency records, VPC references, source secrets) and the control plane client.
//!
//! [`ClusterLookup`]: crate::reconcilers::dependencies::ClusterLookup

pub mod connection_pool;
pub mod database;
pub mod kafka_acl;
pub mod kafka_topic;
pub mod project_vpc;
pub mod service;
pub mod service_integration;
pub mod service_user;

pub use connection_pool::ConnectionPoolAdapter;
pub use database::DatabaseAdapter;
pub use kafka_acl::KafkaAclAdapter;
pub use kafka_topic::KafkaTopicAdapter;
pub use project_vpc::ProjectVpcAdapter;
pub use service::ServiceAdapter;
pub use service_integration::ServiceIntegrationAdapter;
pub use service_user::ServiceUserAdapter;

use crate::errors::OperatorError;
use crate::reconcilers::adapter::ConnectionInfo;

/// Insert `KEY` with a required value.
fn require(
    info: &mut ConnectionInfo,
    key: &str,
    value: Option<impl ToString>,
    source: &str,
) -> Result<(), OperatorError> {
    let value = value.ok_or_else(|| {
        OperatorError::transport(format!("{source} reported no value for {key}"))
    })?;
    info.insert(key.to_string(), value.to_string());
    Ok(())
}

/// Insert `KEY` only when a value is present.
fn optional(info: &mut ConnectionInfo, key: &str, value: Option<impl ToString>) {
    if let Some(value) = value {
        info.insert(key.to_string(), value.to_string());
    }
}

/// Refuse to delete a resource whose record enables termination protection.
fn check_termination_protection(
    protected: Option<bool>,
    resource: &str,
) -> Result<(), OperatorError> {
    if protected.unwrap_or(false) {
        return Err(OperatorError::invalid_spec(format!(
            "termination protection is enabled on {resource}; disable it to allow deletion"
        )));
    }
    Ok(())
}

#[cfg(test)]
pub(crate) mod test_support;
