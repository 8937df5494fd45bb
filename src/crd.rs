// Copyright (c) 2025 Erick Bourgeois, firestoned
// SPDX-License-Identifier: MIT

//! Custom Resource Definitions (CRDs) for managed services.
//!
//! This module defines all Kubernetes Custom Resource Definitions used by msop
//! to manage externally-hosted services declaratively.
//!
//! # Resource Types
//!
//! ## Services
//!
//! - [`PostgreSQL`] - A managed `PostgreSQL` service
//! - [`Kafka`] - A managed Kafka service
//!
//! ## Service-scoped resources
//!
//! - [`ServiceUser`] - A user on a service, optionally with a password from a secret
//! - [`Database`] - A logical database on a `PostgreSQL` service
//! - [`ConnectionPool`] - A `PgBouncer` pool on a `PostgreSQL` service
//! - [`KafkaTopic`] - A topic on a Kafka service
//! - [`KafkaACL`] - An access control entry on a Kafka service
//!
//! ## Project-scoped resources
//!
//! - [`ProjectVPC`] - A VPC hosting services
//! - [`ServiceIntegration`] - A link between two services
//!
//! All kinds share [`ResourceStatus`].
//!
//! # Example: Declaring a service and a user
//!
//! ```yaml
//! apiVersion: msop.dev/v1alpha1
//! kind: PostgreSQL
//! metadata:
//!   name: orders-db
//! spec:
//!   project: acme
//!   plan: startup-4
//!   cloudName: google-europe-west1
//!   connInfoSecretTarget:
//!     name: orders-db-conn
//! ---
//! apiVersion: msop.dev/v1alpha1
//! kind: ServiceUser
//! metadata:
//!   name: orders-app
//! spec:
//!   project: acme
//!   serviceName: orders-db
//!   connInfoSecretSource:
//!     name: orders-app-password
//!     passwordKey: password
//! ```

use kube::CustomResource;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;

/// Schema for free-form JSON objects passed through to the control plane unchanged.
fn preserve_unknown_fields(_: &mut schemars::SchemaGenerator) -> schemars::Schema {
    schemars::json_schema!({
        "type": "object",
        "x-kubernetes-preserve-unknown-fields": true
    })
}

/// Condition represents an observation of a resource's current state.
///
/// Conditions are used in status subresources to communicate the state of
/// a resource to users and controllers.
#[derive(Clone, Debug, Serialize, Deserialize, Default, JsonSchema, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct Condition {
    /// Type of condition: `Running` or `Error`.
    pub r#type: String,

    /// Status of the condition: True, False, or Unknown.
    pub status: String,

    /// Brief CamelCase reason for the condition's last transition.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reason: Option<String>,

    /// Human-readable message indicating details about the transition.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,

    /// Last time the condition transitioned from one status to another (RFC3339 format).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub last_transition_time: Option<String>,
}

/// Status shared by every managed resource kind.
///
/// `Option` fields serialize as `null` when unset so that a JSON merge patch of the
/// whole status clears them on the server.
#[derive(Clone, Debug, Serialize, Deserialize, Default, JsonSchema, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct ResourceStatus {
    /// `Running` and `Error` conditions.
    #[serde(default)]
    pub conditions: Vec<Condition>,

    /// Free-form state string reported by the control plane (e.g. `RUNNING`, `REBUILDING`).
    #[serde(default)]
    pub state: Option<String>,

    /// External identifier. Server-assigned for id-addressed kinds, the external name otherwise.
    #[serde(default)]
    pub id: Option<String>,

    /// Last generation whose mutation was accepted by the control plane.
    #[serde(default)]
    pub observed_generation: Option<i64>,

    /// Generation that failed terminally. Automatic retries stop until the generation changes.
    #[serde(default)]
    pub failed_generation: Option<i64>,

    /// When the current create or update operation first started (RFC3339).
    #[serde(default)]
    pub operation_started_at: Option<String>,

    /// When external deletion was first attempted (RFC3339).
    #[serde(default)]
    pub deletion_started_at: Option<String>,

    /// Salted SHA-256 of the source-secret value last applied.
    #[serde(default)]
    pub source_fingerprint: Option<String>,

    /// Consecutive transport failures.
    #[serde(default)]
    pub failed_attempts: u32,
}

/// Where to write connection information for a reconciled resource.
#[derive(Clone, Debug, Serialize, Deserialize, Default, JsonSchema, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct ConnInfoSecretTarget {
    /// Name of the secret. Defaults to the resource name.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    #[schemars(length(min = 1, max = 253))]
    pub name: Option<String>,

    /// Key prefix. Defaults to the kind prefix (e.g. `POSTGRESQL_`).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub prefix: Option<String>,

    /// Annotations added to the secret.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub annotations: Option<BTreeMap<String, String>>,

    /// Labels added to the secret.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub labels: Option<BTreeMap<String, String>>,
}

/// Externally-owned secret supplying a credential value.
#[derive(Clone, Debug, Serialize, Deserialize, JsonSchema, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct ConnInfoSecretSource {
    /// Name of the source secret.
    pub name: String,

    /// Namespace of the source secret. Defaults to the resource namespace.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub namespace: Option<String>,

    /// Key holding the password.
    pub password_key: String,
}

/// Reference to another msop resource, optionally in a different namespace.
#[derive(Clone, Debug, Serialize, Deserialize, JsonSchema, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct ResourceReference {
    /// Name of the referenced resource.
    pub name: String,

    /// Namespace of the referenced resource. Defaults to the referencing resource's namespace.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub namespace: Option<String>,
}

/// An integration created together with a service.
#[derive(Clone, Debug, Serialize, Deserialize, JsonSchema, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct ServiceIntegrationItem {
    /// Integration type. Only `read_replica` is accepted at service creation.
    #[schemars(regex(pattern = r"^read_replica$"))]
    pub integration_type: String,

    /// Service to replicate from.
    pub source_service_name: String,
}

/// Fields shared by every service kind.
#[derive(Clone, Debug, Serialize, Deserialize, Default, JsonSchema, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ServiceCommonSpec {
    /// Project the service belongs to.
    #[schemars(length(max = 63))]
    pub project: String,

    /// Subscription plan (e.g. `startup-4`).
    pub plan: String,

    /// Cloud and region (e.g. `google-europe-west1`).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cloud_name: Option<String>,

    /// `ProjectVPC` resource hosting the service.
    #[serde(
        default,
        rename = "projectVPCRef",
        skip_serializing_if = "Option::is_none"
    )]
    pub project_vpc_ref: Option<ResourceReference>,

    /// Raw VPC id, for VPCs not managed by msop. Ignored when `projectVPCRef` is set.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub project_vpc_id: Option<String>,

    /// Run (`true`, the default) or suspend (`false`) the service without deleting it.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub powered: Option<bool>,

    /// Prevent deletion of the external service.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub termination_protection: Option<bool>,

    /// Disk space override (e.g. `80GiB`).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    #[schemars(regex(pattern = r"^[1-9][0-9]* ?(MiB|GiB|TiB)$"))]
    pub disk_space: Option<String>,

    /// Tags attached to the external service.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tags: Option<BTreeMap<String, String>>,

    /// Integrations created with the service (read replicas).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub service_integrations: Option<Vec<ServiceIntegrationItem>>,

    /// Kind-specific service configuration passed through unchanged.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    #[schemars(schema_with = "preserve_unknown_fields")]
    pub user_config: Option<BTreeMap<String, Value>>,

    /// Where to write connection information.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub conn_info_secret_target: Option<ConnInfoSecretTarget>,

    /// Do not write connection information. Fixed at creation time.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub conn_info_secret_target_disabled: Option<bool>,
}

/// `PostgreSQL` is a managed `PostgreSQL` service.
///
/// # Example
///
/// ```yaml
/// apiVersion: msop.dev/v1alpha1
/// kind: PostgreSQL
/// metadata:
///   name: orders-db
/// spec:
///   project: acme
///   plan: business-4
///   cloudName: google-europe-west1
///   projectVPCRef:
///     name: acme-vpc
///   userConfig:
///     pg_version: "16"
/// ```
#[derive(CustomResource, Clone, Debug, Serialize, Deserialize, JsonSchema, PartialEq)]
#[kube(
    group = "msop.dev",
    version = "v1alpha1",
    kind = "PostgreSQL",
    namespaced,
    doc = "PostgreSQL is a managed PostgreSQL service provisioned on the control plane.",
    printcolumn = r#"{"name":"Project","type":"string","jsonPath":".spec.project"}"#,
    printcolumn = r#"{"name":"State","type":"string","jsonPath":".status.state"}"#
)]
#[kube(status = "ResourceStatus")]
#[serde(rename_all = "camelCase")]
#[schemars(extend("x-kubernetes-validations" = [
    {
        "rule": "has(oldSelf.connInfoSecretTargetDisabled) == has(self.connInfoSecretTargetDisabled) && (!has(self.connInfoSecretTargetDisabled) || self.connInfoSecretTargetDisabled == oldSelf.connInfoSecretTargetDisabled)",
        "message": "connInfoSecretTargetDisabled can only be set during resource creation"
    },
    {"rule": "self.project == oldSelf.project", "message": "project is immutable"},
    {
        "rule": "has(oldSelf.forkFromServiceName) == has(self.forkFromServiceName) && (!has(self.forkFromServiceName) || self.forkFromServiceName == oldSelf.forkFromServiceName)",
        "message": "forkFromServiceName is immutable"
    }
]))]
pub struct PostgreSQLSpec {
    /// Shared service fields.
    #[serde(flatten)]
    pub common: ServiceCommonSpec,

    /// Create the service as a fork of an existing service.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub fork_from_service_name: Option<String>,
}

/// `Kafka` is a managed Kafka service.
#[derive(CustomResource, Clone, Debug, Serialize, Deserialize, JsonSchema, PartialEq)]
#[kube(
    group = "msop.dev",
    version = "v1alpha1",
    kind = "Kafka",
    namespaced,
    doc = "Kafka is a managed Kafka service provisioned on the control plane.",
    printcolumn = r#"{"name":"Project","type":"string","jsonPath":".spec.project"}"#,
    printcolumn = r#"{"name":"State","type":"string","jsonPath":".status.state"}"#
)]
#[kube(status = "ResourceStatus")]
#[serde(rename_all = "camelCase")]
#[schemars(extend("x-kubernetes-validations" = [
    {
        "rule": "has(oldSelf.connInfoSecretTargetDisabled) == has(self.connInfoSecretTargetDisabled) && (!has(self.connInfoSecretTargetDisabled) || self.connInfoSecretTargetDisabled == oldSelf.connInfoSecretTargetDisabled)",
        "message": "connInfoSecretTargetDisabled can only be set during resource creation"
    },
    {"rule": "self.project == oldSelf.project", "message": "project is immutable"}
]))]
pub struct KafkaSpec {
    /// Shared service fields.
    #[serde(flatten)]
    pub common: ServiceCommonSpec,

    /// Enable the schema registry (Karapace).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub karapace: Option<bool>,
}

/// `ServiceUser` is a user on a service.
///
/// When `connInfoSecretSource` is set, the user's password is taken from that secret
/// and rotated whenever the secret changes.
#[derive(CustomResource, Clone, Debug, Serialize, Deserialize, JsonSchema, PartialEq, Eq)]
#[kube(
    group = "msop.dev",
    version = "v1alpha1",
    kind = "ServiceUser",
    namespaced,
    doc = "ServiceUser is a user account on a managed service.",
    printcolumn = r#"{"name":"Service","type":"string","jsonPath":".spec.serviceName"}"#,
    printcolumn = r#"{"name":"Type","type":"string","jsonPath":".status.state"}"#
)]
#[kube(status = "ResourceStatus")]
#[serde(rename_all = "camelCase")]
#[schemars(extend("x-kubernetes-validations" = [
    {
        "rule": "has(oldSelf.connInfoSecretTargetDisabled) == has(self.connInfoSecretTargetDisabled) && (!has(self.connInfoSecretTargetDisabled) || self.connInfoSecretTargetDisabled == oldSelf.connInfoSecretTargetDisabled)",
        "message": "connInfoSecretTargetDisabled can only be set during resource creation"
    },
    {"rule": "self.project == oldSelf.project", "message": "project is immutable"},
    {"rule": "self.serviceName == oldSelf.serviceName", "message": "serviceName is immutable"}
]))]
pub struct ServiceUserSpec {
    /// Project the service belongs to.
    pub project: String,

    /// Service hosting the user.
    pub service_name: String,

    /// Authentication plugin (`PostgreSQL` and `MySQL` only).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    #[schemars(regex(pattern = r"^(caching_sha2_password|mysql_native_password)$"))]
    pub authentication: Option<String>,

    /// Where to write connection information.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub conn_info_secret_target: Option<ConnInfoSecretTarget>,

    /// Do not write connection information. Fixed at creation time.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub conn_info_secret_target_disabled: Option<bool>,

    /// Secret supplying the user's password.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub conn_info_secret_source: Option<ConnInfoSecretSource>,
}

/// `Database` is a logical database on a `PostgreSQL` service.
#[derive(CustomResource, Clone, Debug, Serialize, Deserialize, JsonSchema, PartialEq, Eq)]
#[kube(
    group = "msop.dev",
    version = "v1alpha1",
    kind = "Database",
    namespaced,
    doc = "Database is a logical database on a managed PostgreSQL service.",
    printcolumn = r#"{"name":"Service","type":"string","jsonPath":".spec.serviceName"}"#
)]
#[kube(status = "ResourceStatus")]
#[serde(rename_all = "camelCase")]
#[schemars(extend("x-kubernetes-validations" = [
    {"rule": "self.project == oldSelf.project", "message": "project is immutable"},
    {"rule": "self.serviceName == oldSelf.serviceName", "message": "serviceName is immutable"},
    {
        "rule": "has(oldSelf.databaseName) == has(self.databaseName) && (!has(self.databaseName) || self.databaseName == oldSelf.databaseName)",
        "message": "databaseName is immutable"
    }
]))]
pub struct DatabaseSpec {
    /// Project the service belongs to.
    pub project: String,

    /// Service hosting the database.
    pub service_name: String,

    /// External database name. Defaults to the resource name.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    #[schemars(length(max = 40))]
    pub database_name: Option<String>,

    /// Default string sort order.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub lc_collate: Option<String>,

    /// Default character classification.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub lc_ctype: Option<String>,

    /// Refuse to drop the external database on deletion.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub termination_protection: Option<bool>,
}

/// `PgBouncer` pooling mode.
#[derive(Clone, Copy, Debug, Serialize, Deserialize, JsonSchema, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum PoolMode {
    /// A server connection is held for the duration of the client session.
    Session,
    /// A server connection is held for one transaction.
    #[default]
    Transaction,
    /// A server connection is held for one statement.
    Statement,
}

impl PoolMode {
    /// Wire representation used by the control plane.
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Session => "session",
            Self::Transaction => "transaction",
            Self::Statement => "statement",
        }
    }
}

/// `ConnectionPool` is a `PgBouncer` pool on a `PostgreSQL` service.
#[derive(CustomResource, Clone, Debug, Serialize, Deserialize, JsonSchema, PartialEq, Eq)]
#[kube(
    group = "msop.dev",
    version = "v1alpha1",
    kind = "ConnectionPool",
    namespaced,
    doc = "ConnectionPool is a PgBouncer connection pool on a managed PostgreSQL service.",
    printcolumn = r#"{"name":"Service","type":"string","jsonPath":".spec.serviceName"}"#,
    printcolumn = r#"{"name":"Database","type":"string","jsonPath":".spec.databaseName"}"#
)]
#[kube(status = "ResourceStatus")]
#[serde(rename_all = "camelCase")]
#[schemars(extend("x-kubernetes-validations" = [
    {
        "rule": "has(oldSelf.connInfoSecretTargetDisabled) == has(self.connInfoSecretTargetDisabled) && (!has(self.connInfoSecretTargetDisabled) || self.connInfoSecretTargetDisabled == oldSelf.connInfoSecretTargetDisabled)",
        "message": "connInfoSecretTargetDisabled can only be set during resource creation"
    },
    {"rule": "self.project == oldSelf.project", "message": "project is immutable"},
    {"rule": "self.serviceName == oldSelf.serviceName", "message": "serviceName is immutable"}
]))]
pub struct ConnectionPoolSpec {
    /// Project the service belongs to.
    pub project: String,

    /// Service hosting the pool.
    pub service_name: String,

    /// External database the pool connects to.
    pub database_name: String,

    /// External user the pool connects as.
    pub username: String,

    /// Number of server connections.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    #[schemars(range(min = 1, max = 10_000))]
    pub pool_size: Option<u32>,

    /// Pooling mode.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pool_mode: Option<PoolMode>,

    /// Where to write connection information.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub conn_info_secret_target: Option<ConnInfoSecretTarget>,

    /// Do not write connection information. Fixed at creation time.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub conn_info_secret_target_disabled: Option<bool>,
}

/// Kafka topic configuration subset managed by msop.
#[derive(Clone, Debug, Serialize, Deserialize, Default, JsonSchema, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct KafkaTopicConfig {
    /// Retention in milliseconds (`-1` for unlimited).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub retention_ms: Option<i64>,

    /// `delete`, `compact` or `compact,delete`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    #[schemars(regex(pattern = r"^(delete|compact|compact,delete)$"))]
    pub cleanup_policy: Option<String>,

    /// Minimum in-sync replicas for acknowledged writes.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    #[schemars(range(min = 1))]
    pub min_insync_replicas: Option<u32>,
}

/// `KafkaTopic` is a topic on a Kafka service.
#[derive(CustomResource, Clone, Debug, Serialize, Deserialize, JsonSchema, PartialEq, Eq)]
#[kube(
    group = "msop.dev",
    version = "v1alpha1",
    kind = "KafkaTopic",
    namespaced,
    doc = "KafkaTopic is a topic on a managed Kafka service.",
    printcolumn = r#"{"name":"Service","type":"string","jsonPath":".spec.serviceName"}"#,
    printcolumn = r#"{"name":"State","type":"string","jsonPath":".status.state"}"#
)]
#[kube(status = "ResourceStatus")]
#[serde(rename_all = "camelCase")]
#[schemars(extend("x-kubernetes-validations" = [
    {"rule": "self.project == oldSelf.project", "message": "project is immutable"},
    {"rule": "self.serviceName == oldSelf.serviceName", "message": "serviceName is immutable"},
    {
        "rule": "has(oldSelf.topicName) == has(self.topicName) && (!has(self.topicName) || self.topicName == oldSelf.topicName)",
        "message": "topicName is immutable"
    }
]))]
pub struct KafkaTopicSpec {
    /// Project the service belongs to.
    pub project: String,

    /// Service hosting the topic.
    pub service_name: String,

    /// External topic name. Defaults to the resource name.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    #[schemars(length(max = 249))]
    pub topic_name: Option<String>,

    /// Number of partitions.
    #[schemars(range(min = 1, max = 1_000_000))]
    pub partitions: u32,

    /// Replication factor.
    #[schemars(range(min = 2))]
    pub replication: u32,

    /// Topic configuration.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub config: Option<KafkaTopicConfig>,

    /// Tags attached to the topic.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tags: Option<BTreeMap<String, String>>,

    /// Refuse to delete the external topic on deletion.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub termination_protection: Option<bool>,
}

/// Kafka ACL permission.
#[derive(Clone, Copy, Debug, Serialize, Deserialize, JsonSchema, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum KafkaPermission {
    /// Full control, including topic management.
    Admin,
    /// Consume only.
    Read,
    /// Produce and consume.
    Readwrite,
    /// Produce only.
    Write,
}

impl KafkaPermission {
    /// Wire representation used by the control plane.
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Admin => "admin",
            Self::Read => "read",
            Self::Readwrite => "readwrite",
            Self::Write => "write",
        }
    }
}

/// `KafkaACL` grants a user access to topics on a Kafka service.
///
/// ACL entries cannot be changed in place on the control plane: every spec change
/// deletes the old entry and creates a new one, and `status.id` changes accordingly.
#[derive(CustomResource, Clone, Debug, Serialize, Deserialize, JsonSchema, PartialEq, Eq)]
#[kube(
    group = "msop.dev",
    version = "v1alpha1",
    kind = "KafkaACL",
    namespaced,
    doc = "KafkaACL is an access control entry on a managed Kafka service.",
    printcolumn = r#"{"name":"Service","type":"string","jsonPath":".spec.serviceName"}"#,
    printcolumn = r#"{"name":"Permission","type":"string","jsonPath":".spec.permission"}"#,
    printcolumn = r#"{"name":"Id","type":"string","jsonPath":".status.id"}"#
)]
#[kube(status = "ResourceStatus")]
#[serde(rename_all = "camelCase")]
#[schemars(extend("x-kubernetes-validations" = [
    {"rule": "self.project == oldSelf.project", "message": "project is immutable"},
    {"rule": "self.serviceName == oldSelf.serviceName", "message": "serviceName is immutable"}
]))]
pub struct KafkaACLSpec {
    /// Project the service belongs to.
    pub project: String,

    /// Service hosting the ACL.
    pub service_name: String,

    /// Granted permission.
    pub permission: KafkaPermission,

    /// Topic name pattern (wildcards allowed).
    pub topic: String,

    /// Username pattern (wildcards allowed).
    pub username: String,
}

/// `ProjectVPC` is a VPC in which services can be placed.
#[derive(CustomResource, Clone, Debug, Serialize, Deserialize, JsonSchema, PartialEq, Eq)]
#[kube(
    group = "msop.dev",
    version = "v1alpha1",
    kind = "ProjectVPC",
    namespaced,
    doc = "ProjectVPC is a VPC on the control plane hosting managed services.",
    printcolumn = r#"{"name":"Cloud","type":"string","jsonPath":".spec.cloudName"}"#,
    printcolumn = r#"{"name":"State","type":"string","jsonPath":".status.state"}"#
)]
#[kube(status = "ResourceStatus")]
#[serde(rename_all = "camelCase")]
#[schemars(extend("x-kubernetes-validations" = [
    {"rule": "self == oldSelf", "message": "ProjectVPC spec is immutable"}
]))]
pub struct ProjectVPCSpec {
    /// Project the VPC belongs to.
    pub project: String,

    /// Cloud and region.
    pub cloud_name: String,

    /// IPv4 network range (CIDR).
    pub network_cidr: String,
}

/// `ServiceIntegration` links two services (metrics, logs, replication, ...).
#[derive(CustomResource, Clone, Debug, Serialize, Deserialize, JsonSchema, PartialEq)]
#[kube(
    group = "msop.dev",
    version = "v1alpha1",
    kind = "ServiceIntegration",
    namespaced,
    doc = "ServiceIntegration links a source and a destination service on the control plane.",
    printcolumn = r#"{"name":"Type","type":"string","jsonPath":".spec.integrationType"}"#,
    printcolumn = r#"{"name":"Source","type":"string","jsonPath":".spec.sourceServiceName"}"#,
    printcolumn = r#"{"name":"Destination","type":"string","jsonPath":".spec.destinationServiceName"}"#
)]
#[kube(status = "ResourceStatus")]
#[serde(rename_all = "camelCase")]
#[schemars(extend("x-kubernetes-validations" = [
    {"rule": "self.project == oldSelf.project", "message": "project is immutable"},
    {"rule": "self.integrationType == oldSelf.integrationType", "message": "integrationType is immutable"},
    {"rule": "self.sourceServiceName == oldSelf.sourceServiceName", "message": "sourceServiceName is immutable"},
    {"rule": "self.destinationServiceName == oldSelf.destinationServiceName", "message": "destinationServiceName is immutable"}
]))]
pub struct ServiceIntegrationSpec {
    /// Project both services belong to.
    pub project: String,

    /// Integration type (e.g. `metrics`, `logs`, `kafka_connect`).
    pub integration_type: String,

    /// Source service.
    pub source_service_name: String,

    /// Destination service.
    pub destination_service_name: String,

    /// Integration-specific configuration passed through unchanged.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    #[schemars(schema_with = "preserve_unknown_fields")]
    pub user_config: Option<BTreeMap<String, Value>>,
}

