// Copyright (c) 2025 Erick Bourgeois, firestoned
// SPDX-License-Identifier: MIT

//! Request and response bodies of the control plane API.
//!
//! Field names follow the control plane's snake_case wire format. Unknown response
//! fields are ignored so that additions on the server side never break decoding.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;

// ============================================================================
// Services
// ============================================================================

/// Read-replica or other integration declared at service creation.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct ServiceIntegrationSpec {
    pub integration_type: String,
    pub source_service: String,
}

/// `POST /project/{p}/service`
#[derive(Clone, Debug, Default, Serialize, PartialEq)]
pub struct CreateServiceRequest {
    pub service_name: String,
    pub service_type: String,
    pub plan: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cloud: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub project_vpc_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub termination_protection: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub disk_space_mb: Option<u64>,
    #[serde(skip_serializing_if = "BTreeMap::is_empty")]
    pub tags: BTreeMap<String, String>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub service_integrations: Vec<ServiceIntegrationSpec>,
    #[serde(skip_serializing_if = "BTreeMap::is_empty")]
    pub user_config: BTreeMap<String, Value>,
}

/// `PUT /project/{p}/service/{s}`
#[derive(Clone, Debug, Default, Serialize, PartialEq)]
pub struct UpdateServiceRequest {
    pub plan: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cloud: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub project_vpc_id: Option<String>,
    pub powered: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub termination_protection: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub disk_space_mb: Option<u64>,
    #[serde(skip_serializing_if = "BTreeMap::is_empty")]
    pub user_config: BTreeMap<String, Value>,
}

/// One network endpoint of a service (e.g. `pg`, `kafka`, `schema_registry`).
#[derive(Clone, Debug, Default, Deserialize, PartialEq, Eq)]
pub struct ServiceComponent {
    pub component: String,
    pub host: String,
    pub port: u16,
    #[serde(default)]
    pub route: Option<String>,
    #[serde(default)]
    pub usage: Option<String>,
    #[serde(default)]
    pub kafka_authentication_method: Option<String>,
}

/// A user as embedded in a service document or returned by the user endpoints.
#[derive(Clone, Debug, Default, Deserialize, PartialEq, Eq)]
pub struct ServiceUserInfo {
    pub username: String,
    #[serde(default)]
    pub password: Option<String>,
    #[serde(default, rename = "type")]
    pub user_type: Option<String>,
    #[serde(default)]
    pub authentication: Option<String>,
    #[serde(default)]
    pub access_cert: Option<String>,
    #[serde(default)]
    pub access_key: Option<String>,
}

/// A connection pool as embedded in a service document.
#[derive(Clone, Debug, Default, Deserialize, PartialEq, Eq)]
pub struct ConnectionPoolInfo {
    pub pool_name: String,
    pub database: String,
    #[serde(default)]
    pub username: Option<String>,
    #[serde(default)]
    pub pool_mode: Option<String>,
    #[serde(default)]
    pub pool_size: Option<u32>,
    #[serde(default)]
    pub connection_uri: Option<String>,
}

/// Service document.
#[derive(Clone, Debug, Default, Deserialize, PartialEq)]
pub struct Service {
    pub service_name: String,
    #[serde(default)]
    pub service_type: String,
    #[serde(default)]
    pub state: String,
    #[serde(default)]
    pub plan: Option<String>,
    #[serde(default)]
    pub cloud_name: Option<String>,
    #[serde(default)]
    pub project_vpc_id: Option<String>,
    #[serde(default)]
    pub termination_protection: Option<bool>,
    #[serde(default)]
    pub service_uri: Option<String>,
    #[serde(default)]
    pub service_uri_params: BTreeMap<String, String>,
    #[serde(default)]
    pub components: Vec<ServiceComponent>,
    #[serde(default)]
    pub users: Vec<ServiceUserInfo>,
    #[serde(default)]
    pub connection_pools: Vec<ConnectionPoolInfo>,
    #[serde(default)]
    pub tags: BTreeMap<String, String>,
}

impl Service {
    /// First component with the given name, preferring the `primary` route.
    #[must_use]
    pub fn component(&self, name: &str) -> Option<&ServiceComponent> {
        self.components
            .iter()
            .find(|c| c.component == name && c.usage.as_deref() == Some("primary"))
            .or_else(|| self.components.iter().find(|c| c.component == name))
    }

    /// Component with the given name and Kafka authentication method.
    #[must_use]
    pub fn kafka_component(&self, name: &str, method: &str) -> Option<&ServiceComponent> {
        self.components.iter().find(|c| {
            c.component == name && c.kafka_authentication_method.as_deref() == Some(method)
        })
    }

    /// Embedded user by name.
    #[must_use]
    pub fn user(&self, username: &str) -> Option<&ServiceUserInfo> {
        self.users.iter().find(|u| u.username == username)
    }

    /// Embedded connection pool by name.
    #[must_use]
    pub fn connection_pool(&self, pool_name: &str) -> Option<&ConnectionPoolInfo> {
        self.connection_pools
            .iter()
            .find(|p| p.pool_name == pool_name)
    }
}

#[derive(Deserialize)]
pub(crate) struct ServiceEnvelope {
    pub service: Service,
}

/// `GET /project/{p}/kms/ca`
#[derive(Deserialize)]
pub(crate) struct CaEnvelope {
    pub certificate: String,
}

// ============================================================================
// Users
// ============================================================================

/// `POST /project/{p}/service/{s}/user`
#[derive(Clone, Debug, Serialize, PartialEq, Eq)]
pub struct CreateUserRequest {
    pub username: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub authentication: Option<String>,
}

/// `PUT /project/{p}/service/{s}/user/{u}`
#[derive(Clone, Debug, Serialize, PartialEq, Eq)]
pub struct ModifyUserRequest {
    pub operation: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub new_password: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub authentication: Option<String>,
}

impl ModifyUserRequest {
    /// Reset credentials, to `new_password` when given or to a generated one otherwise.
    #[must_use]
    pub fn reset_credentials(new_password: Option<String>) -> Self {
        Self {
            operation: "reset-credentials".to_string(),
            new_password,
            authentication: None,
        }
    }

    /// Switch the authentication mechanism.
    #[must_use]
    pub fn set_authentication(authentication: String) -> Self {
        Self {
            operation: "set-access-control".to_string(),
            new_password: None,
            authentication: Some(authentication),
        }
    }
}

#[derive(Deserialize)]
pub(crate) struct UserEnvelope {
    pub user: ServiceUserInfo,
}

// ============================================================================
// Databases and connection pools
// ============================================================================

/// `POST /project/{p}/service/{s}/db`
#[derive(Clone, Debug, Serialize, PartialEq, Eq)]
pub struct CreateDatabaseRequest {
    pub database: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub lc_collate: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub lc_ctype: Option<String>,
}

/// Logical database.
#[derive(Clone, Debug, Default, Deserialize, PartialEq, Eq)]
pub struct DatabaseInfo {
    pub database_name: String,
    #[serde(default)]
    pub lc_collate: Option<String>,
    #[serde(default)]
    pub lc_ctype: Option<String>,
}

#[derive(Deserialize)]
pub(crate) struct DatabaseList {
    #[serde(default)]
    pub databases: Vec<DatabaseInfo>,
}

/// `POST /project/{p}/service/{s}/connection_pool`; `pool_name` is omitted on update.
#[derive(Clone, Debug, Serialize, PartialEq, Eq)]
pub struct ConnectionPoolRequest {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub pool_name: Option<String>,
    pub database: String,
    pub username: String,
    pub pool_size: u32,
    pub pool_mode: String,
}

// ============================================================================
// Kafka
// ============================================================================

/// Topic configuration subset managed by the operator.
#[derive(Clone, Debug, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct TopicConfig {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub retention_ms: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cleanup_policy: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub min_insync_replicas: Option<u32>,
}

impl TopicConfig {
    /// True when no field is set.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.retention_ms.is_none()
            && self.cleanup_policy.is_none()
            && self.min_insync_replicas.is_none()
    }
}

/// Topic tag.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct Tag {
    pub key: String,
    pub value: String,
}

/// `POST /project/{p}/service/{s}/topic`; `topic_name` is omitted on update.
#[derive(Clone, Debug, Serialize, PartialEq, Eq)]
pub struct TopicRequest {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub topic_name: Option<String>,
    pub partitions: u32,
    pub replication: u32,
    #[serde(skip_serializing_if = "TopicConfig::is_empty")]
    pub config: TopicConfig,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub tags: Vec<Tag>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub termination_protection: Option<bool>,
}

/// Topic document. The control plane returns one entry per partition.
#[derive(Clone, Debug, Default, Deserialize, PartialEq)]
pub struct Topic {
    pub topic_name: String,
    #[serde(default)]
    pub state: String,
    #[serde(default)]
    pub replication: u32,
    #[serde(default)]
    pub partitions: Vec<Value>,
}

#[derive(Deserialize)]
pub(crate) struct TopicEnvelope {
    pub topic: Topic,
}

/// `POST /project/{p}/service/{s}/acl`
#[derive(Clone, Debug, Serialize, PartialEq, Eq)]
pub struct CreateAclRequest {
    pub permission: String,
    pub topic: String,
    pub username: String,
}

/// ACL entry.
#[derive(Clone, Debug, Default, Deserialize, PartialEq, Eq)]
pub struct Acl {
    pub id: String,
    pub permission: String,
    pub topic: String,
    pub username: String,
}

#[derive(Deserialize)]
pub(crate) struct AclList {
    #[serde(default)]
    pub acl: Vec<Acl>,
}

// ============================================================================
// Project VPCs and integrations
// ============================================================================

/// `POST /project/{p}/vpcs`
#[derive(Clone, Debug, Serialize, PartialEq, Eq)]
pub struct CreateVpcRequest {
    pub cloud_name: String,
    pub network_cidr: String,
    pub peering_connections: Vec<Value>,
}

/// Project VPC document.
#[derive(Clone, Debug, Default, Deserialize, PartialEq, Eq)]
pub struct Vpc {
    pub project_vpc_id: String,
    #[serde(default)]
    pub cloud_name: String,
    #[serde(default)]
    pub network_cidr: String,
    #[serde(default)]
    pub state: String,
}

#[derive(Deserialize)]
pub(crate) struct VpcList {
    #[serde(default)]
    pub vpcs: Vec<Vpc>,
}

/// `POST /project/{p}/integration`
#[derive(Clone, Debug, Serialize, PartialEq)]
pub struct CreateIntegrationRequest {
    pub integration_type: String,
    pub source_service: String,
    pub dest_service: String,
    #[serde(skip_serializing_if = "BTreeMap::is_empty")]
    pub user_config: BTreeMap<String, Value>,
}

/// `PUT /project/{p}/integration/{id}`
#[derive(Clone, Debug, Serialize, PartialEq)]
pub struct UpdateIntegrationRequest {
    pub user_config: BTreeMap<String, Value>,
}

/// Service integration document.
#[derive(Clone, Debug, Default, Deserialize, PartialEq)]
pub struct Integration {
    pub service_integration_id: String,
    pub integration_type: String,
    pub source_service: String,
    pub dest_service: String,
    #[serde(default)]
    pub active: bool,
    #[serde(default)]
    pub enabled: bool,
    #[serde(default)]
    pub user_config: BTreeMap<String, Value>,
}

#[derive(Deserialize)]
pub(crate) struct IntegrationEnvelope {
    pub service_integration: Integration,
}

#[derive(Deserialize)]
pub(crate) struct IntegrationList {
    #[serde(default)]
    pub service_integrations: Vec<Integration>,
}
