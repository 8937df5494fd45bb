// Copyright (c) 2025 Erick Bourgeois, firestoned
// SPDX-License-Identifier: MIT

//! Service adapter shared by `PostgreSQL` and `Kafka`.
//!
//! Services are addressed by name, which is the record name. What differs between the
//! two kinds (service type, create-only settings, the connection key set) lives behind
//! [`ServiceKind`].

use super::{optional, require};
use crate::constants::{
    DEFAULT_SSLMODE, SERVICE_STATE_POWEROFF, SERVICE_STATE_RUNNING, SERVICE_TYPE_KAFKA,
    SERVICE_TYPE_POSTGRESQL,
};
use crate::controlplane::services::parse_disk_space_mb;
use crate::controlplane::types::{
    CreateServiceRequest, Service, ServiceIntegrationSpec, UpdateServiceRequest,
};
use crate::crd::{Kafka, PostgreSQL, ServiceCommonSpec};
use crate::errors::OperatorError;
use crate::reconcilers::adapter::{ConnectionInfo, Identity, KindAdapter};
use crate::reconcilers::dependencies::{ensure_ready, resolve_project_vpc_id, ClusterLookup};
use crate::resource::ManagedResource;
use async_trait::async_trait;
use kube::ResourceExt;
use serde_json::Value;
use std::collections::BTreeMap;
use std::marker::PhantomData;

/// User config key naming the service a new `PostgreSQL` service is forked from.
const FORK_USER_CONFIG_KEY: &str = "service_to_fork_from";

/// User config key enabling the Kafka schema registry.
const SCHEMA_REGISTRY_USER_CONFIG_KEY: &str = "schema_registry";

/// What a service kind adds on top of [`ServiceCommonSpec`].
pub trait ServiceKind: ManagedResource {
    /// Control plane service type (`pg`, `kafka`).
    const SERVICE_TYPE: &'static str;

    /// Shared service fields.
    fn common(&self) -> &ServiceCommonSpec;

    /// User config sent on create and update.
    fn user_config(&self) -> BTreeMap<String, Value> {
        self.common().user_config.clone().unwrap_or_default()
    }

    /// User config sent on create only.
    fn create_user_config(&self) -> BTreeMap<String, Value> {
        self.user_config()
    }

    /// Connection key set of a running service.
    ///
    /// # Errors
    ///
    /// Returns `Transport` when the service document lacks a required value.
    fn connection_info(service: &Service, ca_cert: String) -> Result<ConnectionInfo, OperatorError>;
}

impl ServiceKind for PostgreSQL {
    const SERVICE_TYPE: &'static str = SERVICE_TYPE_POSTGRESQL;

    fn common(&self) -> &ServiceCommonSpec {
        &self.spec.common
    }

    fn create_user_config(&self) -> BTreeMap<String, Value> {
        let mut config = self.user_config();
        if let Some(source) = &self.spec.fork_from_service_name {
            config.insert(FORK_USER_CONFIG_KEY.to_string(), Value::from(source.as_str()));
        }
        config
    }

    fn connection_info(service: &Service, ca_cert: String) -> Result<ConnectionInfo, OperatorError> {
        let params = &service.service_uri_params;
        let source = format!("service {}", service.service_name);
        let mut info = ConnectionInfo::new();

        require(&mut info, "HOST", params.get("host"), &source)?;
        require(&mut info, "PORT", params.get("port"), &source)?;
        require(&mut info, "DATABASE", params.get("dbname"), &source)?;
        require(&mut info, "USER", params.get("user"), &source)?;
        require(&mut info, "PASSWORD", params.get("password"), &source)?;
        info.insert(
            "SSLMODE".to_string(),
            params
                .get("sslmode")
                .cloned()
                .unwrap_or_else(|| DEFAULT_SSLMODE.to_string()),
        );
        require(&mut info, "DATABASE_URI", service.service_uri.as_ref(), &source)?;
        info.insert("CA_CERT".to_string(), ca_cert);
        Ok(info)
    }
}

impl ServiceKind for Kafka {
    const SERVICE_TYPE: &'static str = SERVICE_TYPE_KAFKA;

    fn common(&self) -> &ServiceCommonSpec {
        &self.spec.common
    }

    fn user_config(&self) -> BTreeMap<String, Value> {
        let mut config = self.spec.common.user_config.clone().unwrap_or_default();
        if let Some(karapace) = self.spec.karapace {
            config.insert(
                SCHEMA_REGISTRY_USER_CONFIG_KEY.to_string(),
                Value::Bool(karapace),
            );
        }
        config
    }

    fn connection_info(service: &Service, ca_cert: String) -> Result<ConnectionInfo, OperatorError> {
        let source = format!("service {}", service.service_name);
        let mut info = ConnectionInfo::new();

        let kafka = service
            .kafka_component("kafka", "certificate")
            .or_else(|| service.component("kafka"));
        require(&mut info, "HOST", kafka.map(|c| &c.host), &source)?;
        require(&mut info, "PORT", kafka.map(|c| c.port), &source)?;

        let admin = service
            .users
            .iter()
            .find(|u| u.user_type.as_deref() == Some("primary"))
            .or_else(|| service.users.first());
        require(&mut info, "USERNAME", admin.map(|u| &u.username), &source)?;
        require(&mut info, "PASSWORD", admin.and_then(|u| u.password.as_ref()), &source)?;
        optional(&mut info, "ACCESS_CERT", admin.and_then(|u| u.access_cert.as_ref()));
        optional(&mut info, "ACCESS_KEY", admin.and_then(|u| u.access_key.as_ref()));
        info.insert("CA_CERT".to_string(), ca_cert);

        if let Some(sasl) = service.kafka_component("kafka", "sasl") {
            info.insert("SASL_HOST".to_string(), sasl.host.clone());
            info.insert("SASL_PORT".to_string(), sasl.port.to_string());
        }
        if let Some(registry) = service.component("schema_registry") {
            info.insert("SCHEMA_REGISTRY_HOST".to_string(), registry.host.clone());
            info.insert("SCHEMA_REGISTRY_PORT".to_string(), registry.port.to_string());
        }
        if let Some(rest) = service.component("kafka_rest") {
            info.insert("REST_HOST".to_string(), rest.host.clone());
            info.insert("REST_PORT".to_string(), rest.port.to_string());
        }
        Ok(info)
    }
}

/// True when the service should be powered on.
fn wants_power<K: ServiceKind>(record: &K) -> bool {
    record.common().powered.unwrap_or(true)
}

fn disk_space_mb(common: &ServiceCommonSpec) -> Result<Option<u64>, OperatorError> {
    common
        .disk_space
        .as_deref()
        .map(parse_disk_space_mb)
        .transpose()
}

/// Adapter for a service kind.
pub struct ServiceAdapter<K> {
    cluster: ClusterLookup,
    kind: PhantomData<fn() -> K>,
}

impl<K: ServiceKind> ServiceAdapter<K> {
    #[must_use]
    pub fn new(cluster: ClusterLookup) -> Self {
        Self {
            cluster,
            kind: PhantomData,
        }
    }

    /// VPC id from `projectVPCRef` when set, `projectVpcId` otherwise.
    async fn project_vpc_id(&self, record: &K) -> Result<Option<String>, OperatorError> {
        let common = record.common();
        match &common.project_vpc_ref {
            Some(reference) => Ok(Some(
                resolve_project_vpc_id(&self.cluster.client, &record.record_namespace(), reference)
                    .await?,
            )),
            None => Ok(common.project_vpc_id.clone()),
        }
    }

    /// Request body for creating `record`'s service.
    ///
    /// # Errors
    ///
    /// Returns `InvalidSpec` for a malformed `diskSpace`.
    pub fn create_request(
        record: &K,
        project_vpc_id: Option<String>,
    ) -> Result<CreateServiceRequest, OperatorError> {
        let common = record.common();
        Ok(CreateServiceRequest {
            service_name: record.name_any(),
            service_type: K::SERVICE_TYPE.to_string(),
            plan: common.plan.clone(),
            cloud: common.cloud_name.clone(),
            project_vpc_id,
            termination_protection: common.termination_protection,
            disk_space_mb: disk_space_mb(common)?,
            tags: common.tags.clone().unwrap_or_default(),
            service_integrations: common
                .service_integrations
                .iter()
                .flatten()
                .map(|item| ServiceIntegrationSpec {
                    integration_type: item.integration_type.clone(),
                    source_service: item.source_service_name.clone(),
                })
                .collect(),
            user_config: record.create_user_config(),
        })
    }

    /// Request body for updating `record`'s service.
    ///
    /// # Errors
    ///
    /// Returns `InvalidSpec` for a malformed `diskSpace`.
    pub fn update_request(
        record: &K,
        project_vpc_id: Option<String>,
    ) -> Result<UpdateServiceRequest, OperatorError> {
        let common = record.common();
        Ok(UpdateServiceRequest {
            plan: common.plan.clone(),
            cloud: common.cloud_name.clone(),
            project_vpc_id,
            powered: wants_power(record),
            termination_protection: common.termination_protection,
            disk_space_mb: disk_space_mb(common)?,
            user_config: record.user_config(),
        })
    }
}

#[async_trait]
impl<K: ServiceKind> KindAdapter for ServiceAdapter<K> {
    type Record = K;
    type Remote = Service;

    const IDENTITY: Identity = Identity::Name;

    async fn check_preconditions(&self, record: &K) -> Result<(), OperatorError> {
        ensure_ready(&self.cluster, record.project(), &record.dependencies()).await
    }

    async fn create(&self, record: &K) -> Result<String, OperatorError> {
        let project_vpc_id = self.project_vpc_id(record).await?;
        let request = Self::create_request(record, project_vpc_id)?;
        let service = self
            .cluster
            .control_plane
            .create_service(record.project(), &request)
            .await?;
        Ok(service.service_name)
    }

    async fn update(&self, record: &K, id: &str) -> Result<(), OperatorError> {
        let project_vpc_id = self.project_vpc_id(record).await?;
        let request = Self::update_request(record, project_vpc_id)?;
        self.cluster
            .control_plane
            .update_service(record.project(), id, &request)
            .await?;
        Ok(())
    }

    async fn get(&self, record: &K, id: Option<&str>) -> Result<Service, OperatorError> {
        let name = id.map_or_else(|| record.name_any(), str::to_string);
        self.cluster
            .control_plane
            .get_service(record.project(), &name)
            .await
    }

    async fn delete(&self, record: &K, id: Option<&str>) -> Result<(), OperatorError> {
        let name = id.map_or_else(|| record.name_any(), str::to_string);
        self.cluster
            .control_plane
            .delete_service(record.project(), &name)
            .await
    }

    async fn connection_info(
        &self,
        record: &K,
        remote: &Service,
    ) -> Result<ConnectionInfo, OperatorError> {
        let ca_cert = self
            .cluster
            .control_plane
            .get_project_ca(record.project())
            .await?;
        K::connection_info(remote, ca_cert)
    }

    fn is_ready(&self, record: &K, remote: &Service) -> bool {
        if wants_power(record) {
            remote.state == SERVICE_STATE_RUNNING
        } else {
            remote.state == SERVICE_STATE_POWEROFF
        }
    }

    fn observed_state(&self, remote: &Service) -> String {
        remote.state.clone()
    }

    fn remote_id(&self, remote: &Service) -> String {
        remote.service_name.clone()
    }

    fn matches_existing(&self, _record: &K, remote: &Service) -> bool {
        remote.service_type == K::SERVICE_TYPE
    }

    /// The service settled in the wrong power state, either behind our back or because
    /// it was created running while `powered` is false.
    fn needs_update(&self, record: &K, remote: &Service) -> bool {
        let powered_off = remote.state == SERVICE_STATE_POWEROFF;
        let settled = powered_off || remote.state == SERVICE_STATE_RUNNING;
        settled && wants_power(record) == powered_off
    }
}

#[cfg(test)]
#[path = "service_tests.rs"]
mod service_tests;
