// Copyright (c) 2025 Erick Bourgeois, firestoned
// SPDX-License-Identifier: MIT

//! Implementations of [`ManagedResource`] for all resource kinds.

use crate::constants::{
    KIND_CONNECTION_POOL, KIND_DATABASE, KIND_KAFKA, KIND_KAFKA_ACL, KIND_KAFKA_TOPIC,
    KIND_POSTGRESQL, KIND_PROJECT_VPC, KIND_SERVICE_INTEGRATION, KIND_SERVICE_USER,
};
use crate::crd::{
    ConnInfoSecretSource, ConnInfoSecretTarget, ConnectionPool, Database, Kafka, KafkaACL,
    KafkaTopic, PostgreSQL, ProjectVPC, ResourceStatus, ServiceCommonSpec, ServiceIntegration,
    ServiceUser,
};
use crate::resource::{Dependency, ManagedResource};
use kube::ResourceExt;

/// Dependencies shared by every service kind: its VPC and its read-replica sources.
fn service_dependencies(namespace: &str, common: &ServiceCommonSpec) -> Vec<Dependency> {
    let mut deps = Vec::new();

    if let Some(vpc) = &common.project_vpc_ref {
        let vpc_namespace = vpc.namespace.as_deref().unwrap_or(namespace);
        deps.push(Dependency::project_vpc(vpc_namespace, &vpc.name));
    }

    for integration in common.service_integrations.iter().flatten() {
        deps.push(Dependency::service(
            namespace,
            &integration.source_service_name,
        ));
    }

    deps
}

impl ManagedResource for PostgreSQL {
    const KIND: &'static str = KIND_POSTGRESQL;
    const SECRET_PREFIX: Option<&'static str> = Some("POSTGRESQL_");

    fn resource_status(&self) -> Option<&ResourceStatus> {
        self.status.as_ref()
    }

    fn project(&self) -> &str {
        &self.spec.common.project
    }

    fn conn_info_secret_target(&self) -> Option<&ConnInfoSecretTarget> {
        self.spec.common.conn_info_secret_target.as_ref()
    }

    fn conn_info_secret_target_disabled(&self) -> bool {
        self.spec
            .common
            .conn_info_secret_target_disabled
            .unwrap_or(false)
    }

    fn dependencies(&self) -> Vec<Dependency> {
        let namespace = self.record_namespace();
        let mut deps = service_dependencies(&namespace, &self.spec.common);
        if let Some(source) = &self.spec.fork_from_service_name {
            deps.push(Dependency::service(&namespace, source));
        }
        deps
    }

    fn provides(&self) -> Option<Dependency> {
        Some(Dependency::service(self.record_namespace(), self.name_any()))
    }
}

impl ManagedResource for Kafka {
    const KIND: &'static str = KIND_KAFKA;
    const SECRET_PREFIX: Option<&'static str> = Some("KAFKA_");

    fn resource_status(&self) -> Option<&ResourceStatus> {
        self.status.as_ref()
    }

    fn project(&self) -> &str {
        &self.spec.common.project
    }

    fn conn_info_secret_target(&self) -> Option<&ConnInfoSecretTarget> {
        self.spec.common.conn_info_secret_target.as_ref()
    }

    fn conn_info_secret_target_disabled(&self) -> bool {
        self.spec
            .common
            .conn_info_secret_target_disabled
            .unwrap_or(false)
    }

    fn dependencies(&self) -> Vec<Dependency> {
        service_dependencies(&self.record_namespace(), &self.spec.common)
    }

    fn provides(&self) -> Option<Dependency> {
        Some(Dependency::service(self.record_namespace(), self.name_any()))
    }
}

impl ManagedResource for ServiceUser {
    const KIND: &'static str = KIND_SERVICE_USER;
    const SECRET_PREFIX: Option<&'static str> = Some("SERVICEUSER_");

    fn resource_status(&self) -> Option<&ResourceStatus> {
        self.status.as_ref()
    }

    fn project(&self) -> &str {
        &self.spec.project
    }

    fn conn_info_secret_target(&self) -> Option<&ConnInfoSecretTarget> {
        self.spec.conn_info_secret_target.as_ref()
    }

    fn conn_info_secret_target_disabled(&self) -> bool {
        self.spec.conn_info_secret_target_disabled.unwrap_or(false)
    }

    fn conn_info_secret_source(&self) -> Option<&ConnInfoSecretSource> {
        self.spec.conn_info_secret_source.as_ref()
    }

    fn dependencies(&self) -> Vec<Dependency> {
        vec![Dependency::service(
            self.record_namespace(),
            &self.spec.service_name,
        )]
    }

    fn provides(&self) -> Option<Dependency> {
        Some(Dependency::service_user(
            self.record_namespace(),
            &self.spec.service_name,
            self.name_any(),
        ))
    }
}

impl Database {
    /// External database name: `spec.databaseName` or the record name.
    #[must_use]
    pub fn database_name(&self) -> String {
        self.spec
            .database_name
            .clone()
            .unwrap_or_else(|| self.name_any())
    }
}

impl ManagedResource for Database {
    const KIND: &'static str = KIND_DATABASE;

    fn resource_status(&self) -> Option<&ResourceStatus> {
        self.status.as_ref()
    }

    fn project(&self) -> &str {
        &self.spec.project
    }

    fn dependencies(&self) -> Vec<Dependency> {
        vec![Dependency::service(
            self.record_namespace(),
            &self.spec.service_name,
        )]
    }

    fn provides(&self) -> Option<Dependency> {
        Some(Dependency::database(
            self.record_namespace(),
            &self.spec.service_name,
            self.database_name(),
        ))
    }
}

impl ManagedResource for ConnectionPool {
    const KIND: &'static str = KIND_CONNECTION_POOL;
    const SECRET_PREFIX: Option<&'static str> = Some("CONNECTIONPOOL_");

    fn resource_status(&self) -> Option<&ResourceStatus> {
        self.status.as_ref()
    }

    fn project(&self) -> &str {
        &self.spec.project
    }

    fn conn_info_secret_target(&self) -> Option<&ConnInfoSecretTarget> {
        self.spec.conn_info_secret_target.as_ref()
    }

    fn conn_info_secret_target_disabled(&self) -> bool {
        self.spec.conn_info_secret_target_disabled.unwrap_or(false)
    }

    fn dependencies(&self) -> Vec<Dependency> {
        let namespace = self.record_namespace();
        vec![
            Dependency::service(&namespace, &self.spec.service_name),
            Dependency::database(&namespace, &self.spec.service_name, &self.spec.database_name),
            Dependency::service_user(&namespace, &self.spec.service_name, &self.spec.username),
        ]
    }
}

impl KafkaTopic {
    /// External topic name: `spec.topicName` or the record name.
    #[must_use]
    pub fn topic_name(&self) -> String {
        self.spec
            .topic_name
            .clone()
            .unwrap_or_else(|| self.name_any())
    }
}

impl ManagedResource for KafkaTopic {
    const KIND: &'static str = KIND_KAFKA_TOPIC;

    fn resource_status(&self) -> Option<&ResourceStatus> {
        self.status.as_ref()
    }

    fn project(&self) -> &str {
        &self.spec.project
    }

    fn dependencies(&self) -> Vec<Dependency> {
        vec![Dependency::service(
            self.record_namespace(),
            &self.spec.service_name,
        )]
    }
}

impl ManagedResource for KafkaACL {
    const KIND: &'static str = KIND_KAFKA_ACL;

    fn resource_status(&self) -> Option<&ResourceStatus> {
        self.status.as_ref()
    }

    fn project(&self) -> &str {
        &self.spec.project
    }

    fn dependencies(&self) -> Vec<Dependency> {
        vec![Dependency::service(
            self.record_namespace(),
            &self.spec.service_name,
        )]
    }
}

impl ManagedResource for ProjectVPC {
    const KIND: &'static str = KIND_PROJECT_VPC;

    fn resource_status(&self) -> Option<&ResourceStatus> {
        self.status.as_ref()
    }

    fn project(&self) -> &str {
        &self.spec.project
    }

    fn provides(&self) -> Option<Dependency> {
        Some(Dependency::project_vpc(
            self.record_namespace(),
            self.name_any(),
        ))
    }
}

impl ManagedResource for ServiceIntegration {
    const KIND: &'static str = KIND_SERVICE_INTEGRATION;

    fn resource_status(&self) -> Option<&ResourceStatus> {
        self.status.as_ref()
    }

    fn project(&self) -> &str {
        &self.spec.project
    }

    fn dependencies(&self) -> Vec<Dependency> {
        let namespace = self.record_namespace();
        vec![
            Dependency::service(&namespace, &self.spec.source_service_name),
            Dependency::service(&namespace, &self.spec.destination_service_name),
        ]
    }
}
