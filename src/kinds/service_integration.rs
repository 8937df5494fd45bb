// Copyright (c) 2025 Erick Bourgeois, firestoned
// SPDX-License-Identifier: MIT

//! `ServiceIntegration` adapter.

use crate::constants::INTEGRATION_STATE_ACTIVE;
use crate::controlplane::types::{
    CreateIntegrationRequest, Integration, UpdateIntegrationRequest,
};
use crate::crd::ServiceIntegration;
use crate::errors::OperatorError;
use crate::reconcilers::adapter::{Identity, KindAdapter};
use crate::reconcilers::dependencies::{ensure_ready, ClusterLookup};
use crate::resource::ManagedResource;
use async_trait::async_trait;

const INTEGRATION_STATE_INACTIVE: &str = "inactive";

pub struct ServiceIntegrationAdapter {
    cluster: ClusterLookup,
}

impl ServiceIntegrationAdapter {
    #[must_use]
    pub fn new(cluster: ClusterLookup) -> Self {
        Self { cluster }
    }

    /// Look an integration up by its endpoints when no id has been recorded.
    async fn find(&self, record: &ServiceIntegration) -> Result<Integration, OperatorError> {
        self.cluster
            .control_plane
            .list_service_integrations(record.project(), &record.spec.source_service_name)
            .await?
            .into_iter()
            .find(|integration| same_endpoints(record, integration))
            .ok_or_else(|| {
                OperatorError::not_found(format!(
                    "{} integration {} -> {}",
                    record.spec.integration_type,
                    record.spec.source_service_name,
                    record.spec.destination_service_name
                ))
            })
    }
}

fn same_endpoints(record: &ServiceIntegration, integration: &Integration) -> bool {
    integration.integration_type == record.spec.integration_type
        && integration.source_service == record.spec.source_service_name
        && integration.dest_service == record.spec.destination_service_name
}

/// Request body for creating `record`'s integration.
#[must_use]
pub fn integration_request(record: &ServiceIntegration) -> CreateIntegrationRequest {
    CreateIntegrationRequest {
        integration_type: record.spec.integration_type.clone(),
        source_service: record.spec.source_service_name.clone(),
        dest_service: record.spec.destination_service_name.clone(),
        user_config: record.spec.user_config.clone().unwrap_or_default(),
    }
}

#[async_trait]
impl KindAdapter for ServiceIntegrationAdapter {
    type Record = ServiceIntegration;
    type Remote = Integration;

    const IDENTITY: Identity = Identity::ServerAssigned;

    async fn check_preconditions(&self, record: &ServiceIntegration) -> Result<(), OperatorError> {
        ensure_ready(&self.cluster, record.project(), &record.dependencies()).await
    }

    async fn create(&self, record: &ServiceIntegration) -> Result<String, OperatorError> {
        let integration = self
            .cluster
            .control_plane
            .create_integration(record.project(), &integration_request(record))
            .await?;
        Ok(integration.service_integration_id)
    }

    async fn update(&self, record: &ServiceIntegration, id: &str) -> Result<(), OperatorError> {
        let request = UpdateIntegrationRequest {
            user_config: record.spec.user_config.clone().unwrap_or_default(),
        };
        self.cluster
            .control_plane
            .update_integration(record.project(), id, &request)
            .await?;
        Ok(())
    }

    async fn get(
        &self,
        record: &ServiceIntegration,
        id: Option<&str>,
    ) -> Result<Integration, OperatorError> {
        match id {
            Some(id) => {
                self.cluster
                    .control_plane
                    .get_integration(record.project(), id)
                    .await
            }
            None => self.find(record).await,
        }
    }

    async fn delete(
        &self,
        record: &ServiceIntegration,
        id: Option<&str>,
    ) -> Result<(), OperatorError> {
        let id = match id {
            Some(id) => id.to_string(),
            None => self.find(record).await?.service_integration_id,
        };
        self.cluster
            .control_plane
            .delete_integration(record.project(), &id)
            .await
    }

    fn is_ready(&self, _record: &ServiceIntegration, remote: &Integration) -> bool {
        remote.active
    }

    fn observed_state(&self, remote: &Integration) -> String {
        if remote.active {
            INTEGRATION_STATE_ACTIVE.to_string()
        } else {
            INTEGRATION_STATE_INACTIVE.to_string()
        }
    }

    fn remote_id(&self, remote: &Integration) -> String {
        remote.service_integration_id.clone()
    }

    fn matches_existing(&self, record: &ServiceIntegration, remote: &Integration) -> bool {
        same_endpoints(record, remote)
    }
}

#[cfg(test)]
#[path = "service_integration_tests.rs"]
mod service_integration_tests;
