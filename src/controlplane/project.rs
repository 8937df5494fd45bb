// Copyright (c) 2025 Erick Bourgeois, firestoned
// SPDX-License-Identifier: MIT

//! Project-scoped endpoints: VPCs and service integrations.

use super::types::{
    CreateIntegrationRequest, CreateVpcRequest, Integration, IntegrationEnvelope,
    IntegrationList, UpdateIntegrationRequest, Vpc, VpcList,
};
use super::ControlPlaneClient;
use crate::errors::OperatorError;
use reqwest::Method;
use tracing::info;

impl ControlPlaneClient {
    /// Create a project VPC and return it with its server-assigned id.
    pub async fn create_vpc(
        &self,
        project: &str,
        request: &CreateVpcRequest,
    ) -> Result<Vpc, OperatorError> {
        let vpc: Vpc = self
            .send_json(
                Method::POST,
                &["project", project, "vpcs"],
                request,
                &format!("VPC {} in {}", request.network_cidr, request.cloud_name),
            )
            .await?;

        info!(
            project = %project,
            vpc_id = %vpc.project_vpc_id,
            cloud = %vpc.cloud_name,
            "Created project VPC"
        );
        Ok(vpc)
    }

    /// Fetch a VPC by id.
    pub async fn get_vpc(&self, project: &str, id: &str) -> Result<Vpc, OperatorError> {
        self.get_json(&["project", project, "vpcs", id], &format!("VPC {id}"))
            .await
    }

    /// List the VPCs of a project.
    pub async fn list_vpcs(&self, project: &str) -> Result<Vec<Vpc>, OperatorError> {
        let list: VpcList = self
            .get_json(
                &["project", project, "vpcs"],
                &format!("VPCs of project {project}"),
            )
            .await?;
        Ok(list.vpcs)
    }

    /// Delete a VPC by id.
    pub async fn delete_vpc(&self, project: &str, id: &str) -> Result<(), OperatorError> {
        self.send(
            Method::DELETE,
            &["project", project, "vpcs", id],
            None::<&()>,
            &format!("VPC {id}"),
        )
        .await?;

        info!(project = %project, vpc_id = %id, "Deleted project VPC");
        Ok(())
    }

    /// Create an integration and return it with its server-assigned id.
    pub async fn create_integration(
        &self,
        project: &str,
        request: &CreateIntegrationRequest,
    ) -> Result<Integration, OperatorError> {
        let envelope: IntegrationEnvelope = self
            .send_json(
                Method::POST,
                &["project", project, "integration"],
                request,
                &format!(
                    "{} integration {} -> {}",
                    request.integration_type, request.source_service, request.dest_service
                ),
            )
            .await?;

        info!(
            project = %project,
            integration_id = %envelope.service_integration.service_integration_id,
            integration_type = %request.integration_type,
            "Created service integration"
        );
        Ok(envelope.service_integration)
    }

    /// Fetch an integration by id.
    pub async fn get_integration(
        &self,
        project: &str,
        id: &str,
    ) -> Result<Integration, OperatorError> {
        let envelope: IntegrationEnvelope = self
            .get_json(
                &["project", project, "integration", id],
                &format!("integration {id}"),
            )
            .await?;
        Ok(envelope.service_integration)
    }

    /// Replace an integration's user config.
    pub async fn update_integration(
        &self,
        project: &str,
        id: &str,
        request: &UpdateIntegrationRequest,
    ) -> Result<Integration, OperatorError> {
        let envelope: IntegrationEnvelope = self
            .send_json(
                Method::PUT,
                &["project", project, "integration", id],
                request,
                &format!("integration {id}"),
            )
            .await?;

        info!(project = %project, integration_id = %id, "Updated service integration");
        Ok(envelope.service_integration)
    }

    /// Delete an integration by id.
    pub async fn delete_integration(&self, project: &str, id: &str) -> Result<(), OperatorError> {
        self.send(
            Method::DELETE,
            &["project", project, "integration", id],
            None::<&()>,
            &format!("integration {id}"),
        )
        .await?;

        info!(project = %project, integration_id = %id, "Deleted service integration");
        Ok(())
    }

    /// List the integrations a service takes part in.
    pub async fn list_service_integrations(
        &self,
        project: &str,
        service: &str,
    ) -> Result<Vec<Integration>, OperatorError> {
        let list: IntegrationList = self
            .get_json(
                &["project", project, "service", service, "integration"],
                &format!("integrations of service {service}"),
            )
            .await?;
        Ok(list.service_integrations)
    }
}
