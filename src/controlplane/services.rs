// Copyright (c) 2025 Erick Bourgeois, firestoned
// SPDX-License-Identifier: MIT

//! Service endpoints and the project CA certificate.

use super::types::{
    CaEnvelope, CreateServiceRequest, Service, ServiceEnvelope, UpdateServiceRequest,
};
use super::ControlPlaneClient;
use crate::errors::OperatorError;
use reqwest::Method;
use tracing::info;

impl ControlPlaneClient {
    /// Create a service. Returns `AlreadyExists` when the name is taken.
    pub async fn create_service(
        &self,
        project: &str,
        request: &CreateServiceRequest,
    ) -> Result<Service, OperatorError> {
        let resource = format!("service {}", request.service_name);
        let envelope: ServiceEnvelope = self
            .send_json(Method::POST, &["project", project, "service"], request, &resource)
            .await?;

        info!(
            project = %project,
            service = %request.service_name,
            service_type = %request.service_type,
            plan = %request.plan,
            "Created service"
        );
        Ok(envelope.service)
    }

    /// Fetch a service document.
    pub async fn get_service(&self, project: &str, service: &str) -> Result<Service, OperatorError> {
        let envelope: ServiceEnvelope = self
            .get_json(
                &["project", project, "service", service],
                &format!("service {service}"),
            )
            .await?;
        Ok(envelope.service)
    }

    /// Update a service's mutable settings.
    pub async fn update_service(
        &self,
        project: &str,
        service: &str,
        request: &UpdateServiceRequest,
    ) -> Result<Service, OperatorError> {
        let envelope: ServiceEnvelope = self
            .send_json(
                Method::PUT,
                &["project", project, "service", service],
                request,
                &format!("service {service}"),
            )
            .await?;

        info!(project = %project, service = %service, powered = request.powered, "Updated service");
        Ok(envelope.service)
    }

    /// Delete a service.
    pub async fn delete_service(&self, project: &str, service: &str) -> Result<(), OperatorError> {
        self.send(
            Method::DELETE,
            &["project", project, "service", service],
            None::<&()>,
            &format!("service {service}"),
        )
        .await?;

        info!(project = %project, service = %service, "Deleted service");
        Ok(())
    }

    /// PEM CA certificate shared by all services of a project.
    pub async fn get_project_ca(&self, project: &str) -> Result<String, OperatorError> {
        let envelope: CaEnvelope = self
            .get_json(
                &["project", project, "kms", "ca"],
                &format!("CA certificate of project {project}"),
            )
            .await?;
        Ok(envelope.certificate)
    }
}

/// Parse a disk size such as `80GiB`, `600 GiB` or `1TiB` into mebibytes.
///
/// # Errors
///
/// Returns `InvalidSpec` for anything that is not a positive integer followed by
/// `MiB`, `GiB` or `TiB`.
pub fn parse_disk_space_mb(value: &str) -> Result<u64, OperatorError> {
    let trimmed = value.trim();
    let split = trimmed
        .find(|c: char| !c.is_ascii_digit())
        .unwrap_or(trimmed.len());
    let (number, unit) = trimmed.split_at(split);

    let number: u64 = number
        .parse()
        .map_err(|_| OperatorError::invalid_spec(format!("invalid diskSpace {value:?}")))?;
    let multiplier = match unit.trim() {
        "MiB" => 1,
        "GiB" => 1024,
        "TiB" => 1024 * 1024,
        other => {
            return Err(OperatorError::invalid_spec(format!(
                "invalid diskSpace unit {other:?} in {value:?}, expected MiB, GiB or TiB"
            )))
        }
    };

    if number == 0 {
        return Err(OperatorError::invalid_spec(format!(
            "diskSpace must be positive, got {value:?}"
        )));
    }
    Ok(number * multiplier)
}

#[cfg(test)]
#[path = "services_tests.rs"]
mod services_tests;
