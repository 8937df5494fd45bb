// Copyright (c) 2025 Erick Bourgeois, firestoned
// SPDX-License-Identifier: MIT

//! Service user endpoints.

use super::types::{CreateUserRequest, ModifyUserRequest, ServiceUserInfo, UserEnvelope};
use super::ControlPlaneClient;
use crate::errors::OperatorError;
use reqwest::Method;
use tracing::info;

impl ControlPlaneClient {
    /// Create a user on a service. Returns `AlreadyExists` when the name is taken.
    pub async fn create_user(
        &self,
        project: &str,
        service: &str,
        request: &CreateUserRequest,
    ) -> Result<ServiceUserInfo, OperatorError> {
        let envelope: UserEnvelope = self
            .send_json(
                Method::POST,
                &["project", project, "service", service, "user"],
                request,
                &format!("user {} on service {service}", request.username),
            )
            .await?;

        info!(project = %project, service = %service, user = %request.username, "Created service user");
        Ok(envelope.user)
    }

    /// Fetch a user with its credentials.
    pub async fn get_user(
        &self,
        project: &str,
        service: &str,
        username: &str,
    ) -> Result<ServiceUserInfo, OperatorError> {
        let envelope: UserEnvelope = self
            .get_json(
                &["project", project, "service", service, "user", username],
                &format!("user {username} on service {service}"),
            )
            .await?;
        Ok(envelope.user)
    }

    /// Reset credentials or change the authentication mechanism.
    pub async fn modify_user(
        &self,
        project: &str,
        service: &str,
        username: &str,
        request: &ModifyUserRequest,
    ) -> Result<(), OperatorError> {
        self.send(
            Method::PUT,
            &["project", project, "service", service, "user", username],
            Some(request),
            &format!("user {username} on service {service}"),
        )
        .await?;

        info!(
            project = %project,
            service = %service,
            user = %username,
            operation = %request.operation,
            "Modified service user"
        );
        Ok(())
    }

    /// Delete a user.
    pub async fn delete_user(
        &self,
        project: &str,
        service: &str,
        username: &str,
    ) -> Result<(), OperatorError> {
        self.send(
            Method::DELETE,
            &["project", project, "service", service, "user", username],
            None::<&()>,
            &format!("user {username} on service {service}"),
        )
        .await?;

        info!(project = %project, service = %service, user = %username, "Deleted service user");
        Ok(())
    }
}
