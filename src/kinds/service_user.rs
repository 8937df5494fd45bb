// Copyright (c) 2025 Erick Bourgeois, firestoned
// SPDX-License-Identifier: MIT

//! `ServiceUser` adapter.
//!
//! The user is named after the record. With `connInfoSecretSource` set, its password
//! is reset to the source value after creation and again whenever the value's
//! fingerprint changes; without it, the control plane generates the password.

use super::{optional, require};
use crate::constants::STATE_ACTIVE;
use crate::controlplane::types::{CreateUserRequest, ModifyUserRequest, Service, ServiceUserInfo};
use crate::crd::ServiceUser;
use crate::errors::OperatorError;
use crate::reconcilers::adapter::{ConnectionInfo, Identity, KindAdapter};
use crate::reconcilers::dependencies::{ensure_ready, ClusterLookup};
use crate::resource::ManagedResource;
use crate::secrets::source::read_source;
use async_trait::async_trait;
use kube::ResourceExt;
use tracing::debug;

/// User type of the administrative user every service is created with.
const PRIMARY_USER_TYPE: &str = "primary";

pub struct ServiceUserAdapter {
    cluster: ClusterLookup,
}

impl ServiceUserAdapter {
    #[must_use]
    pub fn new(cluster: ClusterLookup) -> Self {
        Self { cluster }
    }

    /// Reset the password to the source value, if the record declares a source.
    async fn apply_source_password(
        &self,
        record: &ServiceUser,
        username: &str,
    ) -> Result<(), OperatorError> {
        let Some(source) = read_source(&self.cluster.client, record).await? else {
            return Ok(());
        };
        debug!(
            user = %username,
            fingerprint = %source.fingerprint,
            "Applying password from source secret"
        );
        self.cluster
            .control_plane
            .modify_user(
                record.project(),
                &record.spec.service_name,
                username,
                &ModifyUserRequest::reset_credentials(Some(source.value)),
            )
            .await
    }
}

/// Host and port of the service endpoint users connect to.
fn endpoint(service: &Service) -> (Option<String>, Option<String>) {
    let params = &service.service_uri_params;
    if let (Some(host), Some(port)) = (params.get("host"), params.get("port")) {
        return (Some(host.clone()), Some(port.clone()));
    }
    let component = service.component(&service.service_type);
    (
        component.map(|c| c.host.clone()),
        component.map(|c| c.port.to_string()),
    )
}

#[async_trait]
impl KindAdapter for ServiceUserAdapter {
    type Record = ServiceUser;
    type Remote = ServiceUserInfo;

    const IDENTITY: Identity = Identity::Name;

    async fn check_preconditions(&self, record: &ServiceUser) -> Result<(), OperatorError> {
        ensure_ready(&self.cluster, record.project(), &record.dependencies()).await
    }

    async fn source_fingerprint(
        &self,
        record: &ServiceUser,
    ) -> Result<Option<String>, OperatorError> {
        Ok(read_source(&self.cluster.client, record)
            .await?
            .map(|source| source.fingerprint))
    }

    async fn create(&self, record: &ServiceUser) -> Result<String, OperatorError> {
        let request = CreateUserRequest {
            username: record.name_any(),
            authentication: record.spec.authentication.clone(),
        };
        let user = self
            .cluster
            .control_plane
            .create_user(record.project(), &record.spec.service_name, &request)
            .await?;
        self.apply_source_password(record, &user.username).await?;
        Ok(user.username)
    }

    async fn update(&self, record: &ServiceUser, id: &str) -> Result<(), OperatorError> {
        if let Some(authentication) = &record.spec.authentication {
            self.cluster
                .control_plane
                .modify_user(
                    record.project(),
                    &record.spec.service_name,
                    id,
                    &ModifyUserRequest::set_authentication(authentication.clone()),
                )
                .await?;
        }
        self.apply_source_password(record, id).await
    }

    async fn get(
        &self,
        record: &ServiceUser,
        id: Option<&str>,
    ) -> Result<ServiceUserInfo, OperatorError> {
        let username = id.map_or_else(|| record.name_any(), str::to_string);
        self.cluster
            .control_plane
            .get_user(record.project(), &record.spec.service_name, &username)
            .await
    }

    async fn delete(&self, record: &ServiceUser, id: Option<&str>) -> Result<(), OperatorError> {
        let username = id.map_or_else(|| record.name_any(), str::to_string);
        self.cluster
            .control_plane
            .delete_user(record.project(), &record.spec.service_name, &username)
            .await
    }

    async fn connection_info(
        &self,
        record: &ServiceUser,
        remote: &ServiceUserInfo,
    ) -> Result<ConnectionInfo, OperatorError> {
        let control_plane = &self.cluster.control_plane;
        let service = control_plane
            .get_service(record.project(), &record.spec.service_name)
            .await?;
        let ca_cert = control_plane.get_project_ca(record.project()).await?;

        let source = format!("service {}", service.service_name);
        let (host, port) = endpoint(&service);
        let mut info = ConnectionInfo::new();
        require(&mut info, "HOST", host, &source)?;
        require(&mut info, "PORT", port, &source)?;
        info.insert("USERNAME".to_string(), remote.username.clone());
        require(&mut info, "PASSWORD", remote.password.as_ref(), &source)?;
        optional(&mut info, "ACCESS_CERT", remote.access_cert.as_ref());
        optional(&mut info, "ACCESS_KEY", remote.access_key.as_ref());
        info.insert("CA_CERT".to_string(), ca_cert);
        Ok(info)
    }

    fn is_ready(&self, _record: &ServiceUser, _remote: &ServiceUserInfo) -> bool {
        true
    }

    fn observed_state(&self, _remote: &ServiceUserInfo) -> String {
        STATE_ACTIVE.to_string()
    }

    fn remote_id(&self, remote: &ServiceUserInfo) -> String {
        remote.username.clone()
    }

    /// The service's administrative user is never taken over.
    fn matches_existing(&self, _record: &ServiceUser, remote: &ServiceUserInfo) -> bool {
        remote.user_type.as_deref() != Some(PRIMARY_USER_TYPE)
    }
}

#[cfg(test)]
#[path = "service_user_tests.rs"]
mod service_user_tests;
