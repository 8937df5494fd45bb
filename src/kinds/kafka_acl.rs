// Copyright (c) 2025 Erick Bourgeois, firestoned
// SPDX-License-Identifier: MIT

//! `KafkaACL` adapter.
//!
//! Entries are immutable on the control plane and addressed by a server-assigned id.
//! Every spec change is realised as replace. Without a stored id, the entry is found by
//! its permission, topic and username.

use crate::constants::STATE_ACTIVE;
use crate::controlplane::kafka::find_matching_acl;
use crate::controlplane::types::{Acl, CreateAclRequest};
use crate::crd::KafkaACL;
use crate::errors::OperatorError;
use crate::reconcilers::adapter::{Identity, KindAdapter};
use crate::reconcilers::dependencies::{ensure_ready, ClusterLookup};
use crate::resource::ManagedResource;
use async_trait::async_trait;

pub struct KafkaAclAdapter {
    cluster: ClusterLookup,
}

impl KafkaAclAdapter {
    #[must_use]
    pub fn new(cluster: ClusterLookup) -> Self {
        Self { cluster }
    }

    async fn find(&self, record: &KafkaACL) -> Result<Acl, OperatorError> {
        let request = acl_request(record);
        let acls = self
            .cluster
            .control_plane
            .list_acls(record.project(), &record.spec.service_name)
            .await?;
        find_matching_acl(&acls, &request).cloned().ok_or_else(|| {
            OperatorError::not_found(format!(
                "ACL {}:{}:{} on service {}",
                request.username, request.topic, request.permission, record.spec.service_name
            ))
        })
    }
}

#[must_use]
pub fn acl_request(record: &KafkaACL) -> CreateAclRequest {
    CreateAclRequest {
        permission: record.spec.permission.as_str().to_string(),
        topic: record.spec.topic.clone(),
        username: record.spec.username.clone(),
    }
}

#[async_trait]
impl KindAdapter for KafkaAclAdapter {
    type Record = KafkaACL;
    type Remote = Acl;

    const IDENTITY: Identity = Identity::ServerAssigned;

    async fn check_preconditions(&self, record: &KafkaACL) -> Result<(), OperatorError> {
        ensure_ready(&self.cluster, record.project(), &record.dependencies()).await
    }

    async fn create(&self, record: &KafkaACL) -> Result<String, OperatorError> {
        let acl = self
            .cluster
            .control_plane
            .create_acl(record.project(), &record.spec.service_name, &acl_request(record))
            .await?;
        Ok(acl.id)
    }

    async fn update(&self, _record: &KafkaACL, id: &str) -> Result<(), OperatorError> {
        Err(OperatorError::invalid_spec(format!(
            "ACL {id} cannot be modified in place"
        )))
    }

    async fn get(&self, record: &KafkaACL, id: Option<&str>) -> Result<Acl, OperatorError> {
        match id {
            Some(id) => {
                self.cluster
                    .control_plane
                    .get_acl(record.project(), &record.spec.service_name, id)
                    .await
            }
            None => self.find(record).await,
        }
    }

    async fn delete(&self, record: &KafkaACL, id: Option<&str>) -> Result<(), OperatorError> {
        let id = match id {
            Some(id) => id.to_string(),
            None => self.find(record).await?.id,
        };
        self.cluster
            .control_plane
            .delete_acl(record.project(), &record.spec.service_name, &id)
            .await
    }

    fn is_ready(&self, _record: &KafkaACL, _remote: &Acl) -> bool {
        true
    }

    fn observed_state(&self, _remote: &Acl) -> String {
        STATE_ACTIVE.to_string()
    }

    fn remote_id(&self, remote: &Acl) -> String {
        remote.id.clone()
    }

    fn matches_existing(&self, record: &KafkaACL, remote: &Acl) -> bool {
        find_matching_acl(std::slice::from_ref(remote), &acl_request(record)).is_some()
    }

    fn requires_replace(&self) -> bool {
        true
    }
}

#[cfg(test)]
#[path = "kafka_acl_tests.rs"]
mod kafka_acl_tests;
