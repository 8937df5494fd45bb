// Copyright (c) 2025 Erick Bourgeois, firestoned
// SPDX-License-Identifier: MIT

//! Kafka topic and ACL endpoints.

use super::types::{Acl, AclList, CreateAclRequest, Topic, TopicEnvelope, TopicRequest};
use super::ControlPlaneClient;
use crate::errors::OperatorError;
use reqwest::Method;
use tracing::info;

impl ControlPlaneClient {
    /// Create a topic. `request.topic_name` must be set.
    pub async fn create_topic(
        &self,
        project: &str,
        service: &str,
        request: &TopicRequest,
    ) -> Result<(), OperatorError> {
        let topic = request.topic_name.as_deref().unwrap_or_default();
        self.send(
            Method::POST,
            &["project", project, "service", service, "topic"],
            Some(request),
            &format!("topic {topic} on service {service}"),
        )
        .await?;

        info!(
            project = %project,
            service = %service,
            topic = %topic,
            partitions = request.partitions,
            replication = request.replication,
            "Created Kafka topic"
        );
        Ok(())
    }

    /// Fetch a topic.
    pub async fn get_topic(
        &self,
        project: &str,
        service: &str,
        topic: &str,
    ) -> Result<Topic, OperatorError> {
        let envelope: TopicEnvelope = self
            .get_json(
                &["project", project, "service", service, "topic", topic],
                &format!("topic {topic} on service {service}"),
            )
            .await?;
        Ok(envelope.topic)
    }

    /// Update a topic's partitions, replication and config.
    pub async fn update_topic(
        &self,
        project: &str,
        service: &str,
        topic: &str,
        request: &TopicRequest,
    ) -> Result<(), OperatorError> {
        self.send(
            Method::PUT,
            &["project", project, "service", service, "topic", topic],
            Some(request),
            &format!("topic {topic} on service {service}"),
        )
        .await?;

        info!(project = %project, service = %service, topic = %topic, "Updated Kafka topic");
        Ok(())
    }

    /// Delete a topic.
    pub async fn delete_topic(
        &self,
        project: &str,
        service: &str,
        topic: &str,
    ) -> Result<(), OperatorError> {
        self.send(
            Method::DELETE,
            &["project", project, "service", service, "topic", topic],
            None::<&()>,
            &format!("topic {topic} on service {service}"),
        )
        .await?;

        info!(project = %project, service = %service, topic = %topic, "Deleted Kafka topic");
        Ok(())
    }

    /// List all ACL entries of a Kafka service.
    pub async fn list_acls(&self, project: &str, service: &str) -> Result<Vec<Acl>, OperatorError> {
        let list: AclList = self
            .get_json(
                &["project", project, "service", service, "acl"],
                &format!("ACLs of service {service}"),
            )
            .await?;
        Ok(list.acl)
    }

    /// Find an ACL entry by id.
    pub async fn get_acl(
        &self,
        project: &str,
        service: &str,
        id: &str,
    ) -> Result<Acl, OperatorError> {
        self.list_acls(project, service)
            .await?
            .into_iter()
            .find(|acl| acl.id == id)
            .ok_or_else(|| OperatorError::not_found(format!("ACL {id} on service {service}")))
    }

    /// Create an ACL entry and return it with its server-assigned id.
    ///
    /// The control plane answers with the full ACL list, so the new entry is the one
    /// matching the request.
    pub async fn create_acl(
        &self,
        project: &str,
        service: &str,
        request: &CreateAclRequest,
    ) -> Result<Acl, OperatorError> {
        let resource = format!(
            "ACL {}:{}:{} on service {service}",
            request.username, request.topic, request.permission
        );
        let list: AclList = self
            .send_json(
                Method::POST,
                &["project", project, "service", service, "acl"],
                request,
                &resource,
            )
            .await?;

        let acl = find_matching_acl(&list.acl, request).cloned().ok_or_else(|| {
            OperatorError::transport(format!("{resource} missing from create response"))
        })?;

        info!(project = %project, service = %service, acl_id = %acl.id, "Created Kafka ACL");
        Ok(acl)
    }

    /// Delete an ACL entry by id.
    pub async fn delete_acl(
        &self,
        project: &str,
        service: &str,
        id: &str,
    ) -> Result<(), OperatorError> {
        self.send(
            Method::DELETE,
            &["project", project, "service", service, "acl", id],
            None::<&()>,
            &format!("ACL {id} on service {service}"),
        )
        .await?;

        info!(project = %project, service = %service, acl_id = %id, "Deleted Kafka ACL");
        Ok(())
    }
}

/// The entry whose permission, topic and username equal the request.
#[must_use]
pub fn find_matching_acl<'a>(acls: &'a [Acl], request: &CreateAclRequest) -> Option<&'a Acl> {
    acls.iter().find(|acl| {
        acl.permission == request.permission
            && acl.topic == request.topic
            && acl.username == request.username
    })
}
