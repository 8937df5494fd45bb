// Copyright (c) 2025 Erick Bourgeois, firestoned
// SPDX-License-Identifier: MIT

//! `KafkaTopic` adapter.

use super::check_termination_protection;
use crate::constants::STATE_ACTIVE;
use crate::controlplane::types::{Tag, Topic, TopicConfig, TopicRequest};
use crate::crd::KafkaTopic;
use crate::errors::OperatorError;
use crate::reconcilers::adapter::{Identity, KindAdapter};
use crate::reconcilers::dependencies::{ensure_ready, ClusterLookup};
use crate::resource::ManagedResource;
use async_trait::async_trait;

pub struct KafkaTopicAdapter {
    cluster: ClusterLookup,
}

impl KafkaTopicAdapter {
    #[must_use]
    pub fn new(cluster: ClusterLookup) -> Self {
        Self { cluster }
    }
}

/// Request body for `record`; `topic_name` is only sent on create.
#[must_use]
pub fn topic_request(record: &KafkaTopic, topic_name: Option<String>) -> TopicRequest {
    let config = record
        .spec
        .config
        .as_ref()
        .map(|config| TopicConfig {
            retention_ms: config.retention_ms,
            cleanup_policy: config.cleanup_policy.clone(),
            min_insync_replicas: config.min_insync_replicas,
        })
        .unwrap_or_default();
    let tags = record
        .spec
        .tags
        .iter()
        .flatten()
        .map(|(key, value)| Tag {
            key: key.clone(),
            value: value.clone(),
        })
        .collect();

    TopicRequest {
        topic_name,
        partitions: record.spec.partitions,
        replication: record.spec.replication,
        config,
        tags,
        termination_protection: record.spec.termination_protection,
    }
}

fn partition_count(topic: &Topic) -> u32 {
    u32::try_from(topic.partitions.len()).unwrap_or(u32::MAX)
}

#[async_trait]
impl KindAdapter for KafkaTopicAdapter {
    type Record = KafkaTopic;
    type Remote = Topic;

    const IDENTITY: Identity = Identity::Name;

    async fn check_preconditions(&self, record: &KafkaTopic) -> Result<(), OperatorError> {
        ensure_ready(&self.cluster, record.project(), &record.dependencies()).await
    }

    async fn create(&self, record: &KafkaTopic) -> Result<String, OperatorError> {
        let name = record.topic_name();
        self.cluster
            .control_plane
            .create_topic(
                record.project(),
                &record.spec.service_name,
                &topic_request(record, Some(name.clone())),
            )
            .await?;
        Ok(name)
    }

    async fn update(&self, record: &KafkaTopic, id: &str) -> Result<(), OperatorError> {
        self.cluster
            .control_plane
            .update_topic(
                record.project(),
                &record.spec.service_name,
                id,
                &topic_request(record, None),
            )
            .await
    }

    async fn get(&self, record: &KafkaTopic, id: Option<&str>) -> Result<Topic, OperatorError> {
        let name = id.map_or_else(|| record.topic_name(), str::to_string);
        self.cluster
            .control_plane
            .get_topic(record.project(), &record.spec.service_name, &name)
            .await
    }

    async fn delete(&self, record: &KafkaTopic, id: Option<&str>) -> Result<(), OperatorError> {
        let name = id.map_or_else(|| record.topic_name(), str::to_string);
        check_termination_protection(record.spec.termination_protection, &format!("topic {name}"))?;
        self.cluster
            .control_plane
            .delete_topic(record.project(), &record.spec.service_name, &name)
            .await
    }

    fn is_ready(&self, _record: &KafkaTopic, remote: &Topic) -> bool {
        remote.state == STATE_ACTIVE
    }

    fn observed_state(&self, remote: &Topic) -> String {
        remote.state.clone()
    }

    fn remote_id(&self, remote: &Topic) -> String {
        remote.topic_name.clone()
    }

    /// Partitions can only grow, so an existing topic with more partitions than the
    /// spec asks for cannot be brought in line.
    fn matches_existing(&self, record: &KafkaTopic, remote: &Topic) -> bool {
        remote.replication == record.spec.replication
            && partition_count(remote) <= record.spec.partitions
    }

    fn needs_update(&self, record: &KafkaTopic, remote: &Topic) -> bool {
        remote.state == STATE_ACTIVE && partition_count(remote) < record.spec.partitions
    }
}

#[cfg(test)]
#[path = "kafka_topic_tests.rs"]
mod kafka_topic_tests;
