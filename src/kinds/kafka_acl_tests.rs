// Copyright (c) 2025 Erick Bourgeois, firestoned
// SPDX-License-Identifier: MIT

//! Unit tests for `kafka_acl.rs`

#[cfg(test)]
mod tests {
    use super::super::KafkaAclAdapter;
    use crate::config::ReconcileSettings;
    use crate::crd::{KafkaACL, KafkaACLSpec, KafkaPermission, ResourceStatus};
    use crate::kinds::test_support::{
        cluster, mount_no_declared_records, mount_running_service, NAMESPACE,
    };
    use crate::reconcilers::adapter::KindAdapter;
    use crate::reconcilers::engine::{reconcile_once, Mutation};
    use crate::reconcilers::phase::Step;
    use chrono::Utc;
    use serde_json::json;
    use wiremock::matchers::{body_json, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    const ACLS: &str = "/project/acme/service/events/acl";

    fn acl(permission: KafkaPermission) -> KafkaACL {
        let mut acl = KafkaACL::new(
            "orders-readers",
            KafkaACLSpec {
                project: "acme".to_string(),
                service_name: "events".to_string(),
                permission,
                topic: "orders.*".to_string(),
                username: "app".to_string(),
            },
        );
        acl.metadata.namespace = Some(NAMESPACE.to_string());
        acl.metadata.generation = Some(1);
        acl
    }

    fn entry(id: &str, permission: &str) -> serde_json::Value {
        json!({"id": id, "permission": permission, "topic": "orders.*", "username": "app"})
    }

    #[tokio::test]
    async fn test_create_returns_server_assigned_id() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path(ACLS))
            .and(body_json(json!({"permission": "read", "topic": "orders.*", "username": "app"})))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "acl": [entry("default-acl", "admin"), entry("acl-7f3a", "read")]
            })))
            .mount(&server)
            .await;

        let adapter = KafkaAclAdapter::new(cluster(&server));
        assert_eq!(adapter.create(&acl(KafkaPermission::Read)).await.unwrap(), "acl-7f3a");
    }

    #[tokio::test]
    async fn test_get_without_id_matches_attributes() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path(ACLS))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "acl": [entry("acl-1", "write"), entry("acl-2", "read")]
            })))
            .mount(&server)
            .await;

        let adapter = KafkaAclAdapter::new(cluster(&server));
        let found = adapter.get(&acl(KafkaPermission::Read), None).await.unwrap();
        assert_eq!(found.id, "acl-2");

        let err = adapter
            .get(&acl(KafkaPermission::Admin), None)
            .await
            .unwrap_err();
        assert!(err.is_not_found());
    }

    #[tokio::test]
    async fn test_permission_change_replaces_entry() {
        let server = MockServer::start().await;
        mount_no_declared_records(&server).await;
        mount_running_service(&server, "events").await;
        Mock::given(method("DELETE"))
            .and(path(format!("{ACLS}/acl-1")))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({"acl": []})))
            .expect(1)
            .mount(&server)
            .await;
        Mock::given(method("POST"))
            .and(path(ACLS))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "acl": [entry("acl-2", "readwrite")]
            })))
            .expect(1)
            .mount(&server)
            .await;
        // After the delete the old entry is gone and only the new one is listed.
        Mock::given(method("GET"))
            .and(path(ACLS))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "acl": [entry("acl-2", "readwrite")]
            })))
            .mount(&server)
            .await;

        let mut record = acl(KafkaPermission::Readwrite);
        record.metadata.generation = Some(2);
        record.status = Some(ResourceStatus {
            id: Some("acl-1".to_string()),
            observed_generation: Some(1),
            ..Default::default()
        });

        let adapter = KafkaAclAdapter::new(cluster(&server));
        let outcome =
            reconcile_once(&adapter, &record, &ReconcileSettings::default(), Utc::now()).await;

        assert_eq!(outcome.step, Step::Replace);
        assert_eq!(outcome.mutation, Some(Mutation::Replaced));
        assert_eq!(outcome.status.id.as_deref(), Some("acl-2"));
        assert_eq!(outcome.status.observed_generation, Some(2));
        assert!(outcome.is_running());
    }

    #[tokio::test]
    async fn test_delete_without_id_looks_up_entry() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path(ACLS))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "acl": [entry("acl-9", "read")]
            })))
            .mount(&server)
            .await;
        Mock::given(method("DELETE"))
            .and(path(format!("{ACLS}/acl-9")))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({"acl": []})))
            .expect(1)
            .mount(&server)
            .await;

        let adapter = KafkaAclAdapter::new(cluster(&server));
        adapter.delete(&acl(KafkaPermission::Read), None).await.unwrap();
    }
}
