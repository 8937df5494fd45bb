// Copyright (c) 2025 Erick Bourgeois, firestoned
// SPDX-License-Identifier: MIT

//! Unit tests for CRD types and generated schemas.

#[cfg(test)]
mod tests {
    use crate::crd::*;
    use kube::CustomResourceExt;
    use serde_json::json;

    fn validations_of<K: CustomResourceExt>() -> Vec<String> {
        let crd = serde_json::to_value(K::crd()).unwrap();
        let spec_schema =
            &crd["spec"]["versions"][0]["schema"]["openAPIV3Schema"]["properties"]["spec"];
        spec_schema["x-kubernetes-validations"]
            .as_array()
            .map(|rules| {
                rules
                    .iter()
                    .filter_map(|rule| rule["rule"].as_str().map(str::to_string))
                    .collect()
            })
            .unwrap_or_default()
    }

    #[test]
    fn test_postgresql_spec_deserializes_flattened_common_fields() {
        let spec: PostgreSQLSpec = serde_json::from_value(json!({
            "project": "acme",
            "plan": "startup-4",
            "cloudName": "google-europe-west1",
            "projectVPCRef": {"name": "acme-vpc"},
            "powered": false,
            "forkFromServiceName": "orders-db-old",
            "userConfig": {"pg_version": "16", "pglookout": {"max_failover_replication_time_lag": 60}},
            "connInfoSecretTarget": {"name": "orders-conn", "labels": {"team": "orders"}}
        }))
        .unwrap();

        assert_eq!(spec.common.project, "acme");
        assert_eq!(spec.common.plan, "startup-4");
        assert_eq!(
            spec.common.project_vpc_ref.as_ref().map(|r| r.name.as_str()),
            Some("acme-vpc")
        );
        assert_eq!(spec.common.powered, Some(false));
        assert_eq!(spec.fork_from_service_name.as_deref(), Some("orders-db-old"));
        assert_eq!(
            spec.common.user_config.as_ref().unwrap()["pg_version"],
            json!("16")
        );
        let target = spec.common.conn_info_secret_target.unwrap();
        assert_eq!(target.name.as_deref(), Some("orders-conn"));
        assert_eq!(target.labels.unwrap()["team"], "orders");
    }

    #[test]
    fn test_project_vpc_ref_serializes_with_uppercase_acronym() {
        let spec = ServiceCommonSpec {
            project: "acme".into(),
            plan: "hobbyist".into(),
            project_vpc_ref: Some(ResourceReference {
                name: "vpc".into(),
                namespace: None,
            }),
            ..Default::default()
        };

        let value = serde_json::to_value(&spec).unwrap();
        assert!(value.get("projectVPCRef").is_some());
        assert!(value.get("projectVpcRef").is_none());
        assert!(value.get("powered").is_none());
    }

    #[test]
    fn test_status_serializes_unset_fields_as_null() {
        let status = ResourceStatus {
            id: Some("acl-1".into()),
            ..Default::default()
        };

        let value = serde_json::to_value(&status).unwrap();
        assert_eq!(value["id"], json!("acl-1"));
        assert_eq!(value["failedGeneration"], json!(null));
        assert_eq!(value["operationStartedAt"], json!(null));
        assert_eq!(value["failedAttempts"], json!(0));
    }

    #[test]
    fn test_status_deserializes_from_empty_object() {
        let status: ResourceStatus = serde_json::from_value(json!({})).unwrap();
        assert_eq!(status, ResourceStatus::default());
    }

    #[test]
    fn test_condition_uses_camel_case() {
        let condition = Condition {
            r#type: "Running".into(),
            status: "True".into(),
            reason: Some("Running".into()),
            message: None,
            last_transition_time: Some("2025-01-01T00:00:00Z".into()),
        };

        let value = serde_json::to_value(&condition).unwrap();
        assert_eq!(value["type"], json!("Running"));
        assert_eq!(value["lastTransitionTime"], json!("2025-01-01T00:00:00Z"));
        assert!(value.get("message").is_none());
    }

    #[test]
    fn test_kafka_permission_wire_format() {
        assert_eq!(
            serde_json::to_value(KafkaPermission::Readwrite).unwrap(),
            json!("readwrite")
        );
        assert_eq!(KafkaPermission::Admin.as_str(), "admin");
        let parsed: KafkaPermission = serde_json::from_value(json!("write")).unwrap();
        assert_eq!(parsed, KafkaPermission::Write);
    }

    #[test]
    fn test_pool_mode_defaults_to_transaction() {
        assert_eq!(PoolMode::default(), PoolMode::Transaction);
        assert_eq!(
            serde_json::to_value(PoolMode::Session).unwrap(),
            json!("session")
        );
    }

    #[test]
    fn test_crd_metadata() {
        let crd = KafkaACL::crd();
        assert_eq!(crd.spec.group, "msop.dev");
        assert_eq!(crd.spec.names.kind, "KafkaACL");
        assert_eq!(crd.spec.names.plural, "kafkaacls");
        assert_eq!(crd.spec.scope, "Namespaced");
    }

    #[test]
    fn test_secret_target_disabled_is_immutable_in_schema() {
        for rules in [
            validations_of::<PostgreSQL>(),
            validations_of::<Kafka>(),
            validations_of::<ServiceUser>(),
            validations_of::<ConnectionPool>(),
        ] {
            assert!(
                rules
                    .iter()
                    .any(|rule| rule.contains("has(oldSelf.connInfoSecretTargetDisabled)")),
                "missing opt-out immutability rule in {rules:?}"
            );
        }
    }

    #[test]
    fn test_acl_has_no_field_immutability_beyond_parent() {
        let rules = validations_of::<KafkaACL>();
        assert_eq!(rules.len(), 2);
        assert!(rules.iter().all(|rule| !rule.contains("permission")));
    }

    #[test]
    fn test_user_config_preserves_unknown_fields() {
        let crd = serde_json::to_value(ServiceIntegration::crd()).unwrap();
        let user_config = &crd["spec"]["versions"][0]["schema"]["openAPIV3Schema"]["properties"]
            ["spec"]["properties"]["userConfig"];
        assert_eq!(user_config["x-kubernetes-preserve-unknown-fields"], json!(true));
    }
}
