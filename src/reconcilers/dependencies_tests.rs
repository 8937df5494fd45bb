// Copyright (c) 2025 Erick Bourgeois, firestoned
// SPDX-License-Identifier: MIT

//! Unit tests for `dependencies.rs`

#[cfg(test)]
mod tests {
    use super::super::{dependents_in, ensure_ready, readiness_of, DependencyLookup, Readiness};
    use crate::crd::{
        ConnectionPool, ConnectionPoolSpec, KafkaTopic, KafkaTopicSpec, ResourceStatus,
    };
    use crate::errors::OperatorError;
    use crate::reconcilers::status::create_condition;
    use crate::resource::Dependency;
    use crate::status_reasons::{REASON_DEPENDENCY_MISSING, REASON_DEPENDENCY_NOT_READY};
    use async_trait::async_trait;
    use std::collections::HashMap;
    use std::sync::Mutex;

    const NOW: &str = "2025-01-01T00:00:00+00:00";

    #[derive(Default)]
    struct FakeLookup {
        declared: HashMap<Dependency, Readiness>,
        external: HashMap<Dependency, Readiness>,
        external_calls: Mutex<Vec<Dependency>>,
    }

    #[async_trait]
    impl DependencyLookup for FakeLookup {
        async fn declared(&self, dependency: &Dependency) -> Result<Readiness, OperatorError> {
            Ok(self
                .declared
                .get(dependency)
                .cloned()
                .unwrap_or(Readiness::Absent))
        }

        async fn external(
            &self,
            _project: &str,
            dependency: &Dependency,
        ) -> Result<Readiness, OperatorError> {
            self.external_calls.lock().unwrap().push(dependency.clone());
            Ok(self
                .external
                .get(dependency)
                .cloned()
                .unwrap_or(Readiness::Absent))
        }
    }

    fn pg_main() -> Dependency {
        Dependency::service("team-a", "pg-main")
    }

    fn orders_db() -> Dependency {
        Dependency::database("team-a", "pg-main", "orders")
    }

    #[tokio::test]
    async fn test_declared_ready_dependency_passes() {
        let lookup = FakeLookup {
            declared: HashMap::from([(pg_main(), Readiness::Ready)]),
            ..Default::default()
        };

        ensure_ready(&lookup, "acme", &[pg_main()]).await.unwrap();
        assert!(lookup.external_calls.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_declared_converging_dependency_is_not_ready() {
        let lookup = FakeLookup {
            declared: HashMap::from([(
                pg_main(),
                Readiness::NotReady("PostgreSQL state is REBUILDING".to_string()),
            )]),
            ..Default::default()
        };

        let err = ensure_ready(&lookup, "acme", &[pg_main()])
            .await
            .unwrap_err();
        assert_eq!(err.reason(), REASON_DEPENDENCY_NOT_READY);
        assert!(err.to_string().contains("REBUILDING"));
    }

    #[tokio::test]
    async fn test_undeclared_dependency_falls_back_to_control_plane() {
        let lookup = FakeLookup {
            external: HashMap::from([(pg_main(), Readiness::Ready)]),
            ..Default::default()
        };

        ensure_ready(&lookup, "acme", &[pg_main()]).await.unwrap();
        assert_eq!(*lookup.external_calls.lock().unwrap(), vec![pg_main()]);
    }

    #[tokio::test]
    async fn test_unresolvable_dependency_is_missing() {
        let lookup = FakeLookup {
            declared: HashMap::from([(pg_main(), Readiness::Ready)]),
            ..Default::default()
        };

        let err = ensure_ready(&lookup, "acme", &[pg_main(), orders_db()])
            .await
            .unwrap_err();
        assert_eq!(err.reason(), REASON_DEPENDENCY_MISSING);
        assert!(err.to_string().contains("orders"));
    }

    #[tokio::test]
    async fn test_no_dependencies_is_ready() {
        ensure_ready(&FakeLookup::default(), "acme", &[])
            .await
            .unwrap();
    }

    fn topic(status: Option<ResourceStatus>) -> KafkaTopic {
        let mut topic = KafkaTopic::new(
            "orders",
            KafkaTopicSpec {
                project: "acme".to_string(),
                service_name: "kafka-main".to_string(),
                topic_name: None,
                partitions: 3,
                replication: 2,
                config: None,
                tags: None,
                termination_protection: None,
            },
        );
        topic.metadata.namespace = Some("team-a".to_string());
        topic.status = status;
        topic
    }

    #[test]
    fn test_readiness_of_declared_record() {
        assert_eq!(
            readiness_of(&topic(None)),
            Readiness::NotReady("KafkaTopic state is not yet created".to_string())
        );

        let converging = ResourceStatus {
            state: Some("CONFIGURING".to_string()),
            conditions: vec![create_condition("Running", "False", "Provisioning", "", NOW)],
            ..Default::default()
        };
        assert_eq!(
            readiness_of(&topic(Some(converging))),
            Readiness::NotReady("KafkaTopic state is CONFIGURING".to_string())
        );

        let running = ResourceStatus {
            state: Some("ACTIVE".to_string()),
            conditions: vec![create_condition("Running", "True", "Running", "", NOW)],
            ..Default::default()
        };
        assert_eq!(readiness_of(&topic(Some(running))), Readiness::Ready);
    }

    fn pool(name: &str, database: &str) -> ConnectionPool {
        let mut pool = ConnectionPool::new(
            name,
            ConnectionPoolSpec {
                project: "acme".to_string(),
                service_name: "pg-main".to_string(),
                database_name: database.to_string(),
                username: "app".to_string(),
                pool_size: None,
                pool_mode: None,
                conn_info_secret_target: None,
                conn_info_secret_target_disabled: None,
            },
        );
        pool.metadata.namespace = Some("team-a".to_string());
        pool
    }

    #[test]
    fn test_dependents_in_selects_referencing_records() {
        let pools = [pool("orders-pool", "orders"), pool("billing-pool", "billing")];

        let by_database = dependents_in(pools.iter(), &orders_db());
        assert_eq!(by_database.len(), 1);
        assert_eq!(by_database[0].name, "orders-pool");

        let by_service = dependents_in(pools.iter(), &pg_main());
        assert_eq!(by_service.len(), 2);

        let elsewhere = Dependency::service("team-b", "pg-main");
        assert!(dependents_in(pools.iter(), &elsewhere).is_empty());
    }
}
