// Copyright (c) 2025 Erick Bourgeois, firestoned
// SPDX-License-Identifier: MIT

//! Unit tests for `ManagedResource` implementations.

#[cfg(test)]
mod tests {
    use crate::crd::{
        Condition, ConnectionPool, ConnectionPoolSpec, Database, DatabaseSpec, KafkaACL,
        KafkaACLSpec, KafkaPermission, PostgreSQL, PostgreSQLSpec, ProjectVPC, ProjectVPCSpec,
        ResourceReference, ResourceStatus, ServiceCommonSpec, ServiceIntegrationItem,
    };
    use crate::resource::{Dependency, ManagedResource};

    fn postgres(name: &str, namespace: &str, common: ServiceCommonSpec) -> PostgreSQL {
        let mut pg = PostgreSQL::new(
            name,
            PostgreSQLSpec {
                common,
                fork_from_service_name: None,
            },
        );
        pg.metadata.namespace = Some(namespace.to_string());
        pg
    }

    fn common() -> ServiceCommonSpec {
        ServiceCommonSpec {
            project: "acme".into(),
            plan: "startup-4".into(),
            ..Default::default()
        }
    }

    #[test]
    fn test_kind_constants() {
        assert_eq!(PostgreSQL::KIND, "PostgreSQL");
        assert_eq!(KafkaACL::KIND, "KafkaACL");
        assert_eq!(PostgreSQL::SECRET_PREFIX, Some("POSTGRESQL_"));
        assert_eq!(ConnectionPool::SECRET_PREFIX, Some("CONNECTIONPOOL_"));
        assert_eq!(Database::SECRET_PREFIX, None);
        assert_eq!(KafkaACL::SECRET_PREFIX, None);
    }

    #[test]
    fn test_postgresql_dependencies() {
        let mut spec = common();
        spec.project_vpc_ref = Some(ResourceReference {
            name: "shared-vpc".into(),
            namespace: Some("network".into()),
        });
        spec.service_integrations = Some(vec![ServiceIntegrationItem {
            integration_type: "read_replica".into(),
            source_service_name: "primary-db".into(),
        }]);
        let mut pg = postgres("replica-db", "apps", spec);
        pg.spec.fork_from_service_name = Some("old-db".into());

        assert_eq!(
            pg.dependencies(),
            vec![
                Dependency::project_vpc("network", "shared-vpc"),
                Dependency::service("apps", "primary-db"),
                Dependency::service("apps", "old-db"),
            ]
        );
        assert_eq!(pg.provides(), Some(Dependency::service("apps", "replica-db")));
    }

    #[test]
    fn test_vpc_reference_defaults_to_record_namespace() {
        let mut spec = common();
        spec.project_vpc_ref = Some(ResourceReference {
            name: "vpc".into(),
            namespace: None,
        });
        let pg = postgres("db", "apps", spec);

        assert_eq!(pg.dependencies(), vec![Dependency::project_vpc("apps", "vpc")]);
    }

    #[test]
    fn test_connection_pool_depends_on_service_database_and_user() {
        let mut pool = ConnectionPool::new(
            "pool",
            ConnectionPoolSpec {
                project: "acme".into(),
                service_name: "orders-db".into(),
                database_name: "orders".into(),
                username: "orders-app".into(),
                pool_size: Some(10),
                pool_mode: None,
                conn_info_secret_target: None,
                conn_info_secret_target_disabled: Some(true),
            },
        );
        pool.metadata.namespace = Some("apps".into());

        assert_eq!(
            pool.dependencies(),
            vec![
                Dependency::service("apps", "orders-db"),
                Dependency::database("apps", "orders-db", "orders"),
                Dependency::service_user("apps", "orders-db", "orders-app"),
            ]
        );
        assert!(pool.conn_info_secret_target_disabled());
    }

    #[test]
    fn test_database_name_defaults_to_record_name() {
        let mut db = Database::new(
            "orders",
            DatabaseSpec {
                project: "acme".into(),
                service_name: "orders-db".into(),
                database_name: None,
                lc_collate: None,
                lc_ctype: None,
                termination_protection: None,
            },
        );
        db.metadata.namespace = Some("apps".into());

        assert_eq!(db.database_name(), "orders");
        assert_eq!(
            db.provides(),
            Some(Dependency::database("apps", "orders-db", "orders"))
        );

        db.spec.database_name = Some("orders_v2".into());
        assert_eq!(db.database_name(), "orders_v2");
    }

    #[test]
    fn test_project_vpc_provides_itself() {
        let mut vpc = ProjectVPC::new(
            "acme-vpc",
            ProjectVPCSpec {
                project: "acme".into(),
                cloud_name: "aws-eu-west-1".into(),
                network_cidr: "10.0.0.0/24".into(),
            },
        );
        vpc.metadata.namespace = Some("network".into());

        assert!(vpc.dependencies().is_empty());
        assert_eq!(
            vpc.provides(),
            Some(Dependency::project_vpc("network", "acme-vpc"))
        );
    }

    #[test]
    fn test_is_ready_to_use_reads_running_condition() {
        let mut pg = postgres("db", "apps", common());
        assert!(!pg.is_ready_to_use());
        assert!(pg.conditions().is_empty());

        pg.status = Some(ResourceStatus {
            conditions: vec![Condition {
                r#type: "Running".into(),
                status: "True".into(),
                reason: Some("Running".into()),
                message: None,
                last_transition_time: None,
            }],
            ..Default::default()
        });
        assert!(pg.is_ready_to_use());
    }

    #[test]
    fn test_record_key() {
        let mut acl = KafkaACL::new(
            "orders-read",
            KafkaACLSpec {
                project: "acme".into(),
                service_name: "events".into(),
                permission: KafkaPermission::Read,
                topic: "orders.*".into(),
                username: "orders-app".into(),
            },
        );
        acl.metadata.namespace = Some("apps".into());

        assert_eq!(acl.record_key(), "KafkaACL/apps/orders-read");
        assert_eq!(acl.project(), "acme");
    }
}
