// Copyright (c) 2025 Erick Bourgeois, firestoned
// SPDX-License-Identifier: MIT

//! Unit tests for `service.rs`

#[cfg(test)]
mod tests {
    use super::super::{ServiceAdapter, ServiceKind};
    use crate::controlplane::types::{Service, ServiceComponent, ServiceUserInfo};
    use crate::crd::{
        Kafka, KafkaSpec, PostgreSQL, PostgreSQLSpec, ServiceCommonSpec, ServiceIntegrationItem,
    };
    use crate::config::ReconcileSettings;
    use crate::kinds::test_support::{ca_body, cluster, CA_CERT, NAMESPACE, PROJECT};
    use crate::reconcilers::adapter::KindAdapter;
    use crate::reconcilers::engine::{reconcile_once, Mutation};
    use crate::reconcilers::phase::Step;
    use chrono::Utc;
    use serde_json::json;
    use std::collections::BTreeMap;
    use wiremock::matchers::{body_partial_json, header, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn common() -> ServiceCommonSpec {
        ServiceCommonSpec {
            project: PROJECT.to_string(),
            plan: "business-4".to_string(),
            cloud_name: Some("google-europe-west1".to_string()),
            ..Default::default()
        }
    }

    fn postgres(common: ServiceCommonSpec, fork: Option<&str>) -> PostgreSQL {
        let mut pg = PostgreSQL::new(
            "orders-db",
            PostgreSQLSpec {
                common,
                fork_from_service_name: fork.map(str::to_string),
            },
        );
        pg.metadata.namespace = Some(NAMESPACE.to_string());
        pg
    }

    fn kafka(karapace: Option<bool>) -> Kafka {
        let mut kafka = Kafka::new(
            "events",
            KafkaSpec {
                common: common(),
                karapace,
            },
        );
        kafka.metadata.namespace = Some(NAMESPACE.to_string());
        kafka
    }

    fn service(state: &str) -> Service {
        Service {
            service_name: "orders-db".to_string(),
            service_type: "pg".to_string(),
            state: state.to_string(),
            ..Default::default()
        }
    }

    #[test]
    fn test_create_request_carries_create_only_settings() {
        let mut spec = common();
        spec.disk_space = Some("90GiB".to_string());
        spec.tags = Some(BTreeMap::from([("env".to_string(), "prod".to_string())]));
        spec.service_integrations = Some(vec![ServiceIntegrationItem {
            integration_type: "read_replica".to_string(),
            source_service_name: "orders-primary".to_string(),
        }]);
        spec.user_config = Some(BTreeMap::from([("pg_version".to_string(), json!("16"))]));
        let pg = postgres(spec, Some("orders-snapshot"));

        let request =
            ServiceAdapter::<PostgreSQL>::create_request(&pg, Some("vpc-1".to_string())).unwrap();

        assert_eq!(request.service_name, "orders-db");
        assert_eq!(request.service_type, "pg");
        assert_eq!(request.disk_space_mb, Some(90 * 1024));
        assert_eq!(request.project_vpc_id.as_deref(), Some("vpc-1"));
        assert_eq!(request.service_integrations.len(), 1);
        assert_eq!(request.service_integrations[0].source_service, "orders-primary");
        assert_eq!(request.user_config["pg_version"], json!("16"));
        assert_eq!(request.user_config["service_to_fork_from"], json!("orders-snapshot"));

        let update = ServiceAdapter::<PostgreSQL>::update_request(&pg, None).unwrap();
        assert!(update.powered);
        assert!(!update.user_config.contains_key("service_to_fork_from"));
    }

    #[test]
    fn test_kafka_karapace_maps_to_schema_registry() {
        let request = ServiceAdapter::<Kafka>::create_request(&kafka(Some(true)), None).unwrap();
        assert_eq!(request.service_type, "kafka");
        assert_eq!(request.user_config["schema_registry"], json!(true));

        let request = ServiceAdapter::<Kafka>::create_request(&kafka(None), None).unwrap();
        assert!(request.user_config.is_empty());
    }

    #[test]
    fn test_invalid_disk_space_is_rejected() {
        let mut spec = common();
        spec.disk_space = Some("lots".to_string());
        let err = ServiceAdapter::<PostgreSQL>::create_request(&postgres(spec, None), None)
            .unwrap_err();
        assert_eq!(err.reason(), "InvalidSpec");
    }

    #[tokio::test]
    async fn test_readiness_follows_powered() {
        let server = MockServer::start().await;
        let adapter = ServiceAdapter::<PostgreSQL>::new(cluster(&server));

        let on = postgres(common(), None);
        assert!(adapter.is_ready(&on, &service("RUNNING")));
        assert!(!adapter.is_ready(&on, &service("REBUILDING")));
        assert!(!adapter.needs_update(&on, &service("RUNNING")));
        assert!(adapter.needs_update(&on, &service("POWEROFF")));

        let mut spec = common();
        spec.powered = Some(false);
        let off = postgres(spec, None);
        assert!(adapter.is_ready(&off, &service("POWEROFF")));
        assert!(!adapter.is_ready(&off, &service("RUNNING")));
        assert!(adapter.needs_update(&off, &service("RUNNING")));
        assert!(!adapter.needs_update(&off, &service("POWEROFF")));
        assert!(!adapter.needs_update(&off, &service("REBUILDING")));
        assert!(!adapter.needs_update(&on, &service("REBUILDING")));
    }

    #[tokio::test]
    async fn test_powered_off_service_is_powered_down_after_create() {
        let server = MockServer::start().await;
        let running = json!({
            "service": {"service_name": "orders-db", "service_type": "pg", "state": "RUNNING"}
        });
        Mock::given(method("POST"))
            .and(path("/project/acme/service"))
            .respond_with(ResponseTemplate::new(200).set_body_json(running.clone()))
            .expect(1)
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(path("/project/acme/service/orders-db"))
            .respond_with(ResponseTemplate::new(200).set_body_json(running.clone()))
            .mount(&server)
            .await;
        Mock::given(method("PUT"))
            .and(path("/project/acme/service/orders-db"))
            .and(body_partial_json(json!({"powered": false})))
            .respond_with(ResponseTemplate::new(200).set_body_json(running))
            .expect(1)
            .mount(&server)
            .await;

        let mut spec = common();
        spec.powered = Some(false);
        let mut record = postgres(spec, None);
        record.metadata.generation = Some(1);
        let settings = ReconcileSettings::default();
        let adapter = ServiceAdapter::<PostgreSQL>::new(cluster(&server));

        // Created running; nothing to change until the service settles.
        let created = reconcile_once(&adapter, &record, &settings, Utc::now()).await;
        assert_eq!(created.step, Step::Create);
        assert_eq!(created.mutation, Some(Mutation::Created));
        assert_eq!(created.status.state.as_deref(), Some("RUNNING"));
        assert!(!created.is_running());

        record.status = Some(created.status);
        let powered_down = reconcile_once(&adapter, &record, &settings, Utc::now()).await;
        assert_eq!(powered_down.step, Step::AwaitReady);
        assert_eq!(powered_down.mutation, Some(Mutation::Updated));
        assert!(!powered_down.is_running());
        server.verify().await;

        server.reset().await;
        Mock::given(method("GET"))
            .and(path("/project/acme/service/orders-db"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "service": {
                    "service_name": "orders-db",
                    "service_type": "pg",
                    "state": "POWEROFF",
                    "service_uri": "postgres://avnadmin:pw@orders-db.example.com:12691/defaultdb",
                    "service_uri_params": {
                        "host": "orders-db.example.com",
                        "port": "12691",
                        "dbname": "defaultdb",
                        "user": "avnadmin",
                        "password": "pw"
                    }
                }
            })))
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(path("/project/acme/kms/ca"))
            .respond_with(ResponseTemplate::new(200).set_body_json(ca_body()))
            .mount(&server)
            .await;
        Mock::given(method("PUT"))
            .respond_with(ResponseTemplate::new(500))
            .expect(0)
            .mount(&server)
            .await;

        record.status = Some(powered_down.status);
        let settled = reconcile_once(&adapter, &record, &settings, Utc::now()).await;
        assert!(settled.is_running());
        assert_eq!(settled.status.state.as_deref(), Some("POWEROFF"));
        assert_eq!(settled.mutation, None);
    }

    #[tokio::test]
    async fn test_adoption_requires_same_service_type() {
        let server = MockServer::start().await;
        let adapter = ServiceAdapter::<PostgreSQL>::new(cluster(&server));
        let pg = postgres(common(), None);

        assert!(adapter.matches_existing(&pg, &service("RUNNING")));
        let mut other = service("RUNNING");
        other.service_type = "kafka".to_string();
        assert!(!adapter.matches_existing(&pg, &other));
    }

    #[tokio::test]
    async fn test_create_posts_service() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/project/acme/service"))
            .and(header("authorization", "Bearer test-token"))
            .and(body_partial_json(json!({
                "service_name": "orders-db",
                "service_type": "pg",
                "plan": "business-4",
                "cloud": "google-europe-west1"
            })))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "service": {"service_name": "orders-db", "service_type": "pg", "state": "REBUILDING"}
            })))
            .expect(1)
            .mount(&server)
            .await;

        let adapter = ServiceAdapter::<PostgreSQL>::new(cluster(&server));
        let id = adapter.create(&postgres(common(), None)).await.unwrap();
        assert_eq!(id, "orders-db");
    }

    #[tokio::test]
    async fn test_create_collision_is_already_exists() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/project/acme/service"))
            .respond_with(
                ResponseTemplate::new(409).set_body_json(json!({"message": "Service name is taken"})),
            )
            .mount(&server)
            .await;

        let adapter = ServiceAdapter::<PostgreSQL>::new(cluster(&server));
        let err = adapter.create(&postgres(common(), None)).await.unwrap_err();
        assert!(err.is_already_exists());
    }

    #[tokio::test]
    async fn test_get_missing_service_is_not_found() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/project/acme/service/orders-db"))
            .respond_with(ResponseTemplate::new(404).set_body_json(json!({"message": "Not found"})))
            .mount(&server)
            .await;

        let adapter = ServiceAdapter::<PostgreSQL>::new(cluster(&server));
        let err = adapter
            .get(&postgres(common(), None), Some("orders-db"))
            .await
            .unwrap_err();
        assert!(err.is_not_found());
    }

    #[tokio::test]
    async fn test_postgres_connection_info() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/project/acme/kms/ca"))
            .respond_with(ResponseTemplate::new(200).set_body_json(ca_body()))
            .mount(&server)
            .await;

        let mut remote = service("RUNNING");
        remote.service_uri =
            Some("postgres://avnadmin:pw@orders-db.example.com:12691/defaultdb?sslmode=require".to_string());
        remote.service_uri_params = BTreeMap::from([
            ("host".to_string(), "orders-db.example.com".to_string()),
            ("port".to_string(), "12691".to_string()),
            ("dbname".to_string(), "defaultdb".to_string()),
            ("user".to_string(), "avnadmin".to_string()),
            ("password".to_string(), "pw".to_string()),
        ]);

        let adapter = ServiceAdapter::<PostgreSQL>::new(cluster(&server));
        let info = adapter
            .connection_info(&postgres(common(), None), &remote)
            .await
            .unwrap();

        assert_eq!(
            info.keys().map(String::as_str).collect::<Vec<_>>(),
            vec!["CA_CERT", "DATABASE", "DATABASE_URI", "HOST", "PASSWORD", "PORT", "SSLMODE", "USER"]
        );
        assert_eq!(info["HOST"], "orders-db.example.com");
        assert_eq!(info["PORT"], "12691");
        assert_eq!(info["SSLMODE"], "require");
        assert_eq!(info["CA_CERT"], CA_CERT);
    }

    #[test]
    fn test_postgres_connection_info_requires_parameters() {
        let err = <PostgreSQL as ServiceKind>::connection_info(&service("RUNNING"), String::new())
            .unwrap_err();
        assert!(err.to_string().contains("HOST"));
    }

    #[test]
    fn test_kafka_connection_info_includes_optional_components() {
        let component = |name: &str, port: u16, method: Option<&str>| ServiceComponent {
            component: name.to_string(),
            host: format!("{name}.example.com"),
            port,
            kafka_authentication_method: method.map(str::to_string),
            ..Default::default()
        };
        let remote = Service {
            service_name: "events".to_string(),
            service_type: "kafka".to_string(),
            state: "RUNNING".to_string(),
            components: vec![
                component("kafka", 9092, Some("certificate")),
                component("kafka", 9093, Some("sasl")),
                component("schema_registry", 8081, None),
            ],
            users: vec![ServiceUserInfo {
                username: "avnadmin".to_string(),
                password: Some("pw".to_string()),
                user_type: Some("primary".to_string()),
                access_cert: Some("cert".to_string()),
                access_key: Some("key".to_string()),
                ..Default::default()
            }],
            ..Default::default()
        };

        let info = <Kafka as ServiceKind>::connection_info(&remote, CA_CERT.to_string()).unwrap();
        assert_eq!(info["PORT"], "9092");
        assert_eq!(info["USERNAME"], "avnadmin");
        assert_eq!(info["ACCESS_CERT"], "cert");
        assert_eq!(info["SASL_PORT"], "9093");
        assert_eq!(info["SCHEMA_REGISTRY_HOST"], "schema_registry.example.com");
        assert!(!info.contains_key("REST_HOST"));
    }
}
