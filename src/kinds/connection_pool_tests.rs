// Copyright (c) 2025 Erick Bourgeois, firestoned
// SPDX-License-Identifier: MIT

//! Unit tests for `connection_pool.rs`

#[cfg(test)]
mod tests {
    use super::super::{connection_info, pool_request, ConnectionPoolAdapter, PoolRemote};
    use crate::controlplane::types::{ConnectionPoolInfo, Service, ServiceComponent, ServiceUserInfo};
    use crate::crd::{ConnectionPool, ConnectionPoolSpec, PoolMode};
    use crate::kinds::test_support::{cluster, NAMESPACE};
    use crate::reconcilers::adapter::KindAdapter;
    use serde_json::json;
    use wiremock::matchers::{method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn pool(size: Option<u32>, mode: Option<PoolMode>) -> ConnectionPool {
        let mut pool = ConnectionPool::new(
            "orders-pool",
            ConnectionPoolSpec {
                project: "acme".to_string(),
                service_name: "orders-db".to_string(),
                database_name: "orders".to_string(),
                username: "app".to_string(),
                pool_size: size,
                pool_mode: mode,
                conn_info_secret_target: None,
                conn_info_secret_target_disabled: None,
            },
        );
        pool.metadata.namespace = Some(NAMESPACE.to_string());
        pool
    }

    fn remote(size: u32, mode: &str, uri: Option<&str>) -> PoolRemote {
        PoolRemote {
            service: Service {
                service_name: "orders-db".to_string(),
                service_type: "pg".to_string(),
                state: "RUNNING".to_string(),
                components: vec![ServiceComponent {
                    component: "pgbouncer".to_string(),
                    host: "orders-db.example.com".to_string(),
                    port: 12692,
                    ..Default::default()
                }],
                users: vec![ServiceUserInfo {
                    username: "app".to_string(),
                    password: Some("pw".to_string()),
                    ..Default::default()
                }],
                ..Default::default()
            },
            pool: ConnectionPoolInfo {
                pool_name: "orders-pool".to_string(),
                database: "orders".to_string(),
                username: Some("app".to_string()),
                pool_mode: Some(mode.to_string()),
                pool_size: Some(size),
                connection_uri: uri.map(str::to_string),
            },
        }
    }

    #[test]
    fn test_pool_request_defaults() {
        let request = pool_request(&pool(None, None), Some("orders-pool".to_string()));
        assert_eq!(request.pool_size, 10);
        assert_eq!(request.pool_mode, "transaction");
        assert_eq!(request.pool_name.as_deref(), Some("orders-pool"));

        let update = pool_request(&pool(Some(25), Some(PoolMode::Session)), None);
        assert_eq!(update.pool_size, 25);
        assert_eq!(update.pool_mode, "session");
        assert!(update.pool_name.is_none());
    }

    #[tokio::test]
    async fn test_get_reads_pool_from_service_document() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/project/acme/service/orders-db"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "service": {
                    "service_name": "orders-db",
                    "state": "RUNNING",
                    "connection_pools": [
                        {"pool_name": "orders-pool", "database": "orders", "username": "app",
                         "pool_mode": "transaction", "pool_size": 10}
                    ]
                }
            })))
            .mount(&server)
            .await;

        let adapter = ConnectionPoolAdapter::new(cluster(&server));
        let found = adapter.get(&pool(None, None), None).await.unwrap();
        assert_eq!(found.pool.database, "orders");

        let err = adapter
            .get(&pool(None, None), Some("billing-pool"))
            .await
            .unwrap_err();
        assert!(err.is_not_found());
    }

    #[tokio::test]
    async fn test_drift_and_adoption() {
        let server = MockServer::start().await;
        let adapter = ConnectionPoolAdapter::new(cluster(&server));
        let record = pool(Some(10), None);

        assert!(!adapter.needs_update(&record, &remote(10, "transaction", None)));
        assert!(adapter.needs_update(&record, &remote(20, "transaction", None)));
        assert!(adapter.needs_update(&record, &remote(10, "session", None)));

        assert!(adapter.matches_existing(&record, &remote(10, "session", None)));
        let mut other_db = remote(10, "transaction", None);
        other_db.pool.database = "billing".to_string();
        assert!(!adapter.matches_existing(&record, &other_db));
    }

    #[test]
    fn test_connection_info_builds_uri_when_absent() {
        let info = connection_info(&pool(None, None), &remote(10, "transaction", None), "ca".to_string())
            .unwrap();

        assert_eq!(
            info.keys().map(String::as_str).collect::<Vec<_>>(),
            vec!["CA_CERT", "DATABASE", "DATABASE_URI", "HOST", "PASSWORD", "PORT", "SSLMODE", "USER"]
        );
        assert_eq!(info["DATABASE"], "orders-pool");
        assert_eq!(
            info["DATABASE_URI"],
            "postgres://app:pw@orders-db.example.com:12692/orders-pool?sslmode=require"
        );
    }

    #[test]
    fn test_connection_info_prefers_reported_uri() {
        let uri = "postgres://app:pw@pool.example.com:1/orders-pool?sslmode=verify-full";
        let info = connection_info(&pool(None, None), &remote(10, "transaction", Some(uri)), "ca".to_string())
            .unwrap();
        assert_eq!(info["DATABASE_URI"], uri);
    }

    #[test]
    fn test_connection_info_requires_user_password() {
        let mut remote = remote(10, "transaction", None);
        remote.service.users.clear();
        let err = connection_info(&pool(None, None), &remote, "ca".to_string()).unwrap_err();
        assert!(err.to_string().contains("PASSWORD"));
    }
}
