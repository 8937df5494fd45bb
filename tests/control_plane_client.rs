// Copyright (c) 2025 Erick Bourgeois, firestoned
// SPDX-License-Identifier: MIT

//! Control plane client tests against a mock HTTP server.
//!
//! These run without a cluster: every call goes to a local `wiremock` server.

use msop::controlplane::types::{CreateServiceRequest, CreateVpcRequest};
use msop::controlplane::ControlPlaneClient;
use msop::errors::ErrorClass;
use serde_json::json;
use std::time::Duration;
use wiremock::matchers::{body_partial_json, header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn client(server: &MockServer, retry_window: Duration) -> ControlPlaneClient {
    let _ = rustls::crypto::ring::default_provider().install_default();
    ControlPlaneClient::new(&server.uri(), "test-token")
        .unwrap()
        .with_retry_window(retry_window)
}

fn service_body(state: &str) -> serde_json::Value {
    json!({
        "service": {
            "service_name": "orders-db",
            "service_type": "pg",
            "state": state,
            "plan": "business-4"
        }
    })
}

#[tokio::test]
async fn test_service_lifecycle() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/project/acme/service"))
        .and(header("authorization", "Bearer test-token"))
        .and(body_partial_json(json!({"service_name": "orders-db", "plan": "business-4"})))
        .respond_with(ResponseTemplate::new(200).set_body_json(service_body("REBUILDING")))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/project/acme/service/orders-db"))
        .respond_with(ResponseTemplate::new(200).set_body_json(service_body("RUNNING")))
        .up_to_n_times(1)
        .mount(&server)
        .await;
    Mock::given(method("DELETE"))
        .and(path("/project/acme/service/orders-db"))
        .respond_with(ResponseTemplate::new(204))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/project/acme/service/orders-db"))
        .respond_with(ResponseTemplate::new(404).set_body_json(json!({"message": "Not found"})))
        .mount(&server)
        .await;

    let client = client(&server, Duration::from_secs(5));
    let request = CreateServiceRequest {
        service_name: "orders-db".to_string(),
        service_type: "pg".to_string(),
        plan: "business-4".to_string(),
        ..Default::default()
    };

    let created = client.create_service("acme", &request).await.unwrap();
    assert_eq!(created.state, "REBUILDING");

    let running = client.get_service("acme", "orders-db").await.unwrap();
    assert_eq!(running.state, "RUNNING");
    assert_eq!(running.plan.as_deref(), Some("business-4"));

    client.delete_service("acme", "orders-db").await.unwrap();

    let err = client.get_service("acme", "orders-db").await.unwrap_err();
    assert!(err.is_not_found());
}

#[tokio::test]
async fn test_unavailable_is_retried_within_window() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/project/acme/vpcs"))
        .respond_with(ResponseTemplate::new(503))
        .up_to_n_times(2)
        .expect(2)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/project/acme/vpcs"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "vpcs": [{
                "project_vpc_id": "vpc-1",
                "cloud_name": "aws-eu-west-1",
                "network_cidr": "10.0.0.0/24",
                "state": "ACTIVE"
            }]
        })))
        .expect(1)
        .mount(&server)
        .await;

    let vpcs = client(&server, Duration::from_secs(10))
        .list_vpcs("acme")
        .await
        .unwrap();
    assert_eq!(vpcs.len(), 1);
    assert_eq!(vpcs[0].project_vpc_id, "vpc-1");
}

#[tokio::test]
async fn test_exhausted_window_reports_retry_later() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/project/acme/vpcs/vpc-1"))
        .respond_with(
            ResponseTemplate::new(429).set_body_json(json!({"message": "Too many requests"})),
        )
        .mount(&server)
        .await;

    let err = client(&server, Duration::ZERO)
        .get_vpc("acme", "vpc-1")
        .await
        .unwrap_err();
    assert_eq!(err.class(), ErrorClass::Retryable);
    assert!(err.to_string().contains("Too many requests"));
}

#[tokio::test]
async fn test_rejected_request_is_terminal_and_not_retried() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/project/acme/vpcs"))
        .respond_with(ResponseTemplate::new(400).set_body_json(json!({
            "errors": [{"message": "Invalid network_cidr"}]
        })))
        .expect(1)
        .mount(&server)
        .await;

    let request = CreateVpcRequest {
        cloud_name: "aws-eu-west-1".to_string(),
        network_cidr: "10.0.0.0/99".to_string(),
        peering_connections: Vec::new(),
    };
    let err = client(&server, Duration::from_secs(10))
        .create_vpc("acme", &request)
        .await
        .unwrap_err();
    assert_eq!(err.class(), ErrorClass::Terminal);
    assert_eq!(err.reason(), "Rejected");
    assert!(err.to_string().contains("Invalid network_cidr"));
}

#[tokio::test]
async fn test_create_collision_is_already_exists() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/project/acme/service"))
        .respond_with(
            ResponseTemplate::new(409).set_body_json(json!({"message": "Service name is taken"})),
        )
        .expect(1)
        .mount(&server)
        .await;

    let request = CreateServiceRequest {
        service_name: "orders-db".to_string(),
        service_type: "pg".to_string(),
        plan: "business-4".to_string(),
        ..Default::default()
    };
    let err = client(&server, Duration::from_secs(10))
        .create_service("acme", &request)
        .await
        .unwrap_err();
    assert!(err.is_already_exists());
    assert_eq!(err.class(), ErrorClass::Retryable);
}
