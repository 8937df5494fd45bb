// Copyright (c) 2025 Erick Bourgeois, firestoned
// SPDX-License-Identifier: MIT

//! Shared fixtures for adapter tests.
//!
//! Both clients point at one `wiremock` server: control plane paths live under
//! `/project/...` and Kubernetes paths under `/api/...`, so they never collide.

use crate::controlplane::ControlPlaneClient;
use crate::reconcilers::dependencies::ClusterLookup;
use std::time::Duration;
use wiremock::matchers::{method, path, path_regex};
use wiremock::{Mock, MockServer, ResponseTemplate};

pub(crate) const PROJECT: &str = "acme";
pub(crate) const NAMESPACE: &str = "team-a";
pub(crate) const CA_CERT: &str = "-----BEGIN CERTIFICATE-----\nMIIB\n-----END CERTIFICATE-----";

/// Clients aimed at `server`, with a short in-call retry window.
pub(crate) fn cluster(server: &MockServer) -> ClusterLookup {
    let _ = rustls::crypto::ring::default_provider().install_default();
    let config = kube::Config::new(server.uri().parse().unwrap());
    ClusterLookup {
        client: kube::Client::try_from(config).unwrap(),
        control_plane: ControlPlaneClient::new(&server.uri(), "test-token")
            .unwrap()
            .with_retry_window(Duration::from_millis(50)),
    }
}

/// JSON body of the project CA endpoint.
pub(crate) fn ca_body() -> serde_json::Value {
    serde_json::json!({ "certificate": CA_CERT })
}

/// Answer every lookup of a declared record with a Kubernetes `NotFound` status.
pub(crate) async fn mount_no_declared_records(server: &MockServer) {
    Mock::given(method("GET"))
        .and(path_regex(r"^/apis/msop\.dev/"))
        .respond_with(ResponseTemplate::new(404).set_body_json(serde_json::json!({
            "kind": "Status",
            "apiVersion": "v1",
            "metadata": {},
            "status": "Failure",
            "message": "not found",
            "reason": "NotFound",
            "code": 404
        })))
        .mount(server)
        .await;
}

/// Serve `service` on the control plane in state `RUNNING`.
pub(crate) async fn mount_running_service(server: &MockServer, service: &str) {
    Mock::given(method("GET"))
        .and(path(format!("/project/{PROJECT}/service/{service}")))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "service": {"service_name": service, "state": "RUNNING"}
        })))
        .mount(server)
        .await;
}
