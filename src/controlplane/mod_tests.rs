// Copyright (c) 2025 Erick Bourgeois, firestoned
// SPDX-License-Identifier: MIT

//! Unit tests for `ControlPlaneClient`.

#[cfg(test)]
mod tests {
    use crate::controlplane::{decode, status_class, ControlPlaneClient};
    use crate::errors::ErrorClass;
    use reqwest::StatusCode;

    #[test]
    fn test_client_creation() {
        let _ = rustls::crypto::ring::default_provider().install_default();
        let client = ControlPlaneClient::new("https://api.example.com/v1", "secret-token").unwrap();
        let debug_output = format!("{client:?}");
        assert!(debug_output.starts_with("ControlPlaneClient"));
        assert!(debug_output.contains("base_url"));
    }

    #[test]
    fn test_client_rejects_invalid_url() {
        let _ = rustls::crypto::ring::default_provider().install_default();
        let err = ControlPlaneClient::new("not a url", "t").unwrap_err();
        assert_eq!(err.class(), ErrorClass::Terminal);

        let err = ControlPlaneClient::new("mailto:ops@example.com", "t").unwrap_err();
        assert_eq!(err.class(), ErrorClass::Terminal);
    }

    #[test]
    fn test_url_appends_segments() {
        let _ = rustls::crypto::ring::default_provider().install_default();
        let client = ControlPlaneClient::new("https://api.example.com/v1", "t").unwrap();
        let url = client.url(&["project", "acme", "service", "orders-db"]).unwrap();
        assert_eq!(
            url.as_str(),
            "https://api.example.com/v1/project/acme/service/orders-db"
        );
    }

    #[test]
    fn test_url_ignores_trailing_slash() {
        let _ = rustls::crypto::ring::default_provider().install_default();
        let client = ControlPlaneClient::new("https://api.example.com/v1/", "t").unwrap();
        let url = client.url(&["project", "acme", "vpcs"]).unwrap();
        assert_eq!(url.as_str(), "https://api.example.com/v1/project/acme/vpcs");
    }

    #[test]
    fn test_url_encodes_segments() {
        let _ = rustls::crypto::ring::default_provider().install_default();
        let client = ControlPlaneClient::new("http://localhost:8080", "t").unwrap();
        let url = client
            .url(&["project", "acme", "service", "events", "topic", "a/b c"])
            .unwrap();
        assert_eq!(
            url.as_str(),
            "http://localhost:8080/project/acme/service/events/topic/a%2Fb%20c"
        );
    }

    #[test]
    fn test_status_class() {
        assert_eq!(status_class(StatusCode::OK), "2xx");
        assert_eq!(status_class(StatusCode::CREATED), "2xx");
        assert_eq!(status_class(StatusCode::NOT_FOUND), "4xx");
        assert_eq!(status_class(StatusCode::SERVICE_UNAVAILABLE), "5xx");
        assert_eq!(status_class(StatusCode::MOVED_PERMANENTLY), "other");
    }

    #[test]
    fn test_decode_empty_body_as_null() {
        let value: Option<serde_json::Value> = decode("", "thing").unwrap();
        assert!(value.is_none());

        assert!(decode::<()>("  \n", "thing").is_ok());
    }

    #[test]
    fn test_decode_malformed_body_is_transient() {
        let err = decode::<Vec<String>>("{not json", "service orders-db").unwrap_err();
        assert_eq!(err.class(), ErrorClass::Transient);
        assert!(err.to_string().contains("service orders-db"));
    }
}
