// Copyright (c) 2025 Erick Bourgeois, firestoned
// SPDX-License-Identifier: MIT

//! HTTP error mapping for the control plane API.
//!
//! Converts control plane HTTP responses into classified [`OperatorError`]s and into
//! Kubernetes condition reasons.
//!
//! # Usage
//!
//! ```rust
//! use msop::http_errors::map_http_error_to_reason;
//!
//! let (reason, message) = map_http_error_to_reason(404);
//! assert_eq!(reason, "NotFound");
//!
//! let (reason, message) = map_http_error_to_reason(503);
//! assert_eq!(reason, "RetryLater");
//! ```

use crate::errors::OperatorError;
use crate::status_reasons::{
    REASON_NOT_FOUND, REASON_REJECTED, REASON_RETRY_LATER, REASON_TRANSPORT_ERROR,
};
use reqwest::{Method, StatusCode};

/// Map HTTP status code to condition reason and message.
///
/// # HTTP Code Mapping
///
/// | HTTP Code | Reason | Meaning |
/// |-----------|--------|---------|
/// | 400 | `Rejected` | Invalid request |
/// | 401 | `Rejected` | Token missing or expired |
/// | 403 | `Rejected` | Insufficient permissions or quota |
/// | 404 | `NotFound` | Resource not found |
/// | 409 | `RetryLater` | Conflict, resource mid-transition |
/// | 422 | `Rejected` | Unprocessable request |
/// | 429 | `RetryLater` | Rate limited |
/// | 503 | `RetryLater` | Service unavailable |
/// | Other 5xx | `TransportError` | Server or gateway failure |
/// | Other | `TransportError` | Unexpected response |
#[must_use]
pub fn map_http_error_to_reason(status_code: u16) -> (&'static str, String) {
    match status_code {
        400 => (
            REASON_REJECTED,
            "Invalid request to control plane (400)".into(),
        ),
        401 => (
            REASON_REJECTED,
            "Control plane authentication failed, check the API token (401)".into(),
        ),
        403 => (
            REASON_REJECTED,
            "Control plane authorization failed (403)".into(),
        ),
        404 => (
            REASON_NOT_FOUND,
            "Resource not found on control plane (404)".into(),
        ),
        409 => (
            REASON_RETRY_LATER,
            "Conflicting operation in progress on control plane (409)".into(),
        ),
        422 => (
            REASON_REJECTED,
            "Control plane could not process the request (422)".into(),
        ),
        429 => (
            REASON_RETRY_LATER,
            "Rate limited by control plane (429)".into(),
        ),
        503 => (
            REASON_RETRY_LATER,
            "Control plane temporarily unavailable (503)".into(),
        ),
        500..=599 => (
            REASON_TRANSPORT_ERROR,
            format!("Control plane server error ({status_code})"),
        ),
        _ => (
            REASON_TRANSPORT_ERROR,
            format!("Unexpected HTTP response from control plane ({status_code})"),
        ),
    }
}

/// Classify a failed control plane response.
///
/// `resource` names what was addressed (e.g. "service orders-db") and is used in
/// not-found and already-exists messages. `body` is the raw response body.
#[must_use]
pub fn classify_http_error(
    method: &Method,
    status: StatusCode,
    resource: &str,
    body: &str,
) -> OperatorError {
    let message = extract_error_message(body)
        .unwrap_or_else(|| map_http_error_to_reason(status.as_u16()).1);

    match status.as_u16() {
        404 => OperatorError::not_found(resource),
        409 if *method == Method::POST => OperatorError::AlreadyExists {
            resource: resource.to_string(),
        },
        409 | 429 | 503 => OperatorError::RetryLater {
            status: status.as_u16(),
            message,
        },
        400 | 401 | 403 | 422 => OperatorError::Rejected {
            status: status.as_u16(),
            message,
        },
        code => OperatorError::Transport {
            message: format!("HTTP {code}: {message}"),
        },
    }
}

/// Map a connection-level failure (no HTTP status received).
#[must_use]
pub fn map_connection_error(err: &reqwest::Error) -> OperatorError {
    if err.is_timeout() {
        OperatorError::transport(format!("control plane request timed out: {err}"))
    } else {
        OperatorError::transport(format!("failed to reach control plane: {err}"))
    }
}

/// Extract the human-readable message from a control plane error body.
///
/// Error bodies look like `{"message": "...", "errors": [{"message": "..."}]}`.
/// Falls back to the raw body when it is not JSON.
#[must_use]
pub fn extract_error_message(body: &str) -> Option<String> {
    let trimmed = body.trim();
    if trimmed.is_empty() {
        return None;
    }

    match serde_json::from_str::<serde_json::Value>(trimmed) {
        Ok(value) => value
            .get("message")
            .and_then(serde_json::Value::as_str)
            .or_else(|| {
                value
                    .get("errors")
                    .and_then(|errors| errors.get(0))
                    .and_then(|first| first.get("message"))
                    .and_then(serde_json::Value::as_str)
            })
            .map(str::to_string),
        Err(_) => Some(trimmed.to_string()),
    }
}

#[cfg(test)]
#[path = "http_errors_tests.rs"]
mod http_errors_tests;
