// Copyright (c) 2025 Erick Bourgeois, firestoned
// SPDX-License-Identifier: MIT

//! Client for the managed-service control plane REST API.
//!
//! One endpoint family exists per resource kind, keyed by project and service:
//!
//! - [`services`] - services and the project CA certificate
//! - [`users`] - service users and their credentials
//! - [`databases`] - logical databases and connection pools
//! - [`kafka`] - Kafka topics and ACL entries
//! - [`project`] - project VPCs and service integrations
//!
//! Every call returns a classified [`OperatorError`]: `NotFound` for 404, `AlreadyExists`
//! for a 409 on create, `RetryLater` for busy/conflict/rate-limit answers, `Rejected` for
//! validation failures and `Transport` for everything else. 429 and 5xx responses are
//! retried in-call with exponential backoff before they are surfaced.
//!
//! # Example
//!
//! ```rust,no_run
//! use msop::controlplane::ControlPlaneClient;
//!
//! # async fn example() -> Result<(), msop::errors::OperatorError> {
//! let client = ControlPlaneClient::new("https://api.aiven.io/v1", "token")?;
//! let service = client.get_service("acme", "orders-db").await?;
//! println!("{} is {}", service.service_name, service.state);
//! # Ok(())
//! # }
//! ```

pub mod databases;
pub mod kafka;
pub mod project;
pub mod services;
pub mod types;
pub mod users;

use crate::constants::{API_REQUEST_TIMEOUT_SECS, DEFAULT_API_RETRY_WINDOW_SECS, USER_AGENT};
use crate::errors::OperatorError;
use crate::http_errors::{classify_http_error, map_connection_error};
use crate::metrics;
use crate::reconcilers::retry::{http_backoff, is_retryable_http_status};
use reqwest::{Client as HttpClient, Method, StatusCode};
use serde::{de::DeserializeOwned, Serialize};
use std::sync::Arc;
use std::time::{Duration, Instant};
use tracing::{debug, warn};
use url::Url;

/// A failed attempt, tagged with whether it may be retried in-call.
struct Attempt {
    retryable: bool,
    error: OperatorError,
}

/// Process-wide control plane client.
///
/// Cloning is cheap; the HTTP connection pool and credentials are shared and never
/// change after construction.
#[derive(Debug, Clone)]
pub struct ControlPlaneClient {
    http: HttpClient,
    base_url: Arc<Url>,
    token: Arc<String>,
    retry_window: Duration,
}

impl ControlPlaneClient {
    /// Create a client for `base_url` authenticating with `token`.
    ///
    /// # Errors
    ///
    /// Returns `InvalidSpec` if the base URL cannot be parsed or cannot carry a path,
    /// and `Transport` if the HTTP client cannot be built.
    pub fn new(base_url: &str, token: impl Into<String>) -> Result<Self, OperatorError> {
        let base_url = Url::parse(base_url).map_err(|e| {
            OperatorError::invalid_spec(format!("invalid control plane URL {base_url}: {e}"))
        })?;
        if base_url.cannot_be_a_base() {
            return Err(OperatorError::invalid_spec(format!(
                "control plane URL {base_url} cannot carry a path"
            )));
        }

        let http = HttpClient::builder()
            .timeout(Duration::from_secs(API_REQUEST_TIMEOUT_SECS))
            .user_agent(USER_AGENT)
            .build()
            .map_err(|e| OperatorError::transport(format!("failed to build HTTP client: {e}")))?;

        Ok(Self {
            http,
            base_url: Arc::new(base_url),
            token: Arc::new(token.into()),
            retry_window: Duration::from_secs(DEFAULT_API_RETRY_WINDOW_SECS),
        })
    }

    /// Override the in-call retry window for 429/5xx responses.
    #[must_use]
    pub fn with_retry_window(mut self, retry_window: Duration) -> Self {
        self.retry_window = retry_window;
        self
    }

    /// Build a URL from path segments. Each segment is percent-encoded.
    pub(crate) fn url(&self, segments: &[&str]) -> Result<Url, OperatorError> {
        let mut url = (*self.base_url).clone();
        url.path_segments_mut()
            .map_err(|()| OperatorError::invalid_spec("control plane URL cannot carry a path"))?
            .pop_if_empty()
            .extend(segments);
        Ok(url)
    }

    /// GET and decode a JSON document.
    pub(crate) async fn get_json<R: DeserializeOwned>(
        &self,
        segments: &[&str],
        resource: &str,
    ) -> Result<R, OperatorError> {
        let body = self
            .request(Method::GET, segments, None::<&()>, resource)
            .await?;
        decode(&body, resource)
    }

    /// Send a JSON body and decode the JSON answer.
    pub(crate) async fn send_json<B: Serialize, R: DeserializeOwned>(
        &self,
        method: Method,
        segments: &[&str],
        body: &B,
        resource: &str,
    ) -> Result<R, OperatorError> {
        let text = self.request(method, segments, Some(body), resource).await?;
        decode(&text, resource)
    }

    /// Send a request whose answer body is irrelevant.
    pub(crate) async fn send<B: Serialize>(
        &self,
        method: Method,
        segments: &[&str],
        body: Option<&B>,
        resource: &str,
    ) -> Result<(), OperatorError> {
        self.request(method, segments, body, resource).await.map(|_| ())
    }

    /// Issue a request, retrying 429/5xx and connection failures within the retry window.
    async fn request<B: Serialize>(
        &self,
        method: Method,
        segments: &[&str],
        body: Option<&B>,
        resource: &str,
    ) -> Result<String, OperatorError> {
        let url = self.url(segments)?;
        let body = body
            .map(serde_json::to_value)
            .transpose()
            .map_err(|e| OperatorError::transport(format!("failed to encode request: {e}")))?;

        let mut backoff = http_backoff(self.retry_window);
        let start_time = Instant::now();
        let mut attempt = 0;

        loop {
            attempt += 1;

            match self.request_once(&method, &url, body.as_ref(), resource).await {
                Ok(text) => {
                    if attempt > 1 {
                        debug!(
                            method = %method,
                            url = %url,
                            attempt = attempt,
                            elapsed = ?start_time.elapsed(),
                            "Control plane call succeeded after retries"
                        );
                    }
                    return Ok(text);
                }
                Err(Attempt { retryable, error }) => {
                    if !retryable {
                        return Err(error);
                    }

                    match backoff.next_backoff() {
                        Some(duration) => {
                            warn!(
                                method = %method,
                                url = %url,
                                attempt = attempt,
                                retry_after = ?duration,
                                error = %error,
                                "Retryable control plane error, will retry"
                            );
                            tokio::time::sleep(duration).await;
                        }
                        None => {
                            warn!(
                                method = %method,
                                url = %url,
                                attempt = attempt,
                                elapsed = ?start_time.elapsed(),
                                error = %error,
                                "Control plane retry window exhausted"
                            );
                            return Err(error);
                        }
                    }
                }
            }
        }
    }

    async fn request_once(
        &self,
        method: &Method,
        url: &Url,
        body: Option<&serde_json::Value>,
        resource: &str,
    ) -> Result<String, Attempt> {
        debug!(method = %method, url = %url, "Control plane request");

        let mut request = self
            .http
            .request(method.clone(), url.clone())
            .bearer_auth(self.token.as_str());
        if let Some(body) = body {
            request = request.json(body);
        }

        let response = match request.send().await {
            Ok(response) => response,
            Err(e) => {
                metrics::record_control_plane_request(method.as_str(), "error");
                return Err(Attempt {
                    retryable: e.is_connect() || e.is_timeout(),
                    error: map_connection_error(&e),
                });
            }
        };

        let status = response.status();
        metrics::record_control_plane_request(method.as_str(), status_class(status));

        let text = response.text().await.map_err(|e| Attempt {
            retryable: false,
            error: OperatorError::transport(format!("failed to read response body: {e}")),
        })?;

        if status.is_success() {
            return Ok(text);
        }

        let error = classify_http_error(method, status, resource, &text);
        if !error.is_not_found() {
            debug!(
                method = %method,
                url = %url,
                status = %status,
                error = %error,
                "Control plane request failed"
            );
        }

        Err(Attempt {
            retryable: is_retryable_http_status(status),
            error,
        })
    }
}

/// Decode a JSON response body, treating an empty body as `null`.
fn decode<R: DeserializeOwned>(text: &str, resource: &str) -> Result<R, OperatorError> {
    let text = if text.trim().is_empty() { "null" } else { text };
    serde_json::from_str(text).map_err(|e| {
        OperatorError::transport(format!("unexpected response for {resource}: {e}"))
    })
}

fn status_class(status: StatusCode) -> &'static str {
    match status.as_u16() {
        200..=299 => "2xx",
        400..=499 => "4xx",
        500..=599 => "5xx",
        _ => "other",
    }
}

#[cfg(test)]
mod mod_tests;
