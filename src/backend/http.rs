//! HTTP utilities for reservation backend calls

use crate::error::{ManagerError, Result};
use reqwest::{Client, RequestBuilder, StatusCode};
use serde::de::DeserializeOwned;
use serde_json::Value;
use std::time::Duration;
use url::Url;

/// Maximum length of response body to log (to avoid logging sensitive data)
const MAX_LOG_BODY_LENGTH: usize = 200;

/// Sanitize response body for logging
/// Truncates long responses and strips control characters
pub(crate) fn sanitize_for_log(body: &str) -> String {
    let total = body.chars().count();
    let truncated: String = body.chars().take(MAX_LOG_BODY_LENGTH).collect();
    let truncated = if total > MAX_LOG_BODY_LENGTH {
        format!("{}... [truncated, {} bytes total]", truncated, body.len())
    } else {
        truncated
    };

    truncated.replace(|c: char| !c.is_ascii_graphic() && c != ' ', "")
}

/// Status and raw body of a backend response
#[derive(Debug, Clone)]
pub struct BackendResponse {
    pub status: StatusCode,
    pub body: String,
}

impl BackendResponse {
    pub fn is_server_error(&self) -> bool {
        self.status.is_server_error()
    }

    pub fn json<T: DeserializeOwned>(&self) -> std::result::Result<T, serde_json::Error> {
        serde_json::from_str(&self.body)
    }
}

/// HTTP client wrapper for reservation backend calls
///
/// Returns every response that arrives, whatever its status; callers decide
/// what a status means. Only transport failures are errors here.
#[derive(Clone)]
pub struct BackendHttpClient {
    client: Client,
}

impl BackendHttpClient {
    /// Create a new HTTP client. Without a timeout the transport default applies.
    pub fn new(user_agent: &str, timeout: Option<Duration>) -> Result<Self> {
        let mut builder = Client::builder().user_agent(user_agent);
        if let Some(timeout) = timeout {
            builder = builder.timeout(timeout);
        }

        let client = builder.build().map_err(|e| {
            ManagerError::Configuration(format!("failed to create HTTP client: {}", e))
        })?;

        Ok(Self { client })
    }

    /// Make an unauthenticated GET request
    pub async fn get(&self, url: &Url) -> Result<BackendResponse> {
        tracing::debug!("GET {}", url);
        self.send(self.client.get(url.clone()), url).await
    }

    /// Make a POST request with a JSON body
    pub async fn post(&self, url: &Url, token: &str, body: &Value) -> Result<BackendResponse> {
        tracing::debug!("POST {}", url);
        let request = self.client.post(url.clone()).bearer_auth(token).json(body);
        self.send(request, url).await
    }

    /// Make a DELETE request with a JSON body
    pub async fn delete(&self, url: &Url, token: &str, body: &Value) -> Result<BackendResponse> {
        tracing::debug!("DELETE {}", url);
        let request = self.client.delete(url.clone()).bearer_auth(token).json(body);
        self.send(request, url).await
    }

    async fn send(&self, request: RequestBuilder, url: &Url) -> Result<BackendResponse> {
        let response = request.send().await.map_err(|e| {
            ManagerError::BackendUnreachable(format!("request to {} failed: {}", url, e))
        })?;

        let status = response.status();
        let body = response.text().await.map_err(|e| {
            ManagerError::BackendUnreachable(format!("failed to read response from {}: {}", url, e))
        })?;

        if !status.is_success() {
            // Security: Only log sanitized/truncated error body to avoid leaking sensitive data
            tracing::error!("Backend error: {} - {}", status, sanitize_for_log(&body));
        }

        Ok(BackendResponse { status, body })
    }
}
