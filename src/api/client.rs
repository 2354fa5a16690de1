//! Backend HTTP client
//!
//! Shared `reqwest` client plus the response envelope handling every
//! endpoint goes through. The backend answers with
//! `{ success: bool, data?, error? }`; non-2xx or non-JSON responses are
//! surfaced as errors with best-effort message extraction.

use crate::config::Config;
use crate::error::PanelError;
use reqwest::Method;
use serde::de::DeserializeOwned;
use serde_json::Value;
use tracing::{debug, error};

/// HTTP client for the agent backend
///
/// One instance is shared across the console so connections are pooled.
/// No request timeout is configured and there is no retry policy: every
/// caller action is a single attempt.
#[derive(Debug, Clone)]
pub struct ApiClient {
    http: reqwest::Client,
    base_url: String,
    api_key: String,
}

impl ApiClient {
    /// Create a client for the given base URL and API key
    pub fn new(base_url: impl Into<String>, api_key: impl Into<String>) -> Self {
        Self {
            http: reqwest::Client::new(),
            base_url: base_url.into(),
            api_key: api_key.into(),
        }
    }

    /// Create a client from application configuration
    pub fn from_config(config: &Config) -> Self {
        Self::new(&config.backend.base_url, &config.backend.api_key)
    }

    /// Base URL this client talks to
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Perform a request and decode the response envelope
    ///
    /// # Errors
    /// * `PanelError::Unreachable` if the request could not be sent
    /// * `PanelError::Backend` on non-2xx status or `success: false`
    /// * `PanelError::InvalidResponse` on a non-JSON 2xx body
    async fn request(
        &self,
        method: Method,
        path: &str,
        body: Option<Value>,
    ) -> Result<Value, PanelError> {
        let url = format!("{}{}", self.base_url, path);
        debug!(method = %method, url = %url, "Calling backend");

        let mut request = self
            .http
            .request(method, &url)
            .header("Content-Type", "application/json")
            .header("X-Api-Key", &self.api_key);
        if let Some(body) = body {
            request = request.json(&body);
        }

        let response = request.send().await?;
        let status = response.status();
        let raw = response.text().await?;

        let value: Value = match serde_json::from_str(&raw) {
            Ok(value) => value,
            Err(_) if !status.is_success() => {
                error!(
                    status_code = status.as_u16(),
                    body = %raw,
                    "Backend returned non-JSON error"
                );
                return Err(PanelError::Backend(format!(
                    "HTTP {}: {}",
                    status.as_u16(),
                    raw.trim()
                )));
            }
            Err(e) => {
                error!(body = %raw, "Backend returned non-JSON body");
                return Err(PanelError::InvalidResponse(format!(
                    "Non-JSON response: {}",
                    e
                )));
            }
        };

        if !status.is_success() {
            let message = extract_error(&value)
                .unwrap_or_else(|| format!("HTTP {}", status.as_u16()));
            error!(
                status_code = status.as_u16(),
                message = %message,
                "Backend request failed"
            );
            return Err(PanelError::Backend(message));
        }

        if value.get("success").and_then(Value::as_bool) == Some(false) {
            let message =
                extract_error(&value).unwrap_or_else(|| "Unknown backend error".to_string());
            return Err(PanelError::Backend(message));
        }

        Ok(value)
    }

    /// GET a backend endpoint
    pub async fn get(&self, path: &str) -> Result<Value, PanelError> {
        self.request(Method::GET, path, None).await
    }

    /// POST to a backend endpoint with an optional JSON body
    pub async fn post(&self, path: &str, body: Option<Value>) -> Result<Value, PanelError> {
        self.request(Method::POST, path, body).await
    }

    /// PUT a JSON body to a backend endpoint
    pub async fn put(&self, path: &str, body: Value) -> Result<Value, PanelError> {
        self.request(Method::PUT, path, Some(body)).await
    }

    /// DELETE a backend endpoint
    pub async fn delete(&self, path: &str) -> Result<Value, PanelError> {
        self.request(Method::DELETE, path, None).await
    }

    /// Extract and decode the `data` field of a response envelope
    pub fn data<T: DeserializeOwned>(value: Value) -> Result<T, PanelError> {
        let data = value
            .get("data")
            .cloned()
            .ok_or_else(|| PanelError::InvalidResponse("Envelope has no data field".to_string()))?;
        serde_json::from_value(data)
            .map_err(|e| PanelError::InvalidResponse(format!("Unexpected data shape: {}", e)))
    }
}

/// Best-effort error message extraction from a backend response body
fn extract_error(value: &Value) -> Option<String> {
    value
        .get("error")
        .and_then(Value::as_str)
        .or_else(|| value.get("details").and_then(Value::as_str))
        .map(str::to_string)
}
