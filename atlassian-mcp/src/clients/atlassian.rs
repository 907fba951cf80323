//! Atlassian REST client.
//!
//! One pre-authenticated HTTP client shared by every JIRA (`/rest/api/3/...`)
//! and Confluence (`/wiki/rest/api/...`) handler. Responses are returned as
//! raw JSON; handlers decide what to keep.

use super::config::{AtlassianConfig, Config};
use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine;
use reqwest::header::{HeaderMap, HeaderValue, ACCEPT, AUTHORIZATION, CONTENT_TYPE};
use reqwest::multipart::Form;
use reqwest::{Client, Method, RequestBuilder, Response};
use serde_json::Value;
use std::time::Duration;
use thiserror::Error;
use tracing::{debug, instrument, warn};

/// `X-Atlassian-Token` value JIRA expects on multipart uploads.
pub const JIRA_XSRF_TOKEN: &str = "no-check";

/// `X-Atlassian-Token` value Confluence expects on multipart uploads.
pub const CONFLUENCE_XSRF_TOKEN: &str = "nocheck";

/// Atlassian client errors.
#[derive(Debug, Error)]
pub enum AtlassianError {
    /// HTTP request failed before a response arrived.
    #[error("HTTP request failed: {0}")]
    RequestFailed(#[from] reqwest::Error),

    /// API returned an error response.
    #[error("API error ({status}): {message}")]
    Api {
        /// HTTP status code.
        status: u16,
        /// Error message extracted from the response body.
        message: String,
    },

    /// Response body could not be decoded.
    #[error("Invalid API response: {0}")]
    InvalidResponse(String),
}

impl AtlassianError {
    /// Message suitable for showing to the caller.
    pub fn upstream_message(&self) -> String {
        match self {
            AtlassianError::Api { message, .. } => message.clone(),
            AtlassianError::RequestFailed(e) => e.to_string(),
            AtlassianError::InvalidResponse(msg) => msg.clone(),
        }
    }

    /// HTTP status of an API error response.
    pub fn status(&self) -> Option<u16> {
        match self {
            AtlassianError::Api { status, .. } => Some(*status),
            AtlassianError::RequestFailed(e) => e.status().map(|s| s.as_u16()),
            _ => None,
        }
    }
}

/// Pull a readable message out of an Atlassian error body.
///
/// Tries `message`, then `errorMessages` and `errors`, then falls back to
/// a generic status line.
pub fn extract_error_message(status: u16, body: &str) -> String {
    let parsed: Option<Value> = serde_json::from_str(body).ok();

    if let Some(body) = parsed.as_ref() {
        if let Some(message) = body.get("message").and_then(Value::as_str) {
            if !message.is_empty() {
                return message.to_string();
            }
        }

        let mut parts: Vec<String> = body
            .get("errorMessages")
            .and_then(Value::as_array)
            .map(|msgs| msgs.iter().filter_map(Value::as_str).map(String::from).collect())
            .unwrap_or_default();

        if let Some(errors) = body.get("errors").and_then(Value::as_object) {
            parts.extend(errors.iter().map(|(field, msg)| match msg.as_str() {
                Some(text) => format!("{}: {}", field, text),
                None => format!("{}: {}", field, msg),
            }));
        }

        if !parts.is_empty() {
            return parts.join("; ");
        }
    }

    format!("Request failed with status code {}", status)
}

/// Atlassian REST client.
#[derive(Clone)]
pub struct AtlassianClient {
    /// HTTP client with auth and JSON headers preset.
    client: Client,

    /// Site base URL without trailing slash.
    base_url: String,

    /// Log each request and response.
    debug: bool,
}

impl std::fmt::Debug for AtlassianClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AtlassianClient")
            .field("base_url", &self.base_url)
            .field("debug", &self.debug)
            .finish()
    }
}

impl AtlassianClient {
    /// Create a client for the given site and credentials.
    pub fn new(
        atlassian: &AtlassianConfig,
        timeout: Duration,
        debug: bool,
    ) -> Result<Self, AtlassianError> {
        let credentials = BASE64.encode(format!("{}:{}", atlassian.email, atlassian.token));
        let mut auth = HeaderValue::from_str(&format!("Basic {}", credentials))
            .map_err(|e| AtlassianError::InvalidResponse(format!("invalid credentials: {}", e)))?;
        auth.set_sensitive(true);

        let mut headers = HeaderMap::new();
        headers.insert(AUTHORIZATION, auth);
        headers.insert(ACCEPT, HeaderValue::from_static("application/json"));
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));

        let client = Client::builder()
            .default_headers(headers)
            .timeout(timeout)
            .build()?;

        Ok(Self {
            client,
            base_url: atlassian.base_url.trim_end_matches('/').to_string(),
            debug,
        })
    }

    /// Create a client from the full server configuration.
    pub fn from_config(config: &Config) -> Result<Self, AtlassianError> {
        Self::new(&config.atlassian, config.timeout(), config.debug)
    }

    /// Site base URL.
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Build a full URL by appending a path to the base URL.
    pub fn url(&self, path: &str) -> String {
        format!("{}/{}", self.base_url, path.trim_start_matches('/'))
    }

    /// GET `path` with query parameters.
    #[instrument(skip(self, query))]
    pub async fn get(&self, path: &str, query: &[(&str, String)]) -> Result<Value, AtlassianError> {
        let request = self.client.get(self.url(path)).query(query);
        self.send(Method::GET, path, request, None).await
    }

    /// POST a JSON body.
    #[instrument(skip(self, body))]
    pub async fn post(&self, path: &str, body: &Value) -> Result<Value, AtlassianError> {
        let request = self.client.post(self.url(path)).json(body);
        self.send(Method::POST, path, request, Some(body)).await
    }

    /// PUT a JSON body. A `null` body is sent as the literal `null`.
    #[instrument(skip(self, body))]
    pub async fn put(&self, path: &str, body: &Value) -> Result<Value, AtlassianError> {
        let request = self.client.put(self.url(path)).json(body);
        self.send(Method::PUT, path, request, Some(body)).await
    }

    /// DELETE with query parameters.
    #[instrument(skip(self, query))]
    pub async fn delete(
        &self,
        path: &str,
        query: &[(&str, String)],
    ) -> Result<Value, AtlassianError> {
        let request = self.client.delete(self.url(path)).query(query);
        self.send(Method::DELETE, path, request, None).await
    }

    /// POST a multipart form with the given `X-Atlassian-Token` value.
    #[instrument(skip(self, form))]
    pub async fn post_multipart(
        &self,
        path: &str,
        form: Form,
        xsrf_token: &str,
    ) -> Result<Value, AtlassianError> {
        let request = self
            .client
            .post(self.url(path))
            .header("X-Atlassian-Token", xsrf_token)
            .multipart(form);
        self.send(Method::POST, path, request, None).await
    }

    async fn send(
        &self,
        method: Method,
        path: &str,
        request: RequestBuilder,
        body: Option<&Value>,
    ) -> Result<Value, AtlassianError> {
        if self.debug {
            debug!(
                %method,
                url = %self.url(path),
                authorization = "Basic [REDACTED]",
                body = ?body,
                "Request"
            );
        }

        let response = request.send().await.map_err(|e| {
            if self.debug {
                debug!(%method, path, error = %e, "Request failed without response");
            }
            AtlassianError::RequestFailed(e)
        })?;

        self.handle_response(response).await
    }

    async fn handle_response(&self, response: Response) -> Result<Value, AtlassianError> {
        let status = response.status();
        let text = response.text().await?;

        if self.debug {
            debug!(status = status.as_u16(), body = %text, "Response");
        }

        if !status.is_success() {
            let message = extract_error_message(status.as_u16(), &text);
            warn!("Atlassian API error ({}): {}", status.as_u16(), message);
            return Err(AtlassianError::Api {
                status: status.as_u16(),
                message,
            });
        }

        if text.trim().is_empty() {
            return Ok(Value::Null);
        }

        serde_json::from_str(&text).map_err(|e| AtlassianError::InvalidResponse(e.to_string()))
    }
}
