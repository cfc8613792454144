//! List transports
//!
//! The query layer talks to list endpoints through [`ListTransport`], which
//! posts a JSON body to a path and hands back the JSON response. Any HTTP
//! status outside 2xx is a transport failure; the envelope `code` is
//! interpreted by the query layer, not here.

use async_trait::async_trait;
use axum::{
    body::Body,
    http::{header, Method, Request},
    Router,
};
use serde_json::Value;
use tower::ServiceExt;

use crate::config::ClientConfig;

/// Error types for transport operations
#[derive(Debug, thiserror::Error)]
pub enum TransportError {
    /// Connection, timeout or body read failure
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    /// Server answered with a non-success HTTP status
    #[error("Server answered HTTP {0}")]
    Status(u16),

    /// Response body is not JSON
    #[error("Invalid response body: {0}")]
    Decode(#[from] serde_json::Error),

    /// Request could not be built or its body could not be read
    #[error("Request error: {0}")]
    Request(String),
}

/// Sends list requests
#[async_trait]
pub trait ListTransport: Send + Sync {
    /// POST `body` to `path` and return the decoded JSON response
    async fn post_json(&self, path: &str, body: Value) -> Result<Value, TransportError>;
}

/// Transport over HTTP using reqwest
#[derive(Debug, Clone)]
pub struct HttpTransport {
    client: reqwest::Client,
    base_url: String,
}

impl HttpTransport {
    /// Create a transport for `config.base_url` with the configured timeout
    pub fn new(config: &ClientConfig) -> Result<Self, TransportError> {
        let client = reqwest::Client::builder()
            .timeout(config.timeout())
            .build()?;

        Ok(Self {
            client,
            base_url: config.base_url.trim_end_matches('/').to_string(),
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn url(&self, path: &str) -> String {
        format!("{}/{}", self.base_url, path.trim_start_matches('/'))
    }
}

#[async_trait]
impl ListTransport for HttpTransport {
    async fn post_json(&self, path: &str, body: Value) -> Result<Value, TransportError> {
        let url = self.url(path);
        tracing::debug!("POST {}", url);

        let response = self.client.post(&url).json(&body).send().await?;

        let status = response.status();
        if !status.is_success() {
            return Err(TransportError::Status(status.as_u16()));
        }

        Ok(response.json::<Value>().await?)
    }
}

/// Transport that drives an in-process router without opening a socket
#[derive(Debug, Clone)]
pub struct RouterTransport {
    router: Router,
}

impl RouterTransport {
    pub fn new(router: Router) -> Self {
        Self { router }
    }
}

#[async_trait]
impl ListTransport for RouterTransport {
    async fn post_json(&self, path: &str, body: Value) -> Result<Value, TransportError> {
        let request = Request::builder()
            .method(Method::POST)
            .uri(path)
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(serde_json::to_vec(&body)?))
            .map_err(|e| TransportError::Request(e.to_string()))?;

        let response = match self.router.clone().oneshot(request).await {
            Ok(response) => response,
            Err(never) => match never {},
        };

        let status = response.status();
        if !status.is_success() {
            return Err(TransportError::Status(status.as_u16()));
        }

        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .map_err(|e| TransportError::Request(e.to_string()))?;
        Ok(serde_json::from_slice(&bytes)?)
    }
}
