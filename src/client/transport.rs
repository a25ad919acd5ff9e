//! Outbound transport
//!
//! The client hands a fully rendered payload to a [`Transport`] and gets the
//! raw reply back. [`HttpTransport`] is the production implementation over
//! `reqwest`; tests plug in loopbacks.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::header::CONTENT_TYPE;
use tracing::debug;

use crate::support::errors::TransportError;

#[derive(Debug, Clone)]
pub struct TransportRequest {
    /// Path relative to the remote base URL.
    pub path: String,
    pub content_type: &'static str,
    pub body: String,
    pub timeout: Duration,
}

#[derive(Debug, Clone)]
pub struct TransportResponse {
    pub status: u16,
    pub content_type: Option<String>,
    pub body: String,
}

impl TransportResponse {
    pub fn ok(body: impl Into<String>) -> Self {
        Self {
            status: 200,
            content_type: None,
            body: body.into(),
        }
    }

    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }
}

#[async_trait]
pub trait Transport: Send + Sync {
    async fn send(&self, request: TransportRequest) -> Result<TransportResponse, TransportError>;
}

/// HTTP POST transport
pub struct HttpTransport {
    client: reqwest::Client,
    base_url: String,
}

impl HttpTransport {
    pub fn new(base_url: &str) -> Result<Self, TransportError> {
        let client = reqwest::Client::builder()
            .build()
            .map_err(|e| TransportError::Other(e.to_string()))?;

        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }
}

#[async_trait]
impl Transport for HttpTransport {
    async fn send(&self, request: TransportRequest) -> Result<TransportResponse, TransportError> {
        let url = format!("{}{}", self.base_url, request.path);
        debug!(%url, bytes = request.body.len(), "POST");

        let response = self
            .client
            .post(&url)
            .header(CONTENT_TYPE, request.content_type)
            .timeout(request.timeout)
            .body(request.body)
            .send()
            .await
            .map_err(|e| classify(e, &url, request.timeout))?;

        let status = response.status().as_u16();
        let content_type = response
            .headers()
            .get(CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .map(str::to_string);
        let body = response
            .text()
            .await
            .map_err(|e| classify(e, &url, request.timeout))?;

        Ok(TransportResponse {
            status,
            content_type,
            body,
        })
    }
}

fn classify(e: reqwest::Error, url: &str, timeout: Duration) -> TransportError {
    if e.is_timeout() {
        TransportError::Timeout(timeout.as_millis() as u64)
    } else if e.is_connect() {
        TransportError::Connect(url.to_string())
    } else {
        TransportError::Other(e.to_string())
    }
}
