//! HTTP transport abstraction
//!
//! The fetcher talks to the network through `HttpTransport`. The default
//! implementation uses `reqwest`; tests and embedders can inject their own to
//! script status codes and chunk-by-chunk bodies.

use std::pin::Pin;

use async_trait::async_trait;
use bytes::Bytes;
use futures::Stream;
use futures_util::StreamExt;
use reqwest::header::HeaderMap;

use crate::config::ChatConfig;
use crate::error::ChatError;

/// Response body as a stream of raw reads.
pub type ByteStream = Pin<Box<dyn Stream<Item = Result<Bytes, ChatError>> + Send>>;

/// Transport-level request data for JSON POST requests.
#[derive(Debug, Clone)]
pub struct HttpTransportRequest {
    pub url: String,
    pub headers: HeaderMap,
    pub body: serde_json::Value,
}

/// Transport-level response data. The body is left unread.
pub struct HttpTransportResponse {
    pub status: u16,
    pub headers: HeaderMap,
    pub body: Option<ByteStream>,
}

impl HttpTransportResponse {
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }
}

impl std::fmt::Debug for HttpTransportResponse {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HttpTransportResponse")
            .field("status", &self.status)
            .field("headers", &self.headers)
            .field("body", &self.body.as_ref().map(|_| "<stream>"))
            .finish()
    }
}

/// Custom HTTP transport for streaming JSON requests.
#[async_trait]
pub trait HttpTransport: Send + Sync {
    /// Send the request and return as soon as response headers arrive.
    async fn post_json_stream(
        &self,
        request: HttpTransportRequest,
    ) -> Result<HttpTransportResponse, ChatError>;
}

/// `reqwest`-backed transport.
#[derive(Debug, Clone)]
pub struct ReqwestTransport {
    client: reqwest::Client,
}

impl ReqwestTransport {
    pub fn new(client: reqwest::Client) -> Self {
        Self { client }
    }

    /// Build a client honoring the configured timeouts.
    pub fn from_config(config: &ChatConfig) -> Result<Self, ChatError> {
        let mut builder = reqwest::Client::builder().connect_timeout(config.connect_timeout);
        if let Some(timeout) = config.request_timeout {
            builder = builder.timeout(timeout);
        }
        let client = builder.build().map_err(|e| {
            ChatError::ConfigurationError(format!("Failed to build HTTP client: {e}"))
        })?;
        Ok(Self::new(client))
    }
}

#[async_trait]
impl HttpTransport for ReqwestTransport {
    async fn post_json_stream(
        &self,
        request: HttpTransportRequest,
    ) -> Result<HttpTransportResponse, ChatError> {
        let response = self
            .client
            .post(&request.url)
            .headers(request.headers)
            .json(&request.body)
            .send()
            .await?;

        let status = response.status().as_u16();
        let headers = response.headers().clone();
        let body: ByteStream = Box::pin(
            response
                .bytes_stream()
                .map(|chunk| chunk.map_err(|e| ChatError::TransportError(format!("Stream error: {e}")))),
        );

        Ok(HttpTransportResponse {
            status,
            headers,
            body: Some(body),
        })
    }
}
