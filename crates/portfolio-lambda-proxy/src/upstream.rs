//! Outbound exchange with the protected upstream endpoint.

use async_trait::async_trait;
use http::header::{CONTENT_LENGTH, CONTENT_TYPE};
use reqwest::Client;
use thiserror::Error;

use crate::ProxyTarget;

/// Header carrying the secret API key.
pub const API_KEY_HEADER: &str = "X-Api-Key";

/// Failure to complete an exchange with the upstream.
#[derive(Debug, Error)]
pub enum UpstreamError {
    /// Error raised by the HTTP client (connect, TLS, body read, ...).
    #[error(transparent)]
    Http(#[from] reqwest::Error),

    /// Transport failure reported by any other [`UpstreamTransport`].
    #[error("{0}")]
    Transport(String),
}

/// POST request sent to the upstream.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UpstreamRequest {
    pub url: String,
    pub headers: Vec<(String, String)>,
    pub body: String,
}

impl UpstreamRequest {
    /// Build the outbound request for `target`.
    ///
    /// The body is forwarded untouched. The API key always comes from the
    /// target, never from the inbound request.
    pub fn for_target(target: &ProxyTarget, body: Option<&str>) -> Self {
        let body = body.unwrap_or_default().to_string();
        let headers = vec![
            (API_KEY_HEADER.to_string(), target.api_key().to_string()),
            (CONTENT_TYPE.as_str().to_string(), "application/json".to_string()),
            (CONTENT_LENGTH.as_str().to_string(), body.len().to_string()),
        ];

        Self {
            url: target.url(),
            headers,
            body,
        }
    }

    /// Header value by case-insensitive name.
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(key, _)| key.eq_ignore_ascii_case(name))
            .map(|(_, value)| value.as_str())
    }
}

/// Status and complete body returned by the upstream.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UpstreamResponse {
    pub status: u16,
    /// Full body decoded as UTF-8; invalid sequences become U+FFFD.
    pub body: String,
}

/// Something that can perform one upstream exchange.
#[async_trait]
pub trait UpstreamTransport: Send + Sync {
    /// Send `request` and wait for the full response body.
    async fn send(&self, request: UpstreamRequest) -> Result<UpstreamResponse, UpstreamError>;
}

/// [`UpstreamTransport`] backed by a shared `reqwest::Client`.
#[derive(Debug, Clone)]
pub struct HttpUpstream {
    client: Client,
}

impl HttpUpstream {
    /// Build the client used for every invocation of this process.
    pub fn new() -> Result<Self, UpstreamError> {
        let client = Client::builder().user_agent(user_agent()).build()?;
        Ok(Self { client })
    }

    /// Wrap an existing client.
    pub fn with_client(client: Client) -> Self {
        Self { client }
    }
}

#[async_trait]
impl UpstreamTransport for HttpUpstream {
    async fn send(&self, request: UpstreamRequest) -> Result<UpstreamResponse, UpstreamError> {
        let mut builder = self.client.post(&request.url);
        for (name, value) in &request.headers {
            builder = builder.header(name.as_str(), value.as_str());
        }

        let response = builder.body(request.body).send().await?;
        let status = response.status().as_u16();
        // Chunks are concatenated in arrival order.
        let bytes = response.bytes().await?;

        Ok(UpstreamResponse {
            status,
            body: String::from_utf8_lossy(&bytes).into_owned(),
        })
    }
}

fn user_agent() -> String {
    format!(
        "portfolio-lambda-proxy/{version}",
        version = env!("CARGO_PKG_VERSION")
    )
}
