//! HTTP transport.
//!
//! The dispatcher talks to the network through [`Transport`] so the bridge
//! logic can be exercised without sockets. [`HttpClient`] is the real
//! implementation on top of reqwest.

use async_trait::async_trait;
use reqwest::header::{HeaderMap, HeaderName, HeaderValue};
use reqwest::redirect::Policy;
use reqwest::{Client, Method};
use std::collections::BTreeMap;
use std::time::Duration;
use tracing::{debug, instrument};
use wifigate_core::{ApiResponse, HttpMethod};

use crate::error::TransportError;
use crate::transform::OutboundRequest;

/// Safety-net timeout on the client itself. Per-bridge deadlines are
/// shorter and enforced by the dispatcher.
const CLIENT_TIMEOUT_SECS: u64 = 60;

/// User agent string for wifigate.
const USER_AGENT: &str = concat!("wifigate/", env!("CARGO_PKG_VERSION"));

// ============================================================================
// Transport Trait
// ============================================================================

/// Sends one outbound request and reads the whole response.
#[async_trait]
pub trait Transport: Send + Sync {
    /// Sends `request`. Any HTTP status is a successful send.
    async fn send(&self, request: &OutboundRequest) -> Result<ApiResponse, TransportError>;
}

// ============================================================================
// HTTP Client
// ============================================================================

/// reqwest-backed transport.
#[derive(Debug, Clone)]
pub struct HttpClient {
    inner: Client,
}

impl HttpClient {
    /// Creates a new HTTP client with default settings.
    pub fn new() -> Result<Self, TransportError> {
        Self::with_timeout(Duration::from_secs(CLIENT_TIMEOUT_SECS))
    }

    /// Creates a new HTTP client with a custom overall timeout.
    ///
    /// Redirects are returned as-is: a gateway bouncing the request to its
    /// login page must be seen as interception, not followed.
    pub fn with_timeout(timeout: Duration) -> Result<Self, TransportError> {
        let client = Client::builder()
            .timeout(timeout)
            .user_agent(USER_AGENT)
            .redirect(Policy::none())
            .build()?;

        Ok(Self { inner: client })
    }
}

fn to_header_map(headers: &BTreeMap<String, String>) -> Result<HeaderMap, TransportError> {
    let mut map = HeaderMap::with_capacity(headers.len());
    for (name, value) in headers {
        let name = HeaderName::from_bytes(name.as_bytes())
            .map_err(|e| TransportError::InvalidHeader(format!("{name}: {e}")))?;
        let value = HeaderValue::from_str(value)
            .map_err(|e| TransportError::InvalidHeader(format!("{name}: {e}")))?;
        map.insert(name, value);
    }
    Ok(map)
}

fn from_header_map(headers: &HeaderMap) -> BTreeMap<String, String> {
    headers
        .iter()
        .map(|(name, value)| {
            (
                name.as_str().to_string(),
                String::from_utf8_lossy(value.as_bytes()).into_owned(),
            )
        })
        .collect()
}

#[async_trait]
impl Transport for HttpClient {
    #[instrument(skip(self, request), fields(method = %request.method, url = %request.url))]
    async fn send(&self, request: &OutboundRequest) -> Result<ApiResponse, TransportError> {
        let url = reqwest::Url::parse(&request.url)
            .map_err(|e| TransportError::InvalidUrl(format!("{}: {e}", request.url)))?;
        let method = match request.method {
            HttpMethod::Get => Method::GET,
            HttpMethod::Post => Method::POST,
        };

        let mut builder = self
            .inner
            .request(method, url)
            .headers(to_header_map(&request.headers)?);
        if let Some(body) = &request.body {
            builder = builder.body(body.clone());
        }

        debug!("Sending request");
        let response = builder.send().await?;
        let status = response.status().as_u16();
        let headers = from_header_map(response.headers());
        let body = response.text().await?;
        debug!(status, bytes = body.len(), "Response received");

        Ok(ApiResponse {
            status,
            headers,
            body,
        })
    }
}

// ============================================================================
// Tests
// ============================================================================
