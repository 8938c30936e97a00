//! Logical requests and completed responses.

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

use crate::error::CoreError;

// ============================================================================
// HTTP Method
// ============================================================================

/// The methods the hotspot API is called with.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum HttpMethod {
    /// GET
    Get,
    /// POST
    Post,
}

impl HttpMethod {
    /// Returns the method name as sent on the wire.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Get => "GET",
            Self::Post => "POST",
        }
    }
}

impl fmt::Display for HttpMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// ============================================================================
// Logical Request
// ============================================================================

/// What the caller wants to send, before any bridge rewrites it.
///
/// Header names are stored lower-cased.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LogicalRequest {
    /// Absolute URL of the API endpoint.
    pub target_url: String,
    /// Request method.
    pub method: HttpMethod,
    /// Request headers.
    pub headers: BTreeMap<String, String>,
    /// Pre-serialized body.
    pub body: Option<String>,
}

impl LogicalRequest {
    /// Creates a GET request.
    pub fn get(target_url: impl Into<String>) -> Self {
        Self {
            target_url: target_url.into(),
            method: HttpMethod::Get,
            headers: BTreeMap::new(),
            body: None,
        }
    }

    /// Creates a POST request with an optional pre-serialized body.
    pub fn post(target_url: impl Into<String>, body: Option<String>) -> Self {
        Self {
            target_url: target_url.into(),
            method: HttpMethod::Post,
            headers: BTreeMap::new(),
            body,
        }
    }

    /// Creates a POST request carrying `payload` serialized as JSON.
    pub fn post_json<T: Serialize + ?Sized>(
        target_url: impl Into<String>,
        payload: &T,
    ) -> Result<Self, CoreError> {
        let body = serde_json::to_string(payload)?;
        Ok(Self::post(target_url, Some(body)).with_header("content-type", "application/json"))
    }

    /// Adds a header.
    #[must_use]
    pub fn with_header(mut self, name: impl AsRef<str>, value: impl Into<String>) -> Self {
        self.headers
            .insert(name.as_ref().to_ascii_lowercase(), value.into());
        self
    }

    /// Adds an `Authorization: Bearer` header.
    #[must_use]
    pub fn with_bearer(self, token: &str) -> Self {
        self.with_header("authorization", format!("Bearer {token}"))
    }

    /// Looks up a header by case-insensitive name.
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .get(&name.to_ascii_lowercase())
            .map(String::as_str)
    }

    /// Returns true if the request carries credentials that only survive on
    /// header-forwarding bridges.
    pub fn requires_header_forwarding(&self) -> bool {
        self.headers.contains_key("authorization")
    }
}

// ============================================================================
// API Response
// ============================================================================

/// A completed response, already unwrapped from any relay envelope.
///
/// Header names are stored lower-cased.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ApiResponse {
    /// HTTP status code.
    pub status: u16,
    /// Response headers.
    pub headers: BTreeMap<String, String>,
    /// Response body as text.
    pub body: String,
}

impl ApiResponse {
    /// Creates a response with no headers.
    pub fn new(status: u16, body: impl Into<String>) -> Self {
        Self {
            status,
            headers: BTreeMap::new(),
            body: body.into(),
        }
    }

    /// Creates a JSON response.
    pub fn json_body(status: u16, body: impl Into<String>) -> Self {
        Self::new(status, body).with_header("content-type", "application/json")
    }

    /// Adds a header.
    #[must_use]
    pub fn with_header(mut self, name: impl AsRef<str>, value: impl Into<String>) -> Self {
        self.headers
            .insert(name.as_ref().to_ascii_lowercase(), value.into());
        self
    }

    /// Looks up a header by case-insensitive name.
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .get(&name.to_ascii_lowercase())
            .map(String::as_str)
    }

    /// Returns the `Content-Type` header, if any.
    pub fn content_type(&self) -> Option<&str> {
        self.header("content-type")
    }

    /// Returns true if the content type is HTML.
    pub fn is_html(&self) -> bool {
        self.content_type()
            .is_some_and(|ct| ct.to_ascii_lowercase().contains("text/html"))
    }

    /// Returns true if the content type is JSON.
    pub fn is_json(&self) -> bool {
        self.content_type()
            .is_some_and(|ct| ct.to_ascii_lowercase().contains("json"))
    }

    /// Returns true for 2xx.
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }

    /// Returns true for 3xx.
    pub fn is_redirect(&self) -> bool {
        (300..400).contains(&self.status)
    }

    /// Returns true for 4xx.
    pub fn is_client_error(&self) -> bool {
        (400..500).contains(&self.status)
    }

    /// Parses the body as JSON.
    pub fn json<T: DeserializeOwned>(&self) -> Result<T, CoreError> {
        Ok(serde_json::from_str(&self.body)?)
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_post_json_sets_content_type() {
        let req = LogicalRequest::post_json(
            "https://api.example.net/token/",
            &serde_json::json!({ "username": "0821234567" }),
        )
        .unwrap();

        assert_eq!(req.method, HttpMethod::Post);
        assert_eq!(req.header("Content-Type"), Some("application/json"));
        assert_eq!(req.body.as_deref(), Some(r#"{"username":"0821234567"}"#));
    }

    #[test]
    fn test_bearer_requires_forwarding() {
        let plain = LogicalRequest::get("https://api.example.net/usage/");
        assert!(!plain.requires_header_forwarding());

        let authed = plain.with_bearer("abc");
        assert!(authed.requires_header_forwarding());
        assert_eq!(authed.header("authorization"), Some("Bearer abc"));
    }

    #[test]
    fn test_response_classification() {
        let html = ApiResponse::new(200, "").with_header("Content-Type", "text/html; charset=utf-8");
        assert!(html.is_html());
        assert!(!html.is_json());

        let json = ApiResponse::json_body(404, r#"{"detail":"Not found."}"#);
        assert!(json.is_json());
        assert!(json.is_client_error());
        assert!(!json.is_success());
    }

    #[test]
    fn test_response_json() {
        let resp = ApiResponse::json_body(200, r#"{"token":"abc"}"#);
        let value: serde_json::Value = resp.json().unwrap();
        assert_eq!(value["token"], "abc");

        let broken = ApiResponse::json_body(200, "<html>");
        assert!(broken.json::<serde_json::Value>().is_err());
    }
}
