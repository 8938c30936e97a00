//! Per-bridge request rewriting.
//!
//! [`transform`] turns a [`LogicalRequest`] into the concrete request a
//! bridge needs, and tells the dispatcher how to read the answer. The
//! rules, in order:
//!
//! 1. A cache-busting parameter goes on the target URL before any relay
//!    wrapping, so no cache between us and the API can replay a response.
//! 2. Direct and header-relay POSTs use a "simple" content type (plain text
//!    or form encoding) so no preflight is triggered.
//! 3. Relays get the percent-encoded target appended to their prefix.
//! 4. GET tunnels carry a POST body in the `payload` query parameter.
//! 5. Raw passthrough relays refuse POST outright.

use rand::Rng;
use rand::distributions::Alphanumeric;
use serde::Deserialize;
use std::collections::BTreeMap;
use url::Url;
use url::form_urlencoded;
use wifigate_core::{ApiResponse, Bridge, BridgeStyle, FailureReason, HttpMethod, LogicalRequest, PostEncoding};

/// Query parameter carrying the cache-busting value.
pub const CACHE_BUST_PARAM: &str = "_cb";

/// Query parameter carrying a tunnelled POST body.
pub const TUNNEL_PAYLOAD_PARAM: &str = "payload";

const CACHE_BUST_SUFFIX_LEN: usize = 8;

const PLAIN_TEXT: &str = "text/plain;charset=UTF-8";
const FORM_URLENCODED: &str = "application/x-www-form-urlencoded";
const JSON: &str = "application/json";

// ============================================================================
// Outbound Request
// ============================================================================

/// How to read the response of an outbound request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResponseUnwrap {
    /// Use the response as-is.
    None,
    /// The relay wraps the upstream response in a JSON envelope.
    JsonEnvelope,
}

/// A request ready to hand to the transport.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OutboundRequest {
    /// Final URL, relay prefix included.
    pub url: String,
    /// Method actually sent.
    pub method: HttpMethod,
    /// Headers actually sent (lower-cased names).
    pub headers: BTreeMap<String, String>,
    /// Body actually sent.
    pub body: Option<String>,
    /// Response post-processing rule.
    pub unwrap: ResponseUnwrap,
}

// ============================================================================
// Transform
// ============================================================================

/// Rewrites `request` for `bridge`.
///
/// Fails with [`FailureReason::InvalidRequest`] when the target URL cannot be
/// parsed or the bridge cannot carry the method.
pub fn transform(
    request: &LogicalRequest,
    bridge: &Bridge,
    encoding: PostEncoding,
) -> Result<OutboundRequest, FailureReason> {
    let mut target = Url::parse(&request.target_url).map_err(|e| {
        FailureReason::InvalidRequest(format!("bad target URL {:?}: {e}", request.target_url))
    })?;
    append_cache_buster(&mut target);

    match bridge.style {
        BridgeStyle::Direct => Ok(simple_request(target.to_string(), request, encoding)),
        BridgeStyle::HeaderRelay => Ok(simple_request(
            wrap(&bridge.relay_prefix, &target),
            request,
            encoding,
        )),
        BridgeStyle::GetTunnel => {
            if request.method == HttpMethod::Post {
                if let Some(body) = &request.body {
                    target
                        .query_pairs_mut()
                        .append_pair(TUNNEL_PAYLOAD_PARAM, body);
                }
            }
            Ok(relay_get(wrap(&bridge.relay_prefix, &target), ResponseUnwrap::JsonEnvelope))
        }
        BridgeStyle::RawPassthrough => {
            if request.method == HttpMethod::Post {
                return Err(FailureReason::InvalidRequest(format!(
                    "{} cannot carry a POST body",
                    bridge.name
                )));
            }
            Ok(relay_get(wrap(&bridge.relay_prefix, &target), ResponseUnwrap::None))
        }
    }
}

/// Appends `_cb=<millis>-<random>` to the URL.
pub fn append_cache_buster(url: &mut Url) {
    let suffix: String = rand::thread_rng()
        .sample_iter(&Alphanumeric)
        .take(CACHE_BUST_SUFFIX_LEN)
        .map(char::from)
        .collect();
    let value = format!("{}-{suffix}", chrono::Utc::now().timestamp_millis());
    url.query_pairs_mut().append_pair(CACHE_BUST_PARAM, &value);
}

fn wrap(prefix: &str, target: &Url) -> String {
    let encoded: String = form_urlencoded::byte_serialize(target.as_str().as_bytes()).collect();
    format!("{prefix}{encoded}")
}

/// Direct and header-relay requests: method, headers and body carried,
/// content type downgraded to one that needs no preflight.
fn simple_request(url: String, request: &LogicalRequest, encoding: PostEncoding) -> OutboundRequest {
    let mut headers = request.headers.clone();
    headers
        .entry("accept".to_string())
        .or_insert_with(|| JSON.to_string());

    let body = match request.method {
        HttpMethod::Get => None,
        HttpMethod::Post => {
            headers.remove("content-type");
            request.body.as_ref().map(|body| match encoding {
                PostEncoding::PlainText => {
                    headers.insert("content-type".to_string(), PLAIN_TEXT.to_string());
                    body.clone()
                }
                PostEncoding::FormUrlEncoded => {
                    headers.insert("content-type".to_string(), FORM_URLENCODED.to_string());
                    form_encode(body)
                }
            })
        }
    };

    OutboundRequest {
        url,
        method: request.method,
        headers,
        body,
        unwrap: ResponseUnwrap::None,
    }
}

/// GET-only relays: no body, and only headers the relay would not strip.
fn relay_get(url: String, unwrap: ResponseUnwrap) -> OutboundRequest {
    let mut headers = BTreeMap::new();
    headers.insert("accept".to_string(), JSON.to_string());

    OutboundRequest {
        url,
        method: HttpMethod::Get,
        headers,
        body: None,
        unwrap,
    }
}

/// Flattens a JSON object body into form fields. Non-object bodies travel
/// whole in a single `payload` field.
fn form_encode(body: &str) -> String {
    let mut form = form_urlencoded::Serializer::new(String::new());

    match serde_json::from_str::<serde_json::Value>(body) {
        Ok(serde_json::Value::Object(fields)) => {
            for (key, value) in &fields {
                let text = match value {
                    serde_json::Value::String(s) => s.clone(),
                    serde_json::Value::Null => String::new(),
                    other => other.to_string(),
                };
                form.append_pair(key, &text);
            }
        }
        _ => {
            form.append_pair(TUNNEL_PAYLOAD_PARAM, body);
        }
    }

    form.finish()
}

// ============================================================================
// Envelope Unwrapping
// ============================================================================

#[derive(Debug, Deserialize)]
struct Envelope {
    contents: Option<String>,
    #[serde(default)]
    status: Option<EnvelopeStatus>,
}

#[derive(Debug, Deserialize)]
struct EnvelopeStatus {
    #[serde(default)]
    http_code: Option<u16>,
}

/// Replaces a tunnel relay's JSON envelope with the response it wraps.
///
/// The result carries the inner body, the inner status (200 if absent), and
/// a JSON content type.
pub fn unwrap_envelope(relay: &ApiResponse) -> Result<ApiResponse, FailureReason> {
    let envelope: Envelope = serde_json::from_str(&relay.body)
        .map_err(|e| FailureReason::NetworkError(format!("unreadable relay envelope: {e}")))?;

    let contents = envelope.contents.ok_or_else(|| {
        FailureReason::NetworkError("relay envelope carries no contents".to_string())
    })?;
    let status = envelope
        .status
        .and_then(|s| s.http_code)
        .unwrap_or(200);

    Ok(ApiResponse::json_body(status, contents))
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    const TARGET: &str = "https://api.example.net/api/v1/token/";

    fn query_pairs(url: &str) -> Vec<(String, String)> {
        Url::parse(url)
            .unwrap()
            .query_pairs()
            .map(|(k, v)| (k.into_owned(), v.into_owned()))
            .collect()
    }

    fn inner_target(relayed: &str, param: &str) -> String {
        query_pairs(relayed)
            .into_iter()
            .find(|(k, _)| k == param)
            .map(|(_, v)| v)
            .unwrap()
    }

    fn login() -> LogicalRequest {
        LogicalRequest::post_json(TARGET, &serde_json::json!({"username": "0821234567", "password": "secret"}))
            .unwrap()
    }

    #[test]
    fn test_direct_post_plain_text() {
        let out = transform(&login(), &Bridge::direct(), PostEncoding::PlainText).unwrap();

        assert!(out.url.starts_with(TARGET));
        assert!(query_pairs(&out.url).iter().any(|(k, _)| k == CACHE_BUST_PARAM));
        assert_eq!(out.method, HttpMethod::Post);
        assert_eq!(out.headers.get("content-type").map(String::as_str), Some(PLAIN_TEXT));
        assert_eq!(out.body, login().body);
        assert_eq!(out.unwrap, ResponseUnwrap::None);
    }

    #[test]
    fn test_direct_post_form_encoded() {
        let out = transform(&login(), &Bridge::direct(), PostEncoding::FormUrlEncoded).unwrap();

        assert_eq!(
            out.headers.get("content-type").map(String::as_str),
            Some(FORM_URLENCODED)
        );
        assert_eq!(out.body.as_deref(), Some("password=secret&username=0821234567"));
    }

    #[test]
    fn test_direct_get_adds_accept_and_keeps_auth() {
        let request = LogicalRequest::get("https://api.example.net/usage/").with_bearer("tok");
        let out = transform(&request, &Bridge::direct(), PostEncoding::PlainText).unwrap();

        assert_eq!(out.headers.get("accept").map(String::as_str), Some(JSON));
        assert_eq!(
            out.headers.get("authorization").map(String::as_str),
            Some("Bearer tok")
        );
        assert!(out.body.is_none());
    }

    #[test]
    fn test_header_relay_wraps_busted_target() {
        let bridge = Bridge::header_relay("CorsProxy", "https://corsproxy.io/?url=");
        let out = transform(&login(), &bridge, PostEncoding::PlainText).unwrap();

        assert!(out.url.starts_with("https://corsproxy.io/?url=https%3A%2F%2F"));
        let inner = inner_target(&out.url, "url");
        assert!(inner.starts_with(TARGET));
        assert!(query_pairs(&inner).iter().any(|(k, _)| k == CACHE_BUST_PARAM));
        assert_eq!(out.method, HttpMethod::Post);
        assert!(out.body.is_some());
    }

    #[test]
    fn test_get_tunnel_downgrades_post() {
        let bridge = Bridge::get_tunnel("AllOrigins", "https://api.allorigins.win/get?url=");
        let out = transform(&login(), &bridge, PostEncoding::PlainText).unwrap();

        assert_eq!(out.method, HttpMethod::Get);
        assert!(out.body.is_none());
        assert_eq!(out.unwrap, ResponseUnwrap::JsonEnvelope);

        let inner = inner_target(&out.url, "url");
        let payload = inner_target(&inner, TUNNEL_PAYLOAD_PARAM);
        assert_eq!(Some(payload), login().body);
    }

    #[test]
    fn test_raw_passthrough_rejects_post() {
        let bridge = Bridge::raw_passthrough("Raw", "https://relay.example/raw?url=");
        let err = transform(&login(), &bridge, PostEncoding::PlainText).unwrap_err();
        assert!(matches!(err, FailureReason::InvalidRequest(_)));

        let get = LogicalRequest::get(TARGET);
        let out = transform(&get, &bridge, PostEncoding::PlainText).unwrap();
        assert_eq!(out.unwrap, ResponseUnwrap::None);
    }

    #[test]
    fn test_invalid_target_is_terminal() {
        let request = LogicalRequest::get("not a url");
        let err = transform(&request, &Bridge::direct(), PostEncoding::PlainText).unwrap_err();
        assert!(err.is_terminal());
    }

    #[test]
    fn test_cache_buster_differs_between_calls() {
        let request = LogicalRequest::get(TARGET);
        let a = transform(&request, &Bridge::direct(), PostEncoding::PlainText).unwrap();
        let b = transform(&request, &Bridge::direct(), PostEncoding::PlainText).unwrap();
        assert_ne!(a.url, b.url);
    }

    #[test]
    fn test_unwrap_envelope() {
        let relay = ApiResponse::json_body(
            200,
            r#"{"contents": "{\"token\":\"abc\"}", "status": {"http_code": 200}}"#,
        );
        let inner = unwrap_envelope(&relay).unwrap();

        assert_eq!(inner.status, 200);
        assert!(inner.is_json());
        assert_eq!(inner.body, r#"{"token":"abc"}"#);
    }

    #[test]
    fn test_unwrap_envelope_defaults_and_errors() {
        let no_status = ApiResponse::new(200, r#"{"contents": "{}"}"#);
        assert_eq!(unwrap_envelope(&no_status).unwrap().status, 200);

        let inner_404 = ApiResponse::new(200, r#"{"contents": "{}", "status": {"http_code": 404}}"#);
        assert_eq!(unwrap_envelope(&inner_404).unwrap().status, 404);

        let empty = ApiResponse::new(200, r#"{"contents": null}"#);
        assert!(matches!(unwrap_envelope(&empty), Err(FailureReason::NetworkError(_))));

        let html = ApiResponse::new(200, "<html></html>");
        assert!(matches!(unwrap_envelope(&html), Err(FailureReason::NetworkError(_))));
    }
}
