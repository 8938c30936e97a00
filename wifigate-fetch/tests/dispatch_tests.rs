//! End-to-end dispatch tests against a local mock server.
//!
//! One `MockServer` plays both the API and the relays: relay bridges point
//! at paths on the same server, so every hop goes over real HTTP.

use std::time::Duration;
use wiremock::matchers::{method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

use wifigate_core::{Bridge, DispatchMode, FailureReason, LogicalRequest};
use wifigate_fetch::{BridgeRegistry, DispatchError, DispatchSettings, Dispatcher};

const PORTAL_PAGE: &str = r#"<html><head><title>Hotspot login</title></head>
<body><form name="login" action="http://10.0.0.1/login" method="post"></form></body></html>"#;

fn settings(mode: DispatchMode) -> DispatchSettings {
    DispatchSettings::default()
        .with_mode(mode)
        .with_timeouts(Duration::from_secs(2), Duration::from_secs(2))
}

fn dispatcher(bridges: Vec<Bridge>, mode: DispatchMode) -> Dispatcher {
    Dispatcher::builder()
        .registry(BridgeRegistry::try_new(bridges).unwrap())
        .settings(settings(mode))
        .build()
        .unwrap()
}

fn relay(server: &MockServer) -> Bridge {
    Bridge::header_relay("LocalRelay", format!("{}/relay?url=", server.uri()))
}

fn tunnel(server: &MockServer) -> Bridge {
    Bridge::get_tunnel("LocalTunnel", format!("{}/get?url=", server.uri()))
}

fn portal() -> ResponseTemplate {
    ResponseTemplate::new(200).set_body_raw(PORTAL_PAGE, "text/html")
}

#[tokio::test]
async fn test_direct_success() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/v1/usage/"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({"checks": []})))
        .expect(1)
        .mount(&server)
        .await;

    let d = dispatcher(vec![Bridge::direct()], DispatchMode::Race);
    let outcome = d
        .dispatch(&LogicalRequest::get(format!("{}/api/v1/usage/", server.uri())))
        .await;

    assert!(outcome.is_success());
    assert_eq!(outcome.winner.as_deref(), Some("Direct"));
    assert!(outcome.response().unwrap().is_json());
}

#[tokio::test]
async fn test_interception_falls_through_to_relay() {
    let server = MockServer::start().await;
    Mock::given(path("/api/v1/token/"))
        .respond_with(portal())
        .mount(&server)
        .await;
    Mock::given(path("/relay"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(serde_json::json!({"token": "t0k"}))
                .set_delay(Duration::from_millis(200)),
        )
        .mount(&server)
        .await;

    for mode in [DispatchMode::Race, DispatchMode::Sequential] {
        let d = dispatcher(vec![Bridge::direct(), relay(&server)], mode);
        let request = LogicalRequest::post(
            format!("{}/api/v1/token/", server.uri()),
            Some(r#"{"username":"a","password":"b"}"#.to_string()),
        );
        let outcome = d.dispatch(&request).await;

        assert_eq!(outcome.winner.as_deref(), Some("LocalRelay"), "mode {mode}");
        assert_eq!(outcome.log.len(), 1, "mode {mode}");
        assert_eq!(outcome.log[0].bridge, "Direct");
        assert_eq!(outcome.log[0].reason, FailureReason::Interception);
    }
}

#[tokio::test]
async fn test_relay_receives_encoded_target_and_plain_text_body() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/relay"))
        .respond_with(ResponseTemplate::new(201).set_body_json(serde_json::json!({"id": 1})))
        .mount(&server)
        .await;

    let d = dispatcher(vec![relay(&server)], DispatchMode::Race);
    let target = "https://api.hotspot.example/api/v1/register/";
    let outcome = d
        .dispatch(&LogicalRequest::post(target, Some(r#"{"plan":"free"}"#.to_string())))
        .await;
    assert!(outcome.is_success());

    let received = server.received_requests().await.unwrap();
    assert_eq!(received.len(), 1);

    let request = &received[0];
    let forwarded = request
        .url
        .query_pairs()
        .find(|(k, _)| k == "url")
        .map(|(_, v)| v.into_owned())
        .unwrap();
    assert!(forwarded.starts_with(target));
    assert!(forwarded.contains("_cb="));
    assert_eq!(
        request.headers.get("content-type").unwrap().to_str().unwrap(),
        "text/plain;charset=UTF-8"
    );
    assert_eq!(String::from_utf8_lossy(&request.body), r#"{"plan":"free"}"#);
}

#[tokio::test]
async fn test_origin_client_error_wins() {
    let server = MockServer::start().await;
    Mock::given(path("/api/v1/token/"))
        .respond_with(
            ResponseTemplate::new(400)
                .set_body_json(serde_json::json!({"non_field_errors": ["Unable to log in."]})),
        )
        .mount(&server)
        .await;

    let d = dispatcher(vec![Bridge::direct()], DispatchMode::Sequential);
    let outcome = d
        .dispatch(&LogicalRequest::post(
            format!("{}/api/v1/token/", server.uri()),
            Some("{}".to_string()),
        ))
        .await;

    assert_eq!(outcome.response().map(|r| r.status), Some(400));
    assert!(outcome.log.is_empty());
}

#[tokio::test]
async fn test_tunnel_envelope_roundtrip() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/get"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "contents": "{\"checks\":[{\"value\":100,\"result\":40}]}",
            "status": {"http_code": 200}
        })))
        .mount(&server)
        .await;

    let d = dispatcher(vec![tunnel(&server)], DispatchMode::Race);
    let outcome = d
        .dispatch(&LogicalRequest::get("https://api.hotspot.example/api/v1/usage/"))
        .await;

    let response = outcome.response().unwrap();
    assert_eq!(response.status, 200);
    let body: serde_json::Value = response.json().unwrap();
    assert_eq!(body["checks"][0]["result"], 40);
}

#[tokio::test]
async fn test_tunnel_carries_post_body_as_payload() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/get"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "contents": "{}",
            "status": {"http_code": 200}
        })))
        .mount(&server)
        .await;

    let d = dispatcher(vec![tunnel(&server)], DispatchMode::Race);
    d.dispatch(&LogicalRequest::post(
        "https://api.hotspot.example/api/v1/phone/token/",
        Some(r#"{"phone":"+15550100"}"#.to_string()),
    ))
    .await;

    let received = server.received_requests().await.unwrap();
    let forwarded = received[0]
        .url
        .query_pairs()
        .find(|(k, _)| k == "url")
        .map(|(_, v)| v.into_owned())
        .unwrap();
    let inner = url::Url::parse(&forwarded).unwrap();
    let payload = inner
        .query_pairs()
        .find(|(k, _)| k == "payload")
        .map(|(_, v)| v.into_owned());
    assert_eq!(payload.as_deref(), Some(r#"{"phone":"+15550100"}"#));
    assert!(received[0].body.is_empty());
}

#[tokio::test]
async fn test_slow_bridge_times_out() {
    let server = MockServer::start().await;
    Mock::given(path("/api/v1/usage/"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(serde_json::json!({}))
                .set_delay(Duration::from_secs(3)),
        )
        .mount(&server)
        .await;

    let deadline = Duration::from_millis(150);
    let d = dispatcher(vec![Bridge::direct().with_timeout(deadline)], DispatchMode::Race);
    let outcome = d
        .dispatch(&LogicalRequest::get(format!("{}/api/v1/usage/", server.uri())))
        .await;

    assert!(outcome.duration < Duration::from_secs(2));
    assert_eq!(outcome.log.len(), 1);
    assert_eq!(outcome.log[0].reason, FailureReason::Timeout(deadline));
    assert!(matches!(outcome.result, Err(DispatchError::AllBridgesFailed { .. })));
}

#[tokio::test]
async fn test_blocked_relay_is_a_failure() {
    let server = MockServer::start().await;
    Mock::given(path("/relay"))
        .respond_with(ResponseTemplate::new(403).set_body_string("Forbidden"))
        .mount(&server)
        .await;

    let d = dispatcher(vec![relay(&server)], DispatchMode::Race);
    let outcome = d
        .dispatch(&LogicalRequest::get("https://api.hotspot.example/api/v1/usage/"))
        .await;

    assert_eq!(outcome.log[0].reason, FailureReason::HttpError(403));
    assert!(!outcome.is_success());
}

#[tokio::test]
async fn test_relayed_json_forbidden_is_the_api_answer() {
    let server = MockServer::start().await;
    Mock::given(path("/relay"))
        .respond_with(
            ResponseTemplate::new(403)
                .set_body_json(serde_json::json!({"detail": "Phone number not verified."})),
        )
        .mount(&server)
        .await;

    let d = dispatcher(vec![relay(&server)], DispatchMode::Race);
    let request =
        LogicalRequest::get("https://api.hotspot.example/api/v1/usage/").with_bearer("t0k");
    let outcome = d.dispatch(&request).await;

    assert_eq!(outcome.winner.as_deref(), Some("LocalRelay"));
    assert_eq!(outcome.response().map(|r| r.status), Some(403));
    assert!(outcome.log.is_empty());
}

#[tokio::test]
async fn test_portal_redirect_is_not_followed() {
    let server = MockServer::start().await;
    Mock::given(path("/api/v1/usage/"))
        .respond_with(
            ResponseTemplate::new(302)
                .insert_header("location", format!("{}/login.html", server.uri()).as_str())
                .set_body_raw("<html>redirecting</html>", "text/html"),
        )
        .mount(&server)
        .await;
    Mock::given(path("/login.html"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({})))
        .expect(0)
        .mount(&server)
        .await;

    let d = dispatcher(vec![Bridge::direct()], DispatchMode::Race);
    let outcome = d
        .dispatch(&LogicalRequest::get(format!("{}/api/v1/usage/", server.uri())))
        .await;

    assert!(!outcome.is_success());
    assert_eq!(outcome.log[0].reason, FailureReason::Interception);
}

#[tokio::test]
async fn test_every_attempt_gets_a_distinct_url() {
    let server = MockServer::start().await;
    Mock::given(path("/api/v1/usage/"))
        .and(query_param("x", "1"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({})))
        .expect(2)
        .mount(&server)
        .await;

    let d = dispatcher(vec![Bridge::direct()], DispatchMode::Race);
    let request = LogicalRequest::get(format!("{}/api/v1/usage/?x=1", server.uri()));
    d.dispatch(&request).await;
    d.dispatch(&request).await;

    let received = server.received_requests().await.unwrap();
    assert_eq!(received.len(), 2);
    assert_ne!(received[0].url, received[1].url);
}

#[tokio::test]
async fn test_authorized_request_skips_header_stripping_relays() {
    let server = MockServer::start().await;
    Mock::given(path("/api/v1/usage/"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({})))
        .mount(&server)
        .await;

    let d = dispatcher(vec![Bridge::direct(), tunnel(&server)], DispatchMode::Race);
    let request = LogicalRequest::get(format!("{}/api/v1/usage/", server.uri())).with_bearer("abc");
    let outcome = d.dispatch(&request).await;

    assert!(outcome.is_success());
    assert_eq!(outcome.skipped.len(), 1);
    assert_eq!(outcome.skipped[0].bridge, "LocalTunnel");
    assert!(outcome.log.iter().all(|f| f.bridge != "LocalTunnel"));

    let received = server.received_requests().await.unwrap();
    assert!(received.iter().all(|r| r.url.path() != "/get"));
    assert_eq!(
        received[0].headers.get("authorization").unwrap().to_str().unwrap(),
        "Bearer abc"
    );
}
