//! Wire-level tests for the completion client
//!
//! What actually goes over HTTP: headers, camelCase body fields, and the
//! mapping from upstream failures onto the error taxonomy.

use clova_agent::{
    ClientConfig, CompletionClient, Error, FinishReason, Message, SUCCESS_STATUS_CODE,
};
use serde_json::json;
use wiremock::matchers::{header, header_exists, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn client_for(server_uri: &str) -> CompletionClient {
    CompletionClient::new(
        ClientConfig::new()
            .endpoint(format!("{server_uri}/v3/chat-completions/HCX-007"))
            .api_key("test-key"),
    )
    .unwrap()
}

fn success_envelope() -> serde_json::Value {
    json!({
        "status": {"code": SUCCESS_STATUS_CODE, "message": "OK"},
        "result": {
            "message": {"role": "assistant", "content": "Hello."},
            "finishReason": "stop",
            "created": 1724567890,
            "seed": 42,
            "usage": {"promptTokens": 10, "completionTokens": 4, "totalTokens": 14}
        }
    })
}

/// Test: every call carries the auth, content-type, and correlation headers
///
/// The mock only matches when all three are present, so a missing header
/// turns into a 404 and a failed send.
#[tokio::test]
async fn test_send_carries_expected_headers() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/v3/chat-completions/HCX-007"))
        .and(header("Authorization", "Bearer test-key"))
        .and(header("Content-Type", "application/json"))
        .and(header_exists("X-Request-Id"))
        .respond_with(ResponseTemplate::new(200).set_body_json(success_envelope()))
        .expect(1)
        .mount(&server)
        .await;

    let client = client_for(&server.uri());
    let request = client.build_request(vec![Message::user("hi")], None);
    let response = client.send(&request).await.unwrap();

    let result = response.into_result().unwrap();
    assert_eq!(result.finish_reason, FinishReason::Stop);
    assert_eq!(result.message.as_text(), Some("Hello."));
    assert_eq!(result.created, Some(1724567890));
    assert_eq!(result.seed, Some(42));
    assert_eq!(result.usage.unwrap().total_tokens, 14);
}

/// Test: the correlation id changes on every call
#[tokio::test]
async fn test_request_id_is_fresh_per_call() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(200).set_body_json(success_envelope()))
        .expect(2)
        .mount(&server)
        .await;

    let client = client_for(&server.uri());
    let request = client.build_request(vec![Message::user("hi")], None);
    client.send(&request).await.unwrap();
    client.send(&request).await.unwrap();

    let requests = server.received_requests().await.unwrap();
    let ids: Vec<String> = requests
        .iter()
        .map(|r| {
            r.headers
                .get("X-Request-Id")
                .and_then(|v| v.to_str().ok())
                .unwrap_or_default()
                .to_string()
        })
        .collect();
    assert_eq!(ids.len(), 2);
    assert_ne!(ids[0], ids[1]);
    // simple uuid form: 32 hex characters, no dashes
    assert_eq!(ids[0].len(), 32);
    assert!(!ids[0].contains('-'));
}

/// Test: the body is serialized with camelCase field names
#[tokio::test]
async fn test_request_body_field_names() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(200).set_body_json(success_envelope()))
        .mount(&server)
        .await;

    let client = client_for(&server.uri());
    let request = client.build_request(vec![Message::user("hi")], None);
    client.send(&request).await.unwrap();

    let requests = server.received_requests().await.unwrap();
    let body: serde_json::Value = serde_json::from_slice(&requests[0].body).unwrap();

    assert_eq!(body["messages"][0]["role"], "user");
    assert_eq!(body["messages"][0]["content"], "hi");
    assert_eq!(body["maxTokens"], 1000);
    assert_eq!(body["topP"], 0.8);
    assert_eq!(body["repetitionPenalty"], 1.2);
    assert_eq!(body["includeAiFilters"], true);
    // unset optionals are omitted, not serialized as null
    assert!(body.get("topK").is_none());
    assert!(body.get("seed").is_none());
    assert!(body.get("stop").is_none());
    // no snake_case leakage
    assert!(body.get("max_tokens").is_none());
    assert!(body.get("include_ai_filters").is_none());
}

/// Test: non-2xx becomes UpstreamHttp with the status and body preserved
#[tokio::test]
async fn test_http_failure_maps_to_upstream_http() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(429).set_body_string("Too Many Requests"))
        .mount(&server)
        .await;

    let client = client_for(&server.uri());
    let request = client.build_request(vec![Message::user("hi")], None);
    let err = client.send(&request).await.unwrap_err();

    match err {
        Error::UpstreamHttp { status, body } => {
            assert_eq!(status, 429);
            assert_eq!(body, "Too Many Requests");
        }
        other => panic!("expected UpstreamHttp, got {other:?}"),
    }
}

/// Test: a 2xx envelope with an error status becomes UpstreamApi
#[tokio::test]
async fn test_envelope_error_maps_to_upstream_api() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "status": {"code": "42901", "message": "Requests throttled"}
        })))
        .mount(&server)
        .await;

    let client = client_for(&server.uri());
    let request = client.build_request(vec![Message::user("hi")], None);
    let err = client.send(&request).await.unwrap_err();

    match err {
        Error::UpstreamApi { code, message } => {
            assert_eq!(code, "42901");
            assert_eq!(message, "Requests throttled");
        }
        other => panic!("expected UpstreamApi, got {other:?}"),
    }
}

/// Test: a success status without a result is rejected
#[tokio::test]
async fn test_missing_result_is_rejected() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "status": {"code": SUCCESS_STATUS_CODE, "message": "OK"}
        })))
        .mount(&server)
        .await;

    let client = client_for(&server.uri());
    let request = client.build_request(vec![Message::user("hi")], None);
    let err = client.send(&request).await.unwrap_err();

    match err {
        Error::UpstreamApi { message, .. } => {
            assert!(message.contains("missing its result"));
        }
        other => panic!("expected UpstreamApi, got {other:?}"),
    }
}

/// Test: a tool_calls finish with no calls is rejected as incoherent
#[tokio::test]
async fn test_incoherent_finish_reason_is_rejected() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "status": {"code": SUCCESS_STATUS_CODE, "message": "OK"},
            "result": {
                "message": {"role": "assistant", "content": ""},
                "finishReason": "tool_calls"
            }
        })))
        .mount(&server)
        .await;

    let client = client_for(&server.uri());
    let request = client.build_request(vec![Message::user("hi")], None);
    let err = client.send(&request).await.unwrap_err();

    match err {
        Error::UpstreamApi { message, .. } => {
            assert!(message.contains("tool_calls"));
        }
        other => panic!("expected UpstreamApi, got {other:?}"),
    }
}

/// Test: a stop finish that still carries calls is rejected too
#[tokio::test]
async fn test_stop_finish_with_calls_is_rejected() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "status": {"code": SUCCESS_STATUS_CODE, "message": "OK"},
            "result": {
                "message": {
                    "role": "assistant",
                    "content": "",
                    "toolCalls": [{
                        "id": "call-1",
                        "type": "function",
                        "function": {"name": "search_news", "arguments": {"query": "AI"}}
                    }]
                },
                "finishReason": "stop"
            }
        })))
        .mount(&server)
        .await;

    let client = client_for(&server.uri());
    let request = client.build_request(vec![Message::user("hi")], None);
    let err = client.send(&request).await.unwrap_err();

    assert!(matches!(err, Error::UpstreamApi { .. }));
}

/// Test: an unparseable 2xx body is a serialization error, not a panic
#[tokio::test]
async fn test_unparseable_body_maps_to_json_error() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(200).set_body_string("<html>gateway</html>"))
        .mount(&server)
        .await;

    let client = client_for(&server.uri());
    let request = client.build_request(vec![Message::user("hi")], None);
    let err = client.send(&request).await.unwrap_err();

    assert!(matches!(err, Error::Json(_)));
}

/// Test: connection failure maps to Transport
#[tokio::test]
async fn test_connection_failure_maps_to_transport() {
    // nothing listens on this port
    let client = CompletionClient::new(
        ClientConfig::new()
            .endpoint("http://127.0.0.1:1/v3/chat-completions/HCX-007")
            .api_key("test-key"),
    )
    .unwrap();
    let request = client.build_request(vec![Message::user("hi")], None);
    let err = client.send(&request).await.unwrap_err();

    assert!(matches!(err, Error::Transport(_)));
}
