//! Wire-level tests for vision requests
//!
//! Image-bearing conversations use a second sampling profile and a
//! multi-part message body. These tests pin down the exact body shape the
//! upstream expects: a `content` array with tagged parts, an `imageUrl`
//! object for remote images, and a `dataUri` object for inline payloads.

use clova_agent::{ClientConfig, CompletionClient, ContentPart, Message, SUCCESS_STATUS_CODE};
use serde_json::json;
use wiremock::matchers::method;
use wiremock::{Mock, MockServer, ResponseTemplate};

fn client_for(server_uri: &str) -> CompletionClient {
    CompletionClient::new(
        ClientConfig::new()
            .endpoint(format!("{server_uri}/v3/chat-completions/HCX-005-Vision"))
            .api_key("test-key"),
    )
    .unwrap()
}

fn success_envelope() -> serde_json::Value {
    json!({
        "status": {"code": SUCCESS_STATUS_CODE, "message": "OK"},
        "result": {
            "message": {"role": "assistant", "content": "A cat on a desk."},
            "finishReason": "stop"
        }
    })
}

#[tokio::test]
async fn test_vision_profile_over_the_wire() {
    // GIVEN: a conversation carrying a remote image part
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(200).set_body_json(success_envelope()))
        .expect(1)
        .mount(&server)
        .await;

    let client = client_for(&server.uri());
    let message = Message::user_with_parts(vec![
        ContentPart::text("What is in this picture?"),
        ContentPart::image_url("https://example.com/cat.jpg"),
    ]);

    // WHEN: the vision request is sent
    let request = client.build_vision_request(vec![message]);
    client.send(&request).await.unwrap();

    // THEN: the body carries the vision sampling profile and tagged parts
    let requests = server.received_requests().await.unwrap();
    let body: serde_json::Value = serde_json::from_slice(&requests[0].body).unwrap();

    assert_eq!(body["temperature"], 0.5);
    assert_eq!(body["topP"], 0.8);
    assert_eq!(body["topK"], 0);
    assert_eq!(body["maxTokens"], 1000);
    assert_eq!(body["repetitionPenalty"], 1.1);
    assert_eq!(body["stop"], json!([]));
    assert!(body.get("tools").is_none());
    assert!(body.get("toolChoice").is_none());
    assert!(body.get("includeAiFilters").is_none());

    let content = &body["messages"][0]["content"];
    assert!(content.is_array());
    assert_eq!(content[0]["type"], "text");
    assert_eq!(content[0]["text"], "What is in this picture?");
    assert_eq!(content[1]["type"], "image_url");
    assert_eq!(content[1]["imageUrl"]["url"], "https://example.com/cat.jpg");
    assert!(content[1].get("dataUri").is_none());
}

#[tokio::test]
async fn test_inline_image_serializes_as_data_uri() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(200).set_body_json(success_envelope()))
        .mount(&server)
        .await;

    let client = client_for(&server.uri());
    let data = "data:image/png;base64,iVBORw0KGgoAAAANSUhEUg==";
    let message = Message::user_with_parts(vec![
        ContentPart::text("Describe this."),
        ContentPart::image_data(data),
    ]);

    let request = client.build_vision_request(vec![message]);
    client.send(&request).await.unwrap();

    let requests = server.received_requests().await.unwrap();
    let body: serde_json::Value = serde_json::from_slice(&requests[0].body).unwrap();
    let image_part = &body["messages"][0]["content"][1];

    assert_eq!(image_part["type"], "image_url");
    assert_eq!(image_part["dataUri"]["data"], data);
    assert!(image_part.get("imageUrl").is_none());
}

#[tokio::test]
async fn test_plain_and_part_content_coexist() {
    // a history can mix string-content and part-content messages
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(200).set_body_json(success_envelope()))
        .mount(&server)
        .await;

    let client = client_for(&server.uri());
    let history = vec![
        Message::system("You describe images."),
        Message::user_with_parts(vec![
            ContentPart::text("And this one?"),
            ContentPart::image_url("https://example.com/dog.jpg"),
        ]),
    ];

    let request = client.build_vision_request(history);
    client.send(&request).await.unwrap();

    let requests = server.received_requests().await.unwrap();
    let body: serde_json::Value = serde_json::from_slice(&requests[0].body).unwrap();

    // string content stays a string, part content becomes an array
    assert!(body["messages"][0]["content"].is_string());
    assert!(body["messages"][1]["content"].is_array());
}

#[test]
fn test_hand_built_image_part_is_validated() {
    // neither URL nor data: rejected before it can reach the wire
    let empty = ContentPart::ImageUrl {
        image_url: None,
        data_uri: None,
    };
    assert!(empty.validate().is_err());

    let message = Message::user_with_parts(vec![empty]);
    assert!(message.validate().is_err());
}
