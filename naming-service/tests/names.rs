//! End-to-end tests for `POST /api/names` against a mocked Anthropic API.

mod common;

use common::{TestApp, TEST_API_KEY};
use serde_json::json;
use wiremock::matchers::{header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn names_body() -> serde_json::Value {
    json!({ "image_data": "iVBORw0KGgoAAAANSUhEUg==" })
}

/// A Messages API success envelope around the given content blocks.
fn provider_response(content: serde_json::Value) -> serde_json::Value {
    json!({
        "id": "msg_01",
        "type": "message",
        "role": "assistant",
        "model": "claude-3-5-sonnet-20241022",
        "content": content,
        "stop_reason": "tool_use",
        "usage": { "input_tokens": 120, "output_tokens": 30 }
    })
}

async fn post_names(app: &TestApp) -> reqwest::Response {
    reqwest::Client::new()
        .post(format!("{}/api/names", app.address))
        .json(&names_body())
        .send()
        .await
        .expect("Failed to send request")
}

#[tokio::test]
async fn tool_use_block_yields_names_array() {
    let provider = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/v1/messages"))
        .and(header("x-api-key", TEST_API_KEY))
        .and(header("anthropic-version", "2023-06-01"))
        .respond_with(ResponseTemplate::new(200).set_body_json(provider_response(json!([
            {
                "type": "tool_use",
                "id": "toolu_01",
                "name": "suggest_pattern_names",
                "input": { "names": ["Diamond Lattice", "Blue Cascade"] }
            }
        ]))))
        .expect(1)
        .mount(&provider)
        .await;

    let app = TestApp::spawn(&provider.uri()).await;
    let response = post_names(&app).await;

    assert_eq!(response.status().as_u16(), 200);
    let body: serde_json::Value = response.json().await.unwrap();
    assert_eq!(body, json!(["Diamond Lattice", "Blue Cascade"]));
}

#[tokio::test]
async fn text_blocks_concatenate_in_block_order() {
    let provider = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/v1/messages"))
        .respond_with(ResponseTemplate::new(200).set_body_json(provider_response(json!([
            { "type": "text", "text": "{\"names\": [\"Fern Path\"]}" },
            { "type": "text", "text": "{\"names\": [\"Soft Ripple\", \"Moss Tile\"]}" }
        ]))))
        .expect(1)
        .mount(&provider)
        .await;

    let app = TestApp::spawn(&provider.uri()).await;
    let response = post_names(&app).await;

    assert_eq!(response.status().as_u16(), 200);
    let body: serde_json::Value = response.json().await.unwrap();
    assert_eq!(body, json!(["Fern Path", "Soft Ripple", "Moss Tile"]));
}

#[tokio::test]
async fn zero_matching_blocks_yield_empty_array() {
    let provider = MockServer::start().await;

    // Only a prose text block: commentary, not a matching block.
    Mock::given(method("POST"))
        .and(path("/v1/messages"))
        .respond_with(ResponseTemplate::new(200).set_body_json(provider_response(json!([
            { "type": "text", "text": "I could not find a distinctive motif." }
        ]))))
        .expect(1)
        .mount(&provider)
        .await;

    let app = TestApp::spawn(&provider.uri()).await;
    let response = post_names(&app).await;

    assert_eq!(response.status().as_u16(), 200);
    let body: serde_json::Value = response.json().await.unwrap();
    assert_eq!(body, json!([]));
}

#[tokio::test]
async fn upstream_500_maps_to_bad_gateway_without_leaking_body() {
    let provider = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/v1/messages"))
        .respond_with(
            ResponseTemplate::new(500)
                .set_body_json(json!({ "error": "internal provider meltdown" })),
        )
        .expect(1)
        .mount(&provider)
        .await;

    let app = TestApp::spawn(&provider.uri()).await;
    let response = post_names(&app).await;

    assert_eq!(response.status().as_u16(), 502);
    let body = response.text().await.unwrap();
    assert!(!body.contains("internal provider meltdown"), "{}", body);
}

#[tokio::test]
async fn upstream_429_maps_to_bad_gateway() {
    let provider = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/v1/messages"))
        .respond_with(ResponseTemplate::new(429).set_body_json(json!({
            "error": { "type": "rate_limit_error", "message": "Rate limited" }
        })))
        .expect(1)
        .mount(&provider)
        .await;

    let app = TestApp::spawn(&provider.uri()).await;
    let response = post_names(&app).await;

    assert_eq!(response.status().as_u16(), 502);
    let body = response.text().await.unwrap();
    assert!(!body.contains("rate_limit_error"), "{}", body);
}

#[tokio::test]
async fn schema_violating_tool_input_maps_to_bad_gateway() {
    let provider = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/v1/messages"))
        .respond_with(ResponseTemplate::new(200).set_body_json(provider_response(json!([
            {
                "type": "tool_use",
                "id": "toolu_01",
                "name": "suggest_pattern_names",
                "input": { "names": "not-an-array" }
            }
        ]))))
        .expect(1)
        .mount(&provider)
        .await;

    let app = TestApp::spawn(&provider.uri()).await;
    let response = post_names(&app).await;

    assert_eq!(response.status().as_u16(), 502);
}

#[tokio::test]
async fn oversized_declared_body_is_rejected_before_provider_call() {
    let provider = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/v1/messages"))
        .respond_with(ResponseTemplate::new(200).set_body_json(provider_response(json!([]))))
        .expect(0)
        .mount(&provider)
        .await;

    let app = TestApp::spawn(&provider.uri()).await;

    // 2,000,000 declared bytes against the 1,048,576 cap.
    let response = reqwest::Client::new()
        .post(format!("{}/api/names", app.address))
        .header("content-type", "application/json")
        .body(vec![b'x'; 2_000_000])
        .send()
        .await
        .expect("Failed to send request");

    assert_eq!(response.status().as_u16(), 413);
    let body = response.text().await.unwrap();
    assert!(body.contains("1.9MB"), "{}", body);
    assert!(body.contains("max 1.0MB"), "{}", body);

    provider.verify().await;
}
