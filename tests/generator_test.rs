//! Integration tests for the generator client using wiremock
//!
//! These validate the content-request boundary: envelope handling, error
//! surfacing on non-success status, and the absence of retries.

mod common;

use crammer::config::GeneratorConfig;
use crammer::generator::{build_prompt, GeneratorClient, UpstreamError};
use wiremock::matchers::{body_string_contains, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn test_config(endpoint: &str) -> GeneratorConfig {
    GeneratorConfig {
        endpoint: endpoint.to_string(),
        model: "models/test-flash".to_string(),
        api_key: "test-key".to_string(),
        timeout_secs: 5,
        temperature: 0.4,
        max_output_tokens: 1024,
        question_count: 2,
    }
}

fn envelope_with_text(text: &str) -> serde_json::Value {
    serde_json::json!({
        "candidates": [
            {"content": {"parts": [{"text": text}]}}
        ]
    })
}

#[tokio::test]
async fn test_generate_returns_candidate_text() {
    let mock_server = MockServer::start().await;
    let payload = common::sample_packet_json();

    Mock::given(method("POST"))
        .and(path("/v1/models/test-flash:generateContent"))
        .and(query_param("key", "test-key"))
        .respond_with(ResponseTemplate::new(200).set_body_json(envelope_with_text(&payload)))
        .mount(&mock_server)
        .await;

    let client = GeneratorClient::new(test_config(&mock_server.uri())).unwrap();
    let prompt = build_prompt("Computer networks", 2);
    let raw = client.generate(&prompt).await.unwrap();

    assert!(raw.contains("Computer networks"));
}

#[tokio::test]
async fn test_generate_sends_prompt_in_body() {
    let mock_server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/v1/models/test-flash:generateContent"))
        .and(body_string_contains("Query optimization"))
        .respond_with(ResponseTemplate::new(200).set_body_json(envelope_with_text("ok")))
        .expect(1)
        .mount(&mock_server)
        .await;

    let client = GeneratorClient::new(test_config(&mock_server.uri())).unwrap();
    let prompt = build_prompt("Query optimization", 3);
    client.generate(&prompt).await.unwrap();
}

#[tokio::test]
async fn test_non_success_status_is_upstream_error() {
    let mock_server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/v1/models/test-flash:generateContent"))
        .respond_with(ResponseTemplate::new(429).set_body_string("quota exceeded"))
        .expect(1) // no retry at this layer
        .mount(&mock_server)
        .await;

    let client = GeneratorClient::new(test_config(&mock_server.uri())).unwrap();
    let err = client.generate("prompt").await.unwrap_err();

    match err {
        UpstreamError::Status { status, body } => {
            assert_eq!(status, 429);
            assert!(body.contains("quota exceeded"));
        }
        other => panic!("expected Status error, got {other:?}"),
    }
}

#[tokio::test]
async fn test_envelope_without_text_is_upstream_error() {
    let mock_server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/v1/models/test-flash:generateContent"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "candidates": []
        })))
        .mount(&mock_server)
        .await;

    let client = GeneratorClient::new(test_config(&mock_server.uri())).unwrap();
    let err = client.generate("prompt").await.unwrap_err();
    assert!(matches!(err, UpstreamError::EmptyCandidate));
}
