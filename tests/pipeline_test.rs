//! End-to-end pipeline tests with a mocked service and webhook backend

mod common;

use chrono::NaiveDate;
use crammer::config::Config;
use crammer::error::Error;
use crammer::pipeline;
use crammer::scheduler::StateStore;
use crammer::storage::PacketStore;
use tempfile::TempDir;
use wiremock::matchers::{body_string_contains, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn test_config(dir: &TempDir, generator_uri: &str, webhooks: Vec<String>) -> Config {
    let mut config = Config::default();
    config.generator.endpoint = generator_uri.to_string();
    config.generator.api_key = "test-key".to_string();
    config.dispatch.webhooks = webhooks;
    config.schedule.state_path = dir.path().join("state.json");
    config.schedule.packet_dir = dir.path().join("packets");
    config
        .schedule
        .pools
        .insert("7".to_string(), vec!["Integration topic".to_string()]);
    config
}

fn generator_envelope() -> serde_json::Value {
    serde_json::json!({
        "candidates": [
            {"content": {"parts": [{"text": common::sample_packet_json()}]}}
        ]
    })
}

#[tokio::test]
async fn test_full_run_persists_and_dispatches() {
    let mock_server = MockServer::start().await;
    let today = NaiveDate::from_ymd_opt(2025, 7, 21).unwrap();

    Mock::given(method("POST"))
        .and(path("/v1/models/gemini-2.5-flash:generateContent"))
        .and(body_string_contains("Integration topic"))
        .respond_with(ResponseTemplate::new(200).set_body_json(generator_envelope()))
        .expect(1)
        .mount(&mock_server)
        .await;
    Mock::given(method("POST"))
        .and(path("/hook"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "errcode": 0,
            "errmsg": "ok"
        })))
        .expect(1)
        .mount(&mock_server)
        .await;

    let dir = TempDir::new().unwrap();
    let config = test_config(
        &dir,
        &mock_server.uri(),
        vec![format!("{}/hook", mock_server.uri())],
    );

    let report = pipeline::run(&config, today, false).await.unwrap();

    assert_eq!(report.topic, "Integration topic");
    assert_eq!(report.packet_id.as_deref(), Some("2025-07-21"));
    assert_eq!(report.delivered, 1);

    // Rotation state was advanced and persisted
    let state = StateStore::new(dir.path().join("state.json")).load().unwrap();
    assert_eq!(state.period, 7);
    assert!(state.pending.is_empty());

    // The packet artifact is on disk under its date key
    let store = PacketStore::new(dir.path().join("packets"));
    let artifact = store.load("2025-07-21").unwrap().unwrap();
    assert_eq!(artifact.packet, common::sample_packet());
}

#[tokio::test]
async fn test_all_targets_failing_fails_the_run_but_keeps_the_packet() {
    let mock_server = MockServer::start().await;
    let today = NaiveDate::from_ymd_opt(2025, 7, 22).unwrap();

    Mock::given(method("POST"))
        .and(path("/v1/models/gemini-2.5-flash:generateContent"))
        .respond_with(ResponseTemplate::new(200).set_body_json(generator_envelope()))
        .mount(&mock_server)
        .await;
    Mock::given(method("POST"))
        .and(path("/hook"))
        .respond_with(ResponseTemplate::new(500))
        .mount(&mock_server)
        .await;

    let dir = TempDir::new().unwrap();
    let config = test_config(
        &dir,
        &mock_server.uri(),
        vec![format!("{}/hook", mock_server.uri())],
    );

    let err = pipeline::run(&config, today, false).await.unwrap_err();
    assert!(matches!(err, Error::AllTargetsFailed { attempted: 1 }));

    // The packet itself was produced and persisted before dispatch
    let store = PacketStore::new(dir.path().join("packets"));
    assert!(store.exists("2025-07-22"));
}

#[tokio::test]
async fn test_upstream_failure_aborts_before_dispatch() {
    let mock_server = MockServer::start().await;
    let today = NaiveDate::from_ymd_opt(2025, 7, 23).unwrap();

    Mock::given(method("POST"))
        .and(path("/v1/models/gemini-2.5-flash:generateContent"))
        .respond_with(ResponseTemplate::new(503))
        .mount(&mock_server)
        .await;
    // No webhook mock: a dispatch attempt would 404 loudly

    let dir = TempDir::new().unwrap();
    let config = test_config(
        &dir,
        &mock_server.uri(),
        vec![format!("{}/hook", mock_server.uri())],
    );

    let err = pipeline::run(&config, today, false).await.unwrap_err();
    assert!(matches!(err, Error::Upstream(_)));

    let store = PacketStore::new(dir.path().join("packets"));
    assert!(!store.exists("2025-07-23"));
}

#[tokio::test]
async fn test_missing_secrets_abort_before_any_network_call() {
    let dir = TempDir::new().unwrap();
    let today = NaiveDate::from_ymd_opt(2025, 7, 24).unwrap();

    let mut config = test_config(&dir, "https://unreachable.invalid", Vec::new());
    config.generator.api_key = String::new();

    let err = pipeline::run(&config, today, false).await.unwrap_err();
    assert!(matches!(err, Error::Config(_)));
    assert!(err.is_pre_network());
}

#[tokio::test]
async fn test_dry_run_is_fully_offline() {
    let dir = TempDir::new().unwrap();
    let today = NaiveDate::from_ymd_opt(2025, 7, 25).unwrap();

    // Unreachable endpoints and no secrets: a dry run must not care
    let config = test_config(&dir, "https://unreachable.invalid", Vec::new());

    let report = pipeline::run(&config, today, true).await.unwrap();

    assert!(report.dry_run);
    assert_eq!(report.topic, "Integration topic");
    let preview = report.preview.expect("dry run carries a preview");
    assert!(preview.prompt.contains("Integration topic"));
    assert_eq!(preview.payload["msgtype"], "markdown");

    // No state written, nothing persisted
    assert!(StateStore::new(dir.path().join("state.json")).load().is_none());
    assert!(!dir.path().join("packets").exists());
}
