/*
[INPUT]:  Wiremock server standing in for the PicWish API
[OUTPUT]: End-to-end verification of controller + HTTP client
[POS]:    Integration tests - full submit/poll protocol over HTTP
[UPDATE]: When the wire protocol or failure classification changes
*/

mod common;

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use common::sample_jpeg;
use picwish_enhancer::{EnhancerConfig, Failure, JobId, TaskController};
use picwish_enhancer_adapter::{ClientConfig, Credentials, PicwishClient};
use tokio_test::assert_ok;
use wiremock::matchers::{header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

const API_KEY: &str = "e2e-key";

fn controller_for(server: &MockServer) -> TaskController {
    let config = assert_ok!(EnhancerConfig::load_with_env(
        None,
        Some(HashMap::from([
            ("PICWISH_API_KEY".to_string(), API_KEY.to_string()),
            ("PICWISH_API_URL".to_string(), server.uri()),
            ("PICWISH_POLL_INTERVAL_MS".to_string(), "20".to_string()),
        ])),
    ));
    assert_eq!(config.poll_interval(), Duration::from_millis(20));
    assert_ok!(TaskController::from_config(&config))
}

#[tokio::test]
async fn test_full_enhancement_over_http() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/api/tasks/visual/scale"))
        .and(header("x-api-key", API_KEY))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "status": 200,
            "data": { "task_id": "j1" }
        })))
        .expect(1)
        .mount(&server)
        .await;

    Mock::given(method("GET"))
        .and(path("/api/tasks/visual/scale/j1"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "status": 200,
            "data": { "task_id": "j1", "state": 0, "progress": 42 }
        })))
        .up_to_n_times(1)
        .expect(1)
        .mount(&server)
        .await;

    Mock::given(method("GET"))
        .and(path("/api/tasks/visual/scale/j1"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "status": 200,
            "data": { "task_id": "j1", "state": 1, "progress": 100, "image": "https://x/out.jpg" }
        })))
        .expect(1)
        .mount(&server)
        .await;

    let mut controller = controller_for(&server);
    controller.submit(sample_jpeg());

    let task = tokio::time::timeout(Duration::from_secs(10), controller.wait_for_terminal())
        .await
        .expect("task should finish");

    assert_eq!(task.result_location(), Some("https://x/out.jpg"));
    assert_eq!(task.job_id(), Some(&JobId::from("j1")));
}

#[tokio::test]
async fn test_rate_limited_submit_over_http() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/api/tasks/visual/scale"))
        .respond_with(ResponseTemplate::new(429))
        .expect(1)
        .mount(&server)
        .await;

    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&server)
        .await;

    let mut controller = controller_for(&server);
    controller.submit(sample_jpeg());
    let task = controller.wait_for_terminal().await;

    assert!(matches!(task.failure(), Some(Failure::RateLimited { .. })));
    tokio::time::sleep(Duration::from_millis(100)).await;
}

#[tokio::test]
async fn test_unauthorized_submit_over_http() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/api/tasks/visual/scale"))
        .respond_with(ResponseTemplate::new(401).set_body_json(serde_json::json!({
            "status": 401,
            "message": "api key invalid"
        })))
        .expect(1)
        .mount(&server)
        .await;

    let mut controller = controller_for(&server);
    controller.submit(sample_jpeg());
    let task = controller.wait_for_terminal().await;

    assert_eq!(task.failure(), Some(&Failure::Unauthorized));
    assert_eq!(
        task.failure().map(|failure| failure.user_message()),
        Some("Invalid API key".to_string())
    );
}

#[tokio::test]
async fn test_malformed_poll_over_http_stops_polling() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/api/tasks/visual/scale"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "status": 200,
            "data": { "task_id": "j2" }
        })))
        .mount(&server)
        .await;

    Mock::given(method("GET"))
        .and(path("/api/tasks/visual/scale/j2"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "status": 200,
            "data": { "task_id": "j2", "state": 0 }
        })))
        .expect(1)
        .mount(&server)
        .await;

    let mut controller = controller_for(&server);
    controller.submit(sample_jpeg());
    let task = controller.wait_for_terminal().await;

    assert!(matches!(task.failure(), Some(Failure::ProtocolError { .. })));
    // Several poll intervals pass without another query.
    tokio::time::sleep(Duration::from_millis(200)).await;
}

#[tokio::test]
async fn test_unreachable_service_is_network_error() {
    // Nothing listens on port 1.
    let client = PicwishClient::with_config_and_base_url(
        ClientConfig::default(),
        "http://127.0.0.1:1",
        Credentials::new(API_KEY),
    )
    .expect("client init");

    let mut controller = TaskController::new(Arc::new(client));
    controller.submit(sample_jpeg());
    let task = controller.wait_for_terminal().await;

    assert!(matches!(task.failure(), Some(Failure::NetworkError { .. })));
    assert_eq!(
        task.failure().map(|failure| failure.user_message()),
        Some("Network error. Please check your internet connection".to_string())
    );
}
