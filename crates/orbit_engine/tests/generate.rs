use std::sync::{Arc, Mutex};
use std::time::Duration;

use bytes::Bytes;
use orbit_engine::{ChunkSink, FailureKind, GenerateSettings, Generator, OllamaGenerator};
use serde_json::json;
use tokio_util::sync::CancellationToken;
use wiremock::matchers::{body_partial_json, header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

#[derive(Default, Clone)]
struct TestSink {
    chunks: Arc<Mutex<Vec<Bytes>>>,
}

impl TestSink {
    fn joined(&self) -> Vec<u8> {
        self.chunks
            .lock()
            .unwrap()
            .iter()
            .flat_map(|chunk| chunk.iter().copied())
            .collect()
    }
}

impl ChunkSink for TestSink {
    fn chunk(&self, bytes: Bytes) {
        self.chunks.lock().unwrap().push(bytes);
    }
}

fn settings_for(server: &MockServer) -> GenerateSettings {
    GenerateSettings {
        base_url: server.uri(),
        model: "test-model".to_string(),
        ..GenerateSettings::default()
    }
}

const BODY: &str = "{\"response\":\"Step 1\",\"done\":false}\n{\"response\":\": open doc\",\"done\":true}\n";

#[tokio::test]
async fn posts_prompt_and_forwards_body_bytes() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/generate"))
        .and(header("content-type", "application/json"))
        .and(body_partial_json(json!({
            "model": "test-model",
            "prompt": "hello",
            "stream": true,
            "options": { "temperature": 0.6, "num_ctx": 4096 }
        })))
        .respond_with(ResponseTemplate::new(200).set_body_raw(BODY, "application/x-ndjson"))
        .expect(1)
        .mount(&server)
        .await;

    let generator = OllamaGenerator::new(settings_for(&server));
    let sink = TestSink::default();
    generator
        .generate("hello", &sink, &CancellationToken::new())
        .await
        .expect("generate ok");

    assert_eq!(sink.joined(), BODY.as_bytes());
}

#[tokio::test]
async fn http_error_status_is_reported() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/generate"))
        .respond_with(ResponseTemplate::new(404))
        .mount(&server)
        .await;

    let generator = OllamaGenerator::new(settings_for(&server));
    let err = generator
        .generate("hello", &TestSink::default(), &CancellationToken::new())
        .await
        .unwrap_err();
    assert_eq!(err.kind, FailureKind::HttpStatus(404));
}

#[tokio::test]
async fn cancellation_aborts_a_slow_request() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/generate"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_delay(Duration::from_secs(5))
                .set_body_raw(BODY, "application/x-ndjson"),
        )
        .mount(&server)
        .await;

    let generator = OllamaGenerator::new(settings_for(&server));
    let token = CancellationToken::new();
    let canceller = token.clone();
    tokio::spawn(async move {
        tokio::time::sleep(Duration::from_millis(50)).await;
        canceller.cancel();
    });

    let sink = TestSink::default();
    let started = std::time::Instant::now();
    let err = generator.generate("hello", &sink, &token).await.unwrap_err();
    assert_eq!(err.kind, FailureKind::Cancelled);
    assert!(started.elapsed() < Duration::from_secs(4));
    assert!(sink.joined().is_empty());
}

#[tokio::test]
async fn request_timeout_is_reported() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/generate"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_delay(Duration::from_millis(250))
                .set_body_raw(BODY, "application/x-ndjson"),
        )
        .mount(&server)
        .await;

    let settings = GenerateSettings {
        request_timeout: Duration::from_millis(50),
        ..settings_for(&server)
    };
    let err = OllamaGenerator::new(settings)
        .generate("hello", &TestSink::default(), &CancellationToken::new())
        .await
        .unwrap_err();
    assert_eq!(err.kind, FailureKind::Timeout);
}

#[tokio::test]
async fn unreachable_server_is_a_network_failure() {
    let settings = GenerateSettings {
        base_url: "http://127.0.0.1:1".to_string(),
        ..GenerateSettings::default()
    };
    let err = OllamaGenerator::new(settings)
        .generate("hello", &TestSink::default(), &CancellationToken::new())
        .await
        .unwrap_err();
    assert_eq!(err.kind, FailureKind::Network);
    assert!(matches!(
        err.to_transport_error(),
        orbit_core::TransportError::Failed(_)
    ));
}
