//! HTTP surface regression tests: envelope shape, mode validation, payload
//! limits, and the analyze happy path, all via in-process `oneshot` requests.

use std::sync::Arc;

use axum::body::Body;
use axum::http::{Request, StatusCode};
use tower::ServiceExt;

use auris::api::{create_app, ApiState};
use auris::config::defaults::TABULAR_FEATURE_LEN;
use auris::config::DiagnosticsConfig;
use auris::diagnosis::NUM_CLASSES;
use auris::model::testing::FixedPredictor;
use auris::pipeline::DiagnosticsEngine;

const BOUNDARY: &str = "auris-test-boundary";

fn test_app_with_config(config: DiagnosticsConfig, scores: Vec<f32>) -> axum::Router {
    let max_payload = config.server.max_payload_bytes;
    let engine = DiagnosticsEngine::new(
        Arc::new(FixedPredictor {
            input_shape: vec![1, TABULAR_FEATURE_LEN],
            scores,
        }),
        Arc::new(config),
    )
    .unwrap();
    create_app(ApiState { engine }, max_payload)
}

fn test_app(scores: Vec<f32>) -> axum::Router {
    test_app_with_config(DiagnosticsConfig::default(), scores)
}

/// Scores with all mass on the first class ("normal").
fn normal_scores() -> Vec<f32> {
    let mut scores = vec![0.0f32; NUM_CLASSES];
    scores[0] = 1.0;
    scores
}

/// Build a multipart body with an optional mode field and an optional file part.
fn multipart_body(mode: Option<&str>, file: Option<&[u8]>) -> Vec<u8> {
    let mut body = Vec::new();
    if let Some(mode) = mode {
        body.extend_from_slice(
            format!(
                "--{BOUNDARY}\r\nContent-Disposition: form-data; name=\"mode\"\r\n\r\n{mode}\r\n"
            )
            .as_bytes(),
        );
    }
    if let Some(file) = file {
        body.extend_from_slice(
            format!(
                "--{BOUNDARY}\r\nContent-Disposition: form-data; name=\"file\"; \
                 filename=\"clip.wav\"\r\nContent-Type: audio/wav\r\n\r\n"
            )
            .as_bytes(),
        );
        body.extend_from_slice(file);
        body.extend_from_slice(b"\r\n");
    }
    body.extend_from_slice(format!("--{BOUNDARY}--\r\n").as_bytes());
    body
}

fn analyze_request(body: Vec<u8>) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri("/api/v1/analyze")
        .header(
            "content-type",
            format!("multipart/form-data; boundary={BOUNDARY}"),
        )
        .body(Body::from(body))
        .unwrap()
}

fn wav_tone(freq: f32, sample_rate: u32, duration_secs: f32) -> Vec<u8> {
    let spec = hound::WavSpec {
        channels: 1,
        sample_rate,
        bits_per_sample: 16,
        sample_format: hound::SampleFormat::Int,
    };

    let mut cursor = std::io::Cursor::new(Vec::new());
    {
        let mut writer = hound::WavWriter::new(&mut cursor, spec).unwrap();
        let n = (sample_rate as f32 * duration_secs) as usize;
        for i in 0..n {
            let t = i as f32 / sample_rate as f32;
            let sample = (2.0 * std::f32::consts::PI * freq * t).sin();
            writer
                .write_sample((sample * f32::from(i16::MAX) * 0.8) as i16)
                .unwrap();
        }
        writer.finalize().unwrap();
    }
    cursor.into_inner()
}

async fn json_body(response: axum::response::Response) -> serde_json::Value {
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    serde_json::from_slice(&bytes).unwrap()
}

#[tokio::test]
async fn health_has_envelope_shape() {
    let app = test_app(normal_scores());
    let response = app
        .oneshot(
            Request::builder()
                .uri("/api/v1/health")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let v = json_body(response).await;
    assert_eq!(v["data"]["status"], "ok");
    assert_eq!(v["meta"]["version"], "1");
}

#[tokio::test]
async fn classes_lists_catalog_with_issue_metadata() {
    let app = test_app(normal_scores());
    let response = app
        .oneshot(
            Request::builder()
                .uri("/api/v1/classes")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let v = json_body(response).await;
    let classes = v["data"].as_array().unwrap();
    assert_eq!(classes.len(), NUM_CLASSES);

    let knocking = classes
        .iter()
        .find(|c| c["id"] == "knocking")
        .unwrap();
    assert_eq!(knocking["actionable"], true);
    assert!(knocking["issue"]["recommendation"].is_string());

    let normal = classes.iter().find(|c| c["id"] == "normal").unwrap();
    assert_eq!(normal["actionable"], false);
}

#[tokio::test]
async fn invalid_mode_rejected_before_any_decoding() {
    let app = test_app(normal_scores());
    // No file part at all: a bad mode must fail first, on its own.
    let body = multipart_body(Some("fast"), None);
    let response = app.oneshot(analyze_request(body)).await.unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let v = json_body(response).await;
    assert_eq!(v["error"]["code"], "INVALID_REQUEST");
}

#[tokio::test]
async fn missing_file_field_is_rejected() {
    let app = test_app(normal_scores());
    let body = multipart_body(Some("quick"), None);
    let response = app.oneshot(analyze_request(body)).await.unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let v = json_body(response).await;
    assert_eq!(v["error"]["code"], "INVALID_REQUEST");
    assert!(v["error"]["message"].as_str().unwrap().contains("file"));
}

#[tokio::test]
async fn empty_file_is_rejected() {
    let app = test_app(normal_scores());
    let body = multipart_body(Some("quick"), Some(b""));
    let response = app.oneshot(analyze_request(body)).await.unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn garbage_file_is_a_client_decode_error() {
    let app = test_app(normal_scores());
    let body = multipart_body(Some("quick"), Some(b"definitely not audio"));
    let response = app.oneshot(analyze_request(body)).await.unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn oversized_payload_is_rejected() {
    let mut config = DiagnosticsConfig::default();
    config.server.max_payload_bytes = 1024;
    let app = test_app_with_config(config, normal_scores());

    let body = multipart_body(Some("quick"), Some(&vec![0u8; 64 * 1024]));
    let response = app.oneshot(analyze_request(body)).await.unwrap();

    assert_eq!(response.status(), StatusCode::PAYLOAD_TOO_LARGE);
}

#[tokio::test]
async fn analyze_happy_path_returns_full_result() {
    let app = test_app(normal_scores());
    let wav = wav_tone(440.0, 22_050, 3.0);
    let body = multipart_body(Some("quick"), Some(&wav));
    let response = app.oneshot(analyze_request(body)).await.unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let v = json_body(response).await;
    let data = &v["data"];

    assert_eq!(data["detected_class"], "normal");
    assert!(data["overall_health"].as_u64().unwrap() >= 90);
    assert_eq!(data["mode"], "quick");
    assert_eq!(data["vibration_data"].as_array().unwrap().len(), 100);
    assert_eq!(
        data["class_probabilities"].as_object().unwrap().len(),
        NUM_CLASSES
    );
    assert!(data["timestamp"].is_string());
}

#[tokio::test]
async fn missing_mode_field_is_rejected() {
    let app = test_app(normal_scores());
    let wav = wav_tone(440.0, 22_050, 3.0);
    let body = multipart_body(None, Some(&wav));
    let response = app.oneshot(analyze_request(body)).await.unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let v = json_body(response).await;
    assert_eq!(v["error"]["code"], "INVALID_REQUEST");
    assert!(v["error"]["message"].as_str().unwrap().contains("mode"));
}

#[tokio::test]
async fn deep_mode_returns_larger_vibration_series() {
    let app = test_app(normal_scores());
    let wav = wav_tone(440.0, 22_050, 3.0);
    let body = multipart_body(Some("deep"), Some(&wav));
    let response = app.oneshot(analyze_request(body)).await.unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let v = json_body(response).await;
    assert_eq!(v["data"]["mode"], "deep");
    assert_eq!(v["data"]["vibration_data"].as_array().unwrap().len(), 300);
}
