//! Server Startup Tests
//!
//! Tests for configuration loading, state construction and the router that
//! `main` serves.

use std::net::TcpListener;
use std::path::Path;

use axum::{Router, body::Body, http::Request};
use serial_test::serial;
use tempfile::TempDir;
use tower::util::ServiceExt;

use voxclone_gateway::{
    ServerConfig,
    config::{StorageBackendKind, VoiceStrategyKind},
    routes,
    state::AppState,
};

/// Helper function to create a minimal test configuration
fn create_minimal_config(port: u16, staging: &Path) -> ServerConfig {
    let mut config = ServerConfig::default();
    config.host = "127.0.0.1".to_string();
    config.port = port;
    config.playht_api_key = Some("test-api-key".to_string());
    config.playht_user_id = Some("test-user-id".to_string());
    config.playht_voice_id = Some("s3://voices/test/manifest.json".to_string());
    config.storage_backend = StorageBackendKind::Memory;
    config.staging_dir = staging.join("temp");
    config
}

/// Find an available port for testing
fn find_available_port() -> u16 {
    let listener = TcpListener::bind("127.0.0.1:0").expect("Failed to bind to random port");
    let port = listener.local_addr().unwrap().port();
    drop(listener);
    port
}

#[tokio::test]
async fn test_minimal_config_boot() {
    let staging = TempDir::new().unwrap();
    let config = create_minimal_config(find_available_port(), staging.path());
    let max_upload_bytes = config.max_upload_bytes;

    let app_state = AppState::new(config).await.unwrap();
    assert!(staging.path().join("temp").is_dir());

    let app = routes::api::create_api_router(max_upload_bytes).with_state(app_state);

    let request = Request::builder().uri("/").body(Body::empty()).unwrap();
    let response = app.oneshot(request).await.unwrap();

    assert_eq!(response.status(), axum::http::StatusCode::OK);
}

#[tokio::test]
async fn test_missing_playht_credentials_fail_startup() {
    let staging = TempDir::new().unwrap();
    let mut config = create_minimal_config(find_available_port(), staging.path());
    config.playht_user_id = None;

    let result = AppState::new(config).await;
    let message = format!("{:#}", result.err().unwrap());
    assert!(message.contains("speech synthesizer"));
}

#[tokio::test]
async fn test_unknown_route_returns_not_found() {
    let staging = TempDir::new().unwrap();
    let config = create_minimal_config(find_available_port(), staging.path());
    let app_state = AppState::new(config).await.unwrap();
    let app = routes::api::create_api_router(1024).with_state(app_state);

    let request = Request::builder()
        .uri("/speak")
        .body(Body::empty())
        .unwrap();
    let response = app.oneshot(request).await.unwrap();

    assert_eq!(response.status(), axum::http::StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_upload_requires_post() {
    let staging = TempDir::new().unwrap();
    let config = create_minimal_config(find_available_port(), staging.path());
    let app_state = AppState::new(config).await.unwrap();
    let app = routes::api::create_api_router(1024).with_state(app_state);

    let request = Request::builder()
        .uri("/upload")
        .body(Body::empty())
        .unwrap();
    let response = app.oneshot(request).await.unwrap();

    assert_eq!(
        response.status(),
        axum::http::StatusCode::METHOD_NOT_ALLOWED
    );
}

#[tokio::test]
async fn test_upload_without_multipart_body_is_client_error() {
    let staging = TempDir::new().unwrap();
    let config = create_minimal_config(find_available_port(), staging.path());
    let app_state = AppState::new(config).await.unwrap();
    let app = routes::api::create_api_router(1024 * 1024).with_state(app_state);

    let request = Request::builder()
        .method("POST")
        .uri("/upload")
        .header("content-type", "application/json")
        .body(Body::from(r#"{"text":"Hello"}"#))
        .unwrap();
    let response = app.oneshot(request).await.unwrap();

    assert!(response.status().is_client_error());
}

#[tokio::test]
async fn test_address_parsing() {
    let staging = TempDir::new().unwrap();
    let config = create_minimal_config(8080, staging.path());
    assert_eq!(config.address(), "127.0.0.1:8080");
    assert!(config.tls.is_none());
}

#[tokio::test]
async fn test_concurrent_request_handling() {
    let staging = TempDir::new().unwrap();
    let config = create_minimal_config(find_available_port(), staging.path());
    let app_state = AppState::new(config).await.unwrap();

    let app = Router::new()
        .route(
            "/",
            axum::routing::get(voxclone_gateway::handlers::api::health_check),
        )
        .with_state(app_state);

    let tasks: Vec<_> = (0..10)
        .map(|_| {
            let app = app.clone();
            tokio::spawn(async move {
                let request = Request::builder().uri("/").body(Body::empty()).unwrap();
                let response = app.oneshot(request).await.unwrap();
                response.status()
            })
        })
        .collect();

    for task in tasks {
        let status = task.await.expect("Task should complete");
        assert_eq!(status, axum::http::StatusCode::OK);
    }
}

#[tokio::test]
#[serial]
async fn test_yaml_config_boot() {
    let dir = TempDir::new().unwrap();
    let staging_dir = dir.path().join("staging");
    let config_path = dir.path().join("config.yaml");
    std::fs::write(
        &config_path,
        format!(
            r#"
server:
  host: "127.0.0.1"
  port: 4010
synthesis:
  api_key: "yaml-key"
  user_id: "yaml-user"
  voice_strategy: "clone"
storage:
  backend: "memory"
  bucket: "yaml-bucket"
staging:
  dir: "{}"
  compensate_on_failure: true
"#,
            staging_dir.display()
        ),
    )
    .unwrap();

    let config = ServerConfig::from_file(&config_path).unwrap();
    assert_eq!(config.port, 4010);
    assert_eq!(config.storage_backend, StorageBackendKind::Memory);
    assert_eq!(config.storage_bucket, "yaml-bucket");
    assert_eq!(config.voice_strategy, VoiceStrategyKind::Clone);
    assert!(config.compensate_on_failure);

    let app_state = AppState::new(config).await.unwrap();
    assert_eq!(app_state.store.bucket(), "yaml-bucket");
    assert!(staging_dir.is_dir());
}
