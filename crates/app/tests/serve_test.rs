//! Serves the composed router on an ephemeral port and calls it over HTTP.
#![allow(clippy::unwrap_used, clippy::expect_used)]

use std::sync::Arc;

use memberdesk::{compose, serve};
use memberdesk_application::ports::MockRegistrar;
use memberdesk_domain::{HttpMethod, MockEndpoint};
use memberdesk_infrastructure::{HttpMockRegistrar, MockServerHandle, Settings, SystemClock};
use pretty_assertions::assert_eq;
use serde_json::{Value, json};
use tempfile::tempdir;
use tokio::net::TcpListener;

#[tokio::test]
async fn test_served_api_reaches_external_mock() {
    let temp_dir = tempdir().unwrap();
    let mock = MockServerHandle::start().await.unwrap();
    let settings = Settings {
        database_url: format!("sqlite://{}", temp_dir.path().join("serve.db").display()),
        external_api_url: mock.base_url(),
        ..Settings::default()
    };

    let (app, services) = compose(&settings, Arc::new(SystemClock::new())).unwrap();
    services.initialize_schema().await.unwrap();

    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let base = format!("http://{}", listener.local_addr().unwrap());
    let server = tokio::spawn(serve(listener, app));

    HttpMockRegistrar::new(&mock.base_url())
        .unwrap()
        .put_endpoint(&MockEndpoint::new(HttpMethod::Get, "/ext/ping", 200, r#"{"ok":true}"#).unwrap())
        .await
        .unwrap();

    let health: Value = reqwest::get(format!("{base}/health"))
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(health, json!({"status": "ok"}));

    let response = reqwest::get(format!("{base}/api/v1/external/ext/ping"))
        .await
        .unwrap();
    assert_eq!(response.status().as_u16(), 200);
    let body: Value = response.json().await.unwrap();
    assert_eq!(body, json!({"ok": true}));

    let missing = reqwest::get(format!("{base}/api/v1/external/ext/unknown"))
        .await
        .unwrap();
    assert_eq!(missing.status().as_u16(), 404);

    server.abort();
}
