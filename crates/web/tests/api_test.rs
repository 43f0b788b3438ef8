//! Member API tests driving the router in-process.

#![allow(clippy::unwrap_used, clippy::expect_used)]

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use axum::body::Body;
use axum::http::{Request, StatusCode};
use chrono::{TimeZone, Utc};
use http_body_util::BodyExt;
use memberdesk_application::ApplicationResult;
use memberdesk_application::ports::{ExternalApi, SessionFactory};
use memberdesk_application::use_cases::MemberService;
use memberdesk_domain::ResponseSpec;
use memberdesk_infrastructure::{FixedClock, SqliteSessionFactory};
use memberdesk_web::{AppState, router};
use pretty_assertions::assert_eq;
use serde_json::{Value, json};
use tempfile::TempDir;
use tower::ServiceExt;

struct EchoApi;

#[async_trait]
impl ExternalApi for EchoApi {
    async fn get(&self, path: &str, query: Option<&str>) -> ApplicationResult<ResponseSpec> {
        let body = json!({ "path": path, "query": query }).to_string();
        let headers = HashMap::from([("content-type".to_string(), "application/json".to_string())]);
        Ok(ResponseSpec::new(202, headers, body.into_bytes()))
    }
}

async fn app(dir: &TempDir) -> axum::Router {
    let url = format!("sqlite://{}", dir.path().join("api.db").display());
    let sessions = SqliteSessionFactory::new(&url);
    sessions.create_session().unwrap().initialize().await.unwrap();

    let now = Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap();
    let members = MemberService::new(Arc::new(sessions), Arc::new(FixedClock::new(now)));
    router(AppState::new(members, Arc::new(EchoApi), Some("system".to_string())))
}

async fn send(app: &axum::Router, request: Request<Body>) -> (StatusCode, Value) {
    let response = app.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    let body = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap()
    };
    (status, body)
}

fn post(uri: &str, body: &Value, user: Option<&str>) -> Request<Body> {
    let mut builder = Request::post(uri).header("content-type", "application/json");
    if let Some(user) = user {
        builder = builder.header("x-user-id", user);
    }
    builder.body(Body::from(body.to_string())).unwrap()
}

fn get(uri: &str) -> Request<Body> {
    Request::get(uri).body(Body::empty()).unwrap()
}

#[tokio::test]
async fn test_health() {
    let dir = TempDir::new().unwrap();
    let app = app(&dir).await;
    let (status, body) = send(&app, get("/health")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!({"status": "ok"}));
}

#[tokio::test]
async fn test_member_crud_flow() {
    let dir = TempDir::new().unwrap();
    let app = app(&dir).await;

    let (status, created) = send(
        &app,
        post("/api/v1/members", &json!({"id": "1", "name": "Yao", "age": 18}), Some("yao")),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(created["createdBy"], "yao");
    assert_eq!(created["createdAt"], "2024-01-01T00:00:00+00:00");
    assert_eq!(created["sequenceId"], 1);

    let (status, fetched) = send(&app, get("/api/v1/members/1")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(fetched["name"], "Yao");

    let update = Request::put("/api/v1/members/1")
        .header("content-type", "application/json")
        .body(Body::from(json!({"email": "yao@example.com"}).to_string()))
        .unwrap();
    let (status, updated) = send(&app, update).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(updated["email"], "yao@example.com");
    assert_eq!(updated["changedBy"], "system");

    let delete = Request::delete("/api/v1/members/1").body(Body::empty()).unwrap();
    let (status, _) = send(&app, delete).await;
    assert_eq!(status, StatusCode::NO_CONTENT);

    let (status, error) = send(&app, get("/api/v1/members/1")).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(error["code"], "not_found");
}

#[tokio::test]
async fn test_duplicate_id_conflicts() {
    let dir = TempDir::new().unwrap();
    let app = app(&dir).await;
    let body = json!({"id": "dup"});
    assert_eq!(send(&app, post("/api/v1/members", &body, None)).await.0, StatusCode::CREATED);
    let (status, error) = send(&app, post("/api/v1/members", &body, None)).await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(error["code"], "conflict");
}

#[tokio::test]
async fn test_list_filters_by_repeated_ids() {
    let dir = TempDir::new().unwrap();
    let app = app(&dir).await;
    for id in ["a", "b", "c"] {
        send(&app, post("/api/v1/members", &json!({"id": id}), None)).await;
    }

    let (status, body) = send(&app, get("/api/v1/members?id=c&id=a")).await;
    assert_eq!(status, StatusCode::OK);
    let ids: Vec<_> = body
        .as_array()
        .unwrap()
        .iter()
        .map(|m| m["id"].as_str().unwrap().to_string())
        .collect();
    assert_eq!(ids, vec!["a", "c"]);
}

#[tokio::test]
async fn test_malformed_body_is_bad_request() {
    let dir = TempDir::new().unwrap();
    let app = app(&dir).await;
    let request = Request::post("/api/v1/members")
        .header("content-type", "application/json")
        .body(Body::from("{not json"))
        .unwrap();
    let (status, error) = send(&app, request).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(error["code"], "bad_request");
}

#[tokio::test]
async fn test_external_proxy_relays_status_and_query() {
    let dir = TempDir::new().unwrap();
    let app = app(&dir).await;
    let (status, body) = send(&app, get("/api/v1/external/ext/ping?x=1&x=2")).await;
    assert_eq!(status, StatusCode::ACCEPTED);
    assert_eq!(body, json!({"path": "ext/ping", "query": "x=1&x=2"}));
}
