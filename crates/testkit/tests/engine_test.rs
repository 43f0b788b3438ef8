//! Drives the step library directly, outside the cucumber runner.

#![allow(missing_docs, clippy::unwrap_used, clippy::expect_used, clippy::panic)]

use std::sync::Arc;

use memberdesk_domain::{DataTable, StatusCode};
use memberdesk_testkit::{ContextError, ContextKey, HarnessError, Scenario, TestHarness};
use pretty_assertions::assert_eq;

fn table(rows: &[&[&str]]) -> DataTable {
    DataTable::from_rows(
        rows.iter()
            .map(|row| row.iter().map(|cell| (*cell).to_string()).collect())
            .collect(),
    )
    .unwrap()
}

async fn scenario() -> Scenario {
    let harness = Arc::new(TestHarness::start().await.unwrap());
    Scenario::begin(harness).await.unwrap()
}

async fn started() -> Scenario {
    let mut scenario = scenario().await;
    scenario
        .given_server(&table(&[
            &["Now", "UserId"],
            &["2024-01-01T00:00:00+00:00", "yao"],
        ]))
        .await
        .unwrap();
    scenario
}

#[tokio::test]
async fn test_request_before_server_start_is_missing_client() {
    let mut scenario = scenario().await;

    let err = scenario.when_request("GET", "/health").await.unwrap_err();

    assert!(matches!(
        err,
        HarnessError::Context(ContextError::Missing(ContextKey::HttpClient))
    ));
}

#[tokio::test]
async fn test_server_step_records_now_and_user() {
    let scenario = started().await;

    assert_eq!(scenario.context().user_id(), Some("yao"));
    assert_eq!(
        scenario.context().utc_now().unwrap().to_rfc3339(),
        "2024-01-01T00:00:00+00:00"
    );
}

#[tokio::test]
async fn test_health_round_trip() {
    let mut scenario = started().await;

    scenario.when_request("GET", "/health").await.unwrap();

    assert_eq!(scenario.context().status_code().unwrap(), StatusCode::new(200));
    scenario.then_status("200").unwrap();
    scenario.then_path("$.status", "字串等於", "ok").unwrap();
    scenario.then_body_equals(r#"{ "status" : "ok" }"#).unwrap();
}

#[tokio::test]
async fn test_status_mismatch_fails() {
    let mut scenario = started().await;
    scenario.when_request("GET", "/health").await.unwrap();

    let err = scenario.then_status("201").unwrap_err();

    assert!(matches!(err, HarnessError::Assertion(_)));
}

#[tokio::test]
async fn test_unknown_operation_is_invalid_step() {
    let mut scenario = started().await;
    scenario.when_request("GET", "/health").await.unwrap();

    let err = scenario.then_path("$.status", "大約等於", "ok").unwrap_err();

    assert!(matches!(err, HarnessError::InvalidStep(_)));
}

#[tokio::test]
async fn test_path_mismatch_reports_operation_and_values() {
    let mut scenario = started().await;
    scenario.when_request("GET", "/health").await.unwrap();

    let message = scenario
        .then_path("$.status", "字串等於", "down")
        .unwrap_err()
        .to_string();

    assert!(message.contains("$.status"), "{message}");
    assert!(message.contains("down"), "{message}");
    assert!(message.contains("ok"), "{message}");
}

#[tokio::test]
async fn test_blank_response_has_no_json_document() {
    let mut scenario = started().await;
    scenario
        .given_members_exist(&table(&[&["Id"], &["a"]]))
        .await
        .unwrap();

    scenario
        .when_request("DELETE", "/api/v1/members/a")
        .await
        .unwrap();

    scenario.then_status("204").unwrap();
    assert_eq!(scenario.context().response_body().unwrap(), "");
    assert!(matches!(
        scenario.context().json(),
        Err(ContextError::Missing(ContextKey::JsonNode))
    ));
}

#[tokio::test]
async fn test_non_json_response_is_malformed() {
    let mut scenario = started().await;
    scenario
        .given_fake_endpoint("GET", "/plain", "200", "just text")
        .await
        .unwrap();

    let err = scenario
        .when_request("GET", "/api/v1/external/plain")
        .await
        .unwrap_err();

    match err {
        HarnessError::MalformedResponse { body, .. } => assert_eq!(body, "just text"),
        other => panic!("unexpected error: {other}"),
    }
    assert_eq!(scenario.context().status_code().unwrap(), StatusCode::new(200));
}

#[tokio::test]
async fn test_seeded_created_at_defaults_to_frozen_now() {
    let mut scenario = started().await;
    scenario
        .given_members_exist(&table(&[&["Id", "Name"], &["a", "A"]]))
        .await
        .unwrap();

    scenario
        .then_members_equal(&table(&[
            &["Id", "Name", "CreatedAt", "CreatedBy"],
            &["a", "A", "2024-01-01T08:00:00+08:00", ""],
        ]))
        .await
        .unwrap();
}

#[tokio::test]
async fn test_member_rows_compare_as_unordered_set() {
    let mut scenario = started().await;
    scenario
        .given_members_exist(&table(&[&["Id", "Age"], &["a", "1"], &["b", "2"]]))
        .await
        .unwrap();

    scenario
        .then_members_equal(&table(&[&["Id", "Age"], &["b", "2"], &["a", "1"]]))
        .await
        .unwrap();

    let err = scenario
        .then_members_equal(&table(&[&["Id", "Age"], &["a", "1"]]))
        .await
        .unwrap_err();
    assert!(matches!(err, HarnessError::Assertion(_)));
}

#[tokio::test]
async fn test_unknown_member_column_is_invalid_step() {
    let mut scenario = started().await;
    scenario
        .given_members_exist(&table(&[&["Id"], &["a"]]))
        .await
        .unwrap();

    let err = scenario
        .then_members_equal(&table(&[&["Id", "Nickname"], &["a", "x"]]))
        .await
        .unwrap_err();

    assert!(matches!(err, HarnessError::InvalidStep(_)));
}

#[tokio::test]
async fn test_database_assertion_requires_started_host() {
    let scenario = scenario().await;

    let err = scenario
        .then_members_equal(&table(&[&["Id"]]))
        .await
        .unwrap_err();

    assert!(matches!(
        err,
        HarnessError::Context(ContextError::Missing(ContextKey::ServiceProvider))
    ));
}

#[tokio::test]
async fn test_duplicate_query_parameters_reach_the_api() {
    let mut scenario = started().await;
    scenario
        .given_members_exist(&table(&[&["Id"], &["a"], &["b"], &["c"]]))
        .await
        .unwrap();
    scenario.given_query(&table(&[&["id", "id"], &["c", "a"]]));

    scenario
        .when_request("GET", "/api/v1/members")
        .await
        .unwrap();

    scenario
        .then_path("$[*].id", "Json等於", r#""a""#)
        .unwrap();
    scenario.then_path("$[1].id", "字串等於", "c").unwrap();
    scenario.then_path("$[2].id", "字串等於", "").unwrap();
}
