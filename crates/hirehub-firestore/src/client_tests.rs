//! Tests for Firestore client functionality.
//!
//! Wire-level tests run against a mock server through the emulator code
//! path, which targets plain HTTP and skips real authentication.

use std::collections::HashMap;
use std::time::Duration;

use serde_json::json;
use serial_test::serial;
use wiremock::matchers::{method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

use crate::client::{FirestoreClient, FirestoreConfig};
use crate::error::FirestoreError;
use crate::retry::RetryConfig;
use crate::types::{StructuredQuery, ToFirestoreValue, Value};

// =============================================================================
// Test Helpers
// =============================================================================

pub(crate) fn test_config(emulator_host: Option<String>) -> FirestoreConfig {
    FirestoreConfig {
        project_id: "test-project".to_string(),
        database_id: "(default)".to_string(),
        emulator_host,
        timeout: Duration::from_secs(5),
        connect_timeout: Duration::from_secs(2),
        retry: RetryConfig {
            max_retries: 3,
            base_delay_ms: 10,
            max_delay_ms: 100,
        },
    }
}

pub(crate) async fn mock_client(server: &MockServer) -> FirestoreClient {
    let host = server.uri().trim_start_matches("http://").to_string();
    FirestoreClient::new(test_config(Some(host)))
        .await
        .expect("client should build in emulator mode")
}

pub(crate) const DOCUMENTS_PATH: &str =
    "/v1/projects/test-project/databases/(default)/documents";

pub(crate) fn doc_body(name_suffix: &str, fields: serde_json::Value) -> serde_json::Value {
    json!({
        "name": format!(
            "projects/test-project/databases/(default)/documents/{}",
            name_suffix
        ),
        "fields": fields,
    })
}

// =============================================================================
// CRUD Tests
// =============================================================================

#[tokio::test]
async fn test_get_document_found() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path(format!("{}/users/u_1", DOCUMENTS_PATH)))
        .respond_with(ResponseTemplate::new(200).set_body_json(doc_body(
            "users/u_1",
            json!({"name": {"stringValue": "Asha"}}),
        )))
        .mount(&server)
        .await;

    let client = mock_client(&server).await;
    let doc = client.get_document("users", "u_1").await.unwrap().unwrap();
    assert_eq!(doc.id(), Some("u_1"));
}

#[tokio::test]
async fn test_get_document_missing_is_none() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(404).set_body_string("not found"))
        .mount(&server)
        .await;

    let client = mock_client(&server).await;
    let doc = client.get_document("users", "missing").await.unwrap();
    assert!(doc.is_none());
}

#[tokio::test]
async fn test_create_document_conflict_maps_to_already_exists() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path(format!("{}/applications", DOCUMENTS_PATH)))
        .and(query_param("documentId", "a_j1_deadbeef"))
        .respond_with(ResponseTemplate::new(409).set_body_string("already exists"))
        .mount(&server)
        .await;

    let client = mock_client(&server).await;
    let mut fields = HashMap::new();
    fields.insert("email".to_string(), "x@example.com".to_firestore_value());
    let err = client
        .create_document("applications", "a_j1_deadbeef", fields)
        .await
        .unwrap_err();
    assert!(matches!(err, FirestoreError::AlreadyExists(_)));
}

#[tokio::test]
async fn test_update_document_sends_field_mask() {
    let server = MockServer::start().await;
    Mock::given(method("PATCH"))
        .and(path(format!("{}/job_posts/j_1", DOCUMENTS_PATH)))
        .and(query_param("updateMask.fieldPaths", "status"))
        .respond_with(ResponseTemplate::new(200).set_body_json(doc_body(
            "job_posts/j_1",
            json!({"status": {"stringValue": "closed"}}),
        )))
        .mount(&server)
        .await;

    let client = mock_client(&server).await;
    let mut fields = HashMap::new();
    fields.insert("status".to_string(), "closed".to_firestore_value());
    let doc = client
        .update_document("job_posts", "j_1", fields, &["status"])
        .await
        .unwrap();
    assert_eq!(doc.id(), Some("j_1"));
}

#[tokio::test]
async fn test_delete_missing_document_is_noop() {
    let server = MockServer::start().await;
    Mock::given(method("DELETE"))
        .respond_with(ResponseTemplate::new(404).set_body_string("not found"))
        .mount(&server)
        .await;

    let client = mock_client(&server).await;
    assert!(client.delete_document("job_posts", "gone").await.is_ok());
}

#[tokio::test]
async fn test_run_query_collects_documents() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path(format!("{}:runQuery", DOCUMENTS_PATH)))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([
            {"document": doc_body("job_posts/j_1", json!({"status": {"stringValue": "open"}}))},
            {"readTime": "2026-01-01T00:00:00Z"},
            {"document": doc_body("job_posts/j_2", json!({"status": {"stringValue": "open"}}))},
        ])))
        .mount(&server)
        .await;

    let client = mock_client(&server).await;
    let query = StructuredQuery::collection_where_eq(
        "job_posts",
        "status",
        Value::StringValue("open".into()),
    );
    let docs = client.run_query(query).await.unwrap();
    assert_eq!(docs.len(), 2);
    assert_eq!(docs[0].id(), Some("j_1"));
}

#[tokio::test]
async fn test_server_error_maps_to_retryable() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(503).set_body_string("unavailable"))
        .mount(&server)
        .await;

    let client = mock_client(&server).await;
    let err = client.get_document("users", "u_1").await.unwrap_err();
    assert!(matches!(err, FirestoreError::ServerError(503, _)));
    assert!(err.is_retryable());
}

// =============================================================================
// Config Tests
// =============================================================================

#[test]
#[serial]
fn test_config_requires_project_id() {
    std::env::remove_var("GCP_PROJECT_ID");
    assert!(FirestoreConfig::from_env().is_err());
}

#[test]
#[serial]
fn test_config_rejects_empty_project_id() {
    std::env::set_var("GCP_PROJECT_ID", "");
    assert!(FirestoreConfig::from_env().is_err());
    std::env::remove_var("GCP_PROJECT_ID");
}

#[test]
#[serial]
fn test_config_parses_timeout_env_vars() {
    std::env::set_var("GCP_PROJECT_ID", "test");
    std::env::set_var("FIRESTORE_CONNECT_TIMEOUT_SECS", "15");
    let config = FirestoreConfig::from_env().unwrap();
    assert_eq!(config.connect_timeout, Duration::from_secs(15));
    std::env::remove_var("GCP_PROJECT_ID");
    std::env::remove_var("FIRESTORE_CONNECT_TIMEOUT_SECS");
}

#[test]
#[serial]
fn test_config_handles_invalid_env_values() {
    std::env::set_var("GCP_PROJECT_ID", "test");
    std::env::set_var("FIRESTORE_CONNECT_TIMEOUT_SECS", "not-a-number");
    let config = FirestoreConfig::from_env().unwrap();
    assert_eq!(config.connect_timeout, Duration::from_secs(5));
    std::env::remove_var("GCP_PROJECT_ID");
    std::env::remove_var("FIRESTORE_CONNECT_TIMEOUT_SECS");
}

#[test]
#[serial]
fn test_config_picks_up_emulator_host() {
    std::env::set_var("GCP_PROJECT_ID", "test");
    std::env::set_var("FIRESTORE_EMULATOR_HOST", "localhost:8080");
    let config = FirestoreConfig::from_env().unwrap();
    assert_eq!(config.emulator_host.as_deref(), Some("localhost:8080"));
    std::env::remove_var("GCP_PROJECT_ID");
    std::env::remove_var("FIRESTORE_EMULATOR_HOST");
}
