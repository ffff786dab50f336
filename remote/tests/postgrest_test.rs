//! PostgREST client against a mock server.
#![allow(clippy::unwrap_used, clippy::expect_used)]

use futures::StreamExt;
use serde_json::json;
use todo_sync_remote::{
    ChangeEvent, ChangeFeed, ChangeKind, NewTodoRow, OrderBy, PostgrestClient, RemoteConfig,
    RemoteError, TodoPatch, TodoTable,
};
use wiremock::matchers::{body_json, header, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

const KEY: &str = "anon-key";

fn client(server: &MockServer) -> PostgrestClient {
    PostgrestClient::new(RemoteConfig::new(server.uri(), KEY).unwrap())
}

fn row(id: &str, text: &str) -> serde_json::Value {
    json!({
        "id": id,
        "created_at": "2025-01-01T00:00:00Z",
        "text": text,
        "content": "",
        "completed": false,
        "user_id": null
    })
}

#[tokio::test]
async fn select_all_orders_newest_first_and_authenticates() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/rest/v1/todos"))
        .and(query_param("select", "*"))
        .and(query_param("order", "created_at.desc"))
        .and(header("apikey", KEY))
        .and(header("Authorization", "Bearer anon-key"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([row("2", "B"), row("1", "A")])))
        .expect(1)
        .mount(&server)
        .await;

    let rows = client(&server).select_all(OrderBy::default()).await.unwrap().unwrap();

    let texts: Vec<_> = rows.iter().map(|row| row.text.as_str()).collect();
    assert_eq!(texts, ["B", "A"]);
}

#[tokio::test]
async fn select_all_null_body_is_no_data() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/rest/v1/todos"))
        .respond_with(ResponseTemplate::new(200).set_body_string("null"))
        .mount(&server)
        .await;

    let rows = client(&server).select_all(OrderBy::default()).await.unwrap();
    assert_eq!(rows, None);
}

#[tokio::test]
async fn select_all_surfaces_server_errors() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/rest/v1/todos"))
        .respond_with(ResponseTemplate::new(500).set_body_string("boom"))
        .mount(&server)
        .await;

    let err = client(&server).select_all(OrderBy::default()).await.unwrap_err();
    assert_eq!(
        err,
        RemoteError::Api {
            status: 500,
            message: "boom".to_string()
        }
    );
}

#[tokio::test]
async fn select_all_rejects_malformed_rows() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/rest/v1/todos"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([{ "id": 1 }])))
        .mount(&server)
        .await;

    let err = client(&server).select_all(OrderBy::default()).await.unwrap_err();
    assert!(matches!(err, RemoteError::Decode(_)));
}

#[tokio::test]
async fn insert_posts_rows_and_echoes_changes() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/rest/v1/todos"))
        .and(header("Prefer", "return=representation"))
        .and(body_json(json!([{ "text": "A", "content": "<p>a</p>", "completed": false }])))
        .respond_with(ResponseTemplate::new(201).set_body_json(json!([row("1", "A")])))
        .expect(1)
        .mount(&server)
        .await;

    let client = client(&server);
    let mut changes = client.subscribe();
    let rows = client.insert(vec![NewTodoRow::new("A", "<p>a</p>")]).await.unwrap();

    assert_eq!(rows.len(), 1);
    assert_eq!(rows[0].id, "1");
    assert_eq!(changes.next().await.unwrap(), ChangeEvent::row(ChangeKind::Insert, "1"));
}

#[tokio::test]
async fn insert_constraint_violation_is_rejected() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/rest/v1/todos"))
        .respond_with(ResponseTemplate::new(400).set_body_json(json!({
            "code": "23514",
            "message": "new row violates check constraint"
        })))
        .mount(&server)
        .await;

    let err = client(&server).insert(vec![NewTodoRow::new("", "")]).await.unwrap_err();
    assert!(matches!(err, RemoteError::Rejected(message) if message.contains("23514")));
}

#[tokio::test]
async fn update_patches_by_id() {
    let server = MockServer::start().await;
    Mock::given(method("PATCH"))
        .and(path("/rest/v1/todos"))
        .and(query_param("id", "eq.1"))
        .and(body_json(json!({ "completed": true })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([row("1", "A")])))
        .expect(1)
        .mount(&server)
        .await;

    let client = client(&server);
    let mut changes = client.subscribe();
    client.update("1", TodoPatch::completed(true)).await.unwrap();

    assert_eq!(changes.next().await.unwrap(), ChangeEvent::row(ChangeKind::Update, "1"));
}

#[tokio::test]
async fn delete_matching_nothing_succeeds_without_echo() {
    let server = MockServer::start().await;
    Mock::given(method("DELETE"))
        .and(path("/rest/v1/todos"))
        .and(query_param("id", "eq.missing"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([])))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("DELETE"))
        .and(path("/rest/v1/todos"))
        .and(query_param("id", "eq.1"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([row("1", "A")])))
        .expect(1)
        .mount(&server)
        .await;

    let client = client(&server);
    let mut changes = client.subscribe();
    client.delete("missing").await.unwrap();
    client.delete("1").await.unwrap();

    // only the second delete touched a row
    assert_eq!(changes.next().await.unwrap(), ChangeEvent::row(ChangeKind::Delete, "1"));
}

#[tokio::test]
async fn unavailable_store_is_reported() {
    let server = MockServer::start().await;
    Mock::given(method("DELETE"))
        .respond_with(ResponseTemplate::new(503).set_body_string("maintenance"))
        .mount(&server)
        .await;

    let err = client(&server).delete("1").await.unwrap_err();
    assert_eq!(err, RemoteError::Unavailable("maintenance".to_string()));
}
