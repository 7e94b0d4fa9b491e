//! # Message Tests

use super::*;
use axum::http::StatusCode;
use lib_core::dto::{MessageResponse, SendMessageResponse, SessionResponse};
use lib_core::model::MessageRole;
use serde_json::json;
use std::time::Duration;
use tower::ServiceExt;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

async fn new_session(app: &Router, user: &str, model: &str) -> i64 {
    let response = app
        .clone()
        .oneshot(json_request(
            "POST",
            "/api/sessions",
            Some(user),
            Some(json!({ "name": "Chat", "model": model })),
        ))
        .await
        .unwrap();
    let session: SessionResponse = read_json(response).await;
    session.id
}

async fn send(app: &Router, user: &str, session_id: i64, body: Value) -> Response<Body> {
    app.clone()
        .oneshot(json_request(
            "POST",
            &format!("/api/sessions/{}/messages", session_id),
            Some(user),
            Some(body),
        ))
        .await
        .unwrap()
}

async fn list(app: &Router, user: &str, session_id: i64) -> Vec<MessageResponse> {
    let response = app
        .clone()
        .oneshot(json_request(
            "GET",
            &format!("/api/sessions/{}/messages", session_id),
            Some(user),
            None,
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    read_json(response).await
}

#[tokio::test]
async fn test_send_stores_message_and_gemini_reply_appears() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/models/gemini-2.0-flash:generateContent"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "candidates": [{ "content": { "parts": [{ "text": "Removing a top predator reshapes the food web." }] } }]
        })))
        .expect(1)
        .mount(&server)
        .await;

    let ai = AiConfig {
        google_api_key: Some("test-key".into()),
        gemini_api_base: server.uri(),
        ..AiConfig::default()
    };
    let app = test_app(test_state(ai).await);
    let session_id = new_session(&app, "alice", "gemini-2.0-flash").await;

    let response = send(&app, "alice", session_id, json!({ "content": "What is a trophic cascade?" })).await;
    assert_eq!(response.status(), StatusCode::CREATED);
    let sent: SendMessageResponse = read_json(response).await;

    let mut messages = Vec::new();
    for _ in 0..100 {
        messages = list(&app, "alice", session_id).await;
        if messages.len() == 2 {
            break;
        }
        tokio::time::sleep(Duration::from_millis(20)).await;
    }

    assert_eq!(messages.len(), 2);
    assert_eq!(messages[0].id, sent.message_id);
    assert_eq!(messages[0].role, MessageRole::User);
    assert_eq!(messages[0].author_id.as_deref(), Some("alice"));
    assert_eq!(messages[1].role, MessageRole::Assistant);
    assert_eq!(messages[1].content, "Removing a top predator reshapes the food web.");
    assert_eq!(messages[1].references, Some(vec![]));
}

#[tokio::test]
async fn test_failed_run_leaves_only_user_message() {
    // No API key configured: the provider call fails and the run is dropped
    let app = test_app(test_state(AiConfig::default()).await);
    let session_id = new_session(&app, "alice", "gpt-4o").await;

    let response = send(&app, "alice", session_id, json!({ "content": "hello" })).await;
    assert_eq!(response.status(), StatusCode::CREATED);

    tokio::time::sleep(Duration::from_millis(100)).await;

    let messages = list(&app, "alice", session_id).await;
    assert_eq!(messages.len(), 1);
    assert_eq!(messages[0].content, "hello");
}

#[tokio::test]
async fn test_empty_message_rejected() {
    let app = test_app(test_state(AiConfig::default()).await);
    let session_id = new_session(&app, "alice", "gpt-4o").await;

    let response = send(&app, "alice", session_id, json!({ "content": "  " })).await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    let response = send(&app, "alice", session_id, json!({ "content": "", "fileIds": [] })).await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_overlong_message_rejected() {
    let app = test_app(test_state(AiConfig::default()).await);
    let session_id = new_session(&app, "alice", "gpt-4o").await;

    let response = send(&app, "alice", session_id, json!({ "content": "a".repeat(10_001) })).await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    assert!(list(&app, "alice", session_id).await.is_empty());
}

#[tokio::test]
async fn test_unknown_file_rejected() {
    let app = test_app(test_state(AiConfig::default()).await);
    let session_id = new_session(&app, "alice", "gemini-2.0-flash").await;

    let response = send(&app, "alice", session_id, json!({ "content": "look", "fileIds": ["missing"] })).await;

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_foreign_session_messages_hidden() {
    let app = test_app(test_state(AiConfig::default()).await);
    let session_id = new_session(&app, "alice", "gpt-4o").await;

    let response = send(&app, "bob", session_id, json!({ "content": "sneaky" })).await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);

    let response = app
        .oneshot(json_request(
            "GET",
            &format!("/api/sessions/{}/messages", session_id),
            Some("bob"),
            None,
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}
