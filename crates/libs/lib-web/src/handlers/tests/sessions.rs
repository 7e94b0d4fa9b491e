//! # Session Tests

use super::*;
use axum::http::StatusCode;
use lib_core::dto::SessionResponse;
use lib_core::model::SessionMode;
use serde_json::json;
use tower::ServiceExt;

async fn create(app: &Router, user: &str, name: &str, model: &str) -> Response<Body> {
    app.clone()
        .oneshot(json_request(
            "POST",
            "/api/sessions",
            Some(user),
            Some(json!({ "name": name, "model": model, "mode": "normal" })),
        ))
        .await
        .unwrap()
}

#[tokio::test]
async fn test_create_and_list_newest_first() {
    let app = test_app(test_state(AiConfig::default()).await);

    let response = create(&app, "alice", "Wetlands", "gemini-2.0-flash").await;
    assert_eq!(response.status(), StatusCode::CREATED);
    let first: SessionResponse = read_json(response).await;
    assert_eq!(first.name, "Wetlands");
    assert_eq!(first.model, "gemini-2.0-flash");
    assert_eq!(first.mode, SessionMode::Normal);

    let second: SessionResponse = read_json(create(&app, "alice", "Coral reefs", "gpt-4o").await).await;
    create(&app, "bob", "Bob's chat", "gpt-4o").await;

    let response = app
        .clone()
        .oneshot(json_request("GET", "/api/sessions", Some("alice"), None))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let sessions: Vec<SessionResponse> = read_json(response).await;
    let ids: Vec<i64> = sessions.iter().map(|s| s.id).collect();
    assert_eq!(ids, vec![second.id, first.id]);
}

#[tokio::test]
async fn test_deep_research_is_advanced() {
    let app = test_app(test_state(AiConfig::default()).await);

    let response = app
        .oneshot(json_request(
            "POST",
            "/api/sessions",
            Some("alice"),
            Some(json!({ "name": "Research", "model": "gemini-2.5-pro", "mode": "deep_research" })),
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::CREATED);
    let session: SessionResponse = read_json(response).await;
    assert_eq!(session.mode, SessionMode::Advanced);
}

#[tokio::test]
async fn test_unsupported_model_rejected() {
    let app = test_app(test_state(AiConfig::default()).await);

    let response = create(&app, "alice", "Llamas", "llama-3").await;

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let body: Value = read_json(response).await;
    assert_eq!(body["code"], "InvalidInput");
}

#[tokio::test]
async fn test_blank_name_rejected() {
    let app = test_app(test_state(AiConfig::default()).await);

    let response = create(&app, "alice", "   ", "gpt-4o").await;

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_missing_token_is_unauthorized() {
    let app = test_app(test_state(AiConfig::default()).await);

    let response = app
        .oneshot(json_request("GET", "/api/sessions", None, None))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    let body: Value = read_json(response).await;
    assert_eq!(body["code"], "Unauthorized");
}

#[tokio::test]
async fn test_token_with_wrong_secret_is_unauthorized() {
    let app = test_app(test_state(AiConfig::default()).await);
    let token = encode_jwt("alice", None, "another-secret-that-is-also-32-chars-long", 1).unwrap();

    let response = app
        .oneshot(
            Request::builder()
                .uri("/api/sessions")
                .header("authorization", format!("Bearer {}", token))
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_foreign_session_is_not_found() {
    let app = test_app(test_state(AiConfig::default()).await);
    let session: SessionResponse = read_json(create(&app, "alice", "Private", "gpt-4o").await).await;

    let response = app
        .clone()
        .oneshot(json_request("GET", &format!("/api/sessions/{}", session.id), Some("bob"), None))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::NOT_FOUND);

    let response = app
        .oneshot(json_request("GET", &format!("/api/sessions/{}", session.id), Some("alice"), None))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
}

#[tokio::test]
async fn test_models_health_and_fallback() {
    let app = test_app(test_state(AiConfig::default()).await);

    let response = app
        .clone()
        .oneshot(json_request("GET", "/api/models", Some("alice"), None))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let models: Vec<Value> = read_json(response).await;
    assert_eq!(models.len(), 4);
    assert_eq!(models[0]["id"], "gemini-2.0-flash");

    let response = app
        .clone()
        .oneshot(json_request("GET", "/health", None, None))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    assert!(response.headers().contains_key("x-request-id"));

    let response = app
        .oneshot(json_request("GET", "/api/nope", Some("alice"), None))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
    let body: Value = read_json(response).await;
    assert_eq!(body["code"], "NotFound");
}
