//! # Handler Tests
//!
//! Drive the full router (auth, middleware, handlers) with `oneshot`
//! against an in-memory database.

mod messages;
mod sessions;

use crate::server::{create_router, AppState};
use axum::body::Body;
use axum::http::{Request, Response};
use axum::Router;
use lib_ai::{build_orchestrator, AiConfig, Dispatcher};
use lib_auth::encode_jwt;
use lib_core::{create_memory_pool, Config};
use serde::de::DeserializeOwned;
use serde_json::Value;
use std::sync::Arc;

pub const TEST_SECRET: &str = "test-secret-key-must-be-at-least-32-characters-long!";

/// Create test config
pub fn test_config() -> Config {
    Config {
        database_url: "sqlite::memory:".to_string(),
        jwt_secret: TEST_SECRET.to_string(),
        public_base_url: "http://127.0.0.1:3001".to_string(),
        max_upload_bytes: 1024,
        upload_url_ttl_minutes: 30,
    }
}

/// App state over a fresh in-memory database.
pub async fn test_state(ai: AiConfig) -> AppState {
    let db = create_memory_pool().await.expect("Failed to create test database");
    let config = test_config();
    let orchestrator = build_orchestrator(db.clone(), &config, &ai).expect("Failed to build orchestrator");

    AppState {
        db,
        config,
        dispatcher: Arc::new(Dispatcher::new(Arc::new(orchestrator))),
    }
}

pub fn test_app(state: AppState) -> Router {
    create_router(state, &[])
}

pub fn bearer(user_id: &str) -> String {
    let token = encode_jwt(user_id, None, TEST_SECRET, 1).expect("Failed to encode test token");
    format!("Bearer {}", token)
}

/// JSON request, authenticated as `user` when given.
pub fn json_request(method: &str, uri: &str, user: Option<&str>, body: Option<Value>) -> Request<Body> {
    let mut builder = Request::builder().method(method).uri(uri);
    if let Some(user) = user {
        builder = builder.header("authorization", bearer(user));
    }
    match body {
        Some(body) => builder
            .header("content-type", "application/json")
            .body(Body::from(body.to_string()))
            .unwrap(),
        None => builder.body(Body::empty()).unwrap(),
    }
}

pub async fn read_json<T: DeserializeOwned>(response: Response<Body>) -> T {
    let body = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    serde_json::from_slice(&body).unwrap()
}
