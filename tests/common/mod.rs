#![allow(dead_code)]

use std::sync::Arc;

use axum::body::Body;
use axum::http::header::{AUTHORIZATION, CONTENT_TYPE};
use axum::http::{Method, Request, Response, StatusCode};
use axum::Router;
use serde_json::{json, Value};
use tower::ServiceExt;

use todo_api::config::{Config, StorageBackend};
use todo_api::routes;
use todo_api::state::AppState;

pub const TEST_PASSWORD: &str = "password123";

/// Test config backed by the in-memory store, with a cheap bcrypt cost.
pub fn test_config() -> Config {
    Config {
        database_url: String::new(),
        storage: StorageBackend::Memory,
        jwt_secret: "test-secret".to_string(),
        jwt_expire_hours: 24,
        bcrypt_cost: 4,
        host: "127.0.0.1".to_string(),
        port: 0,
        run_seeder: false,
    }
}

/// Full application router over a fresh in-memory store.
pub fn build_test_app() -> Router {
    routes::router(AppState::in_memory(Arc::new(test_config())))
}

/// Send a request with an optional JSON body and bearer token.
pub async fn send(
    app: Router,
    method: Method,
    uri: &str,
    body: Option<Value>,
    token: Option<&str>,
) -> Response<Body> {
    let mut builder = Request::builder().method(method).uri(uri);
    if let Some(token) = token {
        builder = builder.header(AUTHORIZATION, format!("Bearer {token}"));
    }
    let request = match body {
        Some(body) => builder
            .header(CONTENT_TYPE, "application/json")
            .body(Body::from(body.to_string())),
        None => builder.body(Body::empty()),
    }
    .unwrap();
    app.oneshot(request).await.unwrap()
}

pub async fn get(app: Router, uri: &str) -> Response<Body> {
    send(app, Method::GET, uri, None, None).await
}

pub async fn get_auth(app: Router, uri: &str, token: &str) -> Response<Body> {
    send(app, Method::GET, uri, None, Some(token)).await
}

pub async fn post_json(app: Router, uri: &str, body: Value) -> Response<Body> {
    send(app, Method::POST, uri, Some(body), None).await
}

pub async fn post_json_auth(app: Router, uri: &str, body: Value, token: &str) -> Response<Body> {
    send(app, Method::POST, uri, Some(body), Some(token)).await
}

pub async fn body_json(response: Response<Body>) -> Value {
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    serde_json::from_slice(&bytes).unwrap()
}

/// Register `username` and log in, returning the bearer token.
pub async fn register_and_login(app: &Router, username: &str) -> String {
    let email = format!("{username}@example.com");
    let response = post_json(
        app.clone(),
        "/api/v1/auth/register",
        json!({ "email": email, "username": username, "password": TEST_PASSWORD }),
    )
    .await;
    assert_eq!(response.status(), StatusCode::CREATED);

    let response = post_json(
        app.clone(),
        "/api/v1/auth/login",
        json!({ "email": email, "password": TEST_PASSWORD }),
    )
    .await;
    assert_eq!(response.status(), StatusCode::OK);
    let body = body_json(response).await;
    body["data"]["token"].as_str().unwrap().to_string()
}
