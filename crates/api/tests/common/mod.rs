//! Shared helpers for the HTTP integration tests.

#![allow(dead_code)]

use std::sync::Arc;

use axum::body::Body;
use axum::http::{Request, Response};
use axum::Router;
use http_body_util::BodyExt;
use serde_json::Value;
use sqlx::PgPool;
use tower::ServiceExt;

use deckhub_api::auth::jwt::{generate_access_token, JwtConfig};
use deckhub_api::config::ServerConfig;
use deckhub_api::router::build_app_router;
use deckhub_api::state::AppState;
use deckhub_core::types::DbId;
use deckhub_db::models::user::CreateUser;
use deckhub_db::repositories::UserRepo;

const TEST_JWT_SECRET: &str = "integration-test-secret-long-enough-for-hmac";

/// Build a test `ServerConfig` with safe defaults.
pub fn test_config() -> ServerConfig {
    ServerConfig {
        host: "127.0.0.1".to_string(),
        port: 0,
        cors_origins: vec!["http://localhost:5173".to_string()],
        request_timeout_secs: 30,
        shutdown_timeout_secs: 30,
        database_url: String::new(),
        jwt: JwtConfig {
            secret: TEST_JWT_SECRET.to_string(),
            access_token_expiry_mins: 60,
        },
    }
}

/// Build the application router, with the production middleware stack,
/// over the given pool.
pub fn build_test_app(pool: PgPool) -> Router {
    let config = test_config();
    let state = AppState {
        pool,
        config: Arc::new(config.clone()),
    };
    build_app_router(state, &config)
}

/// Insert a user and mint an access token for it.
pub async fn create_user(pool: &PgPool, username: &str, role: &str) -> (DbId, String) {
    let user = UserRepo::create(
        pool,
        &CreateUser {
            username: username.to_string(),
            role: Some(role.to_string()),
        },
    )
    .await
    .unwrap();
    let token = generate_access_token(user.id, &user.role, &test_config().jwt).unwrap();
    (user.id, token)
}

// ---------------------------------------------------------------------------
// Request helpers
// ---------------------------------------------------------------------------

async fn send(
    app: Router,
    method: &str,
    uri: &str,
    token: Option<&str>,
    body: Option<Value>,
) -> Response<Body> {
    let mut builder = Request::builder().method(method).uri(uri);
    if let Some(token) = token {
        builder = builder.header("authorization", format!("Bearer {token}"));
    }
    let request = match body {
        Some(json) => builder
            .header("content-type", "application/json")
            .body(Body::from(json.to_string()))
            .unwrap(),
        None => builder.body(Body::empty()).unwrap(),
    };
    app.oneshot(request).await.unwrap()
}

pub async fn get(app: Router, uri: &str, token: Option<&str>) -> Response<Body> {
    send(app, "GET", uri, token, None).await
}

pub async fn post_json(app: Router, uri: &str, token: &str, body: Value) -> Response<Body> {
    send(app, "POST", uri, Some(token), Some(body)).await
}

pub async fn post_empty(app: Router, uri: &str, token: &str) -> Response<Body> {
    send(app, "POST", uri, Some(token), None).await
}

pub async fn put_json(app: Router, uri: &str, token: &str, body: Value) -> Response<Body> {
    send(app, "PUT", uri, Some(token), Some(body)).await
}

pub async fn delete(app: Router, uri: &str, token: &str) -> Response<Body> {
    send(app, "DELETE", uri, Some(token), None).await
}

/// Collect a response body as JSON.
pub async fn body_json(response: Response<Body>) -> Value {
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    serde_json::from_slice(&bytes).unwrap()
}

// ---------------------------------------------------------------------------
// Fixtures
// ---------------------------------------------------------------------------

/// Create a Front/Back note model and a deck using it. Returns the deck id.
pub async fn create_deck(pool: &PgPool, token: &str, name: &str) -> DbId {
    let model = body_json(
        post_json(
            build_test_app(pool.clone()),
            "/api/v1/note-models",
            token,
            serde_json::json!({ "name": format!("{name} model") }),
        )
        .await,
    )
    .await;
    let model_id = model["data"]["id"].as_i64().unwrap();

    let deck = body_json(
        post_json(
            build_test_app(pool.clone()),
            "/api/v1/decks",
            token,
            serde_json::json!({ "name": name, "note_model_id": model_id }),
        )
        .await,
    )
    .await;
    deck["data"]["id"].as_i64().unwrap()
}

/// Add a note to a deck. Returns the response body's `data`.
pub async fn add_note(pool: &PgPool, token: &str, deck_id: DbId, front: &str, back: &str) -> Value {
    let response = post_json(
        build_test_app(pool.clone()),
        &format!("/api/v1/decks/{deck_id}/notes"),
        token,
        serde_json::json!({ "fields": { "Front": front, "Back": back } }),
    )
    .await;
    assert_eq!(response.status(), axum::http::StatusCode::CREATED);
    body_json(response).await["data"].clone()
}
