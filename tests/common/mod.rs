use std::sync::Arc;

use axum::body::Body;
use axum::http::{header, Request};
use http_body_util::BodyExt;
use uuid::Uuid;

use mento_api::auth::jwt::create_access_token;
use mento_api::auth::middleware::AuthUser;
use mento_api::config::Config;
use mento_api::db::MemoryGateway;
use mento_api::{create_router, AppState};

/// Create a test app backed by the in-memory gateway.
/// Returns the router, the shared state and a handle on the gateway.
#[allow(dead_code)]
pub fn create_test_app() -> (axum::Router, AppState, MemoryGateway) {
    let gateway = MemoryGateway::new();
    let state = AppState::new(Arc::new(gateway.clone()), Config::test_default());
    (create_router(state.clone()), state, gateway)
}

#[allow(dead_code)]
pub fn identity(email: &str) -> AuthUser {
    AuthUser {
        id: Uuid::new_v4(),
        email: Some(email.to_string()),
    }
}

/// Bearer token for `user`, valid for an hour.
#[allow(dead_code)]
pub fn bearer(user: &AuthUser, config: &Config) -> String {
    let token = create_access_token(user.id, user.email.as_deref(), 3600, config)
        .expect("token should be minted");
    format!("Bearer {}", token)
}

#[allow(dead_code)]
pub fn json_request(method: &str, uri: &str, auth: &str, body: serde_json::Value) -> Request<Body> {
    Request::builder()
        .method(method)
        .uri(uri)
        .header(header::AUTHORIZATION, auth)
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(body.to_string()))
        .unwrap()
}

#[allow(dead_code)]
pub fn empty_request(method: &str, uri: &str, auth: &str) -> Request<Body> {
    Request::builder()
        .method(method)
        .uri(uri)
        .header(header::AUTHORIZATION, auth)
        .body(Body::empty())
        .unwrap()
}

#[allow(dead_code)]
pub async fn body_json(response: axum::response::Response) -> serde_json::Value {
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    serde_json::from_slice(&bytes).unwrap()
}
