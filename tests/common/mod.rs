//! Shared test utilities

#![allow(dead_code)]

use std::sync::Arc;
use std::time::Duration;

use axum::body::Body;
use axum::http::{Request, Response};
use companion_gateway::{ApiState, ModelRegistry, ProviderClient};
use secrecy::SecretString;
use wiremock::MockServer;

pub const TEST_API_KEY: &str = "test-key";

/// Provider client pointed at a mock server
#[must_use]
pub fn client_for(server: &MockServer) -> ProviderClient {
    ProviderClient::new(
        SecretString::from(TEST_API_KEY.to_string()),
        &server.uri(),
        Duration::from_secs(5),
    )
    .expect("failed to build test client")
}

/// Handler state using the default registry against a mock provider
#[must_use]
pub fn test_state(server: &MockServer) -> Arc<ApiState> {
    Arc::new(ApiState::new(
        &client_for(server),
        Arc::new(ModelRegistry::default()),
    ))
}

/// Full router with the embedded UI
#[must_use]
pub fn build_test_router(server: &MockServer) -> axum::Router {
    companion_gateway::api::router(test_state(server), None)
}

/// Responses-endpoint body carrying `text`
#[must_use]
pub fn reply_body(text: &str) -> serde_json::Value {
    serde_json::json!({
        "id": "resp_test",
        "object": "response",
        "status": "completed",
        "output": [{
            "type": "message",
            "id": "msg_test",
            "role": "assistant",
            "content": [{"type": "output_text", "text": text, "annotations": []}]
        }]
    })
}

/// Provider error body for an unknown model
#[must_use]
pub fn model_not_found_body(model: &str) -> serde_json::Value {
    serde_json::json!({
        "error": {
            "message": format!("The model `{model}` does not exist or you do not have access to it."),
            "type": "invalid_request_error",
            "param": null,
            "code": "model_not_found"
        }
    })
}

/// POST a JSON value
#[must_use]
pub fn post_json(uri: &str, body: &serde_json::Value) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri(uri)
        .header("Content-Type", "application/json")
        .body(Body::from(serde_json::to_vec(body).unwrap()))
        .unwrap()
}

/// POST raw bytes
#[must_use]
pub fn post_raw(uri: &str, content_type: &str, body: impl Into<Body>) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri(uri)
        .header("Content-Type", content_type)
        .body(body.into())
        .unwrap()
}

/// Read a response body as JSON
pub async fn json_body(response: Response<Body>) -> serde_json::Value {
    let body = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    serde_json::from_slice(&body).unwrap()
}
