//! Chat endpoint

use std::sync::Arc;

use axum::{
    Json, Router,
    body::Bytes,
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::post,
};
use serde::{Deserialize, Serialize};

use super::ApiState;
use crate::Error;
use crate::models::Tier;

/// Build chat router
pub fn router(state: Arc<ApiState>) -> Router {
    Router::new().route("/chat", post(chat)).with_state(state)
}

/// Chat request
#[derive(Debug, Default, Deserialize)]
pub struct ChatRequest {
    #[serde(default)]
    pub text: Option<String>,
    /// Optional tier name (`cheap`, `default`, `quality`, `o`)
    #[serde(default)]
    pub tier: Option<String>,
}

/// Chat response
#[derive(Debug, Serialize)]
pub struct ChatResponse {
    pub reply: String,
}

/// Parse a JSON request body; an empty body is an empty object
pub(crate) fn parse_body<T>(body: &[u8]) -> crate::Result<T>
where
    T: serde::de::DeserializeOwned + Default,
{
    if body.iter().all(u8::is_ascii_whitespace) {
        return Ok(T::default());
    }
    Ok(serde_json::from_slice(body)?)
}

/// Require a non-blank text field
pub(crate) fn required_text(text: Option<String>) -> crate::Result<String> {
    text.filter(|t| !t.trim().is_empty())
        .ok_or_else(|| Error::Validation("missing text".to_string()))
}

/// Send recognised speech to the chat model
async fn chat(
    State(state): State<Arc<ApiState>>,
    body: Bytes,
) -> Result<Json<ChatResponse>, ChatError> {
    let request: ChatRequest = parse_body(&body)?;
    let text = required_text(request.text)?;
    let tier = request.tier.as_deref().map_or(state.chat_tier, Tier::parse);

    tracing::info!(tier = %tier, chars = text.chars().count(), "chat request");

    let result = state.chat.run_chat(&text, tier).await?;
    Ok(Json(ChatResponse {
        reply: result.reply_text,
    }))
}

/// Chat API errors
#[derive(Debug)]
pub enum ChatError {
    BadRequest(String),
    Failed(String),
}

impl From<Error> for ChatError {
    fn from(err: Error) -> Self {
        match err {
            Error::Validation(msg) => Self::BadRequest(msg),
            other => {
                tracing::error!(
                    model = other.model().unwrap_or("-"),
                    error = %other,
                    "chat failed"
                );
                Self::Failed(other.to_string())
            }
        }
    }
}

impl IntoResponse for ChatError {
    fn into_response(self) -> Response {
        match self {
            Self::BadRequest(error) => (
                StatusCode::BAD_REQUEST,
                Json(serde_json::json!({ "error": error })),
            )
                .into_response(),
            Self::Failed(details) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(serde_json::json!({ "error": "chat_failure", "details": details })),
            )
                .into_response(),
        }
    }
}
