//! Chat adapter over the provider's responses endpoint

use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::fallback::with_fallback;
use crate::models::{ModelKind, ModelRegistry, Tier};
use crate::provider::ProviderClient;
use crate::{Error, Result};

/// Default companion persona: a warm, patient Hebrew-speaking chatbot
/// for an elderly user
pub const DEFAULT_SYSTEM_PROMPT: &str = "את צ'אטבוטית חמה, סבלנית ויצירתית שמלווה אישה בת 85. \
דברי בעברית פשוטה, במשפטים קצרים ובטון מעודד ונעים. שלבי מעט הומור עדין. \
את אוהבת ציור, סיפורים חיוביים, ומדע וחדשנות בניסוח נגיש.";

/// Tier used when the caller does not pick one
pub const DEFAULT_CHAT_TIER: Tier = Tier::Cheap;

/// Reply produced by the chat adapter
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ChatResult {
    pub reply_text: String,
    /// Model that produced the reply
    pub model: String,
}

#[derive(Serialize)]
struct ResponsesRequest<'a> {
    model: &'a str,
    input: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    instructions: Option<&'a str>,
}

#[derive(Deserialize)]
struct ResponsesReply {
    #[serde(default)]
    output_text: Option<String>,
    #[serde(default)]
    output: Vec<OutputItem>,
}

#[derive(Deserialize)]
struct OutputItem {
    #[serde(rename = "type")]
    kind: String,
    #[serde(default)]
    content: Vec<ContentPart>,
}

#[derive(Deserialize)]
struct ContentPart {
    #[serde(rename = "type")]
    kind: String,
    #[serde(default)]
    text: Option<String>,
}

impl ResponsesReply {
    /// Concatenated text output, if the reply carries any
    fn into_text(self) -> Option<String> {
        if let Some(text) = self.output_text.filter(|t| !t.is_empty()) {
            return Some(text);
        }

        let text: String = self
            .output
            .into_iter()
            .filter(|item| item.kind == "message")
            .flat_map(|item| item.content)
            .filter(|part| part.kind == "output_text")
            .filter_map(|part| part.text)
            .collect();

        (!text.is_empty()).then_some(text)
    }
}

/// Sends a prompt to a text model and returns the reply
#[derive(Debug, Clone)]
pub struct ChatAdapter {
    client: ProviderClient,
    models: Arc<ModelRegistry>,
    instructions: Option<String>,
}

impl ChatAdapter {
    /// Create a chat adapter with no system instructions
    #[must_use]
    pub const fn new(client: ProviderClient, models: Arc<ModelRegistry>) -> Self {
        Self {
            client,
            models,
            instructions: None,
        }
    }

    /// Set the system instructions sent with every prompt
    #[must_use]
    pub fn with_instructions(mut self, instructions: impl Into<String>) -> Self {
        let instructions = instructions.into();
        self.instructions = (!instructions.trim().is_empty()).then_some(instructions);
        self
    }

    /// Run a prompt against the model for `tier`
    ///
    /// On a model-unavailable failure the default-tier model is tried once,
    /// unless it is the model that just failed.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Upstream`] if the request (and any fallback) fails
    pub async fn run_chat(&self, prompt: &str, tier: Tier) -> Result<ChatResult> {
        let primary = self.models.select(ModelKind::Text, tier);
        let fallback = self.models.select(ModelKind::Text, Tier::Default);

        tracing::debug!(tier = %tier, primary, fallback, "running chat");

        with_fallback(primary, Some(fallback), |model| {
            self.respond(model, prompt)
        })
        .await
    }

    async fn respond(&self, model: String, prompt: &str) -> Result<ChatResult> {
        let request = ResponsesRequest {
            model: &model,
            input: prompt,
            instructions: self.instructions.as_deref(),
        };

        tracing::debug!(model = %model, prompt_chars = prompt.chars().count(), "sending prompt");

        let response = self
            .client
            .send(&model, self.client.post("responses").json(&request))
            .await?;

        let reply: ResponsesReply = response.json().await.map_err(|e| {
            tracing::error!(model = %model, error = %e, "failed to parse chat response");
            Error::invalid_response(&model, e.to_string())
        })?;

        let Some(reply_text) = reply.into_text() else {
            tracing::error!(model = %model, "chat response contained no text");
            return Err(Error::invalid_response(&model, "empty response"));
        };

        tracing::info!(
            model = %model,
            reply_chars = reply_text.chars().count(),
            "chat reply received"
        );
        Ok(ChatResult { reply_text, model })
    }
}
