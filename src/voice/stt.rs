//! Speech-to-text (STT) processing

use std::sync::Arc;

use serde::Serialize;

use super::AudioClip;
use crate::fallback::with_fallback;
use crate::models::{ModelKind, ModelRegistry, Tier};
use crate::provider::ProviderClient;
use crate::{Error, Result};

/// Response from the transcription API
#[derive(serde::Deserialize)]
struct TranscriptionResponse {
    text: String,
}

/// Transcript of a recorded clip
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TranscriptionResult {
    pub text: String,
    /// Model that produced the transcript
    pub model: String,
}

/// Transcribes speech to text
#[derive(Debug, Clone)]
pub struct SpeechToText {
    client: ProviderClient,
    models: Arc<ModelRegistry>,
    language: Option<String>,
}

impl SpeechToText {
    /// Create a new STT adapter
    #[must_use]
    pub const fn new(client: ProviderClient, models: Arc<ModelRegistry>) -> Self {
        Self {
            client,
            models,
            language: None,
        }
    }

    /// Hint the spoken language (ISO-639-1, e.g. "he")
    #[must_use]
    pub fn with_language(mut self, language: Option<String>) -> Self {
        self.language = language.filter(|l| !l.trim().is_empty());
        self
    }

    /// Transcribe audio to text
    ///
    /// Uses the registry's STT model, retrying once with the STT fallback
    /// when the primary is unavailable.
    ///
    /// # Errors
    ///
    /// Returns error if the clip is empty or transcription fails
    pub async fn speech_to_text(&self, clip: &AudioClip) -> Result<TranscriptionResult> {
        if clip.is_empty() {
            return Err(Error::Validation("missing audio".to_string()));
        }

        let primary = self.models.select(ModelKind::Stt, Tier::Default);
        let fallback = self.models.audio_fallback(ModelKind::Stt);

        with_fallback(primary, fallback, |model| self.transcribe(model, clip)).await
    }

    async fn transcribe(&self, model: String, clip: &AudioClip) -> Result<TranscriptionResult> {
        tracing::debug!(
            model = %model,
            audio_bytes = clip.bytes.len(),
            mime = %clip.mime_type,
            "starting transcription"
        );

        let part = reqwest::multipart::Part::bytes(clip.bytes.to_vec())
            .file_name(clip.file_name())
            .mime_str(&clip.mime_type)
            .map_err(|e| Error::Validation(format!("invalid audio MIME type: {e}")))?;

        let mut form = reqwest::multipart::Form::new()
            .part("file", part)
            .text("model", model.clone());
        if let Some(language) = &self.language {
            form = form.text("language", language.clone());
        }

        let response = self
            .client
            .send(
                &model,
                self.client.post("audio/transcriptions").multipart(form),
            )
            .await?;

        let result: TranscriptionResponse = response.json().await.map_err(|e| {
            tracing::error!(model = %model, error = %e, "failed to parse transcription response");
            Error::invalid_response(&model, e.to_string())
        })?;

        tracing::info!(model = %model, transcript = %result.text, "transcription complete");
        Ok(TranscriptionResult {
            text: result.text,
            model,
        })
    }
}
