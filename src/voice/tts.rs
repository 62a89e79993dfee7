//! Text-to-speech (TTS) processing

use std::sync::Arc;

use super::{AudioFormat, ProviderAudio, SpeechAudio};
use crate::fallback::with_fallback;
use crate::models::{ModelKind, ModelRegistry, Tier};
use crate::provider::ProviderClient;
use crate::{Error, Result};

/// Default synthesis voice
pub const DEFAULT_VOICE: &str = "alloy";

/// Voice and encoding for a synthesis request
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SpeechOptions {
    pub voice: String,
    pub format: AudioFormat,
}

impl Default for SpeechOptions {
    fn default() -> Self {
        Self {
            voice: DEFAULT_VOICE.to_string(),
            format: AudioFormat::Mp3,
        }
    }
}

/// Synthesizes speech from text
#[derive(Debug, Clone)]
pub struct TextToSpeech {
    client: ProviderClient,
    models: Arc<ModelRegistry>,
}

impl TextToSpeech {
    /// Create a new TTS adapter
    #[must_use]
    pub const fn new(client: ProviderClient, models: Arc<ModelRegistry>) -> Self {
        Self { client, models }
    }

    /// Synthesize text to speech
    ///
    /// Uses the registry's TTS model, retrying once with the TTS fallback
    /// when the primary is unavailable. The provider body is always fully
    /// buffered before returning.
    ///
    /// # Errors
    ///
    /// Returns error if synthesis fails or yields no audio
    pub async fn text_to_speech(&self, text: &str, options: &SpeechOptions) -> Result<SpeechAudio> {
        let primary = self.models.select(ModelKind::Tts, Tier::Default);
        let fallback = self.models.audio_fallback(ModelKind::Tts);

        with_fallback(primary, fallback, |model| {
            self.synthesize(model, text, options)
        })
        .await
    }

    async fn synthesize(
        &self,
        model: String,
        text: &str,
        options: &SpeechOptions,
    ) -> Result<SpeechAudio> {
        #[derive(serde::Serialize)]
        struct SpeechRequest<'a> {
            model: &'a str,
            input: &'a str,
            voice: &'a str,
            response_format: &'a str,
        }

        let request = SpeechRequest {
            model: &model,
            input: text,
            voice: &options.voice,
            response_format: options.format.as_str(),
        };

        tracing::debug!(
            model = %model,
            voice = %options.voice,
            format = %options.format,
            chars = text.chars().count(),
            "starting synthesis"
        );

        let response = self
            .client
            .send(&model, self.client.post("audio/speech").json(&request))
            .await?;

        let audio = match ProviderAudio::from_response(response).await {
            Ok(audio) => audio.collect().await,
            Err(e) => Err(e),
        }
        .map_err(|e| {
            tracing::error!(model = %model, error = %e, "failed to read synthesized audio");
            Error::transport(&model, &e)
        })?;

        if audio.is_empty() {
            return Err(Error::invalid_response(&model, "empty audio body"));
        }

        tracing::info!(model = %model, audio_bytes = audio.len(), "synthesis complete");
        Ok(SpeechAudio {
            bytes: audio,
            format: options.format,
            model,
        })
    }
}
