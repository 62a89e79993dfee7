//! Voice API endpoints for text-to-speech and speech-to-text

use std::sync::Arc;

use axum::{
    Json, Router,
    body::Bytes,
    extract::State,
    http::{HeaderMap, StatusCode, header},
    response::{IntoResponse, Response},
    routing::post,
};
use serde::{Deserialize, Serialize};

use super::ApiState;
use super::chat::{parse_body, required_text};
use crate::Error;
use crate::voice::{AudioClip, AudioFormat, SpeechOptions};

/// Build voice router
pub fn router(state: Arc<ApiState>) -> Router {
    Router::new()
        .route("/speak", post(speak))
        .route("/transcribe", post(transcribe))
        .with_state(state)
}

/// Synthesis request
#[derive(Debug, Default, Deserialize)]
pub struct SpeakRequest {
    #[serde(default)]
    pub text: Option<String>,
    /// Voice override
    #[serde(default)]
    pub voice: Option<String>,
}

/// Synthesis response: MP3 audio as a data URI
#[derive(Debug, Serialize)]
pub struct SpeakResponse {
    pub mp3: String,
}

/// Synthesize text to speech
///
/// Always requests MP3 so the data URI matches the `mp3` field.
async fn speak(
    State(state): State<Arc<ApiState>>,
    body: Bytes,
) -> Result<Json<SpeakResponse>, VoiceError> {
    let request: SpeakRequest = parse_body(&body).map_err(VoiceError::synthesis)?;
    let text = required_text(request.text).map_err(VoiceError::synthesis)?;

    let options = SpeechOptions {
        voice: request
            .voice
            .filter(|v| !v.trim().is_empty())
            .unwrap_or_else(|| state.speech.voice.clone()),
        format: AudioFormat::Mp3,
    };

    tracing::info!(voice = %options.voice, chars = text.chars().count(), "speak request");

    let audio = state
        .tts
        .text_to_speech(&text, &options)
        .await
        .map_err(VoiceError::synthesis)?;

    Ok(Json(SpeakResponse {
        mp3: audio.data_uri(),
    }))
}

/// Transcription response
#[derive(Debug, Serialize)]
pub struct TranscribeResponse {
    pub text: String,
}

/// Transcribe audio to text
///
/// The raw request body is the audio; its `Content-Type` is forwarded as the
/// upload MIME type (WAV when absent).
async fn transcribe(
    State(state): State<Arc<ApiState>>,
    headers: HeaderMap,
    body: Bytes,
) -> Result<Json<TranscribeResponse>, VoiceError> {
    let mime_type = headers
        .get(header::CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .filter(|v| v.starts_with("audio/") || v.starts_with("video/"))
        .unwrap_or("audio/wav");

    let clip = AudioClip::new(body, mime_type);

    tracing::info!(audio_bytes = clip.bytes.len(), mime = %clip.mime_type, "transcribe request");

    let result = state
        .stt
        .speech_to_text(&clip)
        .await
        .map_err(VoiceError::transcription)?;

    Ok(Json(TranscribeResponse { text: result.text }))
}

/// Voice API errors
#[derive(Debug)]
pub enum VoiceError {
    BadRequest(String),
    SynthesisFailed,
    TranscriptionFailed(String),
}

impl VoiceError {
    fn synthesis(err: Error) -> Self {
        match err {
            Error::Validation(msg) => Self::BadRequest(msg),
            other => {
                tracing::error!(
                    model = other.model().unwrap_or("-"),
                    error = %other,
                    "speech synthesis failed"
                );
                Self::SynthesisFailed
            }
        }
    }

    fn transcription(err: Error) -> Self {
        match err {
            Error::Validation(msg) => Self::BadRequest(msg),
            other => {
                tracing::error!(
                    model = other.model().unwrap_or("-"),
                    error = %other,
                    "transcription failed"
                );
                Self::TranscriptionFailed(other.to_string())
            }
        }
    }
}

impl IntoResponse for VoiceError {
    fn into_response(self) -> Response {
        let (status, body) = match self {
            Self::BadRequest(error) => {
                (StatusCode::BAD_REQUEST, serde_json::json!({ "error": error }))
            }
            Self::SynthesisFailed => (
                StatusCode::INTERNAL_SERVER_ERROR,
                serde_json::json!({ "error": "tts failure" }),
            ),
            Self::TranscriptionFailed(details) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                serde_json::json!({ "error": "stt failure", "details": details }),
            ),
        };

        (status, Json(body)).into_response()
    }
}
