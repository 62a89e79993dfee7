//! Companion Gateway - voice chat companion backend
//!
//! A browser captures speech, posts the transcript here, and gets back a
//! reply from a language model (optionally as synthesized speech):
//! - Model registry and selection by kind and tier
//! - Chat, speech-to-text and text-to-speech adapters with a single
//!   primary-to-fallback model retry
//! - HTTP edge handlers and the embedded browser client
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────┐
//! │          Browser (speech recognition, he-IL)         │
//! └────────────────────┬────────────────────────────────┘
//!                      │  POST /chat  /speak  /transcribe
//! ┌────────────────────▼────────────────────────────────┐
//! │                 Edge handlers (api)                  │
//! └────────────────────┬────────────────────────────────┘
//!                      │
//! ┌────────────────────▼────────────────────────────────┐
//! │   Chat  │  STT  │  TTS   ── ModelRegistry + fallback │
//! └────────────────────┬────────────────────────────────┘
//!                      │
//! ┌────────────────────▼────────────────────────────────┐
//! │              Model provider HTTP API                 │
//! └─────────────────────────────────────────────────────┘
//! ```

pub mod api;
pub mod chat;
pub mod config;
pub mod error;
pub mod fallback;
pub mod models;
pub mod provider;
pub mod voice;

pub use api::{ApiServer, ApiState};
pub use chat::{ChatAdapter, ChatResult};
pub use config::Config;
pub use error::{Error, Result};
pub use fallback::{is_fallback_eligible, with_fallback};
pub use models::{ModelKind, ModelRegistry, Tier};
pub use provider::ProviderClient;
pub use voice::{
    AudioClip, AudioFormat, SpeechAudio, SpeechOptions, SpeechToText, TextToSpeech,
    TranscriptionResult,
};
