//! Voice processing module
//!
//! Speech-to-text and text-to-speech adapters over the provider API.

mod audio;
mod stt;
mod tts;

pub use audio::{AudioClip, AudioFormat, ProviderAudio, SpeechAudio};
pub use stt::{SpeechToText, TranscriptionResult};
pub use tts::{DEFAULT_VOICE, SpeechOptions, TextToSpeech};
