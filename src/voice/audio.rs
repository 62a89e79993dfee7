//! Audio payload types shared by the speech adapters

use std::fmt;
use std::str::FromStr;

use base64::Engine;
use bytes::{Bytes, BytesMut};
use futures::StreamExt;
use futures::stream::BoxStream;
use serde::{Deserialize, Serialize};

use crate::{Error, Result};

/// Encoded audio formats the speech endpoint can return
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AudioFormat {
    #[default]
    Mp3,
    Opus,
    Aac,
    Flac,
    Wav,
    Pcm,
}

impl AudioFormat {
    /// Name used in provider requests
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Mp3 => "mp3",
            Self::Opus => "opus",
            Self::Aac => "aac",
            Self::Flac => "flac",
            Self::Wav => "wav",
            Self::Pcm => "pcm",
        }
    }

    /// MIME type for data URIs and HTTP responses
    #[must_use]
    pub const fn mime_type(self) -> &'static str {
        match self {
            Self::Mp3 => "audio/mpeg",
            Self::Opus => "audio/opus",
            Self::Aac => "audio/aac",
            Self::Flac => "audio/flac",
            Self::Wav => "audio/wav",
            Self::Pcm => "audio/pcm",
        }
    }
}

impl fmt::Display for AudioFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for AudioFormat {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "mp3" => Ok(Self::Mp3),
            "opus" => Ok(Self::Opus),
            "aac" => Ok(Self::Aac),
            "flac" => Ok(Self::Flac),
            "wav" => Ok(Self::Wav),
            "pcm" => Ok(Self::Pcm),
            other => Err(Error::Config(format!("unsupported audio format: {other}"))),
        }
    }
}

/// Synthesized speech, fully buffered
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SpeechAudio {
    pub bytes: Bytes,
    pub format: AudioFormat,
    /// Model that produced the audio
    pub model: String,
}

impl SpeechAudio {
    /// Encode as a `data:<mime>;base64,...` URI
    #[must_use]
    pub fn data_uri(&self) -> String {
        let encoded = base64::engine::general_purpose::STANDARD.encode(&self.bytes);
        format!("data:{};base64,{encoded}", self.format.mime_type())
    }
}

/// Audio body as delivered by the provider
///
/// Bodies with a declared length are read in one piece; chunked bodies are
/// kept as a stream. [`ProviderAudio::collect`] is the only way to turn
/// either into bytes.
pub enum ProviderAudio {
    Buffered(Bytes),
    Streamed(BoxStream<'static, reqwest::Result<Bytes>>),
}

impl fmt::Debug for ProviderAudio {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Buffered(bytes) => f.debug_tuple("Buffered").field(&bytes.len()).finish(),
            Self::Streamed(_) => f.write_str("Streamed(..)"),
        }
    }
}

impl ProviderAudio {
    /// Classify a successful provider response
    ///
    /// # Errors
    ///
    /// Returns error if a length-delimited body cannot be read
    pub async fn from_response(response: reqwest::Response) -> reqwest::Result<Self> {
        if response.content_length().is_some() {
            Ok(Self::Buffered(response.bytes().await?))
        } else {
            Ok(Self::Streamed(response.bytes_stream().boxed()))
        }
    }

    /// Drain into a single contiguous buffer
    ///
    /// # Errors
    ///
    /// Returns error if a stream chunk fails
    pub async fn collect(self) -> reqwest::Result<Bytes> {
        match self {
            Self::Buffered(bytes) => Ok(bytes),
            Self::Streamed(mut stream) => {
                let mut buf = BytesMut::new();
                while let Some(chunk) = stream.next().await {
                    buf.extend_from_slice(&chunk?);
                }
                Ok(buf.freeze())
            }
        }
    }
}

/// Recorded audio to be transcribed
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AudioClip {
    pub bytes: Bytes,
    pub mime_type: String,
}

impl AudioClip {
    /// Wrap raw bytes with their MIME type
    pub fn new(bytes: impl Into<Bytes>, mime_type: impl Into<String>) -> Self {
        Self {
            bytes: bytes.into(),
            mime_type: mime_type.into(),
        }
    }

    /// Guess the MIME type from a file extension, defaulting to WAV
    #[must_use]
    pub fn mime_for_extension(ext: &str) -> &'static str {
        match ext.to_ascii_lowercase().as_str() {
            "mp3" | "mpga" | "mpeg" => "audio/mpeg",
            "m4a" | "mp4" => "audio/mp4",
            "ogg" | "oga" => "audio/ogg",
            "webm" => "audio/webm",
            "flac" => "audio/flac",
            _ => "audio/wav",
        }
    }

    /// Upload file name; the provider infers the container from its extension
    #[must_use]
    pub fn file_name(&self) -> &'static str {
        let essence = self.mime_type.split(';').next().unwrap_or_default().trim();
        match essence {
            "audio/mpeg" | "audio/mp3" => "audio.mp3",
            "audio/mp4" | "audio/m4a" | "audio/x-m4a" => "audio.m4a",
            "audio/ogg" => "audio.ogg",
            "audio/webm" | "video/webm" => "audio.webm",
            "audio/flac" => "audio.flac",
            _ => "audio.wav",
        }
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }
}
