//! Model registry and selection
//!
//! The registry maps a model kind (text, speech-to-text, text-to-speech) and
//! a tier to a concrete provider model identifier. It is built once at
//! startup from configuration and shared read-only afterwards.

use std::fmt;
use std::str::FromStr;

use serde::Serialize;

use crate::{Error, Result};

/// Key naming the speech-to-text fallback model
pub const STT_FALLBACK_KEY: &str = "OPENAI_STT_FALLBACK";

/// Key naming the text-to-speech fallback model
pub const TTS_FALLBACK_KEY: &str = "OPENAI_TTS_FALLBACK";

/// Category of model usage
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ModelKind {
    /// Text chat
    Text,
    /// Speech-to-text
    Stt,
    /// Text-to-speech
    Tts,
}

impl ModelKind {
    /// Canonical lowercase name
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Text => "text",
            Self::Stt => "stt",
            Self::Tts => "tts",
        }
    }
}

impl fmt::Display for ModelKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ModelKind {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "text" => Ok(Self::Text),
            "stt" => Ok(Self::Stt),
            "tts" => Ok(Self::Tts),
            other => Err(Error::Config(format!("unknown model kind: {other}"))),
        }
    }
}

/// Cost/quality level for text models
///
/// Unrecognised tier names resolve to [`Tier::Default`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Tier {
    Cheap,
    #[default]
    Default,
    Quality,
    OSeries,
}

impl Tier {
    /// Resolve a tier name; anything unknown is the default tier
    #[must_use]
    pub fn parse(name: &str) -> Self {
        match name {
            "cheap" => Self::Cheap,
            "quality" => Self::Quality,
            "o" => Self::OSeries,
            _ => Self::Default,
        }
    }

    /// Short name accepted by [`Tier::parse`]
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Cheap => "cheap",
            Self::Default => "default",
            Self::Quality => "quality",
            Self::OSeries => "o",
        }
    }
}

impl From<&str> for Tier {
    fn from(name: &str) -> Self {
        Self::parse(name)
    }
}

impl fmt::Display for Tier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Text model identifiers per tier
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TextModels {
    pub cheap: String,
    pub default: String,
    pub quality: String,
    pub o_series: String,
}

/// Audio model identifiers (STT or TTS)
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AudioModels {
    pub default: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub fallback: Option<String>,
}

/// Immutable mapping from (kind, tier) to model identifier
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ModelRegistry {
    pub text: TextModels,
    pub stt: AudioModels,
    pub tts: AudioModels,
}

impl Default for ModelRegistry {
    fn default() -> Self {
        Self::from_lookup(|_| None)
    }
}

impl ModelRegistry {
    /// Build the registry from a key lookup, using built-in defaults for
    /// missing or empty values
    ///
    /// Keys are the `OPENAI_*_MODEL*` names (e.g. `OPENAI_TEXT_MODEL_CHEAP`).
    /// An empty `OPENAI_STT_FALLBACK` / `OPENAI_TTS_FALLBACK` disables that
    /// fallback.
    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str, default: &str| {
            lookup(key)
                .filter(|v| !v.trim().is_empty())
                .unwrap_or_else(|| default.to_string())
        };
        let fallback = |key: &str, default: &str| match lookup(key) {
            Some(v) if v.trim().is_empty() => None,
            Some(v) => Some(v),
            None => Some(default.to_string()),
        };

        Self {
            text: TextModels {
                cheap: get("OPENAI_TEXT_MODEL_CHEAP", "gpt-4.1-nano"),
                default: get("OPENAI_TEXT_MODEL_DEFAULT", "gpt-4.1-mini"),
                quality: get("OPENAI_TEXT_MODEL_QUALITY", "gpt-4.1"),
                o_series: get("OPENAI_TEXT_MODEL_O", "gpt-4o"),
            },
            stt: AudioModels {
                default: get("OPENAI_STT_MODEL", "gpt-4o-transcribe"),
                fallback: fallback(STT_FALLBACK_KEY, "whisper-1"),
            },
            tts: AudioModels {
                default: get("OPENAI_TTS_MODEL", "gpt-4o-mini-tts"),
                fallback: fallback(TTS_FALLBACK_KEY, "tts-1"),
            },
        }
    }

    /// Resolve a typed (kind, tier) pair; tier only matters for text
    #[must_use]
    pub fn select(&self, kind: ModelKind, tier: Tier) -> &str {
        match kind {
            ModelKind::Text => match tier {
                Tier::Cheap => &self.text.cheap,
                Tier::Default => &self.text.default,
                Tier::Quality => &self.text.quality,
                Tier::OSeries => &self.text.o_series,
            },
            ModelKind::Stt => &self.stt.default,
            ModelKind::Tts => &self.tts.default,
        }
    }

    /// Resolve a model by kind and tier name; tier defaults to `default`
    ///
    /// # Errors
    ///
    /// Returns [`Error::Config`] naming the kind if it is not in the registry
    pub fn choose_model(&self, kind: &str, tier: Option<&str>) -> Result<&str> {
        let kind: ModelKind = kind.parse()?;
        let tier = tier.map_or(Tier::Default, Tier::parse);
        Ok(self.select(kind, tier))
    }

    /// Designated fallback for an audio kind, if one is configured
    #[must_use]
    pub fn audio_fallback(&self, kind: ModelKind) -> Option<&str> {
        match kind {
            ModelKind::Text => None,
            ModelKind::Stt => self.stt.fallback.as_deref(),
            ModelKind::Tts => self.tts.fallback.as_deref(),
        }
    }
}
