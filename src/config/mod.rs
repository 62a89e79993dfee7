//! Configuration management for the companion gateway
//!
//! All settings are resolved once, at startup, into a single [`Config`]
//! value. Sources in priority order: environment variables, the optional
//! TOML file (see [`file`]), built-in defaults.

pub mod file;

use std::path::{Path, PathBuf};
use std::time::Duration;

use secrecy::SecretString;

use crate::chat::{DEFAULT_CHAT_TIER, DEFAULT_SYSTEM_PROMPT};
use crate::models::{ModelRegistry, STT_FALLBACK_KEY, TTS_FALLBACK_KEY, Tier};
use crate::provider::DEFAULT_BASE_URL;
use crate::voice::{AudioFormat, DEFAULT_VOICE, SpeechOptions};
use crate::{Error, Result};

/// Default HTTP port
pub const DEFAULT_PORT: u16 = 8888;

/// Default provider request timeout
pub const DEFAULT_TIMEOUT_SECS: u64 = 60;

/// Default transcription language hint
pub const DEFAULT_STT_LANGUAGE: &str = "he";

/// Companion gateway configuration
#[derive(Debug, Clone)]
pub struct Config {
    /// Provider credentials and endpoint
    pub openai: OpenAiConfig,

    /// Model registry, immutable after load
    pub models: ModelRegistry,

    /// Chat configuration
    pub chat: ChatConfig,

    /// Voice configuration
    pub voice: VoiceConfig,

    /// HTTP API server configuration
    pub api_server: ApiServerConfig,
}

/// Provider API configuration
#[derive(Debug, Clone)]
pub struct OpenAiConfig {
    /// API key (`OPENAI_API_KEY`)
    pub api_key: Option<SecretString>,

    /// Base URL, e.g. `https://api.openai.com/v1`
    pub base_url: String,

    /// Per-request timeout enforced by the HTTP client
    pub timeout: Duration,
}

/// Chat configuration
#[derive(Debug, Clone)]
pub struct ChatConfig {
    /// Tier used when a request does not name one
    pub tier: Tier,

    /// System instructions sent with every prompt
    pub system_prompt: String,
}

/// Voice processing configuration
#[derive(Debug, Clone)]
pub struct VoiceConfig {
    /// TTS voice identifier
    pub tts_voice: String,

    /// TTS output encoding
    pub tts_format: AudioFormat,

    /// Language hint for transcription
    pub stt_language: Option<String>,
}

impl VoiceConfig {
    /// Synthesis options derived from this configuration
    #[must_use]
    pub fn speech_options(&self) -> SpeechOptions {
        SpeechOptions {
            voice: self.tts_voice.clone(),
            format: self.tts_format,
        }
    }
}

/// HTTP API server configuration
#[derive(Debug, Clone)]
pub struct ApiServerConfig {
    /// Port to listen on
    pub port: u16,

    /// Path to static files directory (web UI); embedded UI when unset
    pub static_dir: Option<PathBuf>,
}

impl Config {
    /// Load configuration from the environment and the config file
    ///
    /// `path` overrides the config file location; otherwise
    /// `COMPANION_CONFIG` or the standard path is used.
    ///
    /// # Errors
    ///
    /// Returns error if a value cannot be parsed
    pub fn load(path: Option<&Path>) -> Result<Self> {
        Self::load_with(path, |key| std::env::var(key).ok())
    }

    /// Load configuration from `env` layered over the config file
    ///
    /// A blank `env` value falls through to the file, except for the
    /// fallback model keys where it disables that fallback.
    ///
    /// # Errors
    ///
    /// Returns error if a value cannot be parsed
    pub fn load_with<E>(path: Option<&Path>, env: E) -> Result<Self>
    where
        E: Fn(&str) -> Option<String>,
    {
        let path = path.map(Path::to_path_buf).or_else(|| {
            env("COMPANION_CONFIG")
                .filter(|p| !p.trim().is_empty())
                .map(PathBuf::from)
        });
        let config_file = file::load_config_file(path.as_deref());

        Self::from_lookup(|key| match env(key) {
            Some(value) if !value.trim().is_empty() || keeps_empty_value(key) => Some(value),
            _ => config_file.get(key),
        })
    }

    /// Load configuration from environment variables only
    ///
    /// # Errors
    ///
    /// Returns error if a value cannot be parsed
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Resolve configuration from an arbitrary key lookup
    ///
    /// Empty values count as unset, except for the STT/TTS fallback keys
    /// where an empty value disables the fallback.
    ///
    /// # Errors
    ///
    /// Returns error if a value cannot be parsed
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        let timeout_secs = parse_key(&get, "COMPANION_REQUEST_TIMEOUT_SECS")?
            .unwrap_or(DEFAULT_TIMEOUT_SECS);
        let openai = OpenAiConfig {
            api_key: get("OPENAI_API_KEY").map(SecretString::from),
            base_url: get("OPENAI_BASE_URL").unwrap_or_else(|| DEFAULT_BASE_URL.to_string()),
            timeout: Duration::from_secs(timeout_secs),
        };

        let models = ModelRegistry::from_lookup(&lookup);

        let chat = ChatConfig {
            tier: get("COMPANION_CHAT_TIER").map_or(DEFAULT_CHAT_TIER, |t| Tier::parse(t.trim())),
            system_prompt: get("COMPANION_SYSTEM_PROMPT")
                .unwrap_or_else(|| DEFAULT_SYSTEM_PROMPT.to_string()),
        };

        let voice = VoiceConfig {
            tts_voice: get("COMPANION_TTS_VOICE").unwrap_or_else(|| DEFAULT_VOICE.to_string()),
            tts_format: get("COMPANION_TTS_FORMAT")
                .map(|f| f.parse::<AudioFormat>())
                .transpose()?
                .unwrap_or_default(),
            stt_language: Some(
                get("COMPANION_STT_LANGUAGE").unwrap_or_else(|| DEFAULT_STT_LANGUAGE.to_string()),
            ),
        };

        let port = match parse_key(&get, "COMPANION_PORT")? {
            Some(port) => port,
            None => parse_key(&get, "PORT")?.unwrap_or(DEFAULT_PORT),
        };
        let api_server = ApiServerConfig {
            port,
            static_dir: get("COMPANION_STATIC_DIR").map(PathBuf::from),
        };

        Ok(Self {
            openai,
            models,
            chat,
            voice,
            api_server,
        })
    }
}

/// Keys whose empty value means "disabled" rather than unset
fn keeps_empty_value(key: &str) -> bool {
    matches!(key, STT_FALLBACK_KEY | TTS_FALLBACK_KEY)
}

/// Parse an optional numeric key, naming the key on failure
fn parse_key<T, F>(get: &F, key: &str) -> Result<Option<T>>
where
    T: std::str::FromStr,
    T::Err: std::fmt::Display,
    F: Fn(&str) -> Option<String>,
{
    get(key)
        .map(|v| {
            v.trim()
                .parse()
                .map_err(|e| Error::Config(format!("invalid {key} value {v:?}: {e}")))
        })
        .transpose()
}
