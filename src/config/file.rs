//! TOML configuration file loading
//!
//! Supports `~/.config/companion/config.toml` (or `COMPANION_CONFIG`) as a
//! persistent config source. All fields are optional: the file is a partial
//! overlay on top of built-in defaults, and environment variables win over it.

use std::path::{Path, PathBuf};

use serde::Deserialize;

use crate::Result;

/// Top-level TOML configuration file schema
#[derive(Debug, Default, Deserialize)]
pub struct CompanionConfigFile {
    /// Provider credentials and endpoint
    #[serde(default)]
    pub openai: OpenAiFileConfig,

    /// Model identifiers per kind and tier
    #[serde(default)]
    pub models: ModelsFileConfig,

    /// Chat behaviour
    #[serde(default)]
    pub chat: ChatFileConfig,

    /// Voice/audio configuration
    #[serde(default)]
    pub voice: VoiceFileConfig,

    /// HTTP server configuration
    #[serde(default)]
    pub server: ServerFileConfig,
}

#[derive(Debug, Default, Deserialize)]
pub struct OpenAiFileConfig {
    pub api_key: Option<String>,
    pub base_url: Option<String>,
    pub timeout_secs: Option<u64>,
}

#[derive(Debug, Default, Deserialize)]
pub struct ModelsFileConfig {
    #[serde(default)]
    pub text: TextModelsFileConfig,
    #[serde(default)]
    pub stt: AudioModelsFileConfig,
    #[serde(default)]
    pub tts: AudioModelsFileConfig,
}

#[derive(Debug, Default, Deserialize)]
pub struct TextModelsFileConfig {
    pub cheap: Option<String>,
    pub default: Option<String>,
    pub quality: Option<String>,
    pub o_series: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
pub struct AudioModelsFileConfig {
    pub default: Option<String>,
    pub fallback: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
pub struct ChatFileConfig {
    /// Tier used when a request does not name one
    pub tier: Option<String>,
    pub system_prompt: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
pub struct VoiceFileConfig {
    pub tts_voice: Option<String>,
    pub tts_format: Option<String>,
    pub stt_language: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
pub struct ServerFileConfig {
    pub port: Option<u16>,
    pub static_dir: Option<String>,
}

impl CompanionConfigFile {
    /// Value the file sets for an environment key
    #[must_use]
    pub fn get(&self, key: &str) -> Option<String> {
        match key {
            "OPENAI_API_KEY" => self.openai.api_key.clone(),
            "OPENAI_BASE_URL" => self.openai.base_url.clone(),
            "COMPANION_REQUEST_TIMEOUT_SECS" => self.openai.timeout_secs.map(|v| v.to_string()),
            "OPENAI_TEXT_MODEL_CHEAP" => self.models.text.cheap.clone(),
            "OPENAI_TEXT_MODEL_DEFAULT" => self.models.text.default.clone(),
            "OPENAI_TEXT_MODEL_QUALITY" => self.models.text.quality.clone(),
            "OPENAI_TEXT_MODEL_O" => self.models.text.o_series.clone(),
            "OPENAI_STT_MODEL" => self.models.stt.default.clone(),
            "OPENAI_STT_FALLBACK" => self.models.stt.fallback.clone(),
            "OPENAI_TTS_MODEL" => self.models.tts.default.clone(),
            "OPENAI_TTS_FALLBACK" => self.models.tts.fallback.clone(),
            "COMPANION_CHAT_TIER" => self.chat.tier.clone(),
            "COMPANION_SYSTEM_PROMPT" => self.chat.system_prompt.clone(),
            "COMPANION_TTS_VOICE" => self.voice.tts_voice.clone(),
            "COMPANION_TTS_FORMAT" => self.voice.tts_format.clone(),
            "COMPANION_STT_LANGUAGE" => self.voice.stt_language.clone(),
            "COMPANION_PORT" => self.server.port.map(|p| p.to_string()),
            "COMPANION_STATIC_DIR" => self.server.static_dir.clone(),
            _ => None,
        }
    }
}

/// Load the TOML config file from `path`, or the standard path when `None`
///
/// Returns `CompanionConfigFile::default()` if the file doesn't exist or can't
/// be parsed.
pub fn load_config_file(path: Option<&Path>) -> CompanionConfigFile {
    let Some(path) = path.map(Path::to_path_buf).or_else(config_file_path) else {
        return CompanionConfigFile::default();
    };

    if !path.exists() {
        return CompanionConfigFile::default();
    }

    match read_config_file(&path) {
        Ok(config) => {
            tracing::info!(path = %path.display(), "loaded config file");
            config
        }
        Err(e) => {
            tracing::warn!(
                path = %path.display(),
                error = %e,
                "failed to load config file, using defaults"
            );
            CompanionConfigFile::default()
        }
    }
}

/// Read and parse a TOML config file
///
/// # Errors
///
/// Returns [`crate::Error::Io`] if the file cannot be read and
/// [`crate::Error::Toml`] if it is not valid config TOML
pub fn read_config_file(path: &Path) -> Result<CompanionConfigFile> {
    let content = std::fs::read_to_string(path)?;
    Ok(toml::from_str(&content)?)
}

/// Return the config file path: `~/.config/companion/config.toml`
pub fn config_file_path() -> Option<PathBuf> {
    directories::BaseDirs::new().map(|d| d.config_dir().join("companion").join("config.toml"))
}
