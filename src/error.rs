//! Error types for the companion gateway

use thiserror::Error;

/// Result type alias for gateway operations
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur in the companion gateway
#[derive(Debug, Error)]
pub enum Error {
    /// Configuration error (unknown model kind, missing credential, bad value)
    #[error("configuration error: {0}")]
    Config(String),

    /// A required request field is missing or empty
    #[error("validation error: {0}")]
    Validation(String),

    /// The model provider rejected the request or could not be reached
    #[error(
        "upstream request failed for model {model}{}: {payload}",
        .status.map_or_else(String::new, |s| format!(" (status {s})"))
    )]
    Upstream {
        /// Model the failing request was issued with
        model: String,
        /// HTTP status, absent for transport failures
        status: Option<u16>,
        /// Provider error code (e.g. `model_not_found`)
        code: Option<String>,
        /// Raw error payload as returned by the provider
        payload: String,
    },

    /// IO error
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    /// Serialization error
    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// TOML parsing error
    #[error("toml error: {0}")]
    Toml(#[from] toml::de::Error),
}

impl Error {
    /// Upstream failure that never produced an HTTP status
    pub(crate) fn transport(model: &str, err: &reqwest::Error) -> Self {
        Self::Upstream {
            model: model.to_string(),
            status: None,
            code: None,
            payload: err.to_string(),
        }
    }

    /// Upstream reply that arrived but could not be used
    pub(crate) fn invalid_response(model: &str, payload: impl Into<String>) -> Self {
        Self::Upstream {
            model: model.to_string(),
            status: None,
            code: Some("invalid_response".to_string()),
            payload: payload.into(),
        }
    }

    /// Model named by an upstream failure, if any
    #[must_use]
    pub fn model(&self) -> Option<&str> {
        match self {
            Self::Upstream { model, .. } => Some(model),
            _ => None,
        }
    }
}
