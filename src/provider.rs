//! HTTP client for the model provider API

use std::time::Duration;

use secrecy::{ExposeSecret, SecretString};
use serde::Deserialize;

use crate::config::OpenAiConfig;
use crate::{Error, Result};

/// Default provider base URL
pub const DEFAULT_BASE_URL: &str = "https://api.openai.com/v1";

/// Provider error envelope: `{"error": {"message", "type", "code"}}`
#[derive(Deserialize)]
struct ErrorEnvelope {
    error: ErrorDetail,
}

#[derive(Deserialize)]
struct ErrorDetail {
    #[serde(default)]
    code: Option<serde_json::Value>,
}

/// Authenticated client shared by the chat and speech adapters
#[derive(Clone)]
pub struct ProviderClient {
    http: reqwest::Client,
    api_key: SecretString,
    base_url: String,
}

impl std::fmt::Debug for ProviderClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ProviderClient")
            .field("base_url", &self.base_url)
            .finish_non_exhaustive()
    }
}

impl ProviderClient {
    /// Create a client for the given base URL
    ///
    /// # Errors
    ///
    /// Returns error if the API key is empty or the HTTP client cannot be built
    pub fn new(api_key: SecretString, base_url: &str, timeout: Duration) -> Result<Self> {
        if api_key.expose_secret().trim().is_empty() {
            return Err(Error::Config("provider API key required".to_string()));
        }

        let http = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| Error::Config(format!("failed to create HTTP client: {e}")))?;

        Ok(Self {
            http,
            api_key,
            base_url: base_url.trim_end_matches('/').to_string(),
        })
    }

    /// Create a client from the provider section of the configuration
    ///
    /// # Errors
    ///
    /// Returns error if no API key is configured
    pub fn from_config(config: &OpenAiConfig) -> Result<Self> {
        let api_key = config
            .api_key
            .clone()
            .ok_or_else(|| Error::Config("OPENAI_API_KEY is not set".to_string()))?;
        Self::new(api_key, &config.base_url, config.timeout)
    }

    /// Base URL requests are issued against
    #[must_use]
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn endpoint(&self, path: &str) -> String {
        format!("{}/{}", self.base_url, path.trim_start_matches('/'))
    }

    /// Start an authenticated POST to a provider path
    pub(crate) fn post(&self, path: &str) -> reqwest::RequestBuilder {
        self.http
            .post(self.endpoint(path))
            .bearer_auth(self.api_key.expose_secret())
    }

    /// Send a request issued for `model`, turning transport failures and
    /// non-2xx replies into [`Error::Upstream`]
    pub(crate) async fn send(
        &self,
        model: &str,
        request: reqwest::RequestBuilder,
    ) -> Result<reqwest::Response> {
        let response = request.send().await.map_err(|e| {
            tracing::error!(model, error = %e, "provider request failed");
            Error::transport(model, &e)
        })?;

        let status = response.status();
        tracing::debug!(model, status = %status, "received provider response");

        if status.is_success() {
            return Ok(response);
        }

        let payload = response.text().await.unwrap_or_default();
        let code = provider_error_code(&payload);
        tracing::error!(
            model,
            status = %status,
            code = code.as_deref().unwrap_or("-"),
            body = %payload,
            "provider API error"
        );

        Err(Error::Upstream {
            model: model.to_string(),
            status: Some(status.as_u16()),
            code,
            payload,
        })
    }
}

/// Extract the provider error code from an error body, if present
fn provider_error_code(payload: &str) -> Option<String> {
    let envelope: ErrorEnvelope = serde_json::from_str(payload).ok()?;
    match envelope.error.code? {
        serde_json::Value::String(code) => Some(code),
        serde_json::Value::Null => None,
        other => Some(other.to_string()),
    }
}
