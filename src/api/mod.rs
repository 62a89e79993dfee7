//! HTTP API server for the companion gateway

pub mod chat;
pub mod health;
pub mod ui;
pub mod voice;

use std::path::PathBuf;
use std::sync::Arc;

use axum::Router;
use tokio::net::TcpListener;
use tower_http::cors::{Any, CorsLayer};
use tower_http::services::{ServeDir, ServeFile};
use tower_http::trace::TraceLayer;

use crate::Result;
use crate::chat::ChatAdapter;
use crate::config::Config;
use crate::models::{ModelRegistry, Tier};
use crate::provider::ProviderClient;
use crate::voice::{SpeechOptions, SpeechToText, TextToSpeech};

/// Shared state for API handlers
///
/// Every handler invocation is independent; the only shared data is the
/// read-only model registry and the adapters built around it.
#[derive(Debug, Clone)]
pub struct ApiState {
    pub models: Arc<ModelRegistry>,
    pub chat: ChatAdapter,
    pub stt: SpeechToText,
    pub tts: TextToSpeech,
    /// Tier for chat requests that do not name one
    pub chat_tier: Tier,
    /// Voice/format for speech requests
    pub speech: SpeechOptions,
}

impl ApiState {
    /// Build handler state from a client and registry, with default chat
    /// tier, no system instructions and default speech options
    #[must_use]
    pub fn new(client: &ProviderClient, models: Arc<ModelRegistry>) -> Self {
        Self {
            chat: ChatAdapter::new(client.clone(), models.clone()),
            stt: SpeechToText::new(client.clone(), models.clone()),
            tts: TextToSpeech::new(client.clone(), models.clone()),
            models,
            chat_tier: crate::chat::DEFAULT_CHAT_TIER,
            speech: SpeechOptions::default(),
        }
    }

    /// Build handler state from the loaded configuration
    ///
    /// # Errors
    ///
    /// Returns error if no provider API key is configured
    pub fn from_config(config: &Config) -> Result<Self> {
        let client = ProviderClient::from_config(&config.openai)?;
        let models = Arc::new(config.models.clone());

        let mut state = Self::new(&client, models);
        let instructions = config.chat.system_prompt.clone();
        state.chat = state.chat.with_instructions(instructions);
        state.stt = state.stt.with_language(config.voice.stt_language.clone());
        state.chat_tier = config.chat.tier;
        state.speech = config.voice.speech_options();
        Ok(state)
    }
}

/// Build the router with all routes
///
/// Serves the UI from `static_dir` when given, otherwise the embedded page.
pub fn router(state: Arc<ApiState>, static_dir: Option<&std::path::Path>) -> Router {
    let mut router = Router::new()
        .merge(chat::router(state.clone()))
        .merge(voice::router(state.clone()))
        .merge(health::router())
        .merge(health::models_router(state));

    if let Some(static_dir) = static_dir {
        let index_file = static_dir.join("index.html");
        let serve_dir = ServeDir::new(static_dir).not_found_service(ServeFile::new(&index_file));

        router = router.fallback_service(serve_dir);
        tracing::info!(path = %static_dir.display(), "serving static files");
    } else {
        router = router.merge(ui::router());
    }

    // CORS layer for cross-origin requests from frontend
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    router.layer(cors).layer(TraceLayer::new_for_http())
}

/// API server
pub struct ApiServer {
    state: Arc<ApiState>,
    port: u16,
    static_dir: Option<PathBuf>,
}

impl ApiServer {
    /// Create a server for prepared state
    #[must_use]
    pub const fn new(state: Arc<ApiState>, port: u16, static_dir: Option<PathBuf>) -> Self {
        Self {
            state,
            port,
            static_dir,
        }
    }

    /// Create a server from the loaded configuration
    ///
    /// # Errors
    ///
    /// Returns error if handler state cannot be built
    pub fn from_config(config: &Config) -> Result<Self> {
        let state = Arc::new(ApiState::from_config(config)?);
        Ok(Self::new(
            state,
            config.api_server.port,
            config.api_server.static_dir.clone(),
        ))
    }

    /// Run the API server until Ctrl-C
    ///
    /// # Errors
    ///
    /// Returns error if server fails to bind or run
    pub async fn run(self) -> Result<()> {
        let addr = format!("0.0.0.0:{}", self.port);
        let listener = TcpListener::bind(&addr)
            .await
            .map_err(|e| crate::Error::Config(format!("failed to bind API server: {e}")))?;

        tracing::info!(port = self.port, "API server listening");

        axum::serve(listener, router(self.state, self.static_dir.as_deref()))
            .with_graceful_shutdown(shutdown_signal())
            .await
            .map_err(|e| crate::Error::Config(format!("API server error: {e}")))?;

        tracing::info!("API server stopped");
        Ok(())
    }
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %e, "failed to listen for shutdown signal");
        std::future::pending::<()>().await;
    }
    tracing::info!("shutdown requested");
}
