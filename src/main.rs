use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::Arc;

use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use companion_gateway::{
    ApiServer, AudioClip, ChatAdapter, Config, ProviderClient, SpeechToText, TextToSpeech, Tier,
};

/// Companion - voice chat companion backend
#[derive(Parser)]
#[command(name = "companion", version, about)]
struct Cli {
    /// Path to a TOML config file
    #[arg(short, long, env = "COMPANION_CONFIG")]
    config: Option<PathBuf>,

    /// Increase verbosity (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand)]
enum Command {
    /// Run the HTTP server (default)
    Serve {
        /// Port to listen on (overrides config)
        #[arg(long)]
        port: Option<u16>,
    },
    /// Send one prompt to the chat model and print the reply
    Chat {
        /// Prompt text
        text: String,
        /// Model tier: cheap, default, quality, o
        #[arg(short, long)]
        tier: Option<String>,
    },
    /// Synthesize speech to a file
    Speak {
        /// Text to speak
        text: String,
        /// Output file
        #[arg(short, long, default_value = "speech.mp3")]
        out: PathBuf,
        /// Voice override
        #[arg(long)]
        voice: Option<String>,
    },
    /// Transcribe an audio file
    Transcribe {
        /// Audio file (wav, mp3, m4a, ogg, webm, flac)
        file: PathBuf,
    },
    /// Print the resolved model registry
    Models,
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    // Set up logging based on verbosity
    let filter = match cli.verbose {
        0 => "info,companion_gateway=info",
        1 => "info,companion_gateway=debug",
        2 => "debug",
        _ => "trace",
    };

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(filter)),
        )
        .init();

    match run(cli).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            tracing::error!("fatal: {e}");
            ExitCode::FAILURE
        }
    }
}

async fn run(cli: Cli) -> anyhow::Result<()> {
    let mut config = Config::load(cli.config.as_deref())?;
    tracing::debug!(?config, "loaded configuration");

    match cli.command.unwrap_or(Command::Serve { port: None }) {
        Command::Serve { port } => {
            if let Some(port) = port {
                config.api_server.port = port;
            }
            tracing::info!(
                port = config.api_server.port,
                chat_tier = %config.chat.tier,
                "starting companion gateway"
            );
            ApiServer::from_config(&config)?.run().await?;
        }
        Command::Chat { text, tier } => {
            let tier = tier.as_deref().map_or(config.chat.tier, Tier::parse);
            let chat = ChatAdapter::new(client(&config)?, Arc::new(config.models.clone()))
                .with_instructions(config.chat.system_prompt.clone());
            let result = chat.run_chat(&text, tier).await?;
            println!("{}", result.reply_text);
            tracing::debug!(model = %result.model, "reply model");
        }
        Command::Speak { text, out, voice } => {
            let mut options = config.voice.speech_options();
            if let Some(voice) = voice {
                options.voice = voice;
            }
            let tts = TextToSpeech::new(client(&config)?, Arc::new(config.models.clone()));
            let audio = tts.text_to_speech(&text, &options).await?;
            tokio::fs::write(&out, &audio.bytes).await?;
            println!(
                "wrote {} bytes of {} audio to {} (model {})",
                audio.bytes.len(),
                audio.format,
                out.display(),
                audio.model
            );
        }
        Command::Transcribe { file } => {
            let bytes = tokio::fs::read(&file).await?;
            let mime = file
                .extension()
                .and_then(|e| e.to_str())
                .map_or("audio/wav", AudioClip::mime_for_extension);
            let stt = SpeechToText::new(client(&config)?, Arc::new(config.models.clone()))
                .with_language(config.voice.stt_language.clone());
            let result = stt.speech_to_text(&AudioClip::new(bytes, mime)).await?;
            println!("{}", result.text);
        }
        Command::Models => {
            println!("{}", serde_json::to_string_pretty(&config.models)?);
        }
    }

    Ok(())
}

fn client(config: &Config) -> anyhow::Result<ProviderClient> {
    Ok(ProviderClient::from_config(&config.openai)?)
}
