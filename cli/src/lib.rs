//! `wyctl`: command-line client for a Wyoming speech-to-text server.

mod wav;

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use tracing_subscriber::{EnvFilter, fmt, prelude::*};
use wyoming_whisper_common::{DEFAULT_URI, ServerUri, WyomingClient};

pub use wav::read_pcm;

#[derive(Parser)]
#[command(name = "wyctl")]
#[command(about = "Talk to a Wyoming speech-to-text server")]
#[command(version)]
struct Cli {
    /// Server address (tcp://host:port or unix:///path)
    #[arg(long, global = true, default_value = DEFAULT_URI)]
    uri: String,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Print the server's capabilities as JSON
    Describe,
    /// Transcribe a WAV file
    Transcribe {
        /// Integer PCM WAV file
        wav: PathBuf,
        /// Language hint such as "en" ("auto" to detect)
        #[arg(long)]
        language: Option<String>,
        /// Frames per audio chunk
        #[arg(long, default_value_t = 1024)]
        samples_per_chunk: usize,
    },
}

/// Entry point for the CLI process.
pub async fn run() -> Result<()> {
    tracing_subscriber::registry()
        .with(fmt::layer().with_writer(std::io::stderr))
        .with(EnvFilter::from_default_env())
        .init();

    let cli = Cli::parse();
    let uri: ServerUri = cli.uri.parse()?;
    let mut client = WyomingClient::connect(&uri).await?;

    match cli.command {
        Commands::Describe => {
            let info = client.describe().await?;
            println!("{}", serde_json::to_string_pretty(&info)?);
        }
        Commands::Transcribe {
            wav,
            language,
            samples_per_chunk,
        } => {
            let (format, pcm) = read_pcm(&wav)?;
            tracing::info!(%format, bytes = pcm.len(), "Streaming audio");
            let transcript = client
                .transcribe(format, &pcm, samples_per_chunk, language)
                .await
                .context("Transcription failed")?;
            println!("{}", transcript.text);
        }
    }

    Ok(())
}
