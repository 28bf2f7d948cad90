pub mod args;
pub mod audio;
pub mod capabilities;
pub mod config;
pub mod daemon;
pub mod error;
pub mod gate;
pub mod logging;
pub mod models;
pub mod recording;
pub mod server;
pub mod session;
pub mod socket;
pub mod transcribe;

#[cfg(test)]
mod test_support;

use clap::Parser;

pub use error::SessionError;
pub use gate::BackendGate;
pub use session::{SessionContext, SessionHandler, SessionSettings};

/// Entry point for the server process: parses flags, configures logging and runs the daemon.
pub async fn run() -> anyhow::Result<()> {
    let args = args::ServeArgs::parse();
    let config = args.load_config()?;

    let _guard = logging::init(&config.logging)?;
    tracing::debug!(?config, "Loaded configuration");

    daemon::run(config).await
}
