//! Daemon runner that wires the model, backend gate and listener together.

use std::future::Future;

use anyhow::{Context, Result};
use tracing::{debug, info, warn};

use crate::capabilities::{capabilities, language_name};
use crate::config::Config;
use crate::gate::BackendGate;
use crate::models::ModelManager;
use crate::server;
use crate::session::{SessionContext, SessionSettings};
use crate::socket::Listener;
use crate::transcribe::WhisperTranscriber;

/// Load the configured model and serve until Ctrl-C.
pub async fn run(config: Config) -> Result<()> {
    let uri = config.server_uri()?;
    let settings = SessionSettings::from_config(&config.model);
    if let Some(language) = settings.default_language.as_deref() {
        if language_name(language).is_none() {
            warn!(%language, "Default language is not a known Whisper language code");
        }
    }

    let manager = ModelManager::with_dir(config.models_dir()?);
    debug!(dir = %manager.models_dir().display(), "Models directory");
    let model_path = manager.resolve(&config.model.model).await?;
    let transcriber = tokio::task::spawn_blocking(move || WhisperTranscriber::new(&model_path))
        .await
        .context("Model loading task panicked")??;

    let context = SessionContext::new(
        settings,
        capabilities(&config.model.model),
        BackendGate::new(transcriber),
    );

    serve_until(&uri, context, async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            warn!(error = %e, "Failed to listen for Ctrl-C");
            std::future::pending::<()>().await;
        }
    })
    .await
}

/// Bind `uri` and serve sessions until `shutdown` completes.
pub async fn serve_until(
    uri: &wyoming_whisper_common::ServerUri,
    context: SessionContext,
    shutdown: impl Future<Output = ()>,
) -> Result<()> {
    let listener = Listener::bind(uri).await?;
    info!(uri = %listener.local_uri()?, model = %context.settings.model, "Ready");

    let result = server::serve(&listener, context, shutdown).await;

    listener.cleanup();
    info!("Server stopped");
    result
}
