//! Serialized access to the single transcription backend.

use std::sync::Arc;

use anyhow::{Context, Result};
use tokio::sync::Mutex;
use tracing::debug;

use crate::transcribe::{Transcriber, TranscriptionRequest, TranscriptionResult};

/// Shared handle to the one backend instance.
///
/// At most one transcription runs at a time across all sessions. Waiters are
/// served in the order they started waiting. The backend call runs on the
/// blocking pool and keeps the lock until it returns, even if the session
/// that started it has gone away.
#[derive(Clone)]
pub struct BackendGate {
    backend: Arc<Mutex<Box<dyn Transcriber>>>,
}

impl BackendGate {
    pub fn new(transcriber: impl Transcriber + 'static) -> Self {
        Self {
            backend: Arc::new(Mutex::new(Box::new(transcriber))),
        }
    }

    /// Wait for the backend, run `request` on it and release it.
    pub async fn with_backend(&self, request: TranscriptionRequest) -> Result<TranscriptionResult> {
        let mut backend = self.backend.clone().lock_owned().await;
        debug!(model = %request.model, "Backend acquired");

        tokio::task::spawn_blocking(move || {
            let result = backend.transcribe(&request);
            drop(backend);
            result
        })
        .await
        .context("Transcription task panicked")?
    }

    /// Whether a transcription is currently running.
    pub fn is_busy(&self) -> bool {
        self.backend.try_lock().is_err()
    }
}

#[cfg(test)]
#[path = "gate_test.rs"]
mod tests;
