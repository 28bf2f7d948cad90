//! Per-connection session handling.
//!
//! A session accumulates the audio of one utterance, hands it to the shared
//! backend when the client stops streaming and answers with a single
//! transcript. Capability queries and language hints are accepted at any point.

use std::sync::Arc;

use futures_util::{Sink, SinkExt};
use tracing::{debug, info, trace, warn};
use wyoming_whisper_proto::{
    AudioChunk, AudioStop, Describe, Event, Eventable, Info, ProtocolError, Transcribe,
    Transcript,
};

use crate::capabilities::language_name;
use crate::config::{ModelConfig, language_hint};
use crate::error::SessionError;
use crate::gate::BackendGate;
use crate::recording::Recording;
use crate::transcribe::{DecodingOptions, TranscriptionRequest};

/// Process-wide settings every session starts from.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SessionSettings {
    pub model: String,
    /// Language used when the client sends no hint; `None` auto-detects.
    pub default_language: Option<String>,
    pub initial_prompt: Option<String>,
}

impl SessionSettings {
    pub fn from_config(config: &ModelConfig) -> Self {
        Self {
            model: config.model.clone(),
            default_language: config.language_hint(),
            initial_prompt: config.prompt(),
        }
    }
}

/// Shared, read-only state handed to every session.
#[derive(Clone)]
pub struct SessionContext {
    pub settings: Arc<SessionSettings>,
    pub info: Arc<Info>,
    pub gate: BackendGate,
}

impl SessionContext {
    pub fn new(settings: SessionSettings, info: Info, gate: BackendGate) -> Self {
        Self {
            settings: Arc::new(settings),
            info: Arc::new(info),
            gate,
        }
    }
}

/// Whether `language` is `"auto"` or a code Whisper knows.
fn is_supported(language: &str) -> bool {
    language_hint(language).is_none_or(|code| language_name(&code).is_some())
}

enum SessionState {
    /// No utterance in progress.
    Idle,
    /// Audio of the current utterance is being recorded.
    Accumulating(Recording),
    /// The utterance was handed off; the connection should close.
    Finished,
}

/// Event handler for one client connection.
///
/// Responses are written to `writer` as they are produced.
pub struct SessionHandler<W> {
    context: SessionContext,
    writer: W,
    state: SessionState,
    /// Client-supplied language for the current utterance.
    language: Option<String>,
}

impl<W> SessionHandler<W>
where
    W: Sink<Event> + Unpin,
    W::Error: Into<ProtocolError>,
{
    pub fn new(context: SessionContext, writer: W) -> Self {
        Self {
            context,
            writer,
            state: SessionState::Idle,
            language: None,
        }
    }

    /// Handle one inbound event.
    ///
    /// Returns `Ok(false)` once the session is over and the connection should
    /// be closed. Unknown event types are ignored.
    pub async fn on_event(&mut self, event: Event) -> Result<bool, SessionError> {
        if self.is_finished() {
            debug!(event_type = %event.event_type, "Event after session finished");
            return Ok(false);
        }

        if event.is::<AudioChunk>() {
            self.on_audio_chunk(AudioChunk::from_event(&event)?)?;
            return Ok(true);
        }

        if event.is::<AudioStop>() {
            self.on_audio_stop().await?;
            return Ok(false);
        }

        if event.is::<Transcribe>() {
            let transcribe = Transcribe::from_event(&event)?;
            if let Some(language) = transcribe.language.filter(|l| !l.is_empty()) {
                if is_supported(&language) {
                    debug!(%language, "Language override set");
                    self.language = Some(language);
                } else {
                    warn!(language = ?language, "Ignoring unsupported language");
                }
            }
            return Ok(true);
        }

        if event.is::<Describe>() {
            self.send(self.context.info.to_event()).await?;
            debug!("Sent info");
            return Ok(true);
        }

        trace!(event_type = %event.event_type, "Ignoring event");
        Ok(true)
    }

    fn on_audio_chunk(&mut self, chunk: AudioChunk) -> Result<(), SessionError> {
        if let SessionState::Idle = self.state {
            debug!(format = %chunk.format, "Utterance started");
            self.state = SessionState::Accumulating(Recording::create(chunk.format)?);
        }
        match &mut self.state {
            SessionState::Accumulating(recording) => recording.append(&chunk),
            _ => Ok(()),
        }
    }

    async fn on_audio_stop(&mut self) -> Result<(), SessionError> {
        // The override only ever applies to the utterance it was sent for
        let language = match self.language.take() {
            Some(language) => language_hint(&language),
            None => self.context.settings.default_language.clone(),
        };

        let SessionState::Accumulating(recording) =
            std::mem::replace(&mut self.state, SessionState::Finished)
        else {
            return Err(SessionError::NoAudio);
        };
        let audio = recording.finalize()?;

        debug!(
            frames = audio.frames(),
            duration_secs = audio.duration_secs(),
            language = ?language,
            "Utterance finished"
        );

        let settings = &self.context.settings;
        let request = TranscriptionRequest {
            audio,
            model: settings.model.clone(),
            language,
            initial_prompt: settings.initial_prompt.clone(),
            options: DecodingOptions::default(),
        };
        let result = self
            .context
            .gate
            .with_backend(request)
            .await
            .map_err(SessionError::Backend)?;

        debug!(
            segments = result.segments,
            language = ?result.language,
            "Transcription complete"
        );
        let text = result.text.trim().to_string();
        info!(%text, "Transcript");
        self.send(
            Transcript {
                text,
                language: result.language,
            }
            .to_event(),
        )
        .await
    }

    async fn send(&mut self, event: Event) -> Result<(), SessionError> {
        self.writer
            .send(event)
            .await
            .map_err(|e| SessionError::Protocol(e.into()))
    }

    /// Language hint from the client for the current utterance, if any.
    pub fn language_override(&self) -> Option<&str> {
        self.language.as_deref()
    }

    /// Whether audio of an utterance is being recorded.
    pub fn is_recording(&self) -> bool {
        matches!(self.state, SessionState::Accumulating(_))
    }

    pub fn is_finished(&self) -> bool {
        matches!(self.state, SessionState::Finished)
    }

    pub fn writer(&self) -> &W {
        &self.writer
    }

    pub fn into_writer(self) -> W {
        self.writer
    }
}

#[cfg(test)]
#[path = "session_test.rs"]
mod tests;
