//! Errors that end a client session.

use wyoming_whisper_proto::{AudioFormat, ProtocolError};

/// Reasons a session is terminated. None of these affect other sessions.
#[derive(Debug, thiserror::Error)]
pub enum SessionError {
    /// `audio-stop` arrived before any `audio-chunk` of the utterance.
    #[error("Received audio-stop without any audio")]
    NoAudio,

    /// A chunk's format differs from the first chunk of the utterance.
    #[error("Audio format changed mid-utterance: expected {expected}, got {actual}")]
    FormatMismatch {
        expected: AudioFormat,
        actual: AudioFormat,
    },

    /// A chunk's format cannot be stored as PCM.
    #[error("Unsupported audio format {0}")]
    InvalidFormat(AudioFormat),

    /// The temporary recording could not be written.
    #[error("Recording failed: {0:#}")]
    Recording(anyhow::Error),

    /// The transcription backend returned an error.
    #[error("Transcription failed: {0:#}")]
    Backend(anyhow::Error),

    /// An event could not be decoded or a response could not be sent.
    #[error(transparent)]
    Protocol(#[from] ProtocolError),
}
