//! Speech-to-text transcription.
//!
//! This module provides a trait abstraction for transcription backends,
//! the request/result records passed through it, and the whisper.cpp implementation.

use anyhow::Result;

use crate::recording::RecordedAudio;

mod whisper;

pub use whisper::WhisperTranscriber;

/// Kind of inference requested from the backend.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Task {
    /// Speech to text in the spoken language.
    Transcribe,
}

/// Decoding parameters applied to every request.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DecodingOptions {
    /// Sampling temperature; 0.0 selects greedy decoding.
    pub temperature: f32,
    /// Feed the text of earlier windows to the decoder as context.
    pub condition_on_previous_text: bool,
    pub task: Task,
}

impl Default for DecodingOptions {
    fn default() -> Self {
        Self {
            temperature: 0.0,
            condition_on_previous_text: true,
            task: Task::Transcribe,
        }
    }
}

/// One utterance to transcribe.
///
/// Owns the recorded audio, so the temporary WAV file lives exactly as long
/// as the request.
#[derive(Debug)]
pub struct TranscriptionRequest {
    pub audio: RecordedAudio,
    /// Model name as configured.
    pub model: String,
    /// Language code; `None` lets the model detect it.
    pub language: Option<String>,
    pub initial_prompt: Option<String>,
    pub options: DecodingOptions,
}

/// Backend output for one request.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TranscriptionResult {
    pub text: String,
    /// Language the text is in, when known.
    pub language: Option<String>,
    /// Number of decoded segments.
    pub segments: usize,
}

/// Speech-to-text transcriber.
///
/// Implementations are not required to be reentrant; callers go through
/// [`crate::gate::BackendGate`], which guarantees one call at a time.
pub trait Transcriber: Send {
    /// Transcribe the recorded audio of `request`.
    fn transcribe(&mut self, request: &TranscriptionRequest) -> Result<TranscriptionResult>;
}
