//! Whisper transcription backend.
//!
//! Uses whisper.cpp via whisper-rs for speech-to-text.

use super::{Task, Transcriber, TranscriptionRequest, TranscriptionResult};
use crate::audio::{AudioBuffer, TARGET_SAMPLE_RATE};
use anyhow::{Context, Result};
use std::path::Path;
use tracing::{debug, info};
use whisper_rs::{FullParams, SamplingStrategy, WhisperContext, WhisperContextParameters};

/// Whisper speech-to-text transcriber.
///
/// The underlying WhisperContext is leaked intentionally - for a long-running server,
/// the model stays loaded for the process lifetime. A fresh decoder state is created
/// per request so no text carries over from one utterance to the next.
pub struct WhisperTranscriber {
    context: &'static WhisperContext,
}

impl WhisperTranscriber {
    /// Load a Whisper model.
    ///
    /// # Arguments
    /// * `model_path` - Path to the Whisper GGML model file
    pub fn new(model_path: impl AsRef<Path>) -> Result<Self> {
        info!(path = %model_path.as_ref().display(), "Loading Whisper model");

        let ctx = WhisperContext::new_with_params(
            model_path.as_ref().to_str().context("Invalid model path")?,
            WhisperContextParameters::default(),
        )
        .context("Failed to load Whisper model")?;

        // Box and leak the context to get a 'static reference.
        let context: &'static WhisperContext = Box::leak(Box::new(ctx));

        info!("Whisper model loaded successfully");

        Ok(Self { context })
    }
}

/// Language code for a whisper language id; negative ids mean detection did not run.
fn detected_language(lang_id: i32) -> Option<String> {
    if lang_id < 0 {
        return None;
    }
    whisper_rs::get_lang_str(lang_id).map(str::to_string)
}

impl Transcriber for WhisperTranscriber {
    fn transcribe(&mut self, request: &TranscriptionRequest) -> Result<TranscriptionResult> {
        let audio = AudioBuffer::from_wav(request.audio.path())?.resampled(TARGET_SAMPLE_RATE)?;
        if audio.samples.is_empty() {
            anyhow::bail!("Recording contains no audio samples");
        }

        debug!(
            samples = audio.samples.len(),
            duration_secs = audio.duration_secs(),
            language = ?request.language,
            model = %request.model,
            "Transcribing audio with Whisper"
        );

        let mut params = FullParams::new(SamplingStrategy::Greedy { best_of: 1 });

        // None auto-detects
        params.set_language(request.language.as_deref());
        if let Some(prompt) = request.initial_prompt.as_deref() {
            params.set_initial_prompt(prompt);
        }
        params.set_temperature(request.options.temperature);
        params.set_no_context(!request.options.condition_on_previous_text);
        params.set_translate(!matches!(request.options.task, Task::Transcribe));

        // Disable printing to stdout
        params.set_print_special(false);
        params.set_print_progress(false);
        params.set_print_realtime(false);
        params.set_print_timestamps(false);

        let mut state = self
            .context
            .create_state()
            .context("Failed to create Whisper state")?;

        state
            .full(params, &audio.samples)
            .context("Whisper inference failed")?;

        // Collect all segments
        let num_segments = state.full_n_segments();
        let mut text = String::new();
        let mut segments = 0;

        for i in 0..num_segments {
            if let Some(segment) = state.get_segment(i) {
                if let Ok(segment_text) = segment.to_str_lossy() {
                    text.push_str(&segment_text);
                    segments += 1;
                }
            }
        }

        let language = match &request.language {
            Some(language) => Some(language.clone()),
            None => detected_language(state.full_lang_id_from_state()),
        };

        debug!(text_len = text.len(), segments, language = ?language, "Transcription complete");

        Ok(TranscriptionResult {
            text: text.trim().to_string(),
            language,
            segments,
        })
    }
}
