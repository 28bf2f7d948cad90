//! In-memory transcriber for unit tests.

use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use anyhow::Result;
use wyoming_whisper_proto::AudioFormat;

use crate::transcribe::{
    DecodingOptions, Transcriber, TranscriptionRequest, TranscriptionResult,
};

/// What the fake backend saw for one call.
#[derive(Debug, Clone)]
pub struct Call {
    pub pcm: Vec<u8>,
    pub format: AudioFormat,
    pub model: String,
    pub language: Option<String>,
    pub initial_prompt: Option<String>,
    pub options: DecodingOptions,
}

/// Shared view of the calls a [`FakeTranscriber`] received.
#[derive(Clone, Default)]
pub struct CallLog {
    calls: Arc<Mutex<Vec<Call>>>,
    overlaps: Arc<AtomicUsize>,
}

impl CallLog {
    pub fn calls(&self) -> Vec<Call> {
        self.calls.lock().unwrap().clone()
    }

    pub fn len(&self) -> usize {
        self.calls.lock().unwrap().len()
    }

    /// Times a call started while another was still running.
    pub fn overlaps(&self) -> usize {
        self.overlaps.load(Ordering::SeqCst)
    }
}

/// Returns `" <language or 'auto'> "` as the transcript after an optional delay.
pub struct FakeTranscriber {
    log: CallLog,
    busy: Arc<AtomicBool>,
    delay: Duration,
    failures: usize,
    detected: Option<String>,
}

impl FakeTranscriber {
    pub fn new() -> Self {
        Self {
            log: CallLog::default(),
            busy: Arc::new(AtomicBool::new(false)),
            delay: Duration::ZERO,
            failures: 0,
            detected: None,
        }
    }

    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = delay;
        self
    }

    pub fn failing(mut self) -> Self {
        self.failures = usize::MAX;
        self
    }

    /// Fail the first call only.
    pub fn failing_once(mut self) -> Self {
        self.failures = 1;
        self
    }

    /// Language reported when the request has none.
    pub fn detecting(mut self, language: &str) -> Self {
        self.detected = Some(language.to_string());
        self
    }

    pub fn log(&self) -> CallLog {
        self.log.clone()
    }
}

impl Transcriber for FakeTranscriber {
    fn transcribe(&mut self, request: &TranscriptionRequest) -> Result<TranscriptionResult> {
        if self.busy.swap(true, Ordering::SeqCst) {
            self.log.overlaps.fetch_add(1, Ordering::SeqCst);
        }

        let mut reader = hound::WavReader::open(request.audio.path())?;
        let pcm: Vec<u8> = reader
            .samples::<i16>()
            .map(|s| s.map(i16::to_le_bytes))
            .collect::<Result<Vec<_>, _>>()?
            .concat();

        self.log.calls.lock().unwrap().push(Call {
            pcm,
            format: request.audio.format(),
            model: request.model.clone(),
            language: request.language.clone(),
            initial_prompt: request.initial_prompt.clone(),
            options: request.options,
        });

        std::thread::sleep(self.delay);
        self.busy.store(false, Ordering::SeqCst);

        if self.failures > 0 {
            self.failures -= 1;
            anyhow::bail!("model exploded");
        }
        Ok(TranscriptionResult {
            text: format!(" {} ", request.language.as_deref().unwrap_or("auto")),
            language: request.language.clone().or_else(|| self.detected.clone()),
            segments: 1,
        })
    }
}
