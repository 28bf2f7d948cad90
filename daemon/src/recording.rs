//! Per-utterance audio store.
//!
//! Incoming PCM chunks are written to a WAV file in a private temporary
//! directory. The directory is removed when the [`Recording`] or the
//! [`RecordedAudio`] it finalizes into is dropped.

use std::fs::File;
use std::io::BufWriter;
use std::path::{Path, PathBuf};

use anyhow::Context;
use hound::{SampleFormat, WavSpec, WavWriter};
use tempfile::TempDir;
use tracing::{trace, warn};
use wyoming_whisper_proto::{AudioChunk, AudioFormat};

use crate::error::SessionError;

const WAV_FILENAME: &str = "speech.wav";

/// An open recording accepting audio of one fixed format.
pub struct Recording {
    format: AudioFormat,
    writer: WavWriter<BufWriter<File>>,
    dir: TempDir,
    /// Bytes of an incomplete frame carried over to the next chunk.
    pending: Vec<u8>,
    frames: u64,
}

impl std::fmt::Debug for Recording {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Recording")
            .field("format", &self.format)
            .field("dir", &self.dir.path())
            .field("frames", &self.frames)
            .finish()
    }
}

impl Recording {
    /// Open a new recording using `format` for the whole utterance.
    pub fn create(format: AudioFormat) -> Result<Self, SessionError> {
        if !(1..=4).contains(&format.width) || format.rate == 0 || format.channels == 0 {
            return Err(SessionError::InvalidFormat(format));
        }

        let dir = tempfile::Builder::new()
            .prefix("wyoming-whisper-")
            .tempdir()
            .context("Failed to create recording directory")
            .map_err(SessionError::Recording)?;
        let spec = WavSpec {
            channels: format.channels,
            sample_rate: format.rate,
            bits_per_sample: format.width * 8,
            sample_format: SampleFormat::Int,
        };
        let writer = WavWriter::create(dir.path().join(WAV_FILENAME), spec)
            .context("Failed to create WAV file")
            .map_err(SessionError::Recording)?;

        Ok(Self {
            format,
            writer,
            dir,
            pending: Vec::new(),
            frames: 0,
        })
    }

    /// Number of complete frames written so far.
    pub fn frames(&self) -> u64 {
        self.frames
    }

    /// Append a chunk, which must use the recording's format.
    pub fn append(&mut self, chunk: &AudioChunk) -> Result<(), SessionError> {
        if chunk.format != self.format {
            return Err(SessionError::FormatMismatch {
                expected: self.format,
                actual: chunk.format,
            });
        }

        let frame_size = self.format.frame_size();
        let mut bytes = std::mem::take(&mut self.pending);
        bytes.extend_from_slice(&chunk.audio);

        let whole = bytes.len() - bytes.len() % frame_size;
        self.write_samples(&bytes[..whole])
            .map_err(SessionError::Recording)?;
        self.frames += (whole / frame_size) as u64;

        bytes.drain(..whole);
        self.pending = bytes;
        trace!(
            bytes = chunk.audio.len(),
            frames = self.frames,
            "Appended audio"
        );
        Ok(())
    }

    /// Close the WAV file and hand over ownership of the temporary directory.
    pub fn finalize(self) -> Result<RecordedAudio, SessionError> {
        if !self.pending.is_empty() {
            warn!(
                bytes = self.pending.len(),
                "Dropping incomplete trailing frame"
            );
        }
        self.writer
            .finalize()
            .context("Failed to finalize WAV file")
            .map_err(SessionError::Recording)?;

        Ok(RecordedAudio {
            path: self.dir.path().join(WAV_FILENAME),
            format: self.format,
            frames: self.frames,
            _dir: self.dir,
        })
    }

    fn write_samples(&mut self, bytes: &[u8]) -> anyhow::Result<()> {
        let width = usize::from(self.format.width);
        for sample in bytes.chunks_exact(width) {
            match *sample {
                // 8-bit WAV is unsigned; hound takes a signed value and re-biases it
                [b] => self.writer.write_sample((b ^ 0x80) as i8)?,
                [b0, b1] => self.writer.write_sample(i16::from_le_bytes([b0, b1]))?,
                [b0, b1, b2] => {
                    let sign = if b2 & 0x80 != 0 { 0xff } else { 0x00 };
                    self.writer
                        .write_sample(i32::from_le_bytes([b0, b1, b2, sign]))?
                }
                [b0, b1, b2, b3] => self
                    .writer
                    .write_sample(i32::from_le_bytes([b0, b1, b2, b3]))?,
                _ => anyhow::bail!("Unsupported sample width {}", width),
            }
        }
        Ok(())
    }
}

/// A finished utterance on disk, deleted on drop.
#[derive(Debug)]
pub struct RecordedAudio {
    path: PathBuf,
    format: AudioFormat,
    frames: u64,
    _dir: TempDir,
}

impl RecordedAudio {
    /// Path of the WAV file.
    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn format(&self) -> AudioFormat {
        self.format
    }

    pub fn frames(&self) -> u64 {
        self.frames
    }

    /// Duration in seconds.
    pub fn duration_secs(&self) -> f32 {
        self.frames as f32 / self.format.rate as f32
    }
}

#[cfg(test)]
#[path = "recording_test.rs"]
mod tests;
