//! Audio streaming events.

use bytes::Bytes;
use serde::{Deserialize, Serialize};

use crate::event::{Event, Eventable, data_event};
use crate::ProtocolError;

/// PCM layout shared by every chunk of one audio stream.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct AudioFormat {
    /// Sample rate in Hz.
    pub rate: u32,
    /// Bytes per sample.
    pub width: u16,
    /// Interleaved channel count.
    pub channels: u16,
}

impl AudioFormat {
    pub const fn new(rate: u32, width: u16, channels: u16) -> Self {
        Self {
            rate,
            width,
            channels,
        }
    }

    /// Bytes in one frame (one sample for every channel).
    pub fn frame_size(&self) -> usize {
        usize::from(self.width) * usize::from(self.channels)
    }
}

impl std::fmt::Display for AudioFormat {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{}Hz/{}-byte/{}ch",
            self.rate, self.width, self.channels
        )
    }
}

/// One chunk of raw PCM audio.
#[derive(Debug, Clone, PartialEq)]
pub struct AudioChunk {
    pub format: AudioFormat,
    pub audio: Bytes,
    pub timestamp: Option<u64>,
}

#[derive(Serialize, Deserialize)]
struct AudioChunkData {
    #[serde(flatten)]
    format: AudioFormat,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    timestamp: Option<u64>,
}

impl AudioChunk {
    pub fn new(format: AudioFormat, audio: impl Into<Bytes>) -> Self {
        Self {
            format,
            audio: audio.into(),
            timestamp: None,
        }
    }
}

impl Eventable for AudioChunk {
    const EVENT_TYPE: &'static str = "audio-chunk";

    fn to_event(&self) -> Event {
        let data = AudioChunkData {
            format: self.format,
            timestamp: self.timestamp,
        };
        Event::new(Self::EVENT_TYPE)
            .with_data(&data)
            .with_payload(self.audio.clone())
    }

    fn from_event(event: &Event) -> Result<Self, ProtocolError> {
        event.expect_type(Self::EVENT_TYPE)?;
        let data: AudioChunkData = event.decode_data()?;
        Ok(Self {
            format: data.format,
            audio: event.payload.clone().unwrap_or_default(),
            timestamp: data.timestamp,
        })
    }
}

/// Start of an audio stream.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct AudioStart {
    #[serde(flatten)]
    pub format: AudioFormat,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timestamp: Option<u64>,
}

data_event!(AudioStart, "audio-start");

/// End of an audio stream (end of utterance).
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct AudioStop {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timestamp: Option<u64>,
}

data_event!(AudioStop, "audio-stop");
