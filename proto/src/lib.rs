//! Wyoming protocol types for wyoming-whisper.
//!
//! Events travel as a JSON header line, an optional JSON data block and an
//! optional binary payload. [`WyomingCodec`] handles the framing, the typed
//! structs in [`asr`], [`audio`] and [`info`] convert to and from [`Event`].

pub mod asr;
pub mod audio;
pub mod codec;
pub mod error;
pub mod event;
pub mod info;

pub use asr::{Transcribe, Transcript};
pub use audio::{AudioChunk, AudioFormat, AudioStart, AudioStop};
pub use codec::WyomingCodec;
pub use error::ProtocolError;
pub use event::{Event, Eventable};
pub use info::{AsrModel, AsrProgram, Attribution, Describe, Info};

/// Protocol version written into every outgoing header.
pub const PROTOCOL_VERSION: &str = "1.5.4";
