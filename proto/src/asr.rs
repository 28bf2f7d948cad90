//! Speech recognition request and response events.

use serde::{Deserialize, Serialize};

use crate::event::data_event;

/// Request to transcribe the audio that follows, optionally with a language hint.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Transcribe {
    /// Model name requested by the client.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    /// Language code such as "en".
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub language: Option<String>,
}

data_event!(Transcribe, "transcribe");

/// Transcription result.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Transcript {
    pub text: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub language: Option<String>,
}

data_event!(Transcript, "transcript");
