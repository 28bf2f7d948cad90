//! Service discovery events.

use serde::{Deserialize, Serialize};

use crate::event::data_event;

/// Request for the server's [`Info`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Describe {}

data_event!(Describe, "describe");

/// Who made a program or model.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Attribution {
    pub name: String,
    pub url: String,
}

/// A speech recognition model offered by a program.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AsrModel {
    pub name: String,
    pub description: Option<String>,
    pub attribution: Attribution,
    pub installed: bool,
    pub languages: Vec<String>,
    #[serde(default)]
    pub version: Option<String>,
}

/// A speech recognition program and its models.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AsrProgram {
    pub name: String,
    pub description: Option<String>,
    pub attribution: Attribution,
    pub installed: bool,
    #[serde(default)]
    pub version: Option<String>,
    pub models: Vec<AsrModel>,
}

/// Capabilities advertised in response to [`Describe`].
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Info {
    #[serde(default)]
    pub asr: Vec<AsrProgram>,
}

data_event!(Info, "info");
