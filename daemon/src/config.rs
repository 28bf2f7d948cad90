//! Configuration management for the wyoming-whisper server.
//!
//! Loads the TOML config file and provides defaults for everything it omits.

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use wyoming_whisper_common::{DEFAULT_URI, ServerUri};

/// Language value meaning "let the model detect the language".
pub const AUTO_LANGUAGE: &str = "auto";

/// Main configuration struct for the server.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub server: ServerConfig,
    pub model: ModelConfig,
    pub logging: LoggingConfig,
}

/// Network configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    /// Address to listen on: `tcp://host:port` or `unix:///path`.
    pub uri: String,
}

/// Configuration for the speech recognition model.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ModelConfig {
    /// Whisper model name (e.g. "base", "small.en") or path to a ggml file.
    pub model: String,
    /// Default language for transcription. Use "auto" for automatic detection.
    pub language: String,
    /// Text given to the decoder as context for the first window.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub initial_prompt: Option<String>,
    /// Where downloaded models are stored. Defaults to the XDG data directory.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub models_dir: Option<PathBuf>,
}

/// Logging configuration.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Log level: "error", "warn", "info", "debug", "trace".
    pub level: LogLevel,
    /// Output format: "full" or "compact".
    pub format: LogFormat,
    /// Write logs to the state directory instead of stderr.
    pub file: bool,
}

/// Log verbosity level.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum LogLevel {
    Error,
    Warn,
    #[default]
    Info,
    Debug,
    Trace,
}

/// Log line layout.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    #[default]
    Full,
    Compact,
}

impl LogLevel {
    /// Convert to a tracing filter directive string for the server crates.
    pub fn as_directive(&self) -> &'static str {
        match self {
            LogLevel::Error => "wyoming_whisper_daemon=error",
            LogLevel::Warn => "wyoming_whisper_daemon=warn",
            LogLevel::Info => "wyoming_whisper_daemon=info",
            LogLevel::Debug => "wyoming_whisper_daemon=debug",
            LogLevel::Trace => "wyoming_whisper_daemon=trace",
        }
    }
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            uri: DEFAULT_URI.to_string(),
        }
    }
}

impl Default for ModelConfig {
    fn default() -> Self {
        Self {
            model: "base".to_string(),
            language: AUTO_LANGUAGE.to_string(),
            initial_prompt: None,
            models_dir: None,
        }
    }
}

impl ModelConfig {
    /// Default language as a decoder hint; `None` means detect.
    pub fn language_hint(&self) -> Option<String> {
        language_hint(&self.language)
    }

    /// Initial prompt, treating an empty string as unset.
    pub fn prompt(&self) -> Option<String> {
        self.initial_prompt
            .as_deref()
            .map(str::trim)
            .filter(|prompt| !prompt.is_empty())
            .map(str::to_string)
    }
}

/// Normalize a language setting: "auto" and empty strings become `None`.
pub fn language_hint(language: &str) -> Option<String> {
    let language = language.trim();
    if language.is_empty() || language.eq_ignore_ascii_case(AUTO_LANGUAGE) {
        None
    } else {
        Some(language.to_string())
    }
}

impl Config {
    /// Returns the default config directory path.
    /// `~/.config/wyoming-whisper/` (or `$XDG_CONFIG_HOME/wyoming-whisper/`)
    pub fn config_dir() -> Result<PathBuf> {
        wyoming_whisper_common::dirs::config_dir()
    }

    /// Returns the default config file path.
    /// `~/.config/wyoming-whisper/config.toml`
    pub fn config_path() -> Result<PathBuf> {
        Self::config_dir().map(|p| p.join("config.toml"))
    }

    /// Returns the models directory: the configured one or
    /// `~/.local/share/wyoming-whisper/models/`.
    pub fn models_dir(&self) -> Result<PathBuf> {
        match &self.model.models_dir {
            Some(dir) => Ok(dir.clone()),
            None => wyoming_whisper_common::dirs::data_dir().map(|p| p.join("models")),
        }
    }

    /// Parsed listen address.
    pub fn server_uri(&self) -> Result<ServerUri> {
        self.server
            .uri
            .parse()
            .with_context(|| format!("Invalid server URI: {}", self.server.uri))
    }

    /// Load configuration from the default path.
    /// Returns defaults if the file doesn't exist.
    pub fn load() -> Result<Self> {
        let path = Self::config_path()?;
        Self::load_from(&path)
    }

    /// Load configuration from a specific path.
    /// Returns defaults if the file doesn't exist.
    pub fn load_from(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        if !path.exists() {
            return Ok(Self::default());
        }

        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;

        Self::parse(&content)
    }

    /// Parse configuration from a TOML string.
    pub fn parse(content: &str) -> Result<Self> {
        toml::from_str(content).context("Failed to parse config file as TOML")
    }
}

#[cfg(test)]
#[path = "config_test.rs"]
mod tests;
