//! Command-line flags for the server. Flags override the config file.

use std::path::PathBuf;

use clap::Parser;

use crate::config::{Config, LogFormat, LogLevel};

#[derive(Debug, Default, Parser)]
#[command(name = "wyoming-whisper")]
#[command(about = "Wyoming speech-to-text server backed by whisper.cpp")]
#[command(version)]
pub struct ServeArgs {
    /// Config file (defaults to ~/.config/wyoming-whisper/config.toml)
    #[arg(long)]
    pub config: Option<PathBuf>,

    /// Name of whisper model to use (tiny, base, small.en, ...) or path to a ggml file
    #[arg(long)]
    pub model: Option<String>,

    /// unix:// or tcp://
    #[arg(long)]
    pub uri: Option<String>,

    /// Default language to set for transcription ("auto" to detect)
    #[arg(long)]
    pub language: Option<String>,

    /// Optional text to provide as a prompt for the first window
    #[arg(long)]
    pub initial_prompt: Option<String>,

    /// Directory where models are downloaded
    #[arg(long)]
    pub models_dir: Option<PathBuf>,

    /// Log DEBUG messages
    #[arg(long)]
    pub debug: bool,

    /// Format for log messages
    #[arg(long, value_enum)]
    pub log_format: Option<LogFormat>,
}

impl ServeArgs {
    /// Load the config file named by `--config` (or the default one) and apply flags on top.
    pub fn load_config(&self) -> anyhow::Result<Config> {
        let mut config = match &self.config {
            Some(path) => Config::load_from(path)?,
            None => Config::load()?,
        };
        self.apply(&mut config);
        Ok(config)
    }

    /// Overwrite config values with the flags that were given.
    pub fn apply(&self, config: &mut Config) {
        if let Some(model) = &self.model {
            config.model.model = model.clone();
        }
        if let Some(uri) = &self.uri {
            config.server.uri = uri.clone();
        }
        if let Some(language) = &self.language {
            config.model.language = language.clone();
        }
        if let Some(prompt) = &self.initial_prompt {
            config.model.initial_prompt = Some(prompt.clone());
        }
        if let Some(dir) = &self.models_dir {
            config.model.models_dir = Some(dir.clone());
        }
        if self.debug {
            config.logging.level = LogLevel::Debug;
        }
        if let Some(format) = self.log_format {
            config.logging.format = format;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_flags_override_config() {
        let args = ServeArgs::parse_from([
            "wyoming-whisper",
            "--model",
            "small.en",
            "--uri",
            "unix:///tmp/whisper.sock",
            "--language",
            "fr",
            "--initial-prompt",
            "Bonjour.",
            "--debug",
            "--log-format",
            "compact",
        ]);
        let mut config = Config::default();
        args.apply(&mut config);

        assert_eq!(config.model.model, "small.en");
        assert_eq!(config.server.uri, "unix:///tmp/whisper.sock");
        assert_eq!(config.model.language, "fr");
        assert_eq!(config.model.initial_prompt.as_deref(), Some("Bonjour."));
        assert_eq!(config.logging.level, LogLevel::Debug);
        assert_eq!(config.logging.format, LogFormat::Compact);
    }

    #[test]
    fn test_no_flags_keep_config() {
        let args = ServeArgs::parse_from(["wyoming-whisper"]);
        let mut config = Config::default();
        config.model.language = "de".to_string();
        args.apply(&mut config);

        assert_eq!(config.model.language, "de");
        assert_eq!(config.model.model, "base");
    }

    #[test]
    fn test_explicit_config_path() {
        let temp = tempfile::tempdir().unwrap();
        let path = temp.path().join("server.toml");
        std::fs::write(&path, "[model]\nmodel = \"tiny\"\n").unwrap();

        let args = ServeArgs::parse_from([
            "wyoming-whisper",
            "--config",
            path.to_str().unwrap(),
            "--language",
            "auto",
        ]);
        let config = args.load_config().unwrap();
        assert_eq!(config.model.model, "tiny");
        assert_eq!(config.model.language_hint(), None);
    }
}
