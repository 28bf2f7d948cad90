//! Model download and management.
//!
//! Resolves a configured model name to a ggml file on disk, downloading it on first use.

use anyhow::{Context, Result};
use futures_util::StreamExt;
use std::path::{Path, PathBuf};
use tokio::fs;
use tokio::io::AsyncWriteExt;
use tracing::{debug, info, warn};

/// Identifier for downloadable Whisper models.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ModelId {
    /// Whisper tiny model (~75MB).
    WhisperTiny,
    /// Whisper tiny English-only model (~75MB).
    WhisperTinyEn,
    /// Whisper base model (~150MB).
    WhisperBase,
    /// Whisper base English-only model (~150MB).
    WhisperBaseEn,
    /// Whisper small model (~500MB).
    WhisperSmall,
    /// Whisper small English-only model (~500MB).
    WhisperSmallEn,
    /// Whisper medium model (~1.5GB).
    WhisperMedium,
    /// Whisper medium English-only model (~1.5GB).
    WhisperMediumEn,
    /// Whisper large-v3 model (~3GB).
    WhisperLargeV3,
    /// Whisper large-v3-turbo model (~1.5GB).
    WhisperLargeV3Turbo,
}

const WHISPER_BASE_URL: &str = "https://huggingface.co/ggerganov/whisper.cpp/resolve/main";

impl ModelId {
    /// Look up a model by name.
    ///
    /// Accepts `tiny`, `tiny.en`, `tiny-en`, `whisper-tiny-en`, `large-v3-turbo`, ...
    pub fn from_name(name: &str) -> Option<Self> {
        let name = name.trim().to_ascii_lowercase();
        let name = name.strip_prefix("whisper-").unwrap_or(&name);
        let id = match name.replace('.', "-").as_str() {
            "tiny" => ModelId::WhisperTiny,
            "tiny-en" => ModelId::WhisperTinyEn,
            "base" => ModelId::WhisperBase,
            "base-en" => ModelId::WhisperBaseEn,
            "small" => ModelId::WhisperSmall,
            "small-en" => ModelId::WhisperSmallEn,
            "medium" => ModelId::WhisperMedium,
            "medium-en" => ModelId::WhisperMediumEn,
            "large-v3" | "large" => ModelId::WhisperLargeV3,
            "large-v3-turbo" | "turbo" => ModelId::WhisperLargeV3Turbo,
            _ => return None,
        };
        Some(id)
    }

    /// Get model metadata.
    fn info(&self) -> ModelInfo {
        let (filename, size_bytes) = match self {
            ModelId::WhisperTiny => ("ggml-tiny.bin", 77_691_713),
            ModelId::WhisperTinyEn => ("ggml-tiny.en.bin", 77_704_715),
            ModelId::WhisperBase => ("ggml-base.bin", 147_951_465),
            ModelId::WhisperBaseEn => ("ggml-base.en.bin", 147_964_211),
            ModelId::WhisperSmall => ("ggml-small.bin", 487_601_967),
            ModelId::WhisperSmallEn => ("ggml-small.en.bin", 487_614_201),
            ModelId::WhisperMedium => ("ggml-medium.bin", 1_533_774_781),
            ModelId::WhisperMediumEn => ("ggml-medium.en.bin", 1_533_774_781),
            ModelId::WhisperLargeV3 => ("ggml-large-v3.bin", 3_094_623_691),
            ModelId::WhisperLargeV3Turbo => ("ggml-large-v3-turbo.bin", 1_624_592_891),
        };
        ModelInfo {
            filename,
            url: format!("{}/{}", WHISPER_BASE_URL, filename),
            size_bytes: Some(size_bytes),
        }
    }
}

impl std::fmt::Display for ModelId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.info().filename)
    }
}

/// Metadata for a downloadable model.
struct ModelInfo {
    /// Filename to save as.
    filename: &'static str,
    /// Download URL.
    url: String,
    /// Expected file size for validation (optional).
    size_bytes: Option<u64>,
}

/// State of a model file on disk.
#[derive(Debug)]
pub enum ModelStatus {
    /// File present with the expected size.
    Ready(PathBuf),
    /// File not downloaded yet.
    Missing,
    /// File present with the wrong size.
    Corrupted { expected: u64, actual: u64 },
}

/// Manages model downloads and storage.
pub struct ModelManager {
    models_dir: PathBuf,
}

impl ModelManager {
    /// Create a ModelManager with a custom models directory.
    pub fn with_dir(models_dir: impl Into<PathBuf>) -> Self {
        Self {
            models_dir: models_dir.into(),
        }
    }

    /// Get the models directory path.
    pub fn models_dir(&self) -> &Path {
        &self.models_dir
    }

    /// Resolve a configured model to a file path.
    ///
    /// An existing file path is used as is; otherwise the value must name a
    /// known model, which is downloaded if necessary.
    pub async fn resolve(&self, model: &str) -> Result<PathBuf> {
        let as_path = Path::new(model);
        if as_path.is_file() {
            debug!(path = %as_path.display(), "Using model file");
            return Ok(as_path.to_path_buf());
        }

        let id = ModelId::from_name(model)
            .with_context(|| format!("Unknown model '{}' and no such file", model))?;
        self.ensure_model(id).await
    }

    /// Check whether a model is present and intact.
    pub async fn check_model(&self, model: ModelId) -> ModelStatus {
        let info = model.info();
        let model_path = self.models_dir.join(info.filename);

        let Ok(metadata) = fs::metadata(&model_path).await else {
            return ModelStatus::Missing;
        };
        match info.size_bytes {
            Some(expected) if metadata.len() != expected => ModelStatus::Corrupted {
                expected,
                actual: metadata.len(),
            },
            _ => ModelStatus::Ready(model_path),
        }
    }

    /// Ensure a model is available, downloading if necessary.
    ///
    /// Returns the path to the model file.
    pub async fn ensure_model(&self, model: ModelId) -> Result<PathBuf> {
        let info = model.info();
        let model_path = self.models_dir.join(info.filename);

        match self.check_model(model).await {
            ModelStatus::Ready(path) => {
                debug!(path = %path.display(), "Model already exists");
                return Ok(path);
            }
            ModelStatus::Corrupted { expected, actual } => {
                warn!(
                    model = %model,
                    expected = expected,
                    actual = actual,
                    "Model size mismatch, re-downloading"
                );
                fs::remove_file(&model_path)
                    .await
                    .context("Failed to remove corrupted model")?;
            }
            ModelStatus::Missing => {}
        }

        self.download_model(&info, &model_path).await?;
        Ok(model_path)
    }

    /// Download a model from its URL.
    async fn download_model(&self, info: &ModelInfo, dest: &Path) -> Result<()> {
        if let Some(parent) = dest.parent() {
            fs::create_dir_all(parent)
                .await
                .context("Failed to create models directory")?;
        }

        info!(
            url = %info.url,
            dest = %dest.display(),
            "Downloading model"
        );

        let response = reqwest::get(&info.url)
            .await
            .with_context(|| format!("Failed to download model from {}", info.url))?;

        if !response.status().is_success() {
            anyhow::bail!("Failed to download model: HTTP {}", response.status());
        }

        // Stream to a temporary file first, then rename (atomic)
        let temp_path = dest.with_extension("tmp");
        let mut file = fs::File::create(&temp_path)
            .await
            .context("Failed to create temporary model file")?;

        let mut written: u64 = 0;
        let mut body = response.bytes_stream();
        while let Some(chunk) = body.next().await {
            let chunk = chunk.context("Failed to read response body")?;
            file.write_all(&chunk)
                .await
                .context("Failed to write model file")?;
            written += chunk.len() as u64;
        }
        file.sync_all().await.context("Failed to sync model file")?;
        drop(file);

        if let Some(expected) = info.size_bytes {
            if written != expected {
                let _ = fs::remove_file(&temp_path).await;
                anyhow::bail!(
                    "Downloaded model size mismatch: expected {}, got {}",
                    expected,
                    written
                );
            }
        }

        fs::rename(&temp_path, dest)
            .await
            .context("Failed to finalize model file")?;

        info!(
            path = %dest.display(),
            size = written,
            "Model downloaded successfully"
        );

        Ok(())
    }
}

#[cfg(test)]
#[path = "models_test.rs"]
mod tests;
