use super::*;
use tempfile::TempDir;

#[test]
fn test_model_info() {
    let info = ModelId::WhisperBaseEn.info();
    assert_eq!(info.filename, "ggml-base.en.bin");
    assert!(info.url.ends_with("/ggml-base.en.bin"));
}

#[test]
fn test_model_names() {
    assert_eq!(ModelId::from_name("tiny"), Some(ModelId::WhisperTiny));
    assert_eq!(ModelId::from_name("base.en"), Some(ModelId::WhisperBaseEn));
    assert_eq!(ModelId::from_name("whisper-small-en"), Some(ModelId::WhisperSmallEn));
    assert_eq!(ModelId::from_name("Medium"), Some(ModelId::WhisperMedium));
    assert_eq!(
        ModelId::from_name("large-v3-turbo"),
        Some(ModelId::WhisperLargeV3Turbo)
    );
    assert_eq!(ModelId::from_name("huge"), None);
}

#[test]
fn test_model_manager_custom_dir() {
    let temp = TempDir::new().unwrap();
    let manager = ModelManager::with_dir(temp.path());
    assert_eq!(manager.models_dir(), temp.path());
}

#[tokio::test]
async fn test_check_model_missing() {
    let temp = TempDir::new().unwrap();
    let manager = ModelManager::with_dir(temp.path());
    let status = manager.check_model(ModelId::WhisperTiny).await;
    assert!(matches!(status, ModelStatus::Missing));
}

#[tokio::test]
async fn test_check_model_corrupted_wrong_size() {
    let temp = TempDir::new().unwrap();
    let manager = ModelManager::with_dir(temp.path());

    let info = ModelId::WhisperTiny.info();
    let path = temp.path().join(info.filename);
    tokio::fs::write(&path, b"too small").await.unwrap();

    let status = manager.check_model(ModelId::WhisperTiny).await;
    assert!(matches!(
        status,
        ModelStatus::Corrupted { actual: 9, .. }
    ));
}

#[tokio::test]
async fn test_resolve_existing_file_path() {
    let temp = TempDir::new().unwrap();
    let manager = ModelManager::with_dir(temp.path().join("models"));

    let custom = temp.path().join("my-model.bin");
    tokio::fs::write(&custom, b"ggml").await.unwrap();

    let resolved = manager.resolve(custom.to_str().unwrap()).await.unwrap();
    assert_eq!(resolved, custom);
}

#[tokio::test]
async fn test_resolve_unknown_model_fails() {
    let temp = TempDir::new().unwrap();
    let manager = ModelManager::with_dir(temp.path());

    let err = manager.resolve("not-a-model").await.unwrap_err();
    assert!(err.to_string().contains("Unknown model"));
}
