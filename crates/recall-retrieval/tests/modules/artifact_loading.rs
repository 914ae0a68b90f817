//! Tests for reading embedding artifacts from disk

use bincode::config::standard as bincode_config;
use bincode::encode_to_vec;
use recall_core::Error;
use recall_retrieval::{EmbeddingStore, VectorArtifact};
use serde_json::to_vec as json_to_vec;
use std::fs;
use tempfile::TempDir;

fn sample_artifact() -> VectorArtifact {
    VectorArtifact {
        embeddings: vec![vec![0.1, 0.2, 0.3], vec![0.3, 0.2, 0.1]],
        texts: vec![
            "Functions are declared with def.".to_owned(),
            "Loops repeat a block of code.".to_owned(),
        ],
    }
}

#[tokio::test]
async fn test_load_json_artifact() {
    let temp_dir = TempDir::new().expect("Failed to create temp dir");
    let path = temp_dir.path().join("vectors.json");
    fs::write(&path, json_to_vec(&sample_artifact()).unwrap()).unwrap();

    let store = EmbeddingStore::load(&path).await.unwrap();
    assert_eq!(store.len(), 2);
    assert_eq!(store.dimension(), 3);
    assert_eq!(store.text(0), Some("Functions are declared with def."));
}

#[tokio::test]
async fn test_load_bincode_artifact() {
    let temp_dir = TempDir::new().expect("Failed to create temp dir");
    let path = temp_dir.path().join("vectors.bin");
    let bytes = encode_to_vec(sample_artifact(), bincode_config()).unwrap();
    fs::write(&path, bytes).unwrap();

    let store = EmbeddingStore::load(&path).await.unwrap();
    assert_eq!(store.len(), 2);
    assert_eq!(store.embeddings()[1], vec![0.3, 0.2, 0.1]);
}

#[tokio::test]
async fn test_missing_file_is_load_failure() {
    let temp_dir = TempDir::new().expect("Failed to create temp dir");
    let path = temp_dir.path().join("absent.json");

    let error = EmbeddingStore::load(&path).await.unwrap_err();
    assert!(matches!(error, Error::Io(_)));
    assert!(error.is_load_failure());
}

#[tokio::test]
async fn test_missing_field_is_load_failure() {
    let temp_dir = TempDir::new().expect("Failed to create temp dir");
    let path = temp_dir.path().join("vectors.json");
    fs::write(&path, r#"{"texts": ["only text"]}"#).unwrap();

    let error = EmbeddingStore::load(&path).await.unwrap_err();
    assert!(error.is_load_failure());
    assert!(error.to_string().contains("embeddings"));
}

#[tokio::test]
async fn test_mismatched_lengths_rejected_on_load() {
    let temp_dir = TempDir::new().expect("Failed to create temp dir");
    let path = temp_dir.path().join("vectors.json");
    fs::write(
        &path,
        r#"{"embeddings": [[1.0], [2.0]], "texts": ["one", "two", "three"]}"#,
    )
    .unwrap();

    let error = EmbeddingStore::load(&path).await.unwrap_err();
    assert!(matches!(
        error,
        Error::LengthMismatch {
            embeddings: 2,
            texts: 3
        }
    ));
}

#[tokio::test]
async fn test_truncated_bincode_rejected() {
    let temp_dir = TempDir::new().expect("Failed to create temp dir");
    let path = temp_dir.path().join("vectors.bincode");
    let mut bytes = encode_to_vec(sample_artifact(), bincode_config()).unwrap();
    bytes.truncate(bytes.len() / 2);
    fs::write(&path, bytes).unwrap();

    let error = EmbeddingStore::load(&path).await.unwrap_err();
    assert!(matches!(error, Error::Decode(_)));
}

#[tokio::test]
async fn test_unknown_extension_rejected() {
    let temp_dir = TempDir::new().expect("Failed to create temp dir");
    let path = temp_dir.path().join("vectors.joblib");
    fs::write(&path, b"not ours").unwrap();

    let error = EmbeddingStore::load(&path).await.unwrap_err();
    assert!(matches!(error, Error::UnsupportedFormat(_)));
}
