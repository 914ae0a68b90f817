//! Loading and validation of the precomputed embedding artifact.

use bincode::config::standard as bincode_config;
use bincode::{Decode, Encode, decode_from_slice};
use crate::normalize::l2_norm;
use recall_core::{Error, Result};
use serde::{Deserialize, Serialize};
use serde_json::from_slice as json_from_slice;
use std::path::Path;
use tokio::fs as async_fs;
use tokio::task::spawn_blocking;
use tracing::info;

/// Serialized form of the artifact produced by the offline indexer
#[derive(Debug, Clone, Default, Serialize, Deserialize, Encode, Decode)]
pub struct VectorArtifact {
    /// One embedding row per chunk
    pub embeddings: Vec<Vec<f32>>,
    /// Chunk texts, parallel to `embeddings`
    pub texts: Vec<String>,
}

/// On-disk encoding of a [`VectorArtifact`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ArtifactFormat {
    /// `serde_json` document with `embeddings` and `texts` fields
    Json,
    /// bincode (standard configuration)
    Bincode,
}

impl ArtifactFormat {
    /// Pick the format from the file extension.
    ///
    /// # Errors
    /// Returns [`Error::UnsupportedFormat`] for unknown or missing extensions
    pub fn from_path(path: &Path) -> Result<Self> {
        let extension = path
            .extension()
            .and_then(|ext| ext.to_str())
            .map(str::to_ascii_lowercase)
            .unwrap_or_default();

        match extension.as_str() {
            "json" => Ok(Self::Json),
            "bin" | "bincode" => Ok(Self::Bincode),
            _ => Err(Error::UnsupportedFormat(path.display().to_string())),
        }
    }

    /// Decode an artifact from raw bytes.
    ///
    /// # Errors
    /// Returns an error if the bytes are not a valid artifact in this format
    pub fn decode(self, bytes: &[u8]) -> Result<VectorArtifact> {
        match self {
            Self::Json => Ok(json_from_slice(bytes)?),
            Self::Bincode => {
                let (artifact, _) = decode_from_slice(bytes, bincode_config())?;
                Ok(artifact)
            }
        }
    }
}

/// Validated, immutable collection of chunk embeddings and their texts.
///
/// Row `i` of the embeddings belongs to text `i`.
#[derive(Debug, Clone)]
pub struct EmbeddingStore {
    dimension: usize,
    embeddings: Vec<Vec<f32>>,
    texts: Vec<String>,
}

impl EmbeddingStore {
    /// Read, decode and validate the artifact at `path`
    ///
    /// # Errors
    /// Returns an error if the file cannot be read, decoded or validated
    pub async fn load(path: &Path) -> Result<Self> {
        let format = ArtifactFormat::from_path(path)?;
        let data = async_fs::read(path).await?;
        info!("Read {} bytes from {}", data.len(), path.display());

        let artifact = spawn_blocking(move || format.decode(&data))
            .await
            .map_err(|error| Error::Other(format!("Task join error: {error}")))??;

        let store = Self::from_artifact(artifact)?;
        info!(
            "Loaded {} chunks with dimension {}",
            store.len(),
            store.dimension
        );
        Ok(store)
    }

    /// Validate a decoded artifact
    ///
    /// # Errors
    /// Returns an error if the artifact is empty, its collections differ in
    /// length, its rows differ in dimension, a value is not finite or a row
    /// has zero length
    pub fn from_artifact(artifact: VectorArtifact) -> Result<Self> {
        let VectorArtifact { embeddings, texts } = artifact;

        if embeddings.len() != texts.len() {
            return Err(Error::LengthMismatch {
                embeddings: embeddings.len(),
                texts: texts.len(),
            });
        }

        let Some(first) = embeddings.first() else {
            return Err(Error::EmptyArtifact);
        };
        let dimension = first.len();
        if dimension == 0 {
            return Err(Error::ZeroVector { row: Some(0) });
        }

        for (row, vector) in embeddings.iter().enumerate() {
            if vector.len() != dimension {
                return Err(Error::InconsistentDimension {
                    row,
                    expected: dimension,
                    actual: vector.len(),
                });
            }
            if !vector.iter().all(|value| value.is_finite()) {
                return Err(Error::NonFinite { row: Some(row) });
            }
            if l2_norm(vector) == 0.0 {
                return Err(Error::ZeroVector { row: Some(row) });
            }
        }

        Ok(Self {
            dimension,
            embeddings,
            texts,
        })
    }

    /// Dimension shared by every embedding
    pub fn dimension(&self) -> usize {
        self.dimension
    }

    /// Number of chunks
    pub fn len(&self) -> usize {
        self.texts.len()
    }

    /// Check if store is empty
    pub fn is_empty(&self) -> bool {
        self.texts.is_empty()
    }

    /// Chunk text at `index`
    pub fn text(&self, index: usize) -> Option<&str> {
        self.texts.get(index).map(String::as_str)
    }

    /// Embedding rows in chunk order
    pub fn embeddings(&self) -> &[Vec<f32>] {
        &self.embeddings
    }

    /// Mean chunk length in characters
    pub fn average_text_chars(&self) -> f64 {
        let total: usize = self.texts.iter().map(|text| text.chars().count()).sum();
        total as f64 / self.len().max(1) as f64
    }

    /// Split into `(dimension, embeddings, texts)`
    pub fn into_parts(self) -> (usize, Vec<Vec<f32>>, Vec<String>) {
        (self.dimension, self.embeddings, self.texts)
    }
}
