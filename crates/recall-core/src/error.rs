use core::result::Result as CoreResult;
use std::io::Error as IoError;

use bincode::error::DecodeError;
use serde_json::Error as SerdeJsonError;
use thiserror::Error;
use toml::de::Error as TomlError;

/// Result type for recall operations.
pub type Result<T> = CoreResult<T, Error>;

/// Errors that can occur while loading, indexing or querying embeddings.
#[derive(Debug, Error)]
pub enum Error {
    /// An I/O operation failed.
    #[error(transparent)]
    Io(#[from] IoError),

    /// JSON deserialization failed.
    #[error(transparent)]
    Json(#[from] SerdeJsonError),

    /// Binary artifact decoding failed.
    #[error(transparent)]
    Decode(#[from] DecodeError),

    /// TOML deserialization failed.
    #[error(transparent)]
    Toml(#[from] TomlError),

    /// Configuration is invalid or missing.
    #[error("Configuration error: {0}")]
    Config(String),

    /// The artifact file extension is not a known format.
    #[error("Unsupported artifact format: {0} (expected .json, .bin or .bincode)")]
    UnsupportedFormat(String),

    /// The artifact holds no embeddings.
    #[error("Artifact contains no embeddings")]
    EmptyArtifact,

    /// The embedding and text collections differ in length.
    #[error("Artifact has {embeddings} embeddings but {texts} texts")]
    LengthMismatch {
        /// Number of embedding rows
        embeddings: usize,
        /// Number of text chunks
        texts: usize,
    },

    /// A stored row does not match the dimension of the first row.
    #[error("Embedding {row} has dimension {actual}, expected {expected}")]
    InconsistentDimension {
        /// Offending row
        row: usize,
        /// Dimension of row 0
        expected: usize,
        /// Dimension of the offending row
        actual: usize,
    },

    /// A vector does not match the dimension of the index.
    #[error("Dimension mismatch: index has dimension {expected}, vector has {actual}")]
    DimensionMismatch {
        /// Index dimension
        expected: usize,
        /// Vector dimension
        actual: usize,
    },

    /// A vector contains NaN or infinity.
    #[error("{}", non_finite_message(*.row))]
    NonFinite {
        /// Offending row, `None` for query vectors
        row: Option<usize>,
    },

    /// A vector has zero length and cannot be normalized.
    #[error("{}", zero_vector_message(*.row))]
    ZeroVector {
        /// Offending row, `None` for query vectors
        row: Option<usize>,
    },

    /// The text encoder failed or is unavailable.
    #[error("Encoder error: {0}")]
    Encoder(String),

    /// A general error not covered by other variants.
    #[error("{0}")]
    Other(String),
}

fn zero_vector_message(row: Option<usize>) -> String {
    row.map_or_else(
        || "Query embedding has zero length and cannot be normalized".to_owned(),
        |index| format!("Embedding {index} has zero length and cannot be normalized"),
    )
}

fn non_finite_message(row: Option<usize>) -> String {
    row.map_or_else(
        || "Query embedding contains non-finite values".to_owned(),
        |index| format!("Embedding {index} contains non-finite values"),
    )
}

impl Error {
    /// Determines whether this error came from reading or validating the
    /// embedding artifact.
    pub fn is_load_failure(&self) -> bool {
        matches!(
            self,
            Self::Io(_)
                | Self::Json(_)
                | Self::Decode(_)
                | Self::UnsupportedFormat(_)
                | Self::EmptyArtifact
                | Self::LengthMismatch { .. }
                | Self::InconsistentDimension { .. }
                | Self::NonFinite { row: Some(_) }
                | Self::ZeroVector { row: Some(_) }
        )
    }
}
