//! Semantic retrieval over a precomputed set of text-chunk embeddings.
//!
//! The pipeline is: load an artifact into an [`EmbeddingStore`], normalize it
//! into a [`FlatIndex`], and answer queries through a [`Retriever`] that
//! embeds the query with an [`Encoder`].
#![cfg_attr(
    test,
    allow(
        dead_code,
        clippy::expect_used,
        clippy::unwrap_used,
        clippy::panic,
        clippy::missing_panics_doc,
        clippy::missing_errors_doc,
        clippy::float_cmp,
        reason = "Test allows"
    )
)]

pub mod encoder;
pub mod format;
pub mod index;
pub mod normalize;
pub mod retriever;
pub mod store;

pub use encoder::{Embedding, Encoder, OllamaEncoder, ollama_url};
pub use format::{format_result, snippet};
pub use index::{FlatIndex, Neighbor, SearchIndex};
pub use normalize::{l2_norm, normalize_in_place, normalize_rows};
pub use retriever::{RetrievedChunk, Retriever};
pub use store::{ArtifactFormat, EmbeddingStore, VectorArtifact};
