//! Query pipeline: encode, normalize, search, attach texts.

use crate::encoder::Encoder;
use crate::index::{FlatIndex, SearchIndex};
use crate::normalize::{normalize_in_place, normalize_rows};
use crate::store::EmbeddingStore;
use recall_core::{Error, Result};
use std::time::Instant;

/// One ranked retrieval result
#[derive(Debug, Clone, PartialEq)]
pub struct RetrievedChunk {
    /// 1-based rank
    pub rank: usize,
    /// Position of the chunk in the store
    pub index: usize,
    /// Cosine similarity to the query
    pub score: f32,
    /// Full chunk text
    pub text: String,
}

/// Answers queries against a fixed set of chunks
pub struct Retriever<E: Encoder, I: SearchIndex = FlatIndex> {
    index: I,
    texts: Vec<String>,
    encoder: E,
}

impl<E: Encoder> Retriever<E, FlatIndex> {
    /// Normalize the store and build a flat inner-product index over it
    ///
    /// # Errors
    /// Returns an error if a stored embedding has zero length
    pub fn from_store(store: EmbeddingStore, encoder: E) -> Result<Self> {
        let (dimension, mut embeddings, texts) = store.into_parts();
        normalize_rows(&mut embeddings)?;
        let index = FlatIndex::build(dimension, &embeddings)?;
        tracing::info!(
            "Index ready: {} chunks, dimension {}",
            index.len(),
            dimension
        );
        Self::with_index(index, texts, encoder)
    }
}

impl<E: Encoder, I: SearchIndex> Retriever<E, I> {
    /// Use an already built index whose entry `i` belongs to `texts[i]`
    ///
    /// # Errors
    /// Returns an error if the index and the texts differ in length
    pub fn with_index(index: I, texts: Vec<String>, encoder: E) -> Result<Self> {
        if index.len() != texts.len() {
            return Err(Error::LengthMismatch {
                embeddings: index.len(),
                texts: texts.len(),
            });
        }
        Ok(Self {
            index,
            texts,
            encoder,
        })
    }

    /// The encoder used for queries
    pub fn encoder(&self) -> &E {
        &self.encoder
    }

    /// Number of searchable chunks
    pub fn len(&self) -> usize {
        self.texts.len()
    }

    /// Check if there is nothing to search
    pub fn is_empty(&self) -> bool {
        self.texts.is_empty()
    }

    /// Retrieve the `top_k` chunks most similar to `query`
    ///
    /// # Errors
    /// Returns an error if encoding fails, the query embedding has zero
    /// length, or its dimension differs from the index
    pub async fn retrieve(&self, query: &str, top_k: usize) -> Result<Vec<RetrievedChunk>> {
        let started = Instant::now();
        let mut query_vector = self.encoder.encode(query).await?;
        normalize_in_place(&mut query_vector)?;

        let neighbors = self.index.search(&query_vector, top_k)?;
        let results = neighbors
            .into_iter()
            .enumerate()
            .map(|(position, neighbor)| {
                let text = self.texts.get(neighbor.index).ok_or_else(|| {
                    Error::Other(format!("Index returned unknown chunk {}", neighbor.index))
                })?;
                Ok(RetrievedChunk {
                    rank: position + 1,
                    index: neighbor.index,
                    score: neighbor.score,
                    text: text.clone(),
                })
            })
            .collect::<Result<Vec<_>>>()?;

        tracing::debug!(
            "Retrieved {} chunks in {:?} for query {:?}",
            results.len(),
            started.elapsed(),
            query
        );
        Ok(results)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::encoder::Embedding;
    use crate::store::VectorArtifact;
    use std::collections::HashMap;

    /// Encoder returning fixed vectors for known texts
    struct StaticEncoder {
        vectors: HashMap<String, Embedding>,
    }

    impl StaticEncoder {
        fn new(entries: &[(&str, Embedding)]) -> Self {
            Self {
                vectors: entries
                    .iter()
                    .map(|(text, vector)| ((*text).to_owned(), vector.clone()))
                    .collect(),
            }
        }
    }

    impl Encoder for StaticEncoder {
        async fn ensure_ready(&self) -> Result<()> {
            Ok(())
        }

        async fn encode(&self, text: &str) -> Result<Embedding> {
            self.vectors
                .get(text)
                .cloned()
                .ok_or_else(|| Error::Encoder(format!("unknown text {text}")))
        }
    }

    fn three_item_store() -> EmbeddingStore {
        EmbeddingStore::from_artifact(VectorArtifact {
            embeddings: vec![
                vec![2.0, 1.0, 0.0],
                vec![-0.1, 0.2, 1.0],
                vec![0.3, -0.5, 1.0],
            ],
            texts: vec!["target".into(), "weak".into(), "weaker".into()],
        })
        .unwrap()
    }

    #[tokio::test]
    async fn test_identical_vector_ranks_first() {
        let encoder = StaticEncoder::new(&[("query", vec![2.0, 1.0, 0.0])]);
        let retriever = Retriever::from_store(three_item_store(), encoder).unwrap();

        let results = retriever.retrieve("query", 2).await.unwrap();
        assert_eq!(results.len(), 2);
        assert_eq!(results[0].rank, 1);
        assert_eq!(results[0].index, 0);
        assert_eq!(results[0].text, "target");
        assert!((results[0].score - 1.0).abs() < 1e-5);

        // Item 2 has the larger residual similarity to the query
        assert_eq!(results[1].rank, 2);
        assert_eq!(results[1].index, 2);
        assert!(results[1].score < results[0].score);
    }

    #[tokio::test]
    async fn test_repeated_queries_identical() {
        let encoder = StaticEncoder::new(&[("query", vec![0.2, 0.1, 0.9])]);
        let retriever = Retriever::from_store(three_item_store(), encoder).unwrap();

        let first = retriever.retrieve("query", 3).await.unwrap();
        let second = retriever.retrieve("query", 3).await.unwrap();
        assert_eq!(first, second);
    }

    #[tokio::test]
    async fn test_k_exceeding_store_returns_all() {
        let encoder = StaticEncoder::new(&[("query", vec![1.0, 1.0, 1.0])]);
        let retriever = Retriever::from_store(three_item_store(), encoder).unwrap();

        let results = retriever.retrieve("query", 5).await.unwrap();
        assert_eq!(results.len(), 3);
        let ranks: Vec<usize> = results.iter().map(|chunk| chunk.rank).collect();
        assert_eq!(ranks, vec![1, 2, 3]);
    }

    #[tokio::test]
    async fn test_zero_query_vector_is_error() {
        let encoder = StaticEncoder::new(&[("empty", vec![0.0, 0.0, 0.0])]);
        let retriever = Retriever::from_store(three_item_store(), encoder).unwrap();

        let error = retriever.retrieve("empty", 2).await.unwrap_err();
        assert!(matches!(error, Error::ZeroVector { row: None }));
    }

    #[tokio::test]
    async fn test_query_dimension_mismatch_is_error() {
        let encoder = StaticEncoder::new(&[("wide", vec![1.0, 0.0, 0.0, 0.0])]);
        let retriever = Retriever::from_store(three_item_store(), encoder).unwrap();

        let error = retriever.retrieve("wide", 2).await.unwrap_err();
        assert!(matches!(
            error,
            Error::DimensionMismatch {
                expected: 3,
                actual: 4
            }
        ));
    }

    #[tokio::test]
    async fn test_encoder_error_propagates() {
        let retriever =
            Retriever::from_store(three_item_store(), StaticEncoder::new(&[])).unwrap();
        let error = retriever.retrieve("anything", 2).await.unwrap_err();
        assert!(matches!(error, Error::Encoder(_)));
    }

    #[tokio::test]
    async fn test_non_finite_query_vector_is_error() {
        let encoder = StaticEncoder::new(&[("overflow", vec![f32::INFINITY, 0.0, 0.0])]);
        let retriever = Retriever::from_store(three_item_store(), encoder).unwrap();

        let error = retriever.retrieve("overflow", 2).await.unwrap_err();
        assert!(matches!(error, Error::NonFinite { row: None }));
        assert!(!error.is_load_failure());
    }

    #[test]
    fn test_with_index_rejects_mismatch() {
        let index = FlatIndex::build(2, &[vec![1.0, 0.0]]).unwrap();
        let result = Retriever::with_index(
            index,
            vec!["a".into(), "b".into()],
            StaticEncoder::new(&[]),
        );
        assert!(matches!(result, Err(Error::LengthMismatch { .. })));
    }
}
