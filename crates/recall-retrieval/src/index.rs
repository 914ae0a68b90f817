//! Exact inner-product nearest-neighbor search.

use recall_core::{Error, Result};
use std::cmp::Ordering;

/// A single search hit.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Neighbor {
    /// Position of the entry in the indexed collection
    pub index: usize,
    /// Inner product between the query and the entry
    pub score: f32,
}

/// Nearest-neighbor index queried by inner product
pub trait SearchIndex {
    /// Dimension every indexed vector shares
    fn dimension(&self) -> usize;

    /// Number of indexed vectors
    fn len(&self) -> usize;

    /// Check if the index holds no vectors
    fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Return the `top_k` highest-scoring entries, best first.
    ///
    /// Asking for more entries than the index holds returns all of them.
    ///
    /// # Errors
    /// Returns an error if the query dimension differs from the index dimension
    fn search(&self, query: &[f32], top_k: usize) -> Result<Vec<Neighbor>>;
}

/// Brute-force index over a contiguous row-major buffer.
///
/// Equal scores are ordered by ascending entry index.
#[derive(Debug, Clone)]
pub struct FlatIndex {
    dimension: usize,
    data: Vec<f32>,
}

impl FlatIndex {
    /// Build an index from rows that all have `dimension` components.
    ///
    /// Rows are copied as given; normalize them first for cosine similarity.
    ///
    /// # Errors
    /// Returns an error if `dimension` is zero or a row has another length
    pub fn build(dimension: usize, rows: &[Vec<f32>]) -> Result<Self> {
        if dimension == 0 {
            return Err(Error::Other("Index dimension must be non-zero".into()));
        }

        let mut data = Vec::with_capacity(dimension * rows.len());
        for (row, vector) in rows.iter().enumerate() {
            if vector.len() != dimension {
                return Err(Error::InconsistentDimension {
                    row,
                    expected: dimension,
                    actual: vector.len(),
                });
            }
            data.extend_from_slice(vector);
        }

        tracing::debug!(
            "Built flat index: {} vectors, dimension {}",
            rows.len(),
            dimension
        );

        Ok(Self { dimension, data })
    }

    /// The stored vector at `index`, if any
    pub fn vector(&self, index: usize) -> Option<&[f32]> {
        let start = index.checked_mul(self.dimension)?;
        let end = start.checked_add(self.dimension)?;
        self.data.get(start..end)
    }
}

impl SearchIndex for FlatIndex {
    fn dimension(&self) -> usize {
        self.dimension
    }

    fn len(&self) -> usize {
        self.data.len() / self.dimension
    }

    fn search(&self, query: &[f32], top_k: usize) -> Result<Vec<Neighbor>> {
        if query.len() != self.dimension {
            return Err(Error::DimensionMismatch {
                expected: self.dimension,
                actual: query.len(),
            });
        }
        if top_k == 0 {
            return Ok(Vec::default());
        }

        let mut scores: Vec<Neighbor> = self
            .data
            .chunks_exact(self.dimension)
            .enumerate()
            .map(|(index, row)| Neighbor {
                index,
                score: dot(query, row),
            })
            .collect();

        scores.sort_by(by_score_then_index);
        scores.truncate(top_k);
        Ok(scores)
    }
}

fn by_score_then_index(first: &Neighbor, second: &Neighbor) -> Ordering {
    second
        .score
        .total_cmp(&first.score)
        .then_with(|| first.index.cmp(&second.index))
}

fn dot(vector_a: &[f32], vector_b: &[f32]) -> f32 {
    vector_a
        .iter()
        .zip(vector_b.iter())
        .map(|(left, right)| left * right)
        .sum()
}
