//! End-to-end retrieval over an in-memory store with a deterministic encoder

use recall_core::Result;
use recall_retrieval::{
    Embedding, EmbeddingStore, Encoder, FlatIndex, Retriever, SearchIndex as _, VectorArtifact,
    format_result, l2_norm, normalize_rows,
};
use std::collections::hash_map::DefaultHasher;
use std::hash::{Hash as _, Hasher as _};

const DIMENSION: usize = 16;

/// Hash-seeded fake encoder: same text, same vector
struct FakeEncoder;

impl FakeEncoder {
    fn fake_embedding(text: &str) -> Embedding {
        let mut hasher = DefaultHasher::new();
        text.hash(&mut hasher);
        let hash = hasher.finish();

        (0..DIMENSION)
            .map(|idx| {
                let mixed = hash.rotate_left(idx as u32 * 4) ^ (idx as u64).wrapping_mul(0x9E37);
                (mixed % 2000) as f32 / 1000.0 - 1.0
            })
            .collect()
    }
}

impl Encoder for FakeEncoder {
    async fn ensure_ready(&self) -> Result<()> {
        Ok(())
    }

    async fn encode(&self, text: &str) -> Result<Embedding> {
        Ok(Self::fake_embedding(text))
    }
}

fn course_texts() -> Vec<String> {
    [
        "Functions group reusable code under a name.",
        "A for loop iterates over a sequence.",
        "While loops run until a condition is false.",
        "Dictionaries map keys to values.",
        "Recursion is a function calling itself.",
        "Exceptions are handled with try and except.",
        "Classes bundle data and behaviour.",
        "Tuples are immutable, lists are mutable.",
    ]
    .iter()
    .map(|text| (*text).to_owned())
    .collect()
}

fn course_store() -> EmbeddingStore {
    let texts = course_texts();
    let embeddings = texts
        .iter()
        .map(|text| FakeEncoder::fake_embedding(text))
        .collect();
    EmbeddingStore::from_artifact(VectorArtifact { embeddings, texts }).unwrap()
}

#[tokio::test]
async fn test_top_five_scores_non_increasing() {
    let retriever = Retriever::from_store(course_store(), FakeEncoder).unwrap();

    for query in ["What is recursion?", "Explain loops", "How do classes work?"] {
        let results = retriever.retrieve(query, 5).await.unwrap();
        assert_eq!(results.len(), 5);
        for pair in results.windows(2) {
            assert!(
                pair[0].score >= pair[1].score,
                "scores out of order for {query}: {} < {}",
                pair[0].score,
                pair[1].score
            );
        }
    }
}

#[tokio::test]
async fn test_exact_chunk_text_ranks_itself_first() {
    let retriever = Retriever::from_store(course_store(), FakeEncoder).unwrap();
    let query = "Dictionaries map keys to values.";

    let results = retriever.retrieve(query, 3).await.unwrap();
    assert_eq!(results[0].index, 3);
    assert!((results[0].score - 1.0).abs() < 1e-5);
    assert!(format_result(&results[0], 250).starts_with("1. (score=1.000)  Dictionaries"));
}

#[tokio::test]
async fn test_same_query_same_ranking() {
    let first = Retriever::from_store(course_store(), FakeEncoder)
        .unwrap()
        .retrieve("Explain object-oriented programming concepts", 5)
        .await
        .unwrap();
    let second = Retriever::from_store(course_store(), FakeEncoder)
        .unwrap()
        .retrieve("Explain object-oriented programming concepts", 5)
        .await
        .unwrap();
    assert_eq!(first, second);
}

#[test]
fn test_normalized_store_rows_are_unit_length() {
    let (dimension, mut embeddings, _) = course_store().into_parts();
    normalize_rows(&mut embeddings).unwrap();
    let index = FlatIndex::build(dimension, &embeddings).unwrap();

    for row in 0..index.len() {
        let vector = index.vector(row).unwrap();
        assert!((l2_norm(vector) - 1.0).abs() < 1e-6);
    }
}
