//! Display formatting for ranked results.

use crate::retriever::RetrievedChunk;

/// Truncate `text` to at most `max_chars` characters with newlines turned
/// into spaces.
pub fn snippet(text: &str, max_chars: usize) -> String {
    text.chars()
        .take(max_chars)
        .map(|character| if character == '\n' { ' ' } else { character })
        .collect()
}

/// Render one result as `rank. (score=X.XXX)  snippet…`
pub fn format_result(chunk: &RetrievedChunk, max_chars: usize) -> String {
    format!(
        "{}. (score={:.3})  {}\u{2026}",
        chunk.rank,
        chunk.score,
        snippet(&chunk.text, max_chars)
    )
}
