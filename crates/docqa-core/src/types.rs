//! Domain types shared across the retrieval pipeline.

use serde::{Deserialize, Serialize};

/// A bounded contiguous slice of document text used as the retrieval unit.
///
/// - `index`: ordinal position within the parent document
/// - `text`: the text payload, including any overlap carried over from
///   the tail of the previous chunk
/// - `start`/`end`: byte span into the original document, always on
///   char boundaries
///
/// Chunks are immutable once created and owned by the index built
/// from them.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Chunk {
    pub index: usize,
    pub text: String,
    pub start: usize,
    pub end: usize,
}

/// One ranked hit from a similarity search.
///
/// `score` is cosine similarity against the query, higher is better.
/// `rank` is the 1-based position within the result list. Results are
/// computed fresh per query and carry no cross-query state.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SearchResult {
    pub chunk: Chunk,
    pub score: f32,
    pub rank: usize,
}

/// An answer together with the retrieval evidence behind it.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct QaOutcome {
    pub answer: String,
    pub results: Vec<SearchResult>,
}
