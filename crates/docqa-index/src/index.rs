use anyhow::Result;
use tracing::info;

use docqa_core::error::Error;
use docqa_core::traits::Embedder;
use docqa_core::types::{Chunk, SearchResult};

/// The searchable collection of chunk/vector pairs for one document.
///
/// `chunks` and `vectors` are index-aligned and always equal in
/// length. A rebuild produces a whole new value; the owner swaps it in
/// only after the build completes, so queries never observe a
/// partially built index.
#[derive(Debug, Clone)]
pub struct VectorIndex {
    chunks: Vec<Chunk>,
    vectors: Vec<Vec<f32>>,
    embedder_id: String,
    dim: usize,
}

impl VectorIndex {
    /// Embed every chunk once and store the vectors aligned 1:1 with
    /// chunk order. Fails if the embedder returns the wrong count or
    /// dimensionality.
    pub fn build(chunks: Vec<Chunk>, embedder: &dyn Embedder) -> Result<Self> {
        let texts: Vec<String> = chunks.iter().map(|c| c.text.clone()).collect();
        let vectors = embedder.embed_batch(&texts)?;
        if vectors.len() != chunks.len() {
            return Err(Error::EmbeddingService(format!(
                "embedder returned {} vectors for {} chunks",
                vectors.len(),
                chunks.len()
            ))
            .into());
        }
        let dim = embedder.dim();
        for v in &vectors {
            if v.len() != dim {
                return Err(Error::DimensionMismatch {
                    expected: dim,
                    actual: v.len(),
                }
                .into());
            }
        }
        info!(chunks = chunks.len(), dim, "built vector index");
        Ok(Self {
            chunks,
            vectors,
            embedder_id: embedder.embedder_id().to_string(),
            dim,
        })
    }

    pub(crate) fn from_parts(
        chunks: Vec<Chunk>,
        vectors: Vec<Vec<f32>>,
        embedder_id: String,
        dim: usize,
    ) -> Self {
        Self {
            chunks,
            vectors,
            embedder_id,
            dim,
        }
    }

    pub fn len(&self) -> usize {
        self.chunks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.chunks.is_empty()
    }

    pub fn dim(&self) -> usize {
        self.dim
    }

    pub fn embedder_id(&self) -> &str {
        &self.embedder_id
    }

    pub fn chunks(&self) -> &[Chunk] {
        &self.chunks
    }

    pub fn vectors(&self) -> &[Vec<f32>] {
        &self.vectors
    }

    /// Reject queries embedded in a different vector space than the
    /// one this index was built in.
    pub fn ensure_embedder(&self, embedder_id: &str) -> Result<()> {
        if embedder_id != self.embedder_id {
            return Err(Error::IncompatibleIndex(format!(
                "index was built with embedder '{}' but '{}' is configured",
                self.embedder_id, embedder_id
            ))
            .into());
        }
        Ok(())
    }

    /// Rank every stored chunk against `query_vec` by cosine
    /// similarity. Ties break towards the lower chunk ordinal, ranks
    /// are 1-based, and `top_k` larger than the corpus returns the
    /// whole corpus ranked. An empty index yields an empty list.
    pub fn search(&self, query_vec: &[f32], top_k: usize) -> Result<Vec<SearchResult>> {
        if self.chunks.is_empty() {
            return Ok(Vec::new());
        }
        if query_vec.len() != self.dim {
            return Err(Error::DimensionMismatch {
                expected: self.dim,
                actual: query_vec.len(),
            }
            .into());
        }

        let mut scored: Vec<(f32, usize)> = self
            .vectors
            .iter()
            .enumerate()
            .map(|(i, v)| (cosine_similarity(query_vec, v), i))
            .collect();
        scored.sort_by(|a, b| {
            b.0.partial_cmp(&a.0)
                .unwrap_or(std::cmp::Ordering::Equal)
                .then_with(|| a.1.cmp(&b.1))
        });
        scored.truncate(top_k);

        Ok(scored
            .into_iter()
            .enumerate()
            .map(|(pos, (score, i))| SearchResult {
                chunk: self.chunks[i].clone(),
                score,
                rank: pos + 1,
            })
            .collect())
    }
}

/// Cosine similarity; 0.0 when either vector has zero magnitude.
fn cosine_similarity(a: &[f32], b: &[f32]) -> f32 {
    if a.len() != b.len() || a.is_empty() {
        return 0.0;
    }

    let mut dot_product = 0.0;
    let mut norm_a = 0.0;
    let mut norm_b = 0.0;

    for (x, y) in a.iter().zip(b.iter()) {
        dot_product += x * y;
        norm_a += x * x;
        norm_b += y * y;
    }

    let denominator = (norm_a * norm_b).sqrt();
    if denominator == 0.0 {
        return 0.0;
    }

    dot_product / denominator
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cosine_similarity() {
        let a = vec![1.0, 0.0, 0.0];
        let b = vec![1.0, 0.0, 0.0];
        assert!((cosine_similarity(&a, &b) - 1.0).abs() < 0.001);

        let c = vec![0.0, 1.0, 0.0];
        assert!(cosine_similarity(&a, &c).abs() < 0.001);

        let d = vec![-1.0, 0.0, 0.0];
        assert!((cosine_similarity(&a, &d) + 1.0).abs() < 0.001);
    }

    #[test]
    fn zero_magnitude_scores_zero() {
        let a = vec![0.0, 0.0];
        let b = vec![1.0, 2.0];
        assert_eq!(cosine_similarity(&a, &b), 0.0);
    }
}
