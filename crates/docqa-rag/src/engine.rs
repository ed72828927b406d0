//! Retrieval engine tying the chunker, embedder, and index together.

use std::path::Path;

use anyhow::{bail, Result};
use tracing::{info, warn};

use docqa_core::chunker::{self, ChunkingConfig};
use docqa_core::error::Error;
use docqa_core::traits::{AnswerGenerator, Embedder, QaBackend};
use docqa_core::types::{QaOutcome, SearchResult};
use docqa_embed::sparse::{SparseEmbedder, SparseModel};
use docqa_embed::{build_embedder, EmbedConfig};
use docqa_index::{load_index, save_index, VectorIndex};

const FALLBACK_PREFIX: &str = "Based on the most relevant sections of the document:\n\n";
const FALLBACK_EXCERPT_CHARS: usize = 1000;
const NO_CONTEXT_ANSWER: &str = "No relevant content was found for this question.";

/// End-to-end local pipeline over a single document.
///
/// `ingest` builds a complete replacement index before swapping it in,
/// so a failed rebuild leaves the previous corpus queryable. Questions
/// are embedded in the same vector space as the indexed chunks; a
/// persisted index records that space and is rejected on reload if the
/// configuration no longer matches it.
pub struct RagEngine {
    chunking: ChunkingConfig,
    embedding: EmbedConfig,
    embedder: Option<Box<dyn Embedder>>,
    index: Option<VectorIndex>,
    sparse_model: Option<SparseModel>,
    generator: Option<Box<dyn AnswerGenerator>>,
}

impl RagEngine {
    pub fn new(chunking: ChunkingConfig, embedding: EmbedConfig) -> Self {
        Self {
            chunking,
            embedding,
            embedder: None,
            index: None,
            sparse_model: None,
            generator: None,
        }
    }

    pub fn with_generator(mut self, generator: Box<dyn AnswerGenerator>) -> Self {
        self.generator = Some(generator);
        self
    }

    pub fn chunk_count(&self) -> usize {
        self.index.as_ref().map_or(0, VectorIndex::len)
    }

    pub fn is_ready(&self) -> bool {
        self.index.is_some()
    }

    /// Chunk, embed, and index `text`, replacing any previous corpus.
    /// Returns the number of chunks indexed.
    pub fn ingest(&mut self, text: &str) -> Result<usize> {
        let chunks = chunker::split(text, &self.chunking);
        let texts: Vec<String> = chunks.iter().map(|c| c.text.clone()).collect();
        let built = build_embedder(&self.embedding, &texts)?;
        let index = VectorIndex::build(chunks, built.embedder.as_ref())?;
        let count = index.len();

        self.embedder = Some(built.embedder);
        self.sparse_model = built.sparse_model;
        self.index = Some(index);
        info!(chunks = count, "document ingested");
        Ok(count)
    }

    /// Rank the indexed chunks against `question`.
    pub fn retrieve(&self, question: &str, top_k: usize) -> Result<Vec<SearchResult>> {
        let (embedder, index) = self.ready()?;
        let mut query = embedder.embed_batch(&[question.to_string()])?;
        if query.is_empty() {
            bail!("embedder returned no vector for the question");
        }
        index.search(&query.remove(0), top_k)
    }

    /// Retrieve, then synthesize an answer over the joined context.
    ///
    /// Generation failures degrade to an extractive excerpt of the
    /// retrieved context rather than failing the question; the ranked
    /// results are returned either way.
    pub fn answer(&self, question: &str, top_k: usize) -> Result<QaOutcome> {
        let results = self.retrieve(question, top_k)?;
        if results.is_empty() {
            return Ok(QaOutcome {
                answer: NO_CONTEXT_ANSWER.to_string(),
                results,
            });
        }

        let context = results
            .iter()
            .map(|r| r.chunk.text.as_str())
            .collect::<Vec<_>>()
            .join("\n\n");
        let answer = match &self.generator {
            Some(generator) => match generator.generate(&context, question) {
                Ok(answer) => answer,
                Err(e) => {
                    warn!(error = %e, "answer generation failed, using extractive fallback");
                    fallback_answer(&context)
                }
            },
            None => fallback_answer(&context),
        };
        Ok(QaOutcome { answer, results })
    }

    pub fn save(&self, path: &Path) -> Result<()> {
        let Some(index) = self.index.as_ref() else {
            bail!("no document has been ingested");
        };
        save_index(index, self.sparse_model.as_ref(), path)
    }

    /// Restore a persisted index and rebuild a query-compatible
    /// embedder for it. Fails with [`Error::IncompatibleIndex`] when
    /// the stored vector space does not match the current
    /// configuration.
    pub fn load(&mut self, path: &Path) -> Result<()> {
        let loaded = load_index(path)?;
        let embedder: Box<dyn Embedder> = if loaded.index.embedder_id().starts_with("tfidf:") {
            if self.embedding.provider != "tfidf" {
                return Err(Error::IncompatibleIndex(format!(
                    "index was built with a sparse embedder but provider '{}' is configured",
                    self.embedding.provider
                ))
                .into());
            }
            let model = loaded.sparse_model.clone().ok_or_else(|| {
                Error::IncompatibleIndex("sparse index is missing its fitted model".to_string())
            })?;
            if model.max_features != self.embedding.max_features {
                return Err(Error::IncompatibleIndex(format!(
                    "index was fitted with max_features {} but {} is configured",
                    model.max_features, self.embedding.max_features
                ))
                .into());
            }
            Box::new(SparseEmbedder::from_model(model))
        } else {
            build_embedder(&self.embedding, &[])?.embedder
        };
        loaded.index.ensure_embedder(embedder.embedder_id())?;

        self.embedder = Some(embedder);
        self.sparse_model = loaded.sparse_model;
        self.index = Some(loaded.index);
        info!(chunks = self.chunk_count(), "index restored");
        Ok(())
    }

    fn ready(&self) -> Result<(&dyn Embedder, &VectorIndex)> {
        match (self.embedder.as_deref(), self.index.as_ref()) {
            (Some(embedder), Some(index)) => Ok((embedder, index)),
            _ => bail!("no document has been ingested"),
        }
    }
}

impl QaBackend for RagEngine {
    fn answer(&self, question: &str, top_k: usize) -> Result<QaOutcome> {
        RagEngine::answer(self, question, top_k)
    }
}

/// Char-safe excerpt of the retrieved context, used when no generator
/// is configured or generation fails.
fn fallback_answer(context: &str) -> String {
    let excerpt: String = context.chars().take(FALLBACK_EXCERPT_CHARS).collect();
    let suffix = if excerpt.len() < context.len() { "..." } else { "" };
    format!("{FALLBACK_PREFIX}{excerpt}{suffix}")
}
