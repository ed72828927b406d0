//! Remote dense embedder: sequential batching with shrink-and-retry
//! failure recovery.
//!
//! One batch is in flight at a time, paced by a fixed delay, so
//! retries always reprocess a well-defined contiguous range. The
//! accumulating output buffer is filled strictly in input order.

use std::thread;
use std::time::Duration;

use anyhow::Result;
use tracing::{debug, warn};

use docqa_core::error::Error;
use docqa_core::traits::Embedder;

/// Transport seam for the external embedding service. Tests substitute
/// a scripted fake; production uses
/// [`crate::service::HttpEmbeddingService`].
pub trait EmbeddingService: Send + Sync {
    /// One vector per input text, in input order.
    fn embed(&self, model: &str, texts: &[String]) -> Result<Vec<Vec<f32>>>;
}

#[derive(Debug, Clone)]
pub struct RemoteConfig {
    pub model: String,
    pub dim: usize,
    pub batch_size: usize,
    /// Floor below which a failing batch is no longer retried.
    pub min_batch_size: usize,
    /// Delay between consecutive batch submissions.
    pub pacing: Duration,
}

pub struct RemoteEmbedder {
    service: Box<dyn EmbeddingService>,
    cfg: RemoteConfig,
    id: String,
}

impl RemoteEmbedder {
    pub fn new(service: Box<dyn EmbeddingService>, cfg: RemoteConfig) -> Self {
        let id = format!("remote:{}:d{}", cfg.model, cfg.dim);
        Self { service, cfg, id }
    }
}

impl Embedder for RemoteEmbedder {
    fn embedder_id(&self) -> &str {
        &self.id
    }

    fn dim(&self) -> usize {
        self.cfg.dim
    }

    /// On a batch failure the width is halved and the same contiguous
    /// range is retried from scratch; the shrunken width sticks for the
    /// rest of the run. Once the current width is at or below the floor
    /// the failure is surfaced as [`Error::EmbeddingService`].
    fn embed_batch(&self, texts: &[String]) -> Result<Vec<Vec<f32>>> {
        let mut out: Vec<Vec<f32>> = Vec::with_capacity(texts.len());
        let mut width = self.cfg.batch_size.max(1);
        let mut start = 0;
        while start < texts.len() {
            let end = (start + width).min(texts.len());
            match self.service.embed(&self.cfg.model, &texts[start..end]) {
                Ok(vectors) => {
                    validate(&vectors, end - start, self.cfg.dim)?;
                    out.extend(vectors);
                    start = end;
                    debug!(done = start, total = texts.len(), width, "embedded batch");
                    if start < texts.len() {
                        thread::sleep(self.cfg.pacing);
                    }
                }
                Err(e) => {
                    if width <= self.cfg.min_batch_size {
                        warn!(width, "embedding batch failed at floor width, giving up");
                        return Err(Error::EmbeddingService(format!(
                            "batch of {} texts failed and width {} is at the floor of {}: {e}",
                            end - start,
                            width,
                            self.cfg.min_batch_size
                        ))
                        .into());
                    }
                    width = (width / 2).max(1);
                    warn!(width, error = %e, "embedding batch failed, retrying with smaller batches");
                }
            }
        }
        Ok(out)
    }
}

fn validate(vectors: &[Vec<f32>], expected_count: usize, dim: usize) -> Result<()> {
    if vectors.len() != expected_count {
        return Err(Error::EmbeddingService(format!(
            "service returned {} embeddings for {} inputs",
            vectors.len(),
            expected_count
        ))
        .into());
    }
    for v in vectors {
        if v.len() != dim {
            return Err(Error::DimensionMismatch {
                expected: dim,
                actual: v.len(),
            }
            .into());
        }
    }
    Ok(())
}
