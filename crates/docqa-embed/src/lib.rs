//! Embedder implementations and the config-driven factory.
//!
//! Two production variants behind the [`Embedder`] trait: a sparse
//! term-weighting model fitted over the chunk corpus (`sparse`) and a
//! remote dense service with batched, retryable acquisition (`remote`
//! + `service`). A deterministic hashing fake is available for tests
//! and offline runs.

pub mod remote;
pub mod service;
pub mod sparse;

use std::hash::{Hash, Hasher};
use std::time::Duration;

use anyhow::Result;
use serde::Deserialize;
use tracing::info;
use twox_hash::XxHash64;

use docqa_core::error::Error;
use docqa_core::traits::Embedder;

use remote::{RemoteConfig, RemoteEmbedder};
use service::HttpEmbeddingService;
use sparse::{SparseEmbedder, SparseModel};

/// Embedding configuration, extracted from the `[embedding]` table.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct EmbedConfig {
    /// `tfidf`, `remote`, or `fake`.
    pub provider: String,
    /// Vocabulary cap for the sparse variant.
    pub max_features: usize,
    /// Model identifier sent to the remote service.
    pub model: String,
    pub base_url: String,
    /// Name of the env var holding the service credential.
    pub api_key_env: String,
    /// Expected vector dimensionality of the remote model.
    pub dim: usize,
    pub batch_size: usize,
    pub min_batch_size: usize,
    /// Inter-batch pacing delay, to respect service rate limits.
    pub pacing_ms: u64,
    pub timeout_secs: u64,
}

impl Default for EmbedConfig {
    fn default() -> Self {
        Self {
            provider: "tfidf".to_string(),
            max_features: 1000,
            model: "text-embedding-3-small".to_string(),
            base_url: "https://api.openai.com/v1".to_string(),
            api_key_env: "OPENAI_API_KEY".to_string(),
            dim: 1536,
            batch_size: 100,
            min_batch_size: 10,
            pacing_ms: 100,
            timeout_secs: 30,
        }
    }
}

/// An embedder plus the fitted state it needs persisted, when any.
///
/// Only the sparse provider carries fitted state; it is stored with
/// the index so a reload can transform queries against the same
/// vocabulary.
pub struct BuiltEmbedder {
    pub embedder: Box<dyn Embedder>,
    pub sparse_model: Option<SparseModel>,
}

impl std::fmt::Debug for BuiltEmbedder {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BuiltEmbedder")
            .field("embedder_id", &self.embedder.embedder_id())
            .field("sparse_model", &self.sparse_model)
            .finish()
    }
}

impl BuiltEmbedder {
    fn stateless(embedder: Box<dyn Embedder>) -> Self {
        Self {
            embedder,
            sparse_model: None,
        }
    }
}

/// Build the configured embedder. The sparse variant is fitted over
/// `corpus` (the chunk texts); the other variants ignore it.
///
/// `APP_USE_FAKE_EMBEDDINGS=1` forces the fake regardless of config so
/// tests and offline runs never touch the network.
pub fn build_embedder(cfg: &EmbedConfig, corpus: &[String]) -> Result<BuiltEmbedder> {
    let use_fake = std::env::var("APP_USE_FAKE_EMBEDDINGS")
        .map(|v| v == "1" || v.eq_ignore_ascii_case("true"))
        .unwrap_or(false);
    if use_fake {
        info!(dim = cfg.dim, "using fake embedder");
        return Ok(BuiltEmbedder::stateless(Box::new(FakeEmbedder::new(
            cfg.dim,
        ))));
    }
    match cfg.provider.as_str() {
        "tfidf" => {
            let fitted = SparseEmbedder::fit(corpus, cfg.max_features);
            let model = fitted.model().clone();
            Ok(BuiltEmbedder {
                embedder: Box::new(fitted),
                sparse_model: Some(model),
            })
        }
        "remote" => {
            let api_key = std::env::var(&cfg.api_key_env).map_err(|_| {
                Error::InvalidConfig(format!(
                    "remote embedding provider requires the {} env var",
                    cfg.api_key_env
                ))
            })?;
            let service = HttpEmbeddingService::new(
                &cfg.base_url,
                api_key,
                Duration::from_secs(cfg.timeout_secs),
            )?;
            Ok(BuiltEmbedder::stateless(Box::new(RemoteEmbedder::new(
                Box::new(service),
                RemoteConfig {
                    model: cfg.model.clone(),
                    dim: cfg.dim,
                    batch_size: cfg.batch_size,
                    min_batch_size: cfg.min_batch_size,
                    pacing: Duration::from_millis(cfg.pacing_ms),
                },
            ))))
        }
        "fake" => Ok(BuiltEmbedder::stateless(Box::new(FakeEmbedder::new(
            cfg.dim,
        )))),
        other => {
            Err(Error::InvalidConfig(format!("unknown embedding provider '{other}'")).into())
        }
    }
}

/// Deterministic hashed bag-of-words embedder. No model, no network;
/// vectors are L2-normalized and stable for a given input.
pub struct FakeEmbedder {
    dim: usize,
    id: String,
}

impl FakeEmbedder {
    pub fn new(dim: usize) -> Self {
        let id = format!("fake:d{dim}");
        Self { dim, id }
    }

    fn embed_one(&self, text: &str) -> Vec<f32> {
        let mut v = vec![0f32; self.dim];
        for (i, token) in text.split_whitespace().enumerate() {
            let mut hasher = XxHash64::with_seed(0);
            token.hash(&mut hasher);
            let h = hasher.finish();
            let idx = (h as usize) % self.dim;
            let val = (((h >> 32) as u32) as f32) / (u32::MAX as f32);
            v[idx] += val + (i as f32 % 3.0) * 0.01;
        }
        let norm = v.iter().map(|x| x * x).sum::<f32>().sqrt().max(1e-6);
        for x in &mut v {
            *x /= norm;
        }
        v
    }
}

impl Embedder for FakeEmbedder {
    fn embedder_id(&self) -> &str {
        &self.id
    }

    fn dim(&self) -> usize {
        self.dim
    }

    fn embed_batch(&self, texts: &[String]) -> Result<Vec<Vec<f32>>> {
        Ok(texts.iter().map(|t| self.embed_one(t)).collect())
    }
}
