//! Managed knowledge-base backend.
//!
//! A single remote call performs retrieval and generation together and
//! returns the answer with its supporting citations. Citations are
//! mapped into the same result shape the local pipeline produces;
//! their spans refer to the cited text itself since the managed store
//! does not report source offsets.

use std::time::Duration;

use anyhow::{anyhow, Context, Result};
use serde::{Deserialize, Serialize};
use tracing::debug;

use docqa_core::error::Error;
use docqa_core::traits::QaBackend;
use docqa_core::types::{Chunk, QaOutcome, SearchResult};

/// Backend configuration, extracted from the `[backend]` table.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct BackendConfig {
    /// `local` routes questions through the in-process pipeline,
    /// `managed` through this backend.
    pub mode: String,
    pub base_url: String,
    /// Name of the env var holding the service credential.
    pub api_key_env: String,
    pub knowledge_base_id: String,
    pub model: String,
    pub timeout_secs: u64,
}

impl Default for BackendConfig {
    fn default() -> Self {
        Self {
            mode: "local".to_string(),
            base_url: String::new(),
            api_key_env: "KB_API_KEY".to_string(),
            knowledge_base_id: String::new(),
            model: String::new(),
            timeout_secs: 60,
        }
    }
}

pub struct KnowledgeBaseBackend {
    client: reqwest::blocking::Client,
    base_url: String,
    api_key: String,
    knowledge_base_id: String,
    model: String,
}

#[derive(Serialize)]
struct QueryRequest<'a> {
    knowledge_base_id: &'a str,
    model: &'a str,
    question: &'a str,
    top_k: usize,
}

#[derive(Deserialize)]
struct QueryResponse {
    answer: String,
    #[serde(default)]
    citations: Vec<Citation>,
}

#[derive(Deserialize)]
struct Citation {
    text: String,
    #[serde(default)]
    score: f32,
}

impl KnowledgeBaseBackend {
    pub fn from_config(cfg: &BackendConfig) -> Result<Self> {
        if cfg.base_url.is_empty() || cfg.knowledge_base_id.is_empty() {
            return Err(Error::InvalidConfig(
                "managed backend requires backend.base_url and backend.knowledge_base_id"
                    .to_string(),
            )
            .into());
        }
        let api_key = std::env::var(&cfg.api_key_env).map_err(|_| {
            Error::InvalidConfig(format!(
                "managed backend requires the {} env var",
                cfg.api_key_env
            ))
        })?;
        let client = reqwest::blocking::Client::builder()
            .timeout(Duration::from_secs(cfg.timeout_secs))
            .build()?;
        Ok(Self {
            client,
            base_url: cfg.base_url.trim_end_matches('/').to_string(),
            api_key,
            knowledge_base_id: cfg.knowledge_base_id.clone(),
            model: cfg.model.clone(),
        })
    }
}

impl QaBackend for KnowledgeBaseBackend {
    fn answer(&self, question: &str, top_k: usize) -> Result<QaOutcome> {
        let payload = QueryRequest {
            knowledge_base_id: &self.knowledge_base_id,
            model: &self.model,
            question,
            top_k,
        };
        debug!(knowledge_base = %self.knowledge_base_id, "querying managed backend");
        let response = self
            .client
            .post(format!("{}/query", self.base_url))
            .bearer_auth(&self.api_key)
            .json(&payload)
            .send()
            .context("sending knowledge base query")?;
        let status = response.status();
        if !status.is_success() {
            let body = response.text().unwrap_or_default();
            return Err(anyhow!("knowledge base returned {status}: {body}"));
        }
        let parsed: QueryResponse = response
            .json()
            .context("decoding knowledge base response")?;
        Ok(outcome_from_response(parsed))
    }
}

fn outcome_from_response(response: QueryResponse) -> QaOutcome {
    let results = response
        .citations
        .into_iter()
        .enumerate()
        .map(|(i, citation)| {
            let end = citation.text.len();
            SearchResult {
                chunk: Chunk {
                    index: i,
                    text: citation.text,
                    start: 0,
                    end,
                },
                score: citation.score,
                rank: i + 1,
            }
        })
        .collect();
    QaOutcome {
        answer: response.answer,
        results,
    }
}
