//! HTTP transport for the remote embedding service.

use std::time::Duration;

use anyhow::{anyhow, Result};
use serde::Deserialize;
use tracing::debug;

use crate::remote::EmbeddingService;

/// Calls an embeddings endpoint (`POST {base_url}/embeddings`) with a
/// bearer credential. Timeouts surface as errors and are handled by
/// the caller's retry policy.
pub struct HttpEmbeddingService {
    client: reqwest::blocking::Client,
    base_url: String,
    api_key: String,
}

#[derive(Deserialize)]
struct EmbeddingsResponse {
    data: Vec<EmbeddingItem>,
}

#[derive(Deserialize)]
struct EmbeddingItem {
    embedding: Vec<f32>,
}

impl HttpEmbeddingService {
    pub fn new(
        base_url: impl Into<String>,
        api_key: impl Into<String>,
        timeout: Duration,
    ) -> Result<Self> {
        let client = reqwest::blocking::Client::builder()
            .timeout(timeout)
            .build()?;
        let base_url: String = base_url.into();
        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
            api_key: api_key.into(),
        })
    }
}

impl EmbeddingService for HttpEmbeddingService {
    fn embed(&self, model: &str, texts: &[String]) -> Result<Vec<Vec<f32>>> {
        let payload = serde_json::json!({
            "model": model,
            "input": texts,
            "encoding_format": "float",
        });
        debug!(count = texts.len(), model, "requesting embeddings");
        let response = self
            .client
            .post(format!("{}/embeddings", self.base_url))
            .bearer_auth(&self.api_key)
            .json(&payload)
            .send()?;
        let status = response.status();
        if !status.is_success() {
            let body = response.text().unwrap_or_default();
            return Err(anyhow!("embedding service returned {status}: {body}"));
        }
        let parsed: EmbeddingsResponse = response.json()?;
        Ok(parsed.data.into_iter().map(|d| d.embedding).collect())
    }
}
