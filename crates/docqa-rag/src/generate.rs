//! Chat-completion answer generation over retrieved context.

use std::time::Duration;

use anyhow::{anyhow, Context, Result};
use serde::{Deserialize, Serialize};
use tracing::debug;

use docqa_core::error::Error;
use docqa_core::traits::AnswerGenerator;

const SYSTEM_PROMPT: &str = "You answer questions using only the provided document context. \
If the context does not contain the answer, say that the document does not cover it. \
Be concise and factual.";

/// Generation configuration, extracted from the `[generation]` table.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct GenerationConfig {
    pub enabled: bool,
    pub model: String,
    pub base_url: String,
    /// Name of the env var holding the service credential.
    pub api_key_env: String,
    pub max_tokens: u32,
    pub temperature: f32,
    pub timeout_secs: u64,
}

impl Default for GenerationConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            model: "gpt-4o-mini".to_string(),
            base_url: "https://api.openai.com/v1".to_string(),
            api_key_env: "OPENAI_API_KEY".to_string(),
            max_tokens: 300,
            temperature: 0.1,
            timeout_secs: 30,
        }
    }
}

/// Calls a chat completions endpoint
/// (`POST {base_url}/chat/completions`) with a bearer credential.
pub struct HttpAnswerGenerator {
    client: reqwest::blocking::Client,
    base_url: String,
    api_key: String,
    model: String,
    max_tokens: u32,
    temperature: f32,
}

#[derive(Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: Vec<ChatMessage<'a>>,
    max_tokens: u32,
    temperature: f32,
}

#[derive(Serialize)]
struct ChatMessage<'a> {
    role: &'a str,
    content: &'a str,
}

#[derive(Deserialize)]
struct ChatResponse {
    choices: Vec<ChatChoice>,
}

#[derive(Deserialize)]
struct ChatChoice {
    message: ChatChoiceMessage,
}

#[derive(Deserialize)]
struct ChatChoiceMessage {
    content: String,
}

impl HttpAnswerGenerator {
    pub fn from_config(cfg: &GenerationConfig) -> Result<Self> {
        let api_key = std::env::var(&cfg.api_key_env).map_err(|_| {
            Error::InvalidConfig(format!(
                "answer generation requires the {} env var",
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
            model: cfg.model.clone(),
            max_tokens: cfg.max_tokens,
            temperature: cfg.temperature,
        })
    }
}

impl AnswerGenerator for HttpAnswerGenerator {
    fn generate(&self, context: &str, question: &str) -> Result<String> {
        let user = format!("Context:\n{context}\n\nQuestion: {question}");
        let payload = ChatRequest {
            model: &self.model,
            messages: vec![
                ChatMessage {
                    role: "system",
                    content: SYSTEM_PROMPT,
                },
                ChatMessage {
                    role: "user",
                    content: &user,
                },
            ],
            max_tokens: self.max_tokens,
            temperature: self.temperature,
        };
        debug!(model = %self.model, "requesting answer generation");
        let response = self
            .client
            .post(format!("{}/chat/completions", self.base_url))
            .bearer_auth(&self.api_key)
            .json(&payload)
            .send()
            .context("sending chat completion request")?;
        let status = response.status();
        if !status.is_success() {
            let body = response.text().unwrap_or_default();
            return Err(anyhow!("chat service returned {status}: {body}"));
        }
        let parsed: ChatResponse = response
            .json()
            .context("decoding chat completion response")?;
        let choice = parsed
            .choices
            .into_iter()
            .next()
            .ok_or_else(|| anyhow!("chat service returned no choices"))?;
        Ok(choice.message.content.trim().to_string())
    }
}
