use crate::types::QaOutcome;

/// Converts texts into fixed-dimension vectors.
///
/// `embedder_id` is a stable identifier for the model/configuration
/// (e.g. `tfidf:f1000:d742` or `remote:text-embedding-3-small:d1536`). An
/// index persisted under one id must not be queried under another.
pub trait Embedder: Send + Sync {
    fn embedder_id(&self) -> &str;
    fn dim(&self) -> usize;
    fn embed_batch(&self, texts: &[String]) -> anyhow::Result<Vec<Vec<f32>>>;
}

/// External text-completion collaborator used to synthesize answers
/// from retrieved context. Best-effort: callers must tolerate failure.
pub trait AnswerGenerator: Send + Sync {
    fn generate(&self, context: &str, question: &str) -> anyhow::Result<String>;
}

/// Anything that can answer a question end to end: the local
/// retrieve-then-generate engine, or a managed knowledge-base service
/// that does both in a single call.
pub trait QaBackend: Send + Sync {
    fn answer(&self, question: &str, top_k: usize) -> anyhow::Result<QaOutcome>;
}
