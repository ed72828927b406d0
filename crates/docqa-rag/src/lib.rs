//! docqa-rag
//!
//! The question answering pipeline: chunk a document, embed and index
//! it, retrieve the best-matching chunks for a question, and
//! synthesize an answer from them. A managed knowledge-base backend is
//! available as an alternative that does retrieval and generation in
//! one remote call.

pub mod backend;
pub mod engine;
pub mod generate;

pub use engine::RagEngine;
