//! Sparse term-weighting embedder fitted over the chunk corpus.
//!
//! Vocabulary: lowercased alphanumeric unigrams and bigrams (tokens of
//! at least two chars, English stop words removed), capped at
//! `max_features` by total corpus frequency with an alphabetical
//! tie-break, then ordered alphabetically. Weights are raw term counts
//! scaled by smoothed idf and L2-normalized. Terms unseen at fit time
//! contribute zero weight at query time.

use std::collections::{HashMap, HashSet};

use anyhow::Result;
use serde::{Deserialize, Serialize};

use docqa_core::traits::Embedder;

/// Fitted state, persisted alongside the index so queries can be
/// transformed against the frozen vocabulary after a reload.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SparseModel {
    pub max_features: usize,
    pub vocabulary: Vec<String>,
    pub idf: Vec<f32>,
}

pub struct SparseEmbedder {
    model: SparseModel,
    term_index: HashMap<String, usize>,
    id: String,
}

impl SparseEmbedder {
    /// Fit a vocabulary and idf weights over the corpus. Deterministic
    /// for identical corpus and config.
    pub fn fit(corpus: &[String], max_features: usize) -> Self {
        let mut corpus_freq: HashMap<String, u64> = HashMap::new();
        let mut doc_freq: HashMap<String, usize> = HashMap::new();
        for text in corpus {
            let terms = extract_terms(text);
            for term in &terms {
                *corpus_freq.entry(term.clone()).or_default() += 1;
            }
            let unique: HashSet<&String> = terms.iter().collect();
            for term in unique {
                *doc_freq.entry(term.clone()).or_default() += 1;
            }
        }

        let mut ranked: Vec<(String, u64)> = corpus_freq.into_iter().collect();
        ranked.sort_by(|a, b| b.1.cmp(&a.1).then_with(|| a.0.cmp(&b.0)));
        ranked.truncate(max_features);
        let mut vocabulary: Vec<String> = ranked.into_iter().map(|(term, _)| term).collect();
        vocabulary.sort();

        let n = corpus.len();
        let idf = vocabulary
            .iter()
            .map(|term| {
                let df = doc_freq.get(term).copied().unwrap_or(0);
                ((1 + n) as f32 / (1 + df) as f32).ln() + 1.0
            })
            .collect();

        Self::from_model(SparseModel {
            max_features,
            vocabulary,
            idf,
        })
    }

    /// Reconstruct a query-capable embedder from persisted state.
    pub fn from_model(model: SparseModel) -> Self {
        let term_index = model
            .vocabulary
            .iter()
            .enumerate()
            .map(|(i, term)| (term.clone(), i))
            .collect();
        let id = format!("tfidf:f{}:d{}", model.max_features, model.vocabulary.len());
        Self {
            model,
            term_index,
            id,
        }
    }

    pub fn model(&self) -> &SparseModel {
        &self.model
    }

    fn transform(&self, text: &str) -> Vec<f32> {
        let mut v = vec![0f32; self.model.vocabulary.len()];
        for term in extract_terms(text) {
            if let Some(&i) = self.term_index.get(&term) {
                v[i] += self.model.idf[i];
            }
        }
        l2_normalize(&mut v);
        v
    }
}

impl Embedder for SparseEmbedder {
    fn embedder_id(&self) -> &str {
        &self.id
    }

    fn dim(&self) -> usize {
        self.model.vocabulary.len()
    }

    fn embed_batch(&self, texts: &[String]) -> Result<Vec<Vec<f32>>> {
        Ok(texts.iter().map(|t| self.transform(t)).collect())
    }
}

fn l2_normalize(v: &mut [f32]) {
    let norm = v.iter().map(|x| x * x).sum::<f32>().sqrt();
    if norm > 0.0 {
        for x in v {
            *x /= norm;
        }
    }
}

/// Unigrams plus adjacent-pair bigrams over the filtered token stream.
fn extract_terms(text: &str) -> Vec<String> {
    let tokens = tokenize(text);
    let mut terms = tokens.clone();
    for pair in tokens.windows(2) {
        terms.push(format!("{} {}", pair[0], pair[1]));
    }
    terms
}

fn tokenize(text: &str) -> Vec<String> {
    let lower = text.to_lowercase();
    lower
        .split(|c: char| !c.is_alphanumeric())
        .filter(|t| t.chars().count() >= 2)
        .filter(|t| !STOP_WORDS.contains(t))
        .map(str::to_string)
        .collect()
}

const STOP_WORDS: &[&str] = &[
    "about", "above", "after", "again", "all", "am", "an", "and", "any", "are", "as", "at", "be",
    "because", "been", "before", "being", "below", "between", "both", "but", "by", "can", "did",
    "do", "does", "doing", "down", "during", "each", "few", "for", "from", "further", "had",
    "has", "have", "having", "he", "her", "here", "hers", "him", "his", "how", "if", "in", "into",
    "is", "it", "its", "itself", "just", "me", "more", "most", "my", "no", "nor", "not", "now",
    "of", "off", "on", "once", "only", "or", "other", "our", "out", "over", "own", "same", "she",
    "should", "so", "some", "such", "than", "that", "the", "their", "them", "then", "there",
    "these", "they", "this", "those", "through", "to", "too", "under", "until", "up", "very",
    "was", "we", "were", "what", "when", "where", "which", "while", "who", "whom", "why", "will",
    "with", "you", "your",
];
