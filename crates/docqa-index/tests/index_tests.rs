use anyhow::Result;
use docqa_core::error::Error;
use docqa_core::traits::Embedder;
use docqa_core::types::Chunk;
use docqa_embed::sparse::SparseEmbedder;
use docqa_index::VectorIndex;

/// Returns one scripted vector per input text, in order.
struct StubEmbedder {
    vectors: Vec<Vec<f32>>,
    dim: usize,
}

impl StubEmbedder {
    fn new(vectors: Vec<Vec<f32>>) -> Self {
        let dim = vectors.first().map_or(0, Vec::len);
        Self { vectors, dim }
    }
}

impl Embedder for StubEmbedder {
    fn embedder_id(&self) -> &str {
        "stub:test"
    }

    fn dim(&self) -> usize {
        self.dim
    }

    fn embed_batch(&self, texts: &[String]) -> Result<Vec<Vec<f32>>> {
        Ok(self.vectors[..texts.len()].to_vec())
    }
}

fn chunks(texts: &[&str]) -> Vec<Chunk> {
    let mut out = Vec::new();
    let mut offset = 0;
    for (index, text) in texts.iter().enumerate() {
        out.push(Chunk {
            index,
            text: (*text).to_string(),
            start: offset,
            end: offset + text.len(),
        });
        offset += text.len();
    }
    out
}

#[test]
fn results_are_sorted_by_descending_similarity() {
    let embedder = StubEmbedder::new(vec![
        vec![1.0, 0.0],
        vec![0.0, 1.0],
        vec![0.7, 0.7],
    ]);
    let index = VectorIndex::build(chunks(&["a", "b", "c"]), &embedder).expect("build");

    let results = index.search(&[1.0, 0.0], 3).expect("search");

    let order: Vec<usize> = results.iter().map(|r| r.chunk.index).collect();
    assert_eq!(order, vec![0, 2, 1]);
    assert!(results[0].score >= results[1].score);
    assert!(results[1].score >= results[2].score);
}

#[test]
fn ranks_are_one_based_and_sequential() {
    let embedder = StubEmbedder::new(vec![vec![1.0, 0.0], vec![0.0, 1.0], vec![0.5, 0.5]]);
    let index = VectorIndex::build(chunks(&["a", "b", "c"]), &embedder).expect("build");

    let results = index.search(&[1.0, 1.0], 3).expect("search");
    let ranks: Vec<usize> = results.iter().map(|r| r.rank).collect();
    assert_eq!(ranks, vec![1, 2, 3]);
}

#[test]
fn equal_scores_break_ties_towards_the_earlier_chunk() {
    // Identical direction, identical score: document order decides.
    let embedder = StubEmbedder::new(vec![vec![1.0, 0.0], vec![1.0, 0.0], vec![2.0, 0.0]]);
    let index = VectorIndex::build(chunks(&["a", "b", "c"]), &embedder).expect("build");

    let results = index.search(&[1.0, 0.0], 3).expect("search");
    let order: Vec<usize> = results.iter().map(|r| r.chunk.index).collect();
    assert_eq!(order, vec![0, 1, 2]);
}

#[test]
fn top_k_beyond_the_corpus_returns_the_whole_corpus() {
    let embedder = StubEmbedder::new(vec![vec![1.0, 0.0], vec![0.0, 1.0]]);
    let index = VectorIndex::build(chunks(&["a", "b"]), &embedder).expect("build");

    let results = index.search(&[1.0, 0.0], 10).expect("search");
    assert_eq!(results.len(), 2);
}

#[test]
fn top_k_truncates_the_result_list() {
    let embedder = StubEmbedder::new(vec![vec![1.0, 0.0], vec![0.0, 1.0], vec![0.5, 0.5]]);
    let index = VectorIndex::build(chunks(&["a", "b", "c"]), &embedder).expect("build");

    let results = index.search(&[1.0, 0.0], 1).expect("search");
    assert_eq!(results.len(), 1);
    assert_eq!(results[0].chunk.index, 0);
}

#[test]
fn an_empty_index_answers_with_no_results() {
    let embedder = StubEmbedder::new(Vec::new());
    let index = VectorIndex::build(Vec::new(), &embedder).expect("build");
    assert!(index.is_empty());

    let results = index.search(&[1.0, 0.0], 5).expect("search");
    assert!(results.is_empty());
}

#[test]
fn query_with_the_wrong_dimensionality_is_rejected() {
    let embedder = StubEmbedder::new(vec![vec![1.0, 0.0]]);
    let index = VectorIndex::build(chunks(&["a"]), &embedder).expect("build");

    let err = index.search(&[1.0, 0.0, 0.0], 1).expect_err("dim mismatch");
    let core = err.downcast_ref::<Error>().expect("typed error");
    assert!(matches!(
        core,
        Error::DimensionMismatch {
            expected: 2,
            actual: 3
        }
    ));
}

#[test]
fn a_short_embedding_batch_fails_the_build() {
    struct Short;
    impl Embedder for Short {
        fn embedder_id(&self) -> &str {
            "stub:short"
        }
        fn dim(&self) -> usize {
            2
        }
        fn embed_batch(&self, _texts: &[String]) -> Result<Vec<Vec<f32>>> {
            Ok(vec![vec![1.0, 0.0]])
        }
    }
    let err = VectorIndex::build(chunks(&["a", "b"]), &Short).expect_err("count mismatch");
    let core = err.downcast_ref::<Error>().expect("typed error");
    assert!(matches!(core, Error::EmbeddingService(_)));
}

#[test]
fn the_most_relevant_policy_chunk_wins_for_a_fee_question() {
    let texts = [
        "Zelle daily limit is $500",
        "Wire cutoff is 5pm ET",
        "International wire fee is $45",
    ];
    let corpus: Vec<String> = texts.iter().map(|t| (*t).to_string()).collect();
    let embedder = SparseEmbedder::fit(&corpus, 1000);
    let index = VectorIndex::build(chunks(&texts), &embedder).expect("build");

    let query = embedder
        .embed_batch(&["What is the wire transfer fee?".to_string()])
        .expect("embed query");
    let results = index.search(&query[0], 1).expect("search");

    assert_eq!(results.len(), 1);
    assert_eq!(results[0].chunk.text, "International wire fee is $45");
    assert_eq!(results[0].rank, 1);
    assert!(results[0].score > 0.0);
}

#[test]
fn a_foreign_embedder_identity_is_incompatible() {
    let embedder = StubEmbedder::new(vec![vec![1.0, 0.0]]);
    let index = VectorIndex::build(chunks(&["a"]), &embedder).expect("build");

    assert!(index.ensure_embedder("stub:test").is_ok());
    let err = index.ensure_embedder("stub:other").expect_err("mismatch");
    let core = err.downcast_ref::<Error>().expect("typed error");
    assert!(matches!(core, Error::IncompatibleIndex(_)));
}
