use docqa_core::traits::Embedder;
use docqa_embed::sparse::SparseEmbedder;

fn corpus() -> Vec<String> {
    vec![
        "Zelle daily limit is $500 for new accounts".to_string(),
        "Wire cutoff is 5pm ET for same-day processing".to_string(),
        "International wire fee is $45 per transfer".to_string(),
        "Bill payments can be cancelled before the cutoff".to_string(),
    ]
}

#[test]
fn fitting_is_deterministic() {
    let a = SparseEmbedder::fit(&corpus(), 1000);
    let b = SparseEmbedder::fit(&corpus(), 1000);
    assert_eq!(a.model(), b.model(), "same corpus and config, same model");
    assert_eq!(a.embedder_id(), b.embedder_id());
}

#[test]
fn vocabulary_is_capped_at_max_features() {
    let embedder = SparseEmbedder::fit(&corpus(), 5);
    assert!(embedder.dim() <= 5);
    assert_eq!(embedder.dim(), embedder.model().vocabulary.len());
}

#[test]
fn stop_words_never_enter_the_vocabulary() {
    let embedder = SparseEmbedder::fit(&corpus(), 1000);
    for term in &embedder.model().vocabulary {
        assert_ne!(term, "is");
        assert_ne!(term, "the");
        assert_ne!(term, "for");
    }
}

#[test]
fn vocabulary_includes_bigrams() {
    let embedder = SparseEmbedder::fit(&corpus(), 1000);
    assert!(embedder
        .model()
        .vocabulary
        .iter()
        .any(|t| t == "wire fee" || t == "international wire"));
}

#[test]
fn vectors_are_l2_normalized() {
    let embedder = SparseEmbedder::fit(&corpus(), 1000);
    let v = &embedder.embed_batch(&corpus()).expect("embed")[0];
    let norm: f32 = v.iter().map(|x| x * x).sum::<f32>().sqrt();
    assert!((norm - 1.0).abs() <= 1e-4, "norm={norm}");
}

#[test]
fn unseen_query_terms_contribute_zero() {
    let embedder = SparseEmbedder::fit(&corpus(), 1000);
    let v = &embedder
        .embed_batch(&["cryptocurrency staking rewards".to_string()])
        .expect("embed")[0];
    assert!(v.iter().all(|&x| x == 0.0), "no fitted term matches");
}

#[test]
fn query_vector_matches_fitted_dimensionality() {
    let embedder = SparseEmbedder::fit(&corpus(), 1000);
    let v = &embedder
        .embed_batch(&["what is the wire transfer fee".to_string()])
        .expect("embed")[0];
    assert_eq!(v.len(), embedder.dim());
    assert!(v.iter().any(|&x| x > 0.0));
}

#[test]
fn empty_corpus_yields_an_empty_vocabulary() {
    let embedder = SparseEmbedder::fit(&[], 1000);
    assert_eq!(embedder.dim(), 0);
    let v = embedder
        .embed_batch(&["anything".to_string()])
        .expect("embed");
    assert!(v[0].is_empty());
}

#[test]
fn model_round_trips_through_serde() {
    let embedder = SparseEmbedder::fit(&corpus(), 1000);
    let json = serde_json::to_string(embedder.model()).expect("serialize");
    let model = serde_json::from_str(&json).expect("deserialize");
    let restored = SparseEmbedder::from_model(model);
    assert_eq!(restored.model(), embedder.model());
    assert_eq!(restored.embedder_id(), embedder.embedder_id());

    let q = "international wire fee".to_string();
    let a = embedder.embed_batch(std::slice::from_ref(&q)).expect("embed");
    let b = restored.embed_batch(std::slice::from_ref(&q)).expect("embed");
    assert_eq!(a, b, "restored model transforms queries identically");
}
