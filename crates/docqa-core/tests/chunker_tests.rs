use docqa_core::chunker::{split, ChunkingConfig};

fn cfg(max_chunk_size: usize, overlap: usize) -> ChunkingConfig {
    ChunkingConfig {
        max_chunk_size,
        overlap,
        ..ChunkingConfig::default()
    }
}

/// Rebuild the source text from chunk spans: each chunk contributes the
/// part of its span that lies after the previous chunk's end.
fn reconstruct(chunks: &[docqa_core::types::Chunk]) -> String {
    let mut rebuilt = String::new();
    let mut prev_end = 0;
    for c in chunks {
        rebuilt.push_str(&c.text[(prev_end - c.start)..]);
        prev_end = c.end;
    }
    rebuilt
}

#[test]
fn empty_text_yields_no_chunks() {
    let chunks = split("", &ChunkingConfig::default());
    assert!(chunks.is_empty());
}

#[test]
fn small_text_is_a_single_chunk() {
    let chunks = split("Short text", &ChunkingConfig::default());
    assert_eq!(chunks.len(), 1);
    assert_eq!(chunks[0].text, "Short text");
    assert_eq!((chunks[0].start, chunks[0].end), (0, 10));
}

#[test]
fn splitting_is_deterministic() {
    let text = "Wire transfers settle same day. Zelle is instant. \n\nFees vary by account tier. ".repeat(30);
    let c = cfg(200, 50);
    let a = split(&text, &c);
    let b = split(&text, &c);
    assert_eq!(a, b, "same input and config produce identical chunks");
}

#[test]
fn spans_index_into_the_source_text() {
    let text = "First paragraph about enrollment.\n\nSecond paragraph about transfer limits.\n\nThird paragraph about fees and cutoff times. ".repeat(20);
    let chunks = split(&text, &cfg(180, 40));
    assert!(chunks.len() > 1);
    for c in &chunks {
        assert_eq!(c.text, &text[c.start..c.end]);
    }
}

#[test]
fn chunk_spans_minus_overlap_reconstruct_the_source() {
    let text = "Alpha section one. Alpha section two.\nBeta line.\n\nGamma paragraph with more words in it. ".repeat(25);
    let chunks = split(&text, &cfg(150, 30));
    assert_eq!(reconstruct(&chunks), text);
}

#[test]
fn chunk_length_never_exceeds_max() {
    let text = "word ".repeat(2000);
    for c in split(&text, &cfg(200, 50)) {
        assert!(c.text.chars().count() <= 200, "chunk of {} chars", c.text.chars().count());
    }
}

#[test]
fn consecutive_chunks_share_tail_context() {
    let text = "This is a test. ".repeat(100);
    let chunks = split(&text, &cfg(200, 50));
    assert!(chunks.len() > 1);
    for pair in chunks.windows(2) {
        assert!(
            pair[1].start < pair[0].end,
            "chunk {} should start inside its predecessor",
            pair[1].index
        );
    }
}

#[test]
fn unbroken_text_falls_back_to_hard_split() {
    let text = "a".repeat(1000);
    let chunks = split(&text, &cfg(300, 50));
    assert_eq!(chunks.len(), 4);
    for c in &chunks {
        assert!(c.text.chars().count() <= 300);
    }
    assert_eq!(reconstruct(&chunks), text);
}

#[test]
fn multibyte_text_splits_on_char_boundaries() {
    let text = "héllo wörld métadata ünicode ".repeat(60);
    let chunks = split(&text, &cfg(120, 20));
    for c in &chunks {
        assert!(text.is_char_boundary(c.start));
        assert!(text.is_char_boundary(c.end));
        assert!(c.text.chars().count() <= 120);
    }
    assert_eq!(reconstruct(&chunks), text);
}

#[test]
fn chunk_ordinals_are_sequential() {
    let text = "Sentence about limits. ".repeat(80);
    let chunks = split(&text, &cfg(160, 30));
    for (i, c) in chunks.iter().enumerate() {
        assert_eq!(c.index, i);
    }
}
