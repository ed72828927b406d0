//! Recursive document chunking.
//!
//! Splits raw document text into overlapping segments bounded by
//! `max_chunk_size` chars, preferring paragraph, line, sentence, and
//! word boundaries in that order before falling back to a hard split.
//! Base segments tile the document exactly, so the original text can
//! be reconstructed from the chunk spans.

use serde::Deserialize;

use crate::types::Chunk;

/// Knobs for [`split`]. Defaults match the agreement corpus the
/// pipeline was tuned on: 800-char chunks with 100 chars of overlap.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ChunkingConfig {
    pub max_chunk_size: usize,
    pub overlap: usize,
    pub separators: Vec<String>,
}

impl Default for ChunkingConfig {
    fn default() -> Self {
        Self {
            max_chunk_size: 800,
            overlap: 100,
            separators: vec![
                "\n\n".to_string(),
                "\n".to_string(),
                ". ".to_string(),
                " ".to_string(),
            ],
        }
    }
}

/// Split `text` into ordered, overlapping chunks.
///
/// Each chunk after the first extends backwards into the tail of its
/// predecessor by up to `overlap` chars. The `max_chunk_size` bound is
/// hard; overlap is best-effort and is clamped whenever honoring it
/// would push the span over the bound or past the predecessor's start.
/// Deterministic for a given input and config. Empty input yields no
/// chunks.
pub fn split(text: &str, cfg: &ChunkingConfig) -> Vec<Chunk> {
    if text.is_empty() {
        return Vec::new();
    }
    let max = cfg.max_chunk_size.max(1);
    let seps: Vec<&str> = cfg.separators.iter().map(String::as_str).collect();
    let segments = split_range(text, 0, text.len(), &seps, max);

    let mut chunks = Vec::with_capacity(segments.len());
    for (i, &(seg_start, end)) in segments.iter().enumerate() {
        let start = if i == 0 {
            seg_start
        } else {
            let budget = max.saturating_sub(char_len(text, seg_start, end));
            rewind(text, seg_start, cfg.overlap.min(budget), segments[i - 1].0)
        };
        chunks.push(Chunk {
            index: i,
            text: text[start..end].to_string(),
            start,
            end,
        });
    }
    chunks
}

/// Tile `text[start..end]` with non-overlapping segments of at most
/// `max` chars, trying separators in priority order and recursing on
/// oversized pieces with the remaining separators.
fn split_range(
    text: &str,
    start: usize,
    end: usize,
    seps: &[&str],
    max: usize,
) -> Vec<(usize, usize)> {
    if char_len(text, start, end) <= max {
        return vec![(start, end)];
    }
    for (si, sep) in seps.iter().enumerate() {
        let pieces = split_at_separator(text, start, end, sep);
        if pieces.len() > 1 {
            let mut tiled = Vec::new();
            for (ps, pe) in pieces {
                if char_len(text, ps, pe) <= max {
                    tiled.push((ps, pe));
                } else {
                    tiled.extend(split_range(text, ps, pe, &seps[si + 1..], max));
                }
            }
            return merge_small(text, tiled, max);
        }
    }
    hard_split(text, start, end, max)
}

/// Split at every occurrence of `sep`, keeping the separator attached
/// to the preceding piece so the pieces tile the range exactly.
fn split_at_separator(text: &str, start: usize, end: usize, sep: &str) -> Vec<(usize, usize)> {
    let mut pieces = Vec::new();
    let mut cursor = start;
    let slice = &text[start..end];
    let mut offset = 0;
    while let Some(found) = slice[offset..].find(sep) {
        let cut = start + offset + found + sep.len();
        if cut < end {
            pieces.push((cursor, cut));
            cursor = cut;
        }
        offset += found + sep.len();
    }
    pieces.push((cursor, end));
    pieces
}

/// Greedily merge adjacent pieces while the combined span stays within
/// `max` chars. Pieces are contiguous by construction.
fn merge_small(text: &str, pieces: Vec<(usize, usize)>, max: usize) -> Vec<(usize, usize)> {
    let mut merged: Vec<(usize, usize)> = Vec::new();
    for (ps, pe) in pieces {
        match merged.last_mut() {
            Some(last) if char_len(text, last.0, pe) <= max => last.1 = pe,
            _ => merged.push((ps, pe)),
        }
    }
    merged
}

/// Last resort: cut every `max` chars on char boundaries.
fn hard_split(text: &str, start: usize, end: usize, max: usize) -> Vec<(usize, usize)> {
    let mut out = Vec::new();
    let mut cursor = start;
    while cursor < end {
        let mut taken = 0;
        let mut next = end;
        for (off, _) in text[cursor..end].char_indices() {
            if taken == max {
                next = cursor + off;
                break;
            }
            taken += 1;
        }
        out.push((cursor, next));
        cursor = next;
    }
    out
}

/// Walk `pos` backwards by up to `want` chars, never before `floor`.
/// Both `pos` and `floor` are char-boundary byte offsets.
fn rewind(text: &str, pos: usize, want: usize, floor: usize) -> usize {
    let mut idx = pos;
    let mut taken = 0;
    while taken < want && idx > floor {
        idx -= 1;
        while !text.is_char_boundary(idx) {
            idx -= 1;
        }
        taken += 1;
    }
    idx.max(floor)
}

fn char_len(text: &str, start: usize, end: usize) -> usize {
    text[start..end].chars().count()
}
