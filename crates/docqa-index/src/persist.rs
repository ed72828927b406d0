//! Durable index representation.
//!
//! A JSON blob holding chunks, vectors, the embedder identity, and the
//! fitted sparse model when one exists. Loading validates internal
//! consistency; callers verify the embedder identity against their own
//! configuration via [`VectorIndex::ensure_embedder`] before querying.

use std::fs;
use std::path::Path;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use tracing::info;

use docqa_core::error::Error;
use docqa_core::types::Chunk;
use docqa_embed::sparse::SparseModel;

use crate::index::VectorIndex;

const FORMAT_VERSION: u32 = 1;

#[derive(Serialize, Deserialize)]
struct SerializedIndex {
    version: u32,
    embedder_id: String,
    dim: usize,
    chunks: Vec<Chunk>,
    vectors: Vec<Vec<f32>>,
    sparse_model: Option<SparseModel>,
}

/// A restored index plus the fitted sparse state needed to transform
/// queries against it (absent for remote/fake embedders).
#[derive(Debug)]
pub struct LoadedIndex {
    pub index: VectorIndex,
    pub sparse_model: Option<SparseModel>,
}

pub fn save_index(
    index: &VectorIndex,
    sparse_model: Option<&SparseModel>,
    path: &Path,
) -> Result<()> {
    let blob = SerializedIndex {
        version: FORMAT_VERSION,
        embedder_id: index.embedder_id().to_string(),
        dim: index.dim(),
        chunks: index.chunks().to_vec(),
        vectors: index.vectors().to_vec(),
        sparse_model: sparse_model.cloned(),
    };
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)?;
    }
    let json = serde_json::to_vec(&blob)?;
    fs::write(path, json).with_context(|| format!("writing index to {}", path.display()))?;
    info!(path = %path.display(), chunks = index.len(), "saved index");
    Ok(())
}

pub fn load_index(path: &Path) -> Result<LoadedIndex> {
    let bytes =
        fs::read(path).with_context(|| format!("reading index from {}", path.display()))?;
    let blob: SerializedIndex = serde_json::from_slice(&bytes).map_err(|e| {
        Error::IncompatibleIndex(format!("corrupt index file {}: {e}", path.display()))
    })?;
    if blob.version != FORMAT_VERSION {
        return Err(Error::IncompatibleIndex(format!(
            "unsupported index format version {}",
            blob.version
        ))
        .into());
    }
    if blob.chunks.len() != blob.vectors.len() {
        return Err(Error::IncompatibleIndex(format!(
            "{} chunks but {} vectors",
            blob.chunks.len(),
            blob.vectors.len()
        ))
        .into());
    }
    for v in &blob.vectors {
        if v.len() != blob.dim {
            return Err(Error::IncompatibleIndex(format!(
                "stored vector has {} dims, expected {}",
                v.len(),
                blob.dim
            ))
            .into());
        }
    }
    info!(path = %path.display(), chunks = blob.chunks.len(), "loaded index");
    Ok(LoadedIndex {
        index: VectorIndex::from_parts(blob.chunks, blob.vectors, blob.embedder_id, blob.dim),
        sparse_model: blob.sparse_model,
    })
}
