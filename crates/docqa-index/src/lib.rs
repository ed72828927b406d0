//! docqa-index
//!
//! In-memory vector index over document chunks with brute-force cosine
//! search, plus the durable JSON representation used to skip
//! re-embedding on restart.

pub mod index;
pub mod persist;

pub use index::VectorIndex;
pub use persist::{load_index, save_index, LoadedIndex};
