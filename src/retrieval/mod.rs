// Retrieval module
// TF-IDF indexing of the chunk list and cosine-similarity ranking of queries

pub mod index;
pub mod ranker;
pub mod tokenizer;

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

pub use index::TfIdfIndex;
pub use ranker::{DEFAULT_MIN_SCORE, DEFAULT_TOP_K, RankedChunk, Ranker};
pub use tokenizer::tokenize;

/// Settings for building answer context
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct RetrievalConfig {
    /// Number of chunks placed into a prompt
    pub top_k: usize,
    /// Chunks scoring at or below this are discarded
    pub min_score: f64,
    /// Override for the chunk list location
    pub chunks_file: Option<PathBuf>,
}

impl Default for RetrievalConfig {
    #[inline]
    fn default() -> Self {
        Self {
            top_k: DEFAULT_TOP_K,
            min_score: DEFAULT_MIN_SCORE,
            chunks_file: None,
        }
    }
}
