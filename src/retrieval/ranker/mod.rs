
use itertools::Itertools;
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use crate::retrieval::index::TfIdfIndex;

pub const DEFAULT_TOP_K: usize = 3;
pub const DEFAULT_MIN_SCORE: f64 = 0.1;

/// A chunk returned for a query together with its cosine similarity
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RankedChunk {
    pub text: String,
    pub score: f64,
}

#[derive(Debug, Default)]
enum RankerState {
    #[default]
    Unready,
    Ready {
        chunks: Vec<String>,
        index: TfIdfIndex,
    },
}

/// Ranks chunks against free-text queries
///
/// A ranker starts unready and answers every query with an empty list until
/// [`Ranker::build`] receives a non-empty chunk sequence. Once built it is
/// read-only, so `rank` may be called from many threads at once.
#[derive(Debug, Default)]
pub struct Ranker {
    state: RankerState,
}

impl Ranker {
    #[inline]
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a ranker and index the given chunks
    #[inline]
    pub fn from_chunks(chunks: Vec<String>) -> Self {
        let mut ranker = Self::new();
        ranker.build(chunks);
        ranker
    }

    /// Index a chunk sequence, replacing any previous index
    ///
    /// An empty sequence leaves the ranker as it was. Returns whether the ranker is ready.
    #[inline]
    pub fn build(&mut self, chunks: Vec<String>) -> bool {
        if chunks.is_empty() {
            warn!("No chunks to index; ranker state unchanged");
            return self.is_ready();
        }

        let index = TfIdfIndex::build(&chunks);
        info!(
            "Indexed {} chunks ({} distinct terms)",
            chunks.len(),
            index.vocabulary_size()
        );

        self.state = RankerState::Ready { chunks, index };
        true
    }

    #[inline]
    pub fn is_ready(&self) -> bool {
        matches!(self.state, RankerState::Ready { .. })
    }

    /// Number of indexed chunks
    #[inline]
    pub fn len(&self) -> usize {
        self.chunks().len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    #[inline]
    pub fn chunks(&self) -> &[String] {
        match &self.state {
            RankerState::Unready => &[],
            RankerState::Ready { chunks, .. } => chunks,
        }
    }

    #[inline]
    pub fn vocabulary_size(&self) -> usize {
        match &self.state {
            RankerState::Unready => 0,
            RankerState::Ready { index, .. } => index.vocabulary_size(),
        }
    }

    /// Return up to `k` chunks scoring strictly above `min_score`, best first
    ///
    /// Equal scores keep chunk order. An unready ranker returns nothing.
    #[inline]
    pub fn rank(&self, query: &str, k: usize, min_score: f64) -> Vec<RankedChunk> {
        let RankerState::Ready { chunks, index } = &self.state else {
            debug!("Ranker is not ready; returning no results");
            return Vec::new();
        };

        let scores = index.scores(query);
        let results = scores
            .iter()
            .enumerate()
            .sorted_by(|(_, a), (_, b)| b.total_cmp(a))
            .take(k)
            .filter(|&(_, &score)| score > min_score)
            .map(|(i, &score)| RankedChunk {
                text: chunks[i].clone(),
                score,
            })
            .collect::<Vec<_>>();

        debug!(
            "Query matched {} chunks (k = {}, min_score = {})",
            results.len(),
            k,
            min_score
        );

        results
    }
}
