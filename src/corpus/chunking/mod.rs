
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::corpus::loader::Document;

/// Separator between sentence-like segments
const SEGMENT_DELIMITER: &str = ". ";

/// Configuration for corpus chunking
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct ChunkingConfig {
    /// Maximum number of whitespace-separated words in a chunk
    pub max_words: usize,
    /// Chunks must be strictly longer than this many bytes to be kept
    pub min_chunk_len: usize,
}

impl Default for ChunkingConfig {
    #[inline]
    fn default() -> Self {
        Self {
            max_words: 500,
            min_chunk_len: 50,
        }
    }
}

/// A sentence-like piece of a document
#[derive(Debug, Clone, PartialEq, Eq)]
struct Segment {
    text: String,
    /// Whether the source followed this segment with the delimiter
    terminated: bool,
    words: usize,
}

/// Chunk every document in order and concatenate the results
#[inline]
pub fn chunk_documents(documents: &[Document], config: &ChunkingConfig) -> Vec<String> {
    let mut chunks = Vec::new();

    for document in documents {
        let document_chunks = chunk_document(&document.text, config);
        debug!(
            "Chunked {} into {} chunks",
            document.source.display(),
            document_chunks.len()
        );
        chunks.extend(document_chunks);
    }

    chunks
}

/// Chunk raw texts in order and concatenate the results
#[inline]
pub fn chunk_texts<S: AsRef<str>>(texts: &[S], config: &ChunkingConfig) -> Vec<String> {
    texts
        .iter()
        .flat_map(|text| chunk_document(text.as_ref(), config))
        .collect()
}

/// Chunk a single document by greedily packing segments up to the word limit
#[inline]
pub fn chunk_document(text: &str, config: &ChunkingConfig) -> Vec<String> {
    let max_words = config.max_words.max(1);
    let mut chunks = Vec::new();
    let mut current = String::new();
    let mut current_words = 0;

    for segment in split_segments(text, max_words) {
        if current_words + segment.words > max_words {
            push_chunk(&mut chunks, &current, config.min_chunk_len);
            current.clear();
            current_words = 0;
        }

        if !current.is_empty() {
            current.push(' ');
        }
        current.push_str(&segment.text);
        if segment.terminated {
            current.push('.');
        }
        current_words += segment.words;
    }

    push_chunk(&mut chunks, &current, config.min_chunk_len);

    chunks
}

/// Count whitespace-separated words
#[inline]
pub fn word_count(text: &str) -> usize {
    text.split_whitespace().count()
}

fn push_chunk(chunks: &mut Vec<String>, candidate: &str, min_chunk_len: usize) {
    if candidate.len() > min_chunk_len {
        chunks.push(candidate.to_owned());
    } else if !candidate.is_empty() {
        debug!(
            "Dropping {}-byte fragment below the {}-byte floor",
            candidate.len(),
            min_chunk_len
        );
    }
}

/// Split text on the segment delimiter, breaking oversized segments into word windows
fn split_segments(text: &str, max_words: usize) -> Vec<Segment> {
    let mut segments = Vec::new();
    let mut pieces = text.split(SEGMENT_DELIMITER).peekable();

    while let Some(piece) = pieces.next() {
        let terminated = pieces.peek().is_some();
        let trimmed = piece.trim();
        if trimmed.is_empty() {
            continue;
        }

        let words = word_count(trimmed);
        if words <= max_words {
            segments.push(Segment {
                text: trimmed.to_owned(),
                terminated,
                words,
            });
            continue;
        }

        let all_words = trimmed.split_whitespace().collect::<Vec<_>>();
        let windows = all_words.chunks(max_words).collect::<Vec<_>>();
        let last = windows.len() - 1;
        for (i, window) in windows.into_iter().enumerate() {
            segments.push(Segment {
                text: window.join(" "),
                terminated: terminated && i == last,
                words: window.len(),
            });
        }
    }

    segments
}
