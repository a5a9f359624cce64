// Corpus module
// Loads source documents, cuts them into retrieval chunks and persists the chunk list

pub mod chunking;
pub mod loader;
pub mod store;

pub use chunking::{ChunkingConfig, chunk_document, chunk_documents, chunk_texts, word_count};
pub use loader::{
    Document, DocumentKind, collect_sources, load_documents, load_documents_with, read_document,
};
pub use store::{DEFAULT_CHUNKS_FILE, load_chunks, save_chunks};
