
use anyhow::{Context, Result};
use std::fs;
use std::path::Path;
use tracing::{debug, info};

/// File name of the chunk list inside the configuration directory
pub const DEFAULT_CHUNKS_FILE: &str = "knowledge_chunks.json";

/// Write chunks as a flat, pretty-printed JSON array of strings
#[inline]
pub fn save_chunks(path: &Path, chunks: &[String]) -> Result<()> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent)
            .with_context(|| format!("Failed to create directory: {}", parent.display()))?;
    }

    let content = to_json(chunks).context("Failed to serialize chunks to JSON")?;
    fs::write(path, content)
        .with_context(|| format!("Failed to write chunks file: {}", path.display()))?;

    info!("Saved {} chunks to {}", chunks.len(), path.display());
    Ok(())
}

/// Read a chunk list written by [`save_chunks`]
#[inline]
pub fn load_chunks(path: &Path) -> Result<Vec<String>> {
    let content = fs::read_to_string(path)
        .with_context(|| format!("Failed to read chunks file: {}", path.display()))?;

    let chunks = from_json(&content)
        .with_context(|| format!("Chunks file is not a JSON array of strings: {}", path.display()))?;

    debug!("Loaded {} chunks from {}", chunks.len(), path.display());
    Ok(chunks)
}

#[inline]
pub fn to_json(chunks: &[String]) -> serde_json::Result<String> {
    serde_json::to_string_pretty(chunks)
}

#[inline]
pub fn from_json(content: &str) -> serde_json::Result<Vec<String>> {
    serde_json::from_str(content)
}
