#[cfg(test)]
mod tests;

use anyhow::{Context, Result};
use itertools::Itertools;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};
use walkdir::WalkDir;

/// Raw text of one source file
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Document {
    pub source: PathBuf,
    pub text: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DocumentKind {
    PlainText,
    Pdf,
}

impl DocumentKind {
    /// Detect the kind of a file from its extension
    #[inline]
    pub fn from_path(path: &Path) -> Option<Self> {
        let extension = path.extension()?.to_str()?;

        if extension.eq_ignore_ascii_case("pdf") {
            Some(Self::Pdf)
        } else if extension.eq_ignore_ascii_case("txt") || extension.eq_ignore_ascii_case("md") {
            Some(Self::PlainText)
        } else {
            None
        }
    }
}

/// Load every readable document reachable from the given files and directories
///
/// Unreadable sources are logged and skipped.
#[inline]
pub fn load_documents(inputs: &[PathBuf]) -> Vec<Document> {
    load_documents_with(inputs, |_| {})
}

/// Same as [`load_documents`], calling `on_source` before each file is read
#[inline]
pub fn load_documents_with<F>(inputs: &[PathBuf], mut on_source: F) -> Vec<Document>
where
    F: FnMut(&Path),
{
    let sources = collect_sources(inputs);
    let mut documents = Vec::with_capacity(sources.len());

    for source in &sources {
        on_source(source);

        match read_document(source) {
            Ok(document) => documents.push(document),
            Err(e) => warn!("Skipping unreadable document {}: {:#}", source.display(), e),
        }
    }

    info!(
        "Loaded {} of {} documents",
        documents.len(),
        sources.len()
    );

    documents
}

/// Expand directories into the supported files they contain
///
/// Explicit file paths are kept as given, even with an unknown extension.
/// Directory entries come back sorted by file name so runs are reproducible.
#[inline]
pub fn collect_sources(inputs: &[PathBuf]) -> Vec<PathBuf> {
    let mut sources = Vec::new();

    for input in inputs {
        if !input.is_dir() {
            sources.push(input.clone());
            continue;
        }

        for entry in WalkDir::new(input).sort_by_file_name() {
            match entry {
                Ok(entry)
                    if entry.file_type().is_file()
                        && DocumentKind::from_path(entry.path()).is_some() =>
                {
                    sources.push(entry.into_path());
                }
                Ok(_) => {}
                Err(e) => warn!("Failed to walk {}: {}", input.display(), e),
            }
        }
    }

    debug!("Collected {} source files", sources.len());
    sources
}

/// Read a single document from disk
#[inline]
pub fn read_document(path: &Path) -> Result<Document> {
    let text = match DocumentKind::from_path(path).unwrap_or(DocumentKind::PlainText) {
        DocumentKind::PlainText => fs::read_to_string(path)
            .with_context(|| format!("Failed to read text file: {}", path.display()))?,
        DocumentKind::Pdf => {
            let extracted = pdf_extract::extract_text(path).map_err(|e| {
                anyhow::anyhow!("Failed to extract text from PDF {}: {}", path.display(), e)
            })?;
            normalize_whitespace(&extracted)
        }
    };

    debug!("Read {} ({} bytes)", path.display(), text.len());

    Ok(Document {
        source: path.to_path_buf(),
        text,
    })
}

/// Collapse line breaks and runs of whitespace left behind by PDF text extraction
fn normalize_whitespace(text: &str) -> String {
    text.split_whitespace().join(" ")
}
