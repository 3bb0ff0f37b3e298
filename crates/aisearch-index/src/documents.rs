//! File boundary: source records in, embedded documents out.
use std::fs;
use std::path::Path;

use aisearch_core::types::{Document, SourceRecord};
use aisearch_core::{Embedder, Error, Result};

pub fn read_source_records(path: &Path) -> Result<Vec<SourceRecord>> {
    let raw = fs::read_to_string(path)?;
    Ok(serde_json::from_str(&raw)?)
}

/// Embed all titles in one call and all contents in a second call, then zip
/// the vectors back onto the records by position.
pub fn augment(records: Vec<SourceRecord>, embedder: &dyn Embedder) -> Result<Vec<Document>> {
    let titles: Vec<String> = records.iter().map(|r| r.title.clone()).collect();
    let contents: Vec<String> = records.iter().map(|r| r.content.clone()).collect();
    let title_vectors = embedder.embed_batch(&titles)?;
    let content_vectors = embedder.embed_batch(&contents)?;
    for vectors in [&title_vectors, &content_vectors] {
        if vectors.len() != records.len() {
            return Err(Error::EmbeddingCount { expected: records.len(), got: vectors.len() });
        }
        if let Some(bad) = vectors.iter().find(|v| v.len() != embedder.dim()) {
            return Err(Error::Dimension { expected: embedder.dim(), got: bad.len() });
        }
    }
    Ok(records
        .into_iter()
        .zip(title_vectors.into_iter().zip(content_vectors))
        .enumerate()
        .map(|(i, (record, (title_vector, content_vector)))| Document::from_source(i, record, title_vector, content_vector))
        .collect())
}

/// Write documents as a JSON array, creating parent directories as needed.
pub fn write_documents(path: &Path, documents: &[Document]) -> Result<()> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent)?;
    }
    fs::write(path, serde_json::to_vec(documents)?)?;
    Ok(())
}

pub fn read_documents(path: &Path) -> Result<Vec<Document>> {
    let raw = fs::read_to_string(path)?;
    Ok(serde_json::from_str(&raw)?)
}
