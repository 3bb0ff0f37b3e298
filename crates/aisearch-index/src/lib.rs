//! aisearch-index
//!
//! Index setup: define the schema, create or replace the index, embed the
//! source records and upload them. See `index_ctrl` for the full pipeline.
use std::path::Path;

use aisearch_core::types::Document;
use aisearch_core::{Embedder, Result, Settings};
use aisearch_embed::build_embedder;

pub mod client;
pub mod documents;
pub mod schema;

pub use client::{IndexClient, UploadSummary};
pub use schema::IndexSchema;

use schema::{SearchField, SemanticConfiguration, VectorSearch};

/// Owns the clients needed to (re)build one index. Clients are built when the
/// value is constructed.
pub struct IndexDefine {
    settings: Settings,
    embedder: Box<dyn Embedder>,
    client: IndexClient,
}

impl IndexDefine {
    pub fn new(settings: &Settings) -> Result<Self> {
        Self::with_embedder(settings, build_embedder(settings)?)
    }

    pub fn with_embedder(settings: &Settings, embedder: Box<dyn Embedder>) -> Result<Self> {
        Ok(Self { settings: settings.clone(), embedder, client: IndexClient::new(settings)? })
    }

    pub fn fields(&self) -> Vec<SearchField> { schema::build_fields(self.settings.openai_embedding_dimensions) }

    pub fn vector_search(&self) -> VectorSearch { schema::build_vector_search(&self.settings) }

    pub fn semantic_config(&self) -> SemanticConfiguration { schema::build_semantic_config() }

    pub fn index_schema(&self) -> IndexSchema { schema::build_index_schema(&self.settings) }

    pub fn create_or_update_index(&self) -> Result<String> {
        let name = self.client.create_or_update(&self.index_schema())?;
        tracing::info!("{} created", name);
        Ok(name)
    }

    /// Read `{title, content, category}` records from `input`, attach title and
    /// content vectors, and write the result to `output`.
    pub fn data_create(&self, input: &Path, output: &Path) -> Result<Vec<Document>> {
        let records = documents::read_source_records(input)?;
        tracing::debug!(count = records.len(), input = %input.display(), "embedding source records");
        let docs = documents::augment(records, self.embedder.as_ref())?;
        documents::write_documents(output, &docs)?;
        tracing::info!(count = docs.len(), output = %output.display(), "wrote embedded documents");
        Ok(docs)
    }

    pub fn upload_documents(&self, output: &Path) -> Result<UploadSummary> {
        let docs = documents::read_documents(output)?;
        let summary = self.client.upload(&docs)?;
        tracing::info!("Uploaded {} documents", summary.uploaded);
        Ok(summary)
    }
}

/// Full setup run: create or replace the index, embed `input` into `output`,
/// then upload `output`.
pub fn index_ctrl(settings: &Settings, input: &Path, output: &Path) -> Result<UploadSummary> {
    let define = IndexDefine::new(settings)?;
    run_setup(&define, input, output)
}

pub(crate) fn run_setup(define: &IndexDefine, input: &Path, output: &Path) -> Result<UploadSummary> {
    define.create_or_update_index()?;
    define.data_create(input, output)?;
    define.upload_documents(output)
}
