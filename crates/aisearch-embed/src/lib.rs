//! Embedding backends.
//!
//! `AzureOpenAiEmbedder` calls a deployed embeddings model; `FakeEmbedder`
//! produces deterministic hashed vectors for offline runs and tests.

pub mod azure;
pub mod fake;

pub use aisearch_core::traits::Embedder;
pub use azure::AzureOpenAiEmbedder;
pub use fake::FakeEmbedder;

use aisearch_core::{Result, Settings};

/// The embedder used by the index and search pipelines.
pub fn build_embedder(settings: &Settings) -> Result<Box<dyn Embedder>> {
    if settings.use_fake_embeddings {
        tracing::warn!(dim = settings.openai_embedding_dimensions, "using FakeEmbedder");
        return Ok(Box::new(FakeEmbedder::new(settings.openai_embedding_dimensions)));
    }
    Ok(Box::new(AzureOpenAiEmbedder::new(settings)?))
}
