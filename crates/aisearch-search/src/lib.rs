//! aisearch-search
//!
//! Query-time operator. Each mode builds a `SearchRequest` and returns the
//! service's ranked hits as a lazy `SearchResults` stream; nothing is
//! re-ranked locally.
use aisearch_core::{Embedder, Result, Settings};
use aisearch_embed::build_embedder;

pub mod client;
pub mod request;
pub mod results;

pub use client::SearchClient;
pub use request::{MultiVectorParams, SearchRequest, VectorQuery, DEFAULT_HYBRID_WEIGHT, DEFAULT_TOP_K};
pub use results::{Caption, SearchHit, SearchResults, SemanticAnswer};

/// A query style plus its parameters, for callers that pick the mode at runtime.
#[derive(Debug, Clone, PartialEq)]
pub enum SearchMode {
    Vector { top_k: usize, filter: Option<String> },
    KnnExact { top_k: usize },
    CrossVector { top_k: usize },
    MultiVector(MultiVectorParams),
    Hybrid { top_k: usize, weight: f64 },
    SemanticHybrid { top_k: usize },
}

impl SearchMode {
    pub const NAMES: [&'static str; 6] = ["vector", "knn-exact", "cross-vector", "multi-vector", "hybrid", "semantic-hybrid"];

    /// Build a mode from its CLI name. `weight` applies to hybrid only and
    /// `filter` to vector only; `top_k` sets both per-field counts for
    /// multi-vector.
    pub fn from_name(name: &str, top_k: usize, weight: Option<f64>, filter: Option<String>) -> Option<Self> {
        let mode = match name {
            "vector" => SearchMode::Vector { top_k, filter },
            "knn-exact" => SearchMode::KnnExact { top_k },
            "cross-vector" => SearchMode::CrossVector { top_k },
            "multi-vector" => SearchMode::MultiVector(MultiVectorParams { title_k: top_k, content_k: top_k, ..Default::default() }),
            "hybrid" => SearchMode::Hybrid { top_k, weight: weight.unwrap_or(DEFAULT_HYBRID_WEIGHT) },
            "semantic-hybrid" => SearchMode::SemanticHybrid { top_k },
            _ => return None,
        };
        Some(mode)
    }
}

/// Issues queries against one index. The embedder is only used by
/// `vector_search`; every other mode lets the service vectorize the text.
pub struct AiSearchOperator {
    embedder: Box<dyn Embedder>,
    client: SearchClient,
}

impl AiSearchOperator {
    pub fn new(settings: &Settings) -> Result<Self> {
        Self::with_embedder(settings, build_embedder(settings)?)
    }

    pub fn with_embedder(settings: &Settings, embedder: Box<dyn Embedder>) -> Result<Self> {
        Ok(Self { embedder, client: SearchClient::new(settings)? })
    }

    pub fn search(&self, mode: &SearchMode, query: &str) -> Result<SearchResults> {
        match mode {
            SearchMode::Vector { top_k, filter } => self.vector_search(query, *top_k, filter.as_deref()),
            SearchMode::KnnExact { top_k } => self.knn_exact_search(query, *top_k),
            SearchMode::CrossVector { top_k } => self.cross_vector_search(query, *top_k),
            SearchMode::MultiVector(params) => self.multi_vector_search(query, params),
            SearchMode::Hybrid { top_k, weight } => self.hybrid_search(query, *top_k, *weight),
            SearchMode::SemanticHybrid { top_k } => self.semantic_hybrid_search(query, *top_k),
        }
    }

    pub fn vector_search(&self, query: &str, top_k: usize, filter: Option<&str>) -> Result<SearchResults> {
        let vector = self.embedder.embed_text(query)?;
        self.client.search(&SearchRequest::vector(vector, top_k, filter))
    }

    pub fn knn_exact_search(&self, query: &str, top_k: usize) -> Result<SearchResults> {
        self.client.search(&SearchRequest::knn_exact(query, top_k))
    }

    pub fn cross_vector_search(&self, query: &str, top_k: usize) -> Result<SearchResults> {
        self.client.search(&SearchRequest::cross_vector(query, top_k))
    }

    pub fn multi_vector_search(&self, query: &str, params: &MultiVectorParams) -> Result<SearchResults> {
        self.client.search(&SearchRequest::multi_vector(query, params))
    }

    pub fn hybrid_search(&self, query: &str, top_k: usize, weight: f64) -> Result<SearchResults> {
        self.client.search(&SearchRequest::hybrid(query, top_k, weight))
    }

    pub fn semantic_hybrid_search(&self, query: &str, top_k: usize) -> Result<SearchResults> {
        self.client.search(&SearchRequest::semantic_hybrid(query, top_k))
    }
}
