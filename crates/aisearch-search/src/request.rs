//! Query bodies for `POST /indexes/{name}/docs/search`, one builder per mode.
use serde::Serialize;

use aisearch_core::types::{CONTENT_VECTOR_FIELD, SELECT_FIELDS, SEMANTIC_CONFIG_NAME, TITLE_VECTOR_FIELD};

pub const DEFAULT_TOP_K: usize = 3;
pub const DEFAULT_HYBRID_WEIGHT: f64 = 0.2;

/// Where a vector query's vector comes from.
#[derive(Debug, Clone, Serialize, PartialEq)]
#[serde(tag = "kind", rename_all = "camelCase")]
pub enum VectorSource {
    /// Embedded by the caller.
    Vector { vector: Vec<f32> },
    /// Embedded by the service with the index's vectorizer.
    Text { text: String },
}

#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct VectorQuery {
    #[serde(flatten)]
    pub source: VectorSource,
    pub k: usize,
    /// Comma-separated vector field names.
    pub fields: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub weight: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub exhaustive: Option<bool>,
}

impl VectorQuery {
    pub fn vector(vector: Vec<f32>, k: usize, fields: &[&str]) -> Self {
        Self { source: VectorSource::Vector { vector }, k, fields: fields.join(","), weight: None, exhaustive: None }
    }

    pub fn text(text: &str, k: usize, fields: &[&str]) -> Self {
        Self { source: VectorSource::Text { text: text.to_string() }, k, fields: fields.join(","), weight: None, exhaustive: None }
    }

    pub fn weight(mut self, weight: f64) -> Self { self.weight = Some(weight); self }

    /// Brute-force comparison against every vector instead of the HNSW graph.
    pub fn exhaustive(mut self) -> Self { self.exhaustive = Some(true); self }

    pub fn field_names(&self) -> impl Iterator<Item = &str> { self.fields.split(',') }
}

#[derive(Debug, Clone, Copy, Serialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum QueryType {
    Simple,
    Full,
    Semantic,
}

#[derive(Debug, Clone, Copy, Serialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum Extraction {
    Extractive,
}

#[derive(Debug, Clone, Serialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct SearchRequest {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub search: Option<String>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub vector_queries: Vec<VectorQuery>,
    pub select: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub filter: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub query_type: Option<QueryType>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub semantic_configuration: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub captions: Option<Extraction>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub answers: Option<Extraction>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub top: Option<usize>,
}

/// Per-field neighbour counts and weights for `multi_vector`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MultiVectorParams {
    pub title_k: usize,
    pub content_k: usize,
    pub title_weight: f64,
    pub content_weight: f64,
}

impl Default for MultiVectorParams {
    fn default() -> Self {
        Self { title_k: DEFAULT_TOP_K, content_k: DEFAULT_TOP_K, title_weight: 2.0, content_weight: 0.5 }
    }
}

impl SearchRequest {
    fn with_vectors(vector_queries: Vec<VectorQuery>) -> Self {
        Self {
            search: None,
            vector_queries,
            select: SELECT_FIELDS.join(","),
            filter: None,
            query_type: None,
            semantic_configuration: None,
            captions: None,
            answers: None,
            top: None,
        }
    }

    /// Pure vector search with a caller-computed query embedding.
    pub fn vector(vector: Vec<f32>, top_k: usize, filter: Option<&str>) -> Self {
        let mut req = Self::with_vectors(vec![VectorQuery::vector(vector, top_k, &[CONTENT_VECTOR_FIELD])]);
        req.filter = filter.map(str::to_string);
        req
    }

    pub fn knn_exact(query: &str, top_k: usize) -> Self {
        Self::with_vectors(vec![VectorQuery::text(query, top_k, &[CONTENT_VECTOR_FIELD]).exhaustive()])
    }

    /// One query over both vector fields.
    pub fn cross_vector(query: &str, top_k: usize) -> Self {
        Self::with_vectors(vec![VectorQuery::text(query, top_k, &[CONTENT_VECTOR_FIELD, TITLE_VECTOR_FIELD])])
    }

    /// Two independent weighted queries, one per vector field.
    pub fn multi_vector(query: &str, params: &MultiVectorParams) -> Self {
        Self::with_vectors(vec![
            VectorQuery::text(query, params.title_k, &[TITLE_VECTOR_FIELD]).weight(params.title_weight),
            VectorQuery::text(query, params.content_k, &[CONTENT_VECTOR_FIELD]).weight(params.content_weight),
        ])
    }

    pub fn hybrid(query: &str, top_k: usize, weight: f64) -> Self {
        let mut req = Self::with_vectors(vec![VectorQuery::text(query, top_k, &[CONTENT_VECTOR_FIELD]).weight(weight)]);
        req.search = Some(query.to_string());
        req.top = Some(top_k);
        req
    }

    pub fn semantic_hybrid(query: &str, top_k: usize) -> Self {
        let mut req = Self::with_vectors(vec![VectorQuery::text(query, top_k, &[CONTENT_VECTOR_FIELD]).exhaustive()]);
        req.search = Some(query.to_string());
        req.query_type = Some(QueryType::Semantic);
        req.semantic_configuration = Some(SEMANTIC_CONFIG_NAME.to_string());
        req.captions = Some(Extraction::Extractive);
        req.answers = Some(Extraction::Extractive);
        req.top = Some(top_k);
        req
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    const DECLARED: [&str; 2] = [CONTENT_VECTOR_FIELD, TITLE_VECTOR_FIELD];

    fn all_modes(top_k: usize) -> Vec<SearchRequest> {
        vec![
            SearchRequest::vector(vec![0.5, 0.5], top_k, None),
            SearchRequest::knn_exact("q", top_k),
            SearchRequest::cross_vector("q", top_k),
            SearchRequest::multi_vector("q", &MultiVectorParams { title_k: top_k, content_k: top_k, ..Default::default() }),
            SearchRequest::hybrid("q", top_k, 0.5),
            SearchRequest::semantic_hybrid("q", top_k),
        ]
    }

    #[test]
    fn every_mode_uses_declared_fields_and_caller_k() {
        for top_k in [1, 5, 17] {
            for req in all_modes(top_k) {
                assert!(!req.vector_queries.is_empty());
                for vq in &req.vector_queries {
                    assert_eq!(vq.k, top_k, "{req:?}");
                    for field in vq.field_names() {
                        assert!(DECLARED.contains(&field), "undeclared field {field}");
                    }
                }
            }
        }
    }

    #[test]
    fn hybrid_matches_documented_example() {
        let v = serde_json::to_value(SearchRequest::hybrid("cats", 5, 0.3)).unwrap();
        assert_eq!(
            v,
            json!({
                "search": "cats",
                "vectorQueries": [{"kind": "text", "text": "cats", "k": 5, "fields": "contentVector", "weight": 0.3}],
                "select": "title,content,category",
                "top": 5
            })
        );
    }

    #[test]
    fn vector_mode_sends_caller_vector_and_filter() {
        let v = serde_json::to_value(SearchRequest::vector(vec![0.5, 0.25], 4, Some("category eq 'pets'"))).unwrap();
        assert_eq!(
            v,
            json!({
                "vectorQueries": [{"kind": "vector", "vector": [0.5, 0.25], "k": 4, "fields": "contentVector"}],
                "select": "title,content,category",
                "filter": "category eq 'pets'"
            })
        );
    }

    #[test]
    fn knn_exact_is_exhaustive_without_search_text() {
        let req = SearchRequest::knn_exact("q", 3);
        assert_eq!(req.search, None);
        assert_eq!(req.vector_queries[0].exhaustive, Some(true));
    }

    #[test]
    fn cross_vector_targets_both_fields_in_one_query() {
        let req = SearchRequest::cross_vector("q", 3);
        assert_eq!(req.vector_queries.len(), 1);
        assert_eq!(req.vector_queries[0].fields, "contentVector,titleVector");
    }

    #[test]
    fn multi_vector_defaults_weight_title_over_content() {
        let req = SearchRequest::multi_vector("q", &MultiVectorParams::default());
        assert_eq!(req.vector_queries.len(), 2);
        assert_eq!(req.vector_queries[0].fields, "titleVector");
        assert_eq!(req.vector_queries[0].weight, Some(2.0));
        assert_eq!(req.vector_queries[1].fields, "contentVector");
        assert_eq!(req.vector_queries[1].weight, Some(0.5));
    }

    #[test]
    fn semantic_hybrid_sets_semantic_parameters() {
        let v = serde_json::to_value(SearchRequest::semantic_hybrid("q", 2)).unwrap();
        assert_eq!(v["queryType"], json!("semantic"));
        assert_eq!(v["semanticConfiguration"], json!("my-semantic-config"));
        assert_eq!(v["captions"], json!("extractive"));
        assert_eq!(v["answers"], json!("extractive"));
        assert_eq!(v["top"], json!(2));
        assert_eq!(v["search"], json!("q"));
        assert_eq!(v["vectorQueries"][0]["exhaustive"], json!(true));
    }
}
