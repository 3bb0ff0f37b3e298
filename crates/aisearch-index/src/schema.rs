//! Declarative index definition sent to `PUT /indexes/{name}`.
use serde::{Deserialize, Serialize};

use aisearch_core::types::{
    CATEGORY_FIELD, CONTENT_FIELD, CONTENT_VECTOR_FIELD, ID_FIELD, SEMANTIC_CONFIG_NAME, TITLE_FIELD,
    TITLE_VECTOR_FIELD,
};
use aisearch_core::Settings;

pub const HNSW_ALGORITHM_NAME: &str = "myHnsw";
pub const HNSW_PROFILE_NAME: &str = "myHnswProfile";
pub const VECTORIZER_NAME: &str = "myVectorizer";

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub enum FieldType {
    #[serde(rename = "Edm.String")]
    String,
    #[serde(rename = "Collection(Edm.Single)")]
    SingleCollection,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct SearchField {
    pub name: String,
    #[serde(rename = "type")]
    pub field_type: FieldType,
    pub key: bool,
    pub searchable: bool,
    pub filterable: bool,
    pub sortable: bool,
    pub facetable: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub dimensions: Option<usize>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub vector_search_profile: Option<String>,
}

impl SearchField {
    /// Non-searchable string field.
    pub fn simple(name: &str) -> Self {
        Self {
            name: name.to_string(),
            field_type: FieldType::String,
            key: false,
            searchable: false,
            filterable: false,
            sortable: false,
            facetable: false,
            dimensions: None,
            vector_search_profile: None,
        }
    }

    /// Full-text searchable string field.
    pub fn searchable(name: &str) -> Self {
        Self { searchable: true, ..Self::simple(name) }
    }

    pub fn vector(name: &str, dimensions: usize, profile: &str) -> Self {
        Self {
            field_type: FieldType::SingleCollection,
            searchable: true,
            dimensions: Some(dimensions),
            vector_search_profile: Some(profile.to_string()),
            ..Self::simple(name)
        }
    }

    pub fn key(mut self) -> Self { self.key = true; self }
    pub fn filterable(mut self) -> Self { self.filterable = true; self }
    pub fn sortable(mut self) -> Self { self.sortable = true; self }
    pub fn facetable(mut self) -> Self { self.facetable = true; self }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct HnswParameters {
    pub m: u32,
    pub ef_construction: u32,
    pub ef_search: u32,
    pub metric: String,
}

impl Default for HnswParameters {
    fn default() -> Self {
        Self { m: 4, ef_construction: 400, ef_search: 500, metric: "cosine".to_string() }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct HnswAlgorithm {
    pub name: String,
    pub kind: String,
    pub hnsw_parameters: HnswParameters,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct VectorSearchProfile {
    pub name: String,
    pub algorithm: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub vectorizer: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct AzureOpenAiParameters {
    pub resource_uri: String,
    pub deployment_id: String,
    pub model_name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub api_key: Option<String>,
}

/// Lets the service embed query text itself (`kind: "text"` vector queries).
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Vectorizer {
    pub name: String,
    pub kind: String,
    #[serde(rename = "azureOpenAIParameters")]
    pub azure_open_ai_parameters: AzureOpenAiParameters,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct VectorSearch {
    pub algorithms: Vec<HnswAlgorithm>,
    pub profiles: Vec<VectorSearchProfile>,
    pub vectorizers: Vec<Vectorizer>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct SemanticField {
    pub field_name: String,
}

impl SemanticField {
    fn of(name: &str) -> Self { Self { field_name: name.to_string() } }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct PrioritizedFields {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title_field: Option<SemanticField>,
    pub prioritized_keywords_fields: Vec<SemanticField>,
    pub prioritized_content_fields: Vec<SemanticField>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct SemanticConfiguration {
    pub name: String,
    pub prioritized_fields: PrioritizedFields,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct SemanticSearch {
    pub configurations: Vec<SemanticConfiguration>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct IndexSchema {
    pub name: String,
    pub fields: Vec<SearchField>,
    pub vector_search: VectorSearch,
    pub semantic: SemanticSearch,
}

/// Key, three text fields and one vector per text field to be embedded.
pub fn build_fields(dimensions: usize) -> Vec<SearchField> {
    vec![
        SearchField::simple(ID_FIELD).key().sortable().filterable().facetable(),
        SearchField::searchable(TITLE_FIELD),
        SearchField::searchable(CONTENT_FIELD),
        SearchField::searchable(CATEGORY_FIELD).filterable(),
        SearchField::vector(TITLE_VECTOR_FIELD, dimensions, HNSW_PROFILE_NAME),
        SearchField::vector(CONTENT_VECTOR_FIELD, dimensions, HNSW_PROFILE_NAME),
    ]
}

pub fn build_vector_search(settings: &Settings) -> VectorSearch {
    VectorSearch {
        algorithms: vec![HnswAlgorithm {
            name: HNSW_ALGORITHM_NAME.to_string(),
            kind: "hnsw".to_string(),
            hnsw_parameters: HnswParameters::default(),
        }],
        profiles: vec![VectorSearchProfile {
            name: HNSW_PROFILE_NAME.to_string(),
            algorithm: HNSW_ALGORITHM_NAME.to_string(),
            vectorizer: Some(VECTORIZER_NAME.to_string()),
        }],
        vectorizers: vec![Vectorizer {
            name: VECTORIZER_NAME.to_string(),
            kind: "azureOpenAI".to_string(),
            azure_open_ai_parameters: AzureOpenAiParameters {
                resource_uri: settings.openai_endpoint.clone(),
                deployment_id: settings.openai_embedding_deployment.clone(),
                model_name: settings.embedding_model().to_string(),
                api_key: settings.openai_key().map(str::to_string),
            },
        }],
    }
}

pub fn build_semantic_config() -> SemanticConfiguration {
    SemanticConfiguration {
        name: SEMANTIC_CONFIG_NAME.to_string(),
        prioritized_fields: PrioritizedFields {
            title_field: Some(SemanticField::of(TITLE_FIELD)),
            prioritized_keywords_fields: vec![SemanticField::of(CATEGORY_FIELD)],
            prioritized_content_fields: vec![SemanticField::of(CONTENT_FIELD)],
        },
    }
}

pub fn build_index_schema(settings: &Settings) -> IndexSchema {
    IndexSchema {
        name: settings.search_index.clone(),
        fields: build_fields(settings.openai_embedding_dimensions),
        vector_search: build_vector_search(settings),
        semantic: SemanticSearch { configurations: vec![build_semantic_config()] },
    }
}
