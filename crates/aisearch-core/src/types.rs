//! Records exchanged with the search service and the file boundary.

use serde::{Deserialize, Serialize};

pub const ID_FIELD: &str = "id";
pub const TITLE_FIELD: &str = "title";
pub const CONTENT_FIELD: &str = "content";
pub const CATEGORY_FIELD: &str = "category";
pub const TITLE_VECTOR_FIELD: &str = "titleVector";
pub const CONTENT_VECTOR_FIELD: &str = "contentVector";

/// Fields returned by every query.
pub const SELECT_FIELDS: [&str; 3] = [TITLE_FIELD, CONTENT_FIELD, CATEGORY_FIELD];

pub const SEMANTIC_CONFIG_NAME: &str = "my-semantic-config";

/// One row of the input file, before embeddings are attached.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct SourceRecord {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    pub title: String,
    pub content: String,
    pub category: String,
}

/// A record ready for upload: the source fields plus one vector per text field.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Document {
    pub id: String,
    pub title: String,
    pub content: String,
    pub category: String,
    pub title_vector: Vec<f32>,
    pub content_vector: Vec<f32>,
}

impl Document {
    /// `position` is the record's zero-based place in its batch; it becomes the
    /// key (1-based) when the record has no id of its own.
    pub fn from_source(position: usize, record: SourceRecord, title_vector: Vec<f32>, content_vector: Vec<f32>) -> Self {
        let id = record.id.unwrap_or_else(|| (position + 1).to_string());
        Self { id, title: record.title, content: record.content, category: record.category, title_vector, content_vector }
    }
}
