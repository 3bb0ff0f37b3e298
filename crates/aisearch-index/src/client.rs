use serde::{Deserialize, Serialize};

use aisearch_core::types::Document;
use aisearch_core::{Credential, Error, Result, ServiceClient, Settings};

use crate::schema::IndexSchema;

/// Index management and document upload against one named index.
#[derive(Debug, Clone)]
pub struct IndexClient {
    service: ServiceClient,
    index_name: String,
}

#[derive(Deserialize)]
struct IndexEcho {
    name: String,
}

#[derive(Serialize)]
struct IndexAction<'a> {
    #[serde(rename = "@search.action")]
    action: &'static str,
    #[serde(flatten)]
    document: &'a Document,
}

#[derive(Serialize)]
struct IndexBatch<'a> {
    value: Vec<IndexAction<'a>>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct IndexingResult {
    pub key: String,
    pub status: bool,
    #[serde(default)]
    pub error_message: Option<String>,
    #[serde(default)]
    pub status_code: Option<u16>,
}

#[derive(Deserialize)]
struct IndexBatchReply {
    value: Vec<IndexingResult>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UploadSummary {
    pub uploaded: usize,
}

impl IndexClient {
    pub fn new(settings: &Settings) -> Result<Self> {
        let service = ServiceClient::new(
            &settings.search_service_endpoint,
            &settings.search_api_version,
            Credential::for_search(settings),
            settings.request_timeout(),
        )?;
        Ok(Self { service, index_name: settings.search_index.clone() })
    }

    pub fn index_name(&self) -> &str { &self.index_name }

    /// Create the index or replace the one with the same name. Returns the name
    /// the service echoes back, or the schema's own name on `204 No Content`.
    pub fn create_or_update(&self, schema: &IndexSchema) -> Result<String> {
        let echo: Option<IndexEcho> = self.service.put_representation(&format!("/indexes/{}", schema.name), schema)?;
        Ok(echo.map_or_else(|| schema.name.clone(), |e| e.name))
    }

    /// Upload the whole batch in one request. Any rejected key fails the call.
    pub fn upload(&self, documents: &[Document]) -> Result<UploadSummary> {
        let batch = IndexBatch {
            value: documents.iter().map(|document| IndexAction { action: "upload", document }).collect(),
        };
        let reply: IndexBatchReply = self.service.post_json(&format!("/indexes/{}/docs/index", self.index_name), &batch)?;
        let failed: Vec<String> = reply
            .value
            .iter()
            .filter(|r| !r.status)
            .map(|r| match &r.error_message {
                Some(msg) => format!("{} ({})", r.key, msg),
                None => r.key.clone(),
            })
            .collect();
        if !failed.is_empty() {
            return Err(Error::PartialUpload { failed });
        }
        Ok(UploadSummary { uploaded: reply.value.len() })
    }
}
