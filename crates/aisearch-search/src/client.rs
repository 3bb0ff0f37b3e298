use serde_json::Value;

use aisearch_core::{Credential, Result, ServiceClient, Settings};

use crate::request::SearchRequest;
use crate::results::{SearchPage, SearchResults};

/// Query access to one named index.
#[derive(Debug, Clone)]
pub struct SearchClient {
    service: ServiceClient,
    index_name: String,
}

impl SearchClient {
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

    /// Prepare the query. No request is sent until the results are consumed.
    pub fn search(&self, request: &SearchRequest) -> Result<SearchResults> {
        let body = serde_json::to_value(request)?;
        Ok(SearchResults::new(self.clone(), body))
    }

    pub(crate) fn fetch_page(&self, body: &Value) -> Result<SearchPage> {
        self.service.post_json(&format!("/indexes/{}/docs/search", self.index_name), body)
    }
}
