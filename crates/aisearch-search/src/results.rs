use serde::Deserialize;
use serde_json::{Map, Value};

use aisearch_core::Result;

use crate::client::SearchClient;

#[derive(Debug, Clone, Deserialize, PartialEq)]
pub struct Caption {
    #[serde(default)]
    pub text: Option<String>,
    #[serde(default)]
    pub highlights: Option<String>,
}

impl Caption {
    /// Highlighted text when the service provides it, plain text otherwise.
    pub fn display_text(&self) -> &str {
        self.highlights.as_deref().or(self.text.as_deref()).unwrap_or("")
    }
}

#[derive(Debug, Clone, Deserialize, PartialEq)]
pub struct SemanticAnswer {
    pub key: String,
    #[serde(default)]
    pub text: Option<String>,
    #[serde(default)]
    pub highlights: Option<String>,
    #[serde(default)]
    pub score: Option<f64>,
}

impl SemanticAnswer {
    pub fn display_text(&self) -> &str {
        self.highlights.as_deref().or(self.text.as_deref()).unwrap_or("")
    }
}

/// One ranked document. The score's meaning depends on the query mode.
#[derive(Debug, Clone, Deserialize, PartialEq)]
pub struct SearchHit {
    #[serde(rename = "@search.score")]
    pub score: f64,
    #[serde(rename = "@search.rerankerScore", default)]
    pub reranker_score: Option<f64>,
    #[serde(rename = "@search.captions", default)]
    captions: Option<Vec<Caption>>,
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub content: Option<String>,
    #[serde(default)]
    pub category: Option<String>,
    /// Any other returned fields, verbatim.
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl SearchHit {
    pub fn captions(&self) -> &[Caption] { self.captions.as_deref().unwrap_or(&[]) }
}

#[derive(Deserialize)]
pub(crate) struct SearchPage {
    #[serde(default)]
    pub(crate) value: Vec<SearchHit>,
    #[serde(rename = "@search.answers", default)]
    pub(crate) answers: Option<Vec<SemanticAnswer>>,
    #[serde(rename = "@search.nextPageParameters", default)]
    pub(crate) next_page_parameters: Option<Value>,
}

/// Lazy, single-pass stream of ranked hits.
///
/// Nothing is sent until the first hit (or the answers) is requested. Further
/// pages are fetched when the current one runs out and the service supplied
/// continuation parameters. After an error the stream ends.
pub struct SearchResults {
    client: SearchClient,
    pending: Option<Value>,
    page: std::vec::IntoIter<SearchHit>,
    answers: Option<Vec<SemanticAnswer>>,
    started: bool,
}

impl SearchResults {
    pub(crate) fn new(client: SearchClient, body: Value) -> Self {
        Self { client, pending: Some(body), page: Vec::new().into_iter(), answers: None, started: false }
    }

    /// Whether any request has been sent yet.
    pub fn started(&self) -> bool { self.started }

    /// Extractive answers from a semantic query (empty for other modes).
    /// Fetches the first page if it has not been fetched yet.
    pub fn answers(&mut self) -> Result<&[SemanticAnswer]> {
        if !self.started {
            if let Some(body) = self.pending.take() {
                self.load(&body)?;
            }
        }
        Ok(self.answers.as_deref().unwrap_or(&[]))
    }

    fn load(&mut self, body: &Value) -> Result<()> {
        self.started = true;
        let page = self.client.fetch_page(body)?;
        tracing::debug!(index = %self.client.index_name(), hits = page.value.len(), more = page.next_page_parameters.is_some(), "fetched result page");
        if self.answers.is_none() {
            self.answers = page.answers;
        }
        self.pending = page.next_page_parameters;
        self.page = page.value.into_iter();
        Ok(())
    }
}

impl Iterator for SearchResults {
    type Item = Result<SearchHit>;

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            if let Some(hit) = self.page.next() {
                return Some(Ok(hit));
            }
            let body = self.pending.take()?;
            if let Err(e) = self.load(&body) {
                return Some(Err(e));
            }
        }
    }
}
