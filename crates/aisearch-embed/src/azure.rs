use serde::{Deserialize, Serialize};

use aisearch_core::{Credential, Embedder, Error, Result, ServiceClient, Settings};

/// Client for an Azure OpenAI embeddings deployment.
///
/// Batches go out as a single request; results are re-ordered by the
/// response `index` and checked against the configured dimensionality.
#[derive(Debug)]
pub struct AzureOpenAiEmbedder {
    service: ServiceClient,
    path: String,
    model: String,
    dimensions: usize,
}

#[derive(Serialize)]
#[serde(untagged)]
enum EmbeddingInput<'a> {
    Single(&'a str),
    Batch(&'a [String]),
}

#[derive(Serialize)]
struct EmbeddingRequest<'a> {
    input: EmbeddingInput<'a>,
    model: &'a str,
    dimensions: usize,
}

#[derive(Deserialize)]
struct EmbeddingResponse {
    data: Vec<EmbeddingDatum>,
}

#[derive(Deserialize)]
struct EmbeddingDatum {
    #[serde(default)]
    index: usize,
    embedding: Vec<f32>,
}

impl AzureOpenAiEmbedder {
    pub fn new(settings: &Settings) -> Result<Self> {
        let service = ServiceClient::new(
            &settings.openai_endpoint,
            &settings.openai_api_version,
            Credential::for_openai(settings),
            settings.request_timeout(),
        )?;
        Ok(Self {
            service,
            path: format!("/openai/deployments/{}/embeddings", settings.openai_embedding_deployment),
            model: settings.embedding_model().to_string(),
            dimensions: settings.openai_embedding_dimensions,
        })
    }

    fn request(&self, input: EmbeddingInput<'_>, expected: usize) -> Result<Vec<Vec<f32>>> {
        let payload = EmbeddingRequest { input, model: &self.model, dimensions: self.dimensions };
        let mut response: EmbeddingResponse = self.service.post_json(&self.path, &payload)?;
        if response.data.len() != expected {
            return Err(Error::EmbeddingCount { expected, got: response.data.len() });
        }
        response.data.sort_by_key(|d| d.index);
        let mut out = Vec::with_capacity(expected);
        for d in response.data {
            if d.embedding.len() != self.dimensions {
                return Err(Error::Dimension { expected: self.dimensions, got: d.embedding.len() });
            }
            out.push(d.embedding);
        }
        Ok(out)
    }
}

impl Embedder for AzureOpenAiEmbedder {
    fn dim(&self) -> usize { self.dimensions }

    fn embed_batch(&self, texts: &[String]) -> Result<Vec<Vec<f32>>> {
        if texts.is_empty() { return Ok(Vec::new()); }
        tracing::debug!(count = texts.len(), model = %self.model, "embedding batch");
        self.request(EmbeddingInput::Batch(texts), texts.len())
    }

    fn embed_text(&self, text: &str) -> Result<Vec<f32>> {
        let mut out = self.request(EmbeddingInput::Single(text), 1)?;
        out.pop().ok_or(Error::EmbeddingCount { expected: 1, got: 0 })
    }
}
