//! Authenticated JSON-over-HTTP plumbing shared by every remote call.
use reqwest::blocking::Client;
use reqwest::Method;
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::time::Duration;

use crate::credential::Credential;
use crate::error::{Error, Result};

#[derive(Debug, Clone)]
pub struct ServiceClient {
    http: Client,
    base_url: String,
    api_version: String,
    credential: Credential,
}

impl ServiceClient {
    pub fn new(base_url: &str, api_version: &str, credential: Credential, timeout: Duration) -> Result<Self> {
        let http = Client::builder().timeout(timeout).build()?;
        Ok(Self {
            http,
            base_url: base_url.trim_end_matches('/').to_string(),
            api_version: api_version.to_string(),
            credential,
        })
    }

    pub fn base_url(&self) -> &str { &self.base_url }

    pub fn url(&self, path: &str) -> String {
        format!("{}{}?api-version={}", self.base_url, path, self.api_version)
    }

    /// Send `body` as JSON and decode a JSON reply.
    ///
    /// Non-2xx replies become `Error::Service` carrying the raw body.
    pub fn send_json<B, T>(&self, method: Method, path: &str, body: &B) -> Result<T>
    where
        B: Serialize + ?Sized,
        T: DeserializeOwned,
    {
        let text = self.execute(method, path, body, &[])?;
        Ok(serde_json::from_str(&text)?)
    }

    fn execute<B>(&self, method: Method, path: &str, body: &B, headers: &[(&str, &str)]) -> Result<String>
    where
        B: Serialize + ?Sized,
    {
        let url = self.url(path);
        tracing::debug!(%method, %url, "sending request");
        let mut request = self.credential.apply(self.http.request(method, &url))?;
        for (name, value) in headers {
            request = request.header(*name, *value);
        }
        let response = request.json(body).send()?;
        let status = response.status();
        let text = response.text()?;
        if !status.is_success() {
            return Err(Error::Service { status: status.as_u16(), body: text });
        }
        Ok(text)
    }

    pub fn post_json<B, T>(&self, path: &str, body: &B) -> Result<T>
    where
        B: Serialize + ?Sized,
        T: DeserializeOwned,
    {
        self.send_json(Method::POST, path, body)
    }

    pub fn put_json<B, T>(&self, path: &str, body: &B) -> Result<T>
    where
        B: Serialize + ?Sized,
        T: DeserializeOwned,
    {
        self.send_json(Method::PUT, path, body)
    }

    /// PUT asking the service to echo the stored resource.
    ///
    /// Some services still answer `204 No Content` when the resource already
    /// existed; that comes back as `None`.
    pub fn put_representation<B, T>(&self, path: &str, body: &B) -> Result<Option<T>>
    where
        B: Serialize + ?Sized,
        T: DeserializeOwned,
    {
        let text = self.execute(Method::PUT, path, body, &[("Prefer", "return=representation")])?;
        if text.trim().is_empty() {
            return Ok(None);
        }
        Ok(Some(serde_json::from_str(&text)?))
    }
}
