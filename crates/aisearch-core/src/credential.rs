//! Credentials for the search and embedding services.
//!
//! A `Credential` is either a static API key (sent as the `api-key` header) or
//! a bearer-token provider. The provider is picked once, when a client is
//! built, from whether a key is configured.
use reqwest::blocking::RequestBuilder;
use serde::Deserialize;
use std::fmt;
use std::process::Command;
use std::sync::{Arc, Mutex};
use std::time::{SystemTime, UNIX_EPOCH};

use crate::config::Settings;
use crate::error::{Error, Result};

pub const COGNITIVE_SERVICES_SCOPE: &str = "https://cognitiveservices.azure.com/.default";
pub const SEARCH_SCOPE: &str = "https://search.azure.com/.default";

/// Refresh tokens this many seconds before they expire.
const EXPIRY_MARGIN_SECS: i64 = 300;

pub trait TokenProvider: Send + Sync + fmt::Debug {
    fn token(&self) -> Result<String>;
}

#[derive(Clone)]
pub enum Credential {
    ApiKey(String),
    Bearer(Arc<dyn TokenProvider>),
}

impl fmt::Debug for Credential {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Credential::ApiKey(_) => f.write_str("ApiKey(***)"),
            Credential::Bearer(provider) => f.debug_tuple("Bearer").field(provider).finish(),
        }
    }
}

impl Credential {
    pub fn for_openai(settings: &Settings) -> Self {
        match settings.openai_key() {
            Some(key) => Credential::ApiKey(key.to_string()),
            None => Credential::Bearer(Arc::new(AzureCliToken::new(COGNITIVE_SERVICES_SCOPE))),
        }
    }

    pub fn for_search(settings: &Settings) -> Self {
        match settings.search_admin_key() {
            Some(key) => Credential::ApiKey(key.to_string()),
            None => Credential::Bearer(Arc::new(AzureCliToken::new(SEARCH_SCOPE))),
        }
    }

    /// Attach the credential to an outgoing request.
    pub fn apply(&self, request: RequestBuilder) -> Result<RequestBuilder> {
        match self {
            Credential::ApiKey(key) => Ok(request.header("api-key", key)),
            Credential::Bearer(provider) => Ok(request.bearer_auth(provider.token()?)),
        }
    }
}

/// A token acquired elsewhere and handed in as-is.
#[derive(Clone)]
pub struct StaticToken(String);

impl StaticToken {
    pub fn new(token: impl Into<String>) -> Self { Self(token.into()) }
}

impl fmt::Debug for StaticToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result { f.write_str("StaticToken(***)") }
}

impl TokenProvider for StaticToken {
    fn token(&self) -> Result<String> { Ok(self.0.clone()) }
}

#[derive(Debug, Clone, PartialEq)]
pub(crate) struct CachedToken {
    pub(crate) token: String,
    pub(crate) expires_on: Option<i64>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct CliTokenOutput {
    access_token: String,
    #[serde(default, rename = "expires_on")]
    expires_on: Option<i64>,
}

/// Obtains tokens from the signed-in Azure CLI (`az account get-access-token`).
#[derive(Debug)]
pub struct AzureCliToken {
    scope: String,
    cached: Mutex<Option<CachedToken>>,
}

impl AzureCliToken {
    pub fn new(scope: impl Into<String>) -> Self {
        Self { scope: scope.into(), cached: Mutex::new(None) }
    }

    pub fn scope(&self) -> &str { &self.scope }

    fn fetch(&self) -> Result<CachedToken> {
        tracing::debug!(scope = %self.scope, "requesting access token from Azure CLI");
        let output = Command::new("az")
            .args(["account", "get-access-token", "--scope", &self.scope, "--output", "json"])
            .output()
            .map_err(|e| Error::Credential(format!("failed to run az: {e}")))?;
        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(Error::Credential(format!("az get-access-token failed: {}", stderr.trim())));
        }
        parse_cli_token(&String::from_utf8_lossy(&output.stdout))
    }
}

impl TokenProvider for AzureCliToken {
    fn token(&self) -> Result<String> {
        let mut cached = self.cached.lock().map_err(|_| Error::Credential("token cache poisoned".to_string()))?;
        if let Some(entry) = cached.as_ref() {
            if is_fresh(entry, unix_now()) { return Ok(entry.token.clone()); }
        }
        let fresh = self.fetch()?;
        let token = fresh.token.clone();
        *cached = Some(fresh);
        Ok(token)
    }
}

pub(crate) fn parse_cli_token(stdout: &str) -> Result<CachedToken> {
    let out: CliTokenOutput = serde_json::from_str(stdout)?;
    if out.access_token.is_empty() {
        return Err(Error::Credential("az returned an empty access token".to_string()));
    }
    Ok(CachedToken { token: out.access_token, expires_on: out.expires_on })
}

/// Tokens without a known expiry are never reused.
pub(crate) fn is_fresh(entry: &CachedToken, now: i64) -> bool {
    entry.expires_on.is_some_and(|exp| exp - EXPIRY_MARGIN_SECS > now)
}

fn unix_now() -> i64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| i64::try_from(d.as_secs()).unwrap_or(i64::MAX))
        .unwrap_or(0)
}
