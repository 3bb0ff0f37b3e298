use figment::{
    providers::{Env, Format, Serialized, Toml},
    Figment,
};
use serde::{Deserialize, Deserializer, Serialize};
use std::collections::BTreeMap;
use std::env;
use std::fmt;
use std::path::PathBuf;
use std::time::Duration;

use crate::error::{Error, Result};

pub const DEFAULT_INDEX_NAME: &str = "vectest";
pub const DEFAULT_SEARCH_API_VERSION: &str = "2024-07-01";
pub const DEFAULT_REQUEST_TIMEOUT_SECS: u64 = 60;

/// Set to `1` or `true` to embed offline with the hashed fake embedder.
pub const FAKE_EMBEDDINGS_ENV: &str = "AISEARCH_USE_FAKE_EMBEDDINGS";

/// Settings read verbatim from the environment. Figment would otherwise parse
/// an all-digit key or name into a number and drop leading zeros.
const STRING_KEYS: [&str; 9] = [
    "search_service_endpoint",
    "search_index",
    "search_admin_key",
    "search_api_version",
    "openai_endpoint",
    "openai_key",
    "openai_embedding_deployment",
    "openai_embedding_model",
    "openai_api_version",
];

/// Connection settings shared by the index and search pipelines.
///
/// Field names mirror the `AZURE_*` environment variables with the prefix
/// stripped, so `AZURE_OPENAI_ENDPOINT` fills `openai_endpoint`.
#[derive(Clone, Serialize, Deserialize, PartialEq)]
pub struct Settings {
    pub search_service_endpoint: String,
    #[serde(default = "default_index_name")]
    pub search_index: String,
    #[serde(default)]
    pub search_admin_key: Option<String>,
    #[serde(default = "default_search_api_version")]
    pub search_api_version: String,
    pub openai_endpoint: String,
    #[serde(default)]
    pub openai_key: Option<String>,
    pub openai_embedding_deployment: String,
    #[serde(default)]
    pub openai_embedding_model: Option<String>,
    pub openai_embedding_dimensions: usize,
    pub openai_api_version: String,
    #[serde(default = "default_request_timeout_secs")]
    pub request_timeout_secs: u64,
    /// Swap the Azure OpenAI embedder for the offline one.
    #[serde(default, deserialize_with = "flag")]
    pub use_fake_embeddings: bool,
}

impl fmt::Debug for Settings {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let redact = |key: &Option<String>| key.as_ref().map(|_| "***");
        f.debug_struct("Settings")
            .field("search_service_endpoint", &self.search_service_endpoint)
            .field("search_index", &self.search_index)
            .field("search_admin_key", &redact(&self.search_admin_key))
            .field("search_api_version", &self.search_api_version)
            .field("openai_endpoint", &self.openai_endpoint)
            .field("openai_key", &redact(&self.openai_key))
            .field("openai_embedding_deployment", &self.openai_embedding_deployment)
            .field("openai_embedding_model", &self.openai_embedding_model)
            .field("openai_embedding_dimensions", &self.openai_embedding_dimensions)
            .field("openai_api_version", &self.openai_api_version)
            .field("request_timeout_secs", &self.request_timeout_secs)
            .field("use_fake_embeddings", &self.use_fake_embeddings)
            .finish()
    }
}

/// Accepts `true`/`false`, `1`/`0` and their string spellings.
fn flag<'de, D: Deserializer<'de>>(deserializer: D) -> std::result::Result<bool, D::Error> {
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Flag {
        Bool(bool),
        Int(i64),
        Text(String),
    }
    Ok(match Flag::deserialize(deserializer)? {
        Flag::Bool(b) => b,
        Flag::Int(n) => n != 0,
        Flag::Text(t) => t == "1" || t.eq_ignore_ascii_case("true"),
    })
}

fn default_index_name() -> String { DEFAULT_INDEX_NAME.to_string() }
fn default_search_api_version() -> String { DEFAULT_SEARCH_API_VERSION.to_string() }
fn default_request_timeout_secs() -> u64 { DEFAULT_REQUEST_TIMEOUT_SECS }

impl Settings {
    /// Load from `config.toml`, `config.<RUST_ENV>.toml` and `AZURE_*` env vars.
    pub fn load() -> Result<Self> {
        let env_name = env::var("RUST_ENV").unwrap_or_else(|_| "dev".to_string());
        Self::from_figment(Self::figment(&env_name))
    }

    /// Provider stack for the given environment name, later sources winning.
    pub fn figment(env_name: &str) -> Figment {
        let mut figment = Figment::new().merge(Toml::file("config.toml"));
        match env_name {
            "dev" | "development" => figment = figment.merge(Toml::file("config.dev.toml")),
            "prod" | "production" => figment = figment.merge(Toml::file("config.prod.toml")),
            "test" | "testing" => figment = figment.merge(Toml::file("config.test.toml")),
            _ => {}
        }
        let azure = Env::prefixed("AZURE_");
        let verbatim: BTreeMap<String, String> = azure
            .clone()
            .only(&STRING_KEYS)
            .iter()
            .map(|(key, value)| (key.as_str().to_ascii_lowercase(), value))
            .collect();
        figment
            .merge(azure.ignore(&STRING_KEYS))
            .merge(Serialized::defaults(verbatim))
            .merge(Env::raw().only(&[FAKE_EMBEDDINGS_ENV]).map(|_| "use_fake_embeddings".into()))
    }

    pub fn from_figment(figment: Figment) -> Result<Self> {
        let settings: Settings = figment.extract()?;
        settings.validate()?;
        Ok(settings)
    }

    fn validate(&self) -> Result<()> {
        if self.openai_embedding_dimensions == 0 {
            return Err(Error::InvalidConfig("openai_embedding_dimensions must be greater than 0".to_string()));
        }
        for (name, value) in [
            ("search_service_endpoint", &self.search_service_endpoint),
            ("search_index", &self.search_index),
            ("openai_endpoint", &self.openai_endpoint),
            ("openai_embedding_deployment", &self.openai_embedding_deployment),
            ("openai_api_version", &self.openai_api_version),
        ] {
            if value.trim().is_empty() {
                return Err(Error::InvalidConfig(format!("{name} must not be empty")));
            }
        }
        Ok(())
    }

    /// Model name sent with embedding requests; defaults to the deployment name.
    pub fn embedding_model(&self) -> &str {
        self.openai_embedding_model
            .as_deref()
            .filter(|m| !m.trim().is_empty())
            .unwrap_or(&self.openai_embedding_deployment)
    }

    pub fn openai_key(&self) -> Option<&str> { non_empty(self.openai_key.as_deref()) }

    pub fn search_admin_key(&self) -> Option<&str> { non_empty(self.search_admin_key.as_deref()) }

    pub fn request_timeout(&self) -> Duration { Duration::from_secs(self.request_timeout_secs.max(1)) }
}

fn non_empty(value: Option<&str>) -> Option<&str> {
    value.filter(|v| !v.trim().is_empty())
}

/// Expand a user-provided path string:
/// - Expands leading '~' to the user's home directory
/// - Expands ${VAR} and $VAR environment variables
/// - Returns a PathBuf without attempting to canonicalize
pub fn expand_path<S: AsRef<str>>(input: S) -> PathBuf {
    let s = input.as_ref();
    let expanded_env = shellexpand::env(s).unwrap_or(std::borrow::Cow::Borrowed(s));
    let expanded = shellexpand::tilde(&expanded_env);
    PathBuf::from(expanded.as_ref())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> Settings {
        Settings {
            search_service_endpoint: "https://search.example".to_string(),
            search_index: DEFAULT_INDEX_NAME.to_string(),
            search_admin_key: None,
            search_api_version: DEFAULT_SEARCH_API_VERSION.to_string(),
            openai_endpoint: "https://openai.example".to_string(),
            openai_key: Some("  ".to_string()),
            openai_embedding_deployment: "embed-deploy".to_string(),
            openai_embedding_model: None,
            openai_embedding_dimensions: 8,
            openai_api_version: "2024-02-01".to_string(),
            request_timeout_secs: 0,
            use_fake_embeddings: false,
        }
    }

    #[test]
    fn blank_keys_count_as_absent() {
        let s = sample();
        assert_eq!(s.openai_key(), None);
        assert_eq!(s.search_admin_key(), None);
    }

    #[test]
    fn model_falls_back_to_deployment() {
        let mut s = sample();
        assert_eq!(s.embedding_model(), "embed-deploy");
        s.openai_embedding_model = Some("text-embedding-3-small".to_string());
        assert_eq!(s.embedding_model(), "text-embedding-3-small");
    }

    #[test]
    fn timeout_is_at_least_one_second() {
        assert_eq!(sample().request_timeout(), Duration::from_secs(1));
    }

    #[test]
    fn zero_dimensions_rejected() {
        let mut s = sample();
        s.openai_embedding_dimensions = 0;
        assert!(matches!(s.validate(), Err(Error::InvalidConfig(_))));
    }

    #[test]
    fn debug_output_hides_keys() {
        let mut s = sample();
        s.openai_key = Some("openai-secret".to_string());
        s.search_admin_key = Some("admin-secret".to_string());
        let shown = format!("{s:?}");
        assert!(!shown.contains("openai-secret"));
        assert!(!shown.contains("admin-secret"));
        assert!(shown.contains("openai_key: Some(\"***\")"));
        assert!(shown.contains("embed-deploy"));
    }

    #[test]
    fn fake_embeddings_flag_spellings() {
        let parse = |v: serde_json::Value| -> bool {
            let s: Settings = serde_json::from_value(serde_json::json!({
                "search_service_endpoint": "s", "openai_endpoint": "o", "openai_embedding_deployment": "d",
                "openai_embedding_dimensions": 2, "openai_api_version": "v", "use_fake_embeddings": v
            }))
            .unwrap();
            s.use_fake_embeddings
        };
        assert!(parse(serde_json::json!(true)));
        assert!(parse(serde_json::json!(1)));
        assert!(parse(serde_json::json!("TRUE")));
        assert!(!parse(serde_json::json!("0")));
        assert!(!parse(serde_json::json!(0)));
    }

    #[test]
    fn expand_path_keeps_plain_relative_paths() {
        assert_eq!(expand_path("data/docVectors.json"), PathBuf::from("data/docVectors.json"));
    }
}
