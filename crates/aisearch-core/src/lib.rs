//! Shared building blocks for the aisearch crates.
//!
//! Settings are loaded once with Figment (`config.toml` + `config.<env>.toml` +
//! `AZURE_*` env vars) and passed explicitly to every component. Credentials,
//! the error type and the authenticated HTTP client live here too.

pub mod config;
pub mod credential;
pub mod error;
pub mod service;
pub mod traits;
pub mod types;

pub use config::Settings;
pub use credential::Credential;
pub use error::{Error, Result};
pub use service::ServiceClient;
pub use traits::Embedder;
