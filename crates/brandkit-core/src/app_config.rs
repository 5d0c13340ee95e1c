use std::net::SocketAddr;
use std::path::PathBuf;

use crate::keyword::KeywordWeights;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Environment {
    Development,
    Test,
    Production,
}

impl std::fmt::Display for Environment {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Environment::Development => write!(f, "development"),
            Environment::Test => write!(f, "test"),
            Environment::Production => write!(f, "production"),
        }
    }
}

/// Remote row-store coordinates. Absent means the in-memory backend.
#[derive(Clone)]
pub struct StoreConfig {
    pub url: String,
    pub service_key: String,
}

/// One configured API key and the owner it authenticates as.
#[derive(Clone)]
pub struct ApiKeyEntry {
    pub key: String,
    pub owner: String,
}

#[derive(Clone)]
pub struct AppConfig {
    pub env: Environment,
    pub listen_addr: SocketAddr,
    pub log_level: String,
    pub templates_path: PathBuf,
    pub api_keys: Vec<ApiKeyEntry>,

    pub autofill_client_id: String,
    pub autofill_client_secret: String,
    pub autofill_base_url: String,
    pub autofill_token_path: PathBuf,
    pub autofill_refresh_buffer_secs: u64,

    pub openai_api_key: String,
    pub openai_base_url: String,
    pub llm_primary_model: String,
    pub llm_cheap_model: String,
    pub llm_embedding_model: String,

    pub scraper_base_url: String,
    pub scraper_request_timeout_secs: u64,

    pub store: Option<StoreConfig>,
    pub keyword_weights: KeywordWeights,
}

impl std::fmt::Debug for AppConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AppConfig")
            .field("env", &self.env)
            .field("listen_addr", &self.listen_addr)
            .field("log_level", &self.log_level)
            .field("templates_path", &self.templates_path)
            .field(
                "api_keys",
                &self
                    .api_keys
                    .iter()
                    .map(|k| format!("[redacted]={}", k.owner))
                    .collect::<Vec<_>>(),
            )
            .field("autofill_client_id", &self.autofill_client_id)
            .field("autofill_client_secret", &"[redacted]")
            .field("autofill_base_url", &self.autofill_base_url)
            .field("autofill_token_path", &self.autofill_token_path)
            .field(
                "autofill_refresh_buffer_secs",
                &self.autofill_refresh_buffer_secs,
            )
            .field("openai_api_key", &"[redacted]")
            .field("openai_base_url", &self.openai_base_url)
            .field("llm_primary_model", &self.llm_primary_model)
            .field("llm_cheap_model", &self.llm_cheap_model)
            .field("llm_embedding_model", &self.llm_embedding_model)
            .field("scraper_base_url", &self.scraper_base_url)
            .field(
                "scraper_request_timeout_secs",
                &self.scraper_request_timeout_secs,
            )
            .field(
                "store_url",
                &self.store.as_ref().map(|s| s.url.as_str()),
            )
            .field(
                "store_service_key",
                &self.store.as_ref().map(|_| "[redacted]"),
            )
            .field("keyword_weights", &self.keyword_weights)
            .finish()
    }
}
