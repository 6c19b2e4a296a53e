use serde::de::DeserializeOwned;
use serde::Deserialize;
use std::path::Path;
use std::time::Duration;

use crate::application::{Prompts, RetryPolicy};
use crate::domain::DomainError;

pub const DEFAULT_CONFIG_PATH: &str = "config/default.yaml";
pub const DEFAULT_PROMPTS_PATH: &str = "config/prompts.yaml";
pub const OPENAI_API_KEY: &str = "OPENAI_API_KEY";

/// Settings plus prompt templates, loaded once at startup.
#[derive(Debug, Clone, Default)]
pub struct AppConfig {
    pub config: Config,
    pub prompts: Prompts,
}

impl AppConfig {
    /// Reads the YAML files named by `APP_CONFIG` / `PROMPTS_CONFIG` (or the
    /// defaults under `config/`) and applies environment overrides.
    ///
    /// A missing default file falls back to built-in values; a missing file
    /// that was named explicitly is an error.
    pub fn load() -> Result<Self, DomainError> {
        let lookup = |key: &str| std::env::var(key).ok();

        let config_path = lookup("APP_CONFIG");
        let prompts_path = lookup("PROMPTS_CONFIG");

        let mut config: Config = read_yaml(
            config_path.as_deref().unwrap_or(DEFAULT_CONFIG_PATH),
            config_path.is_some(),
        )?;
        let prompts: Prompts = read_yaml(
            prompts_path.as_deref().unwrap_or(DEFAULT_PROMPTS_PATH),
            prompts_path.is_some(),
        )?;

        config.apply_overrides(lookup);
        Ok(Self { config, prompts })
    }

    pub fn from_yaml(config: &str, prompts: &str) -> Result<Self, DomainError> {
        Ok(Self {
            config: parse_yaml(config, "inline config")?,
            prompts: parse_yaml(prompts, "inline prompts")?,
        })
    }

    /// Fails fast when a required credential or setting is unusable.
    pub fn validate(&self) -> Result<(), DomainError> {
        self.validate_with(|key| std::env::var(key).ok())
    }

    pub fn validate_with(&self, lookup: impl Fn(&str) -> Option<String>) -> Result<(), DomainError> {
        let key_present = lookup(OPENAI_API_KEY).is_some_and(|v| !v.trim().is_empty());
        if !key_present {
            return Err(DomainError::configuration(format!(
                "{OPENAI_API_KEY} must be set"
            )));
        }

        let c = &self.config;
        if c.retrieval.top_k == 0 || c.retrieval.top_k > c.retrieval.max_top_k {
            return Err(DomainError::configuration(format!(
                "retrieval.top_k must be between 1 and {}",
                c.retrieval.max_top_k
            )));
        }
        if c.ingestion.batch_size == 0 {
            return Err(DomainError::configuration("ingestion.batch_size must be positive"));
        }
        if c.embedding.dimension == 0 {
            return Err(DomainError::configuration("embedding.dimension must be positive"));
        }
        if c.retry.max_attempts == 0 {
            return Err(DomainError::configuration("retry.max_attempts must be positive"));
        }

        Ok(())
    }
}

fn read_yaml<T>(path: &str, required: bool) -> Result<T, DomainError>
where
    T: DeserializeOwned + Default,
{
    match std::fs::read_to_string(Path::new(path)) {
        Ok(raw) => parse_yaml(&raw, path),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound && !required => {
            tracing::debug!(path, "config file not found, using defaults");
            Ok(T::default())
        }
        Err(e) => Err(DomainError::configuration(format!("cannot read {path}: {e}"))),
    }
}

fn parse_yaml<T: DeserializeOwned>(raw: &str, origin: &str) -> Result<T, DomainError> {
    serde_yaml::from_str(raw)
        .map_err(|e| DomainError::configuration(format!("invalid YAML in {origin}: {e}")))
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct Config {
    pub server: ServerConfig,
    pub llm: LlmConfig,
    pub embedding: EmbeddingConfig,
    pub vector_index: VectorIndexConfig,
    pub record_store: RecordStoreConfig,
    pub retrieval: RetrievalConfig,
    pub ingestion: IngestionConfig,
    pub composer: ComposerConfig,
    pub retry: RetryConfig,
    pub cors: CorsConfig,
}

impl Config {
    /// Environment wins over the file for deployment-specific endpoints.
    pub fn apply_overrides(&mut self, lookup: impl Fn(&str) -> Option<String>) {
        if let Some(host) = lookup("SERVER_HOST") {
            self.server.host = host;
        }
        if let Some(port) = lookup("SERVER_PORT").and_then(|p| p.parse().ok()) {
            self.server.port = port;
        }
        if let Some(url) = lookup("QDRANT_URL") {
            self.vector_index.url = url;
        }
        if let Some(url) = lookup("REDIS_URL") {
            self.record_store.redis_url = url;
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 8000,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct LlmConfig {
    pub model: String,
    pub temperature: f64,
    pub timeout_seconds: u64,
}

impl Default for LlmConfig {
    fn default() -> Self {
        Self {
            model: "gpt-4o-mini".to_string(),
            temperature: 0.7,
            timeout_seconds: 60,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct EmbeddingConfig {
    pub model: String,
    pub dimension: usize,
}

impl Default for EmbeddingConfig {
    fn default() -> Self {
        Self {
            model: "text-embedding-3-small".to_string(),
            dimension: 1536,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct VectorIndexConfig {
    pub url: String,
    pub collection: String,
}

impl Default for VectorIndexConfig {
    fn default() -> Self {
        Self {
            url: "http://localhost:6334".to_string(),
            collection: "bakery_vector_store".to_string(),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct RecordStoreConfig {
    pub redis_url: String,
    pub key: String,
}

impl Default for RecordStoreConfig {
    fn default() -> Self {
        Self {
            redis_url: "redis://localhost:6379".to_string(),
            key: "bakeries".to_string(),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct RetrievalConfig {
    pub top_k: usize,
    pub max_top_k: usize,
}

impl Default for RetrievalConfig {
    fn default() -> Self {
        Self {
            top_k: 3,
            max_top_k: 20,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct IngestionConfig {
    pub batch_size: usize,
}

impl Default for IngestionConfig {
    fn default() -> Self {
        Self { batch_size: 32 }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ComposerConfig {
    /// Ask the model a second question relating the top candidate to the user.
    pub explain: bool,
}

impl Default for ComposerConfig {
    fn default() -> Self {
        Self { explain: true }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct RetryConfig {
    pub max_attempts: u32,
    pub base_delay_ms: u64,
    pub max_delay_ms: u64,
}

impl From<&RetryConfig> for RetryPolicy {
    fn from(config: &RetryConfig) -> Self {
        RetryPolicy::new(
            config.max_attempts,
            Duration::from_millis(config.base_delay_ms),
            Duration::from_millis(config.max_delay_ms),
        )
    }
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            max_attempts: 3,
            base_delay_ms: 500,
            max_delay_ms: 8_000,
        }
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct CorsConfig {
    pub allowed_origins: Vec<String>,
}
