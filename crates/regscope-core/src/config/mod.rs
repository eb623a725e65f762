//! Configuration management

use crate::error::{RegscopeError, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Environment variable pointing at an explicit config file
pub const CONFIG_ENV_VAR: &str = "REGSCOPE_CONFIG";

/// Main configuration structure
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct Config {
    /// LLM service configuration
    #[serde(default)]
    pub llm_service: LLMServiceConfig,

    /// Extract storage configuration
    #[serde(default)]
    pub storage: StorageConfig,

    /// HTTP server configuration
    #[serde(default)]
    pub server: ServerConfig,

    /// Research workflow tuning
    #[serde(default)]
    pub research: ResearchConfig,
}

/// Which completion API the LLM client speaks
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum LlmProvider {
    /// OpenAI-compatible `/v1/chat/completions` (OpenAI, vLLM, Ollama, ...)
    #[default]
    OpenAi,
    /// Google Generative Language `generateContent`
    Gemini,
}

impl std::str::FromStr for LlmProvider {
    type Err = RegscopeError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_lowercase().as_str() {
            "openai" | "vllm" => Ok(Self::OpenAi),
            "gemini" => Ok(Self::Gemini),
            other => Err(RegscopeError::Config(format!(
                "Unknown LLM provider: {}",
                other
            ))),
        }
    }
}

impl std::fmt::Display for LlmProvider {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::OpenAi => write!(f, "openai"),
            Self::Gemini => write!(f, "gemini"),
        }
    }
}

/// LLM service configuration for external inference
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LLMServiceConfig {
    #[serde(default)]
    pub provider: LlmProvider,

    /// Base URL of the completion service
    #[serde(default = "default_llm_url")]
    pub url: String,

    /// Model name for completions
    #[serde(default = "default_chat_model")]
    pub model: String,

    /// API key (optional, for authenticated services)
    #[serde(default)]
    pub api_key: Option<String>,

    /// Request timeout in seconds
    #[serde(default = "default_timeout")]
    pub timeout_secs: u64,

    #[serde(default = "default_temperature")]
    pub temperature: f32,

    #[serde(default = "default_max_tokens")]
    pub max_tokens: u32,

    /// Response cache TTL in seconds (0 disables caching)
    #[serde(default = "default_cache_ttl")]
    pub cache_ttl_secs: u64,
}

impl Default for LLMServiceConfig {
    fn default() -> Self {
        Self {
            provider: LlmProvider::default(),
            url: default_llm_url(),
            model: default_chat_model(),
            api_key: None,
            timeout_secs: default_timeout(),
            temperature: default_temperature(),
            max_tokens: default_max_tokens(),
            cache_ttl_secs: default_cache_ttl(),
        }
    }
}

fn default_llm_url() -> String {
    "http://localhost:8000".to_string()
}

fn default_chat_model() -> String {
    "meta-llama/Llama-3.1-8B-Instruct".to_string()
}

fn default_timeout() -> u64 {
    30
}

fn default_temperature() -> f32 {
    0.7
}

fn default_max_tokens() -> u32 {
    2048
}

fn default_cache_ttl() -> u64 {
    3600
}

pub const GEMINI_DEFAULT_URL: &str = "https://generativelanguage.googleapis.com";
pub const GEMINI_DEFAULT_MODEL: &str = "gemini-2.5-pro";

/// Storage backend selection
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum StorageBackend {
    /// Seeded in-memory store (lost on restart)
    #[default]
    Memory,
    /// CSV files under `data_dir`
    Csv,
}

impl std::str::FromStr for StorageBackend {
    type Err = RegscopeError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_lowercase().as_str() {
            "memory" | "mem" => Ok(Self::Memory),
            "csv" => Ok(Self::Csv),
            other => Err(RegscopeError::Config(format!(
                "Unknown storage backend: {}",
                other
            ))),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StorageConfig {
    #[serde(default)]
    pub backend: StorageBackend,

    /// Directory holding extracts.csv, keywords.csv and summaries.csv
    #[serde(default = "default_data_dir")]
    pub data_dir: PathBuf,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            backend: StorageBackend::default(),
            data_dir: default_data_dir(),
        }
    }
}

fn default_data_dir() -> PathBuf {
    PathBuf::from("data")
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    #[serde(default = "default_bind")]
    pub bind: String,

    /// `tracing` filter directive used by `regscope serve`
    #[serde(default = "default_log_level")]
    pub log_level: String,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind: default_bind(),
            log_level: default_log_level(),
        }
    }
}

fn default_bind() -> String {
    "127.0.0.1:5000".to_string()
}

fn default_log_level() -> String {
    "info".to_string()
}

/// How the retry decision is derived from a quality assessment
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum RecommendationPolicy {
    /// Trust the label the model returned
    #[default]
    Model,
    /// Derive the label from the overall score
    Score,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ResearchConfig {
    /// Number of leading keywords joined into the search string
    #[serde(default = "default_search_keyword_limit")]
    pub search_keyword_limit: usize,

    /// Maximum documents kept per retrieval
    #[serde(default = "default_max_documents")]
    pub max_documents: usize,

    #[serde(default)]
    pub recommendation_policy: RecommendationPolicy,
}

impl Default for ResearchConfig {
    fn default() -> Self {
        Self {
            search_keyword_limit: default_search_keyword_limit(),
            max_documents: default_max_documents(),
            recommendation_policy: RecommendationPolicy::default(),
        }
    }
}

fn default_search_keyword_limit() -> usize {
    8
}

fn default_max_documents() -> usize {
    15
}

impl Config {
    /// Load config from `$REGSCOPE_CONFIG` or the default path, then apply
    /// environment overrides
    pub fn load() -> Result<Self> {
        let path = std::env::var(CONFIG_ENV_VAR)
            .map(PathBuf::from)
            .unwrap_or_else(|_| Self::default_path());

        let mut config = if path.exists() {
            Self::load_from(&path)?
        } else {
            Config::default()
        };
        config.apply_overrides(|key| std::env::var(key).ok())?;
        Ok(config)
    }

    /// Load config from an explicit YAML file
    pub fn load_from(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        let config: Config = serde_yaml::from_str(&content)?;
        Ok(config)
    }

    /// Save config to default path
    pub fn save(&self) -> Result<()> {
        let path = Self::default_path();
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let content = serde_yaml::to_string(self)?;
        std::fs::write(path, content)?;
        Ok(())
    }

    /// Get default config path
    pub fn default_path() -> PathBuf {
        dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join(crate::CONFIG_DIR_NAME)
            .join("config.yml")
    }

    /// Apply `REGSCOPE_*` overrides read through `lookup`
    pub fn apply_overrides<F>(&mut self, lookup: F) -> Result<()>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(provider) = lookup("REGSCOPE_LLM_PROVIDER") {
            self.llm_service.provider = provider.parse()?;
            if self.llm_service.provider == LlmProvider::Gemini
                && self.llm_service.url == default_llm_url()
            {
                self.llm_service.url = GEMINI_DEFAULT_URL.to_string();
                self.llm_service.model = GEMINI_DEFAULT_MODEL.to_string();
            }
        }
        if let Some(url) = lookup("REGSCOPE_LLM_URL") {
            self.llm_service.url = url;
        }
        if let Some(model) = lookup("REGSCOPE_LLM_MODEL") {
            self.llm_service.model = model;
        }
        if let Some(key) = lookup("REGSCOPE_LLM_API_KEY") {
            self.llm_service.api_key = Some(key);
        } else if self.llm_service.provider == LlmProvider::Gemini
            && self.llm_service.api_key.is_none()
        {
            self.llm_service.api_key = lookup("GEMINI_API_KEY");
        }
        if let Some(backend) = lookup("REGSCOPE_STORAGE") {
            self.storage.backend = backend.parse()?;
        }
        if let Some(dir) = lookup("REGSCOPE_DATA_DIR") {
            self.storage.data_dir = PathBuf::from(dir);
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    #[test]
    fn test_defaults() {
        let config = Config::default();
        assert_eq!(config.research.search_keyword_limit, 8);
        assert_eq!(config.research.max_documents, 15);
        assert_eq!(config.research.recommendation_policy, RecommendationPolicy::Model);
        assert_eq!(config.storage.backend, StorageBackend::Memory);
        assert_eq!(config.llm_service.cache_ttl_secs, 3600);
    }

    #[test]
    fn test_parse_partial_yaml() {
        let yaml = r#"
llm_service:
  provider: gemini
  model: gemini-2.5-flash
storage:
  backend: csv
  data_dir: /srv/regscope
research:
  recommendation_policy: score
"#;
        let config: Config = serde_yaml::from_str(yaml).unwrap();
        assert_eq!(config.llm_service.provider, LlmProvider::Gemini);
        assert_eq!(config.llm_service.model, "gemini-2.5-flash");
        assert_eq!(config.llm_service.timeout_secs, 30);
        assert_eq!(config.storage.backend, StorageBackend::Csv);
        assert_eq!(config.storage.data_dir, PathBuf::from("/srv/regscope"));
        assert_eq!(config.research.recommendation_policy, RecommendationPolicy::Score);
        assert_eq!(config.research.max_documents, 15);
        assert_eq!(config.server.bind, "127.0.0.1:5000");
    }

    #[test]
    fn test_env_overrides() {
        let env: HashMap<&str, &str> = [
            ("REGSCOPE_LLM_PROVIDER", "gemini"),
            ("GEMINI_API_KEY", "secret"),
            ("REGSCOPE_STORAGE", "csv"),
            ("REGSCOPE_DATA_DIR", "/tmp/regs"),
        ]
        .into_iter()
        .collect();

        let mut config = Config::default();
        config
            .apply_overrides(|key| env.get(key).map(|v| v.to_string()))
            .unwrap();

        assert_eq!(config.llm_service.provider, LlmProvider::Gemini);
        assert_eq!(config.llm_service.url, GEMINI_DEFAULT_URL);
        assert_eq!(config.llm_service.model, GEMINI_DEFAULT_MODEL);
        assert_eq!(config.llm_service.api_key.as_deref(), Some("secret"));
        assert_eq!(config.storage.backend, StorageBackend::Csv);
        assert_eq!(config.storage.data_dir, PathBuf::from("/tmp/regs"));
    }

    #[test]
    fn test_unknown_backend_rejected() {
        let mut config = Config::default();
        let result = config.apply_overrides(|key| {
            (key == "REGSCOPE_STORAGE").then(|| "postgres".to_string())
        });
        assert!(matches!(result, Err(RegscopeError::Config(_))));
    }
}
