//! HTTP client for OpenAI-compatible LLM services (OpenAI, vLLM, Ollama, etc.)

use super::cache::{chat_cache_key, ResponseCache};
use crate::config::{LLMServiceConfig, LlmProvider};
use crate::error::{RegscopeError, Result};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};

/// Trait for LLM service clients
#[async_trait]
pub trait LLMClient: Send + Sync {
    /// Generate a chat completion; an empty string means the model said nothing
    async fn chat_completion(&self, messages: Vec<ChatMessage>) -> Result<String>;

    /// Get model name
    fn model_name(&self) -> &str;

    /// Request counters, when the client keeps them
    fn metrics(&self) -> Option<MetricsSnapshot> {
        None
    }
}

/// Chat message for completion requests
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChatMessage {
    pub role: String,
    pub content: String,
}

impl ChatMessage {
    pub fn system(content: impl Into<String>) -> Self {
        Self {
            role: "system".to_string(),
            content: content.into(),
        }
    }

    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: "user".to_string(),
            content: content.into(),
        }
    }

    pub fn is_system(&self) -> bool {
        self.role == "system"
    }
}

/// API metrics for monitoring
#[derive(Debug, Default)]
pub struct ClientMetrics {
    pub total_requests: AtomicU64,
    pub total_errors: AtomicU64,
    pub cache_hits: AtomicU64,
    pub cache_misses: AtomicU64,
    pub total_latency_ms: AtomicU64,
}

impl ClientMetrics {
    pub(crate) fn record_error(&self) {
        self.total_errors.fetch_add(1, Ordering::Relaxed);
    }

    pub(crate) fn record_latency(&self, start: Instant) {
        let elapsed = start.elapsed().as_millis() as u64;
        self.total_latency_ms.fetch_add(elapsed, Ordering::Relaxed);
    }

    pub fn snapshot(&self) -> MetricsSnapshot {
        let total = self.total_requests.load(Ordering::Relaxed);
        let hits = self.cache_hits.load(Ordering::Relaxed);

        MetricsSnapshot {
            total_requests: total,
            total_errors: self.total_errors.load(Ordering::Relaxed),
            cache_hits: hits,
            cache_misses: self.cache_misses.load(Ordering::Relaxed),
            cache_hit_rate: if total > 0 {
                hits as f64 / total as f64 * 100.0
            } else {
                0.0
            },
            avg_latency_ms: if total > 0 {
                self.total_latency_ms.load(Ordering::Relaxed) as f64 / total as f64
            } else {
                0.0
            },
        }
    }
}

/// Snapshot of API metrics
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MetricsSnapshot {
    pub total_requests: u64,
    pub total_errors: u64,
    pub cache_hits: u64,
    pub cache_misses: u64,
    pub cache_hit_rate: f64,
    pub avg_latency_ms: f64,
}

/// Request bookkeeping shared by the HTTP-backed clients
pub(crate) struct CachedTransport {
    pub(crate) http_client: reqwest::Client,
    pub(crate) cache: ResponseCache,
    pub(crate) metrics: Arc<ClientMetrics>,
}

impl CachedTransport {
    pub(crate) fn new(config: &LLMServiceConfig) -> Result<Self> {
        let http_client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()?;

        Ok(Self {
            http_client,
            cache: ResponseCache::with_ttl(Duration::from_secs(config.cache_ttl_secs)),
            metrics: Arc::new(ClientMetrics::default()),
        })
    }

    /// Count the request and return a cached reply if there is one
    pub(crate) fn lookup(&self, model: &str, messages: &[ChatMessage]) -> (String, Option<String>) {
        self.metrics.total_requests.fetch_add(1, Ordering::Relaxed);

        let messages_json = serde_json::to_string(messages).unwrap_or_default();
        let key = chat_cache_key(model, &messages_json);

        match self.cache.get(&key) {
            Some(cached) => {
                tracing::debug!("Cache hit for chat completion");
                self.metrics.cache_hits.fetch_add(1, Ordering::Relaxed);
                (key, Some(cached))
            }
            None => {
                self.metrics.cache_misses.fetch_add(1, Ordering::Relaxed);
                (key, None)
            }
        }
    }

    /// Store a non-empty reply and record latency
    pub(crate) fn finish(&self, key: String, content: &str, start: Instant) {
        if !content.is_empty() {
            self.cache.set(key, content.to_string());
        }
        self.metrics.record_latency(start);
    }

    /// Turn a non-2xx response into an `ExternalError`
    pub(crate) async fn check_status(
        &self,
        response: reqwest::Response,
    ) -> Result<reqwest::Response> {
        if response.status().is_success() {
            return Ok(response);
        }
        self.metrics.record_error();
        let status = response.status();
        let body = response.text().await.unwrap_or_default();
        Err(RegscopeError::ExternalError(format!(
            "LLM service error (HTTP {}): {}",
            status, body
        )))
    }
}

/// OpenAI-compatible chat completions client
pub struct HttpLLMClient {
    transport: CachedTransport,
    config: LLMServiceConfig,
}

impl HttpLLMClient {
    /// Create new client from configuration
    pub fn new(config: LLMServiceConfig) -> Result<Self> {
        let transport = CachedTransport::new(&config)?;
        Ok(Self { transport, config })
    }

    /// Get current API metrics
    pub fn metrics(&self) -> MetricsSnapshot {
        self.transport.metrics.snapshot()
    }
}

#[async_trait]
impl LLMClient for HttpLLMClient {
    async fn chat_completion(&self, messages: Vec<ChatMessage>) -> Result<String> {
        let start = Instant::now();
        let (cache_key, cached) = self.transport.lookup(&self.config.model, &messages);
        if let Some(cached) = cached {
            return Ok(cached);
        }

        #[derive(Serialize)]
        struct ChatRequest<'a> {
            model: &'a str,
            messages: Vec<ChatMessage>,
            temperature: f32,
            max_tokens: u32,
        }

        #[derive(Deserialize)]
        struct ChatResponse {
            #[serde(default)]
            choices: Vec<ChatChoice>,
        }

        #[derive(Deserialize)]
        struct ChatChoice {
            message: ChoiceMessage,
        }

        #[derive(Deserialize)]
        struct ChoiceMessage {
            #[serde(default)]
            content: Option<String>,
        }

        let request = ChatRequest {
            model: &self.config.model,
            messages,
            temperature: self.config.temperature,
            max_tokens: self.config.max_tokens,
        };

        let url = format!(
            "{}/v1/chat/completions",
            self.config.url.trim_end_matches('/')
        );

        let mut req = self.transport.http_client.post(&url).json(&request);
        if let Some(ref api_key) = self.config.api_key {
            req = req.header("Authorization", format!("Bearer {}", api_key));
        }

        let response = req.send().await.map_err(|e| {
            self.transport.metrics.record_error();
            RegscopeError::Http(e)
        })?;
        let response = self.transport.check_status(response).await?;

        let chat_response: ChatResponse = response.json().await.map_err(|e| {
            self.transport.metrics.record_error();
            RegscopeError::Http(e)
        })?;

        let content = chat_response
            .choices
            .into_iter()
            .next()
            .and_then(|choice| choice.message.content)
            .unwrap_or_default();

        if content.is_empty() {
            tracing::warn!("LLM returned an empty completion");
        }
        self.transport.finish(cache_key, &content, start);

        Ok(content)
    }

    fn model_name(&self) -> &str {
        &self.config.model
    }

    fn metrics(&self) -> Option<MetricsSnapshot> {
        Some(self.transport.metrics.snapshot())
    }
}

/// Build the client selected by `config.provider`
pub fn client_from_config(config: &LLMServiceConfig) -> Result<Arc<dyn LLMClient>> {
    let client: Arc<dyn LLMClient> = match config.provider {
        LlmProvider::OpenAi => Arc::new(HttpLLMClient::new(config.clone())?),
        LlmProvider::Gemini => Arc::new(super::gemini::GeminiClient::new(config.clone())?),
    };
    tracing::debug!(
        "Using {:?} LLM provider with model {}",
        config.provider,
        client.model_name()
    );
    Ok(client)
}
