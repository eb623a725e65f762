//! LLM integration
//!
//! Provides the completion client trait and implementations for:
//! - OpenAI-compatible services (OpenAI, vLLM, Ollama, ...)
//! - Google Gemini
//! - Tolerant JSON decoding of completions

mod cache;
mod client;
mod gemini;
pub mod json;

pub use cache::{chat_cache_key, CacheStats, ResponseCache};
pub use client::{
    client_from_config, ChatMessage, ClientMetrics, HttpLLMClient, LLMClient, MetricsSnapshot,
};
pub use gemini::GeminiClient;
