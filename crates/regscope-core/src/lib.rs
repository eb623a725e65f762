//! Regscope Core Library
//!
//! Core functionality for the regscope regulatory research assistant.
//!
//! # Features
//! - Regulatory extract storage (in-memory or CSV files)
//! - Catalog keyword baselines and content search
//! - LLM research workflow: keyword generation, retrieval, quality
//!   assessment with one retry, answer synthesis
//! - OpenAI-compatible and Gemini completion clients with response caching

pub mod catalog;
pub mod config;
pub mod error;
pub mod llm;
pub mod research;
pub mod services;
pub mod store;
pub mod text;

pub use catalog::{
    BaselineKeywords, CatalogDocument, ContentSearch, ContentSearchResults, KeywordProvider,
    KeywordSuggestions, QueryPlan, RegulatoryCatalog, SummaryOptions,
};
pub use config::{Config, LLMServiceConfig, LlmProvider, RecommendationPolicy, StorageBackend};
pub use error::{Error, RegscopeError, Result};
pub use llm::{ChatMessage, GeminiClient, HttpLLMClient, LLMClient, MetricsSnapshot};
pub use research::{
    DocumentResult, KeywordSet, MemorySummary, ProgressHook, QualityCheck, Recommendation,
    ResearchOutcome, ResearchWorkflow, StepStatus, Visualization, WorkflowMemory, WorkflowStep,
};
pub use services::Services;
pub use store::{
    CsvStorage, Extract, ExtractFilter, Keyword, MemStorage, NewExtract, NewSummary, Storage,
    Summary,
};

/// Default config directory name
pub const CONFIG_DIR_NAME: &str = "regscope";
