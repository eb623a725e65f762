//! Keyword generation: catalog baseline merged with model suggestions

use crate::catalog::{BaselineKeywords, KeywordProvider};
use crate::error::Result;
use crate::llm::{json::decode_or_else, ChatMessage, LLMClient};
use serde::{Deserialize, Serialize};
use std::sync::Arc;

/// Category used when the model does not name one
pub const DEFAULT_KEYWORD_CATEGORY: &str = "General Compliance";

fn default_category() -> String {
    DEFAULT_KEYWORD_CATEGORY.to_string()
}

/// Search terms driving one retrieval pass
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "RawKeywordSet")]
pub struct KeywordSet {
    pub primary: Vec<String>,
    pub secondary: Vec<String>,
    pub generated: Vec<String>,
    pub category: String,
}

/// Model reply shape: any bucket may be missing or `null`
#[derive(Deserialize)]
struct RawKeywordSet {
    #[serde(default)]
    primary: Option<Vec<String>>,
    #[serde(default)]
    secondary: Option<Vec<String>>,
    #[serde(default)]
    generated: Option<Vec<String>>,
    #[serde(default)]
    category: Option<String>,
}

impl From<RawKeywordSet> for KeywordSet {
    fn from(raw: RawKeywordSet) -> Self {
        Self {
            primary: raw.primary.unwrap_or_default(),
            secondary: raw.secondary.unwrap_or_default(),
            generated: raw.generated.unwrap_or_default(),
            category: raw.category.unwrap_or_else(default_category),
        }
    }
}

impl KeywordSet {
    /// Model contribution when its reply cannot be parsed
    pub fn empty_generated() -> Self {
        Self {
            primary: Vec::new(),
            secondary: Vec::new(),
            generated: Vec::new(),
            category: default_category(),
        }
    }

    /// Broad regulatory terms used when alternative keywords cannot be parsed
    pub fn alternative_fallback() -> Self {
        let owned = |items: &[&str]| items.iter().map(|s| s.to_string()).collect();
        Self {
            primary: owned(&[
                "banking regulation",
                "compliance framework",
                "regulatory requirements",
            ]),
            secondary: owned(&[
                "financial services",
                "risk management",
                "regulatory guidance",
            ]),
            generated: owned(&["supervisory expectations", "regulatory interpretation"]),
            category: "Alternative Search".to_string(),
        }
    }

    /// Primary, then secondary, then generated terms
    pub fn terms(&self) -> impl Iterator<Item = &str> {
        self.primary
            .iter()
            .chain(&self.secondary)
            .chain(&self.generated)
            .map(String::as_str)
    }

    pub fn is_empty(&self) -> bool {
        self.terms().next().is_none()
    }

    /// Space-joined search string of the first `limit` terms
    pub fn search_query(&self, limit: usize) -> String {
        self.terms().take(limit).collect::<Vec<_>>().join(" ")
    }

    /// Baseline buckets concatenated with the model's; emerging baseline
    /// terms only inform the prompt
    pub fn merge(baseline: &BaselineKeywords, generated: KeywordSet) -> Self {
        let category = if generated.category.trim().is_empty() {
            default_category()
        } else {
            generated.category
        };
        Self {
            primary: baseline.primary.iter().cloned().chain(generated.primary).collect(),
            secondary: baseline
                .secondary
                .iter()
                .cloned()
                .chain(generated.secondary)
                .collect(),
            generated: generated.generated,
            category,
        }
    }
}

/// Turns a question into a [`KeywordSet`]
pub struct KeywordGenerator {
    provider: Arc<dyn KeywordProvider>,
    client: Arc<dyn LLMClient>,
}

impl KeywordGenerator {
    pub fn new(provider: Arc<dyn KeywordProvider>, client: Arc<dyn LLMClient>) -> Self {
        Self { provider, client }
    }

    pub async fn generate(&self, question: &str) -> Result<KeywordSet> {
        let baseline = self.provider.keywords_gen(question, None).await?;

        let messages = vec![
            ChatMessage::system(
                "You are a banking regulation research assistant. Respond ONLY with valid JSON.",
            ),
            ChatMessage::user(build_keyword_prompt(question, &baseline.keywords)),
        ];
        let response = self.client.chat_completion(messages).await?;
        let generated = decode_or_else(&response, "keyword generation", KeywordSet::empty_generated);

        let merged = KeywordSet::merge(&baseline.keywords, generated);
        tracing::info!(
            "Generated {} primary and {} secondary keywords ({})",
            merged.primary.len(),
            merged.secondary.len(),
            merged.category
        );
        Ok(merged)
    }
}

fn build_keyword_prompt(question: &str, baseline: &BaselineKeywords) -> String {
    let existing = serde_json::to_string(baseline).unwrap_or_default();
    format!(
        r#"Analyze this banking/financial regulation question and generate comprehensive keywords:

Question: "{}"

Existing relevant keywords from database: {}

Generate additional keywords in this JSON format:
{{
  "primary": ["keyword1", "keyword2", ...],
  "secondary": ["related1", "related2", ...],
  "generated": ["new1", "new2", ...],
  "category": "category_name"
}}

Focus on:
- Banking regulatory terms
- Compliance frameworks
- Legal terminology
- Industry-specific jargon
- Synonyms and variations

Generate 5-8 primary keywords, 8-12 secondary keywords, and 3-5 new generated keywords."#,
        question, existing
    )
}
