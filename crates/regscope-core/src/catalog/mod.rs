//! Regulatory catalog: keyword baselines, content search, query planning
//! and canned summaries
//!
//! The workflow only depends on the [`KeywordProvider`] and [`ContentSearch`]
//! traits; [`RegulatoryCatalog`] is the built-in implementation backing both,
//! plus the `query_gen` and `summary` functions exposed over HTTP and MCP.

use crate::error::Result;
use crate::text::{preview, query_terms};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::HashMap;

/// Default category for keyword baselines
pub const DEFAULT_CATEGORY: &str = "banking_regulation";

/// Minimum length of a query term considered by content search
const MIN_TERM_LEN: usize = 3;

/// Source of baseline keywords for a piece of content
#[async_trait]
pub trait KeywordProvider: Send + Sync {
    async fn keywords_gen(&self, content: &str, category: Option<&str>)
        -> Result<KeywordSuggestions>;
}

/// Searchable collection of regulatory documents
#[async_trait]
pub trait ContentSearch: Send + Sync {
    async fn content_search(
        &self,
        query: &str,
        filters: Option<&Value>,
    ) -> Result<ContentSearchResults>;
}

/// Baseline keyword buckets
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct BaselineKeywords {
    #[serde(default)]
    pub primary: Vec<String>,
    #[serde(default)]
    pub secondary: Vec<String>,
    #[serde(default)]
    pub emerging: Vec<String>,
}

impl BaselineKeywords {
    pub fn len(&self) -> usize {
        self.primary.len() + self.secondary.len() + self.emerging.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct KeywordSuggestions {
    pub input_content: String,
    pub category: String,
    pub keywords: BaselineKeywords,
    pub total_keywords: usize,
    pub confidence: f64,
}

/// Catalog document as returned by content search
///
/// Optional fields are filled in by the retriever with its own defaults.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CatalogDocument {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    pub title: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub excerpt: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub summary: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub content: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub source: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub relevance_score: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub category: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub keywords: Option<Vec<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_updated: Option<String>,
}

impl CatalogDocument {
    fn matches(&self, terms: &[String]) -> bool {
        let haystack = format!(
            "{} {} {}",
            self.title,
            self.excerpt.as_deref().unwrap_or_default(),
            self.content.as_deref().unwrap_or_default()
        )
        .to_lowercase();
        terms.iter().any(|term| haystack.contains(term.as_str()))
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ContentSearchResults {
    pub query: String,
    pub total_results: usize,
    pub results: Vec<CatalogDocument>,
    pub filters_applied: Value,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QueryPlan {
    pub original_query: String,
    pub generated_queries: Vec<String>,
    pub search_strategy: String,
    pub priority_areas: Vec<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SummaryOptions {
    #[serde(default)]
    pub style: Option<String>,
    #[serde(default)]
    pub length: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SummaryBody {
    pub overview: String,
    pub key_points: Vec<String>,
    pub implications: Vec<String>,
    pub recommendations: Vec<String>,
}

impl SummaryBody {
    fn word_count(&self) -> usize {
        std::iter::once(&self.overview)
            .chain(&self.key_points)
            .chain(&self.implications)
            .chain(&self.recommendations)
            .map(|s| s.split_whitespace().count())
            .sum()
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CatalogSummary {
    pub input_sources: usize,
    pub style: String,
    pub length: String,
    pub summary: SummaryBody,
    pub word_count: usize,
}

/// Descriptor of a catalog function
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CatalogFunction {
    pub name: String,
    pub description: String,
    pub parameters: Value,
}

/// Built-in regulatory catalog
pub struct RegulatoryCatalog {
    documents: Vec<CatalogDocument>,
    baselines: HashMap<String, BaselineKeywords>,
}

impl Default for RegulatoryCatalog {
    fn default() -> Self {
        Self::new()
    }
}

impl RegulatoryCatalog {
    /// Catalog seeded with the standard supervisory documents and the
    /// banking regulation keyword baseline
    pub fn new() -> Self {
        let mut baselines = HashMap::new();
        baselines.insert(DEFAULT_CATEGORY.to_string(), banking_baseline());
        Self {
            documents: seed_documents(),
            baselines,
        }
    }

    /// Catalog over an explicit document set
    pub fn with_documents(documents: Vec<CatalogDocument>) -> Self {
        Self {
            documents,
            ..Self::new()
        }
    }

    /// Register the baseline for another category
    pub fn with_baseline(mut self, category: impl Into<String>, keywords: BaselineKeywords) -> Self {
        self.baselines.insert(category.into(), keywords);
        self
    }

    pub fn documents(&self) -> &[CatalogDocument] {
        &self.documents
    }

    /// Unknown categories fall back to the default baseline
    pub fn baseline(&self, category: &str) -> BaselineKeywords {
        self.baselines
            .get(category)
            .or_else(|| self.baselines.get(DEFAULT_CATEGORY))
            .cloned()
            .unwrap_or_default()
    }

    /// Expand a user query into search variants
    pub fn query_gen(&self, user_query: &str, context: Option<&str>) -> QueryPlan {
        let query = match context.map(str::trim).filter(|c| !c.is_empty()) {
            Some(ctx) => format!("{} {}", user_query.trim(), ctx),
            None => user_query.trim().to_string(),
        };
        let generated_queries = [
            "regulatory framework analysis",
            "compliance requirements banking",
            "regulatory updates recent changes",
        ]
        .iter()
        .map(|suffix| format!("{} {}", query, suffix))
        .collect();

        QueryPlan {
            original_query: user_query.to_string(),
            generated_queries,
            search_strategy: "comprehensive_regulatory_search".to_string(),
            priority_areas: vec![
                "compliance".to_string(),
                "regulatory".to_string(),
                "banking".to_string(),
            ],
        }
    }

    /// Summarize a set of regulatory texts
    pub fn summary(&self, contents: &[String], options: &SummaryOptions) -> CatalogSummary {
        let body = landscape_summary();
        CatalogSummary {
            input_sources: contents.len(),
            style: options.style.clone().unwrap_or_else(|| "executive".to_string()),
            length: options.length.clone().unwrap_or_else(|| "detailed".to_string()),
            word_count: body.word_count(),
            summary: body,
        }
    }

    pub fn functions(&self) -> Vec<CatalogFunction> {
        vec![
            CatalogFunction {
                name: "query_gen".to_string(),
                description: "Generate optimized search queries for regulatory compliance research"
                    .to_string(),
                parameters: serde_json::json!({
                    "userQuery": "string",
                    "context": "string (optional)"
                }),
            },
            CatalogFunction {
                name: "content_search".to_string(),
                description: "Search regulatory content across multiple databases and sources"
                    .to_string(),
                parameters: serde_json::json!({
                    "query": "string",
                    "filters": "object (optional)"
                }),
            },
            CatalogFunction {
                name: "keywords_gen".to_string(),
                description: "Generate relevant keywords and tags for regulatory content".to_string(),
                parameters: serde_json::json!({
                    "content": "string",
                    "category": "string (optional)"
                }),
            },
            CatalogFunction {
                name: "summary".to_string(),
                description: "Create comprehensive summaries of regulatory content".to_string(),
                parameters: serde_json::json!({
                    "content": "string[]",
                    "options": "object (optional)"
                }),
            },
        ]
    }
}

#[async_trait]
impl KeywordProvider for RegulatoryCatalog {
    async fn keywords_gen(
        &self,
        content: &str,
        category: Option<&str>,
    ) -> Result<KeywordSuggestions> {
        let category = category.unwrap_or(DEFAULT_CATEGORY);
        let keywords = self.baseline(category);

        Ok(KeywordSuggestions {
            input_content: preview(content, 100),
            category: category.to_string(),
            total_keywords: keywords.len(),
            keywords,
            confidence: 0.89,
        })
    }
}

#[async_trait]
impl ContentSearch for RegulatoryCatalog {
    async fn content_search(
        &self,
        query: &str,
        filters: Option<&Value>,
    ) -> Result<ContentSearchResults> {
        let terms = query_terms(query, MIN_TERM_LEN);
        let results: Vec<CatalogDocument> = self
            .documents
            .iter()
            .filter(|doc| terms.is_empty() || doc.matches(&terms))
            .cloned()
            .collect();

        tracing::debug!(
            "Catalog search '{}' matched {} of {} documents",
            query,
            results.len(),
            self.documents.len()
        );

        Ok(ContentSearchResults {
            query: query.to_string(),
            total_results: results.len(),
            results,
            filters_applied: filters.cloned().unwrap_or_else(|| Value::Object(Default::default())),
        })
    }
}

fn strings(items: &[&str]) -> Vec<String> {
    items.iter().map(|s| s.to_string()).collect()
}

fn banking_baseline() -> BaselineKeywords {
    BaselineKeywords {
        primary: strings(&[
            "basel III",
            "capital requirements",
            "regulatory compliance",
            "banking supervision",
        ]),
        secondary: strings(&[
            "risk management",
            "liquidity coverage",
            "stress testing",
            "prudential regulation",
        ]),
        emerging: strings(&[
            "digital banking",
            "fintech regulation",
            "ESG compliance",
            "cyber risk",
        ]),
    }
}

fn seed_documents() -> Vec<CatalogDocument> {
    let doc = |id: &str, title: &str, excerpt: &str, content: &str, source: &str, score: u32, updated: &str| {
        CatalogDocument {
            id: Some(id.to_string()),
            title: title.to_string(),
            excerpt: Some(excerpt.to_string()),
            content: Some(content.to_string()),
            source: Some(source.to_string()),
            relevance_score: Some(score),
            last_updated: Some(updated.to_string()),
            ..CatalogDocument::default()
        }
    };

    vec![
        doc(
            "reg_001",
            "Basel III Capital Requirements Update",
            "Banking organizations must maintain minimum capital ratios: common equity tier 1 capital ratio of 4.5%, tier 1 capital ratio of 6.0%, and total capital ratio of 8.0%.",
            "Detailed framework for capital adequacy requirements under Basel III including buffer mechanisms, conservation measures, and supervisory review processes for internationally active banks.",
            "BIS Regulatory Guidelines",
            95,
            "2024-12-15",
        ),
        doc(
            "reg_002",
            "Liquidity Coverage Ratio Implementation",
            "Banks must maintain sufficient high-quality liquid assets to survive a 30-day stressed funding scenario with LCR minimum of 100%.",
            "Comprehensive guidelines on calculating LCR including eligible HQLA categories, cash outflow calculations, and regulatory reporting requirements for liquidity risk management.",
            "Federal Reserve Bulletin",
            88,
            "2024-12-10",
        ),
        doc(
            "reg_003",
            "Stress Testing Methodologies",
            "Annual stress testing scenarios must include baseline, adverse, and severely adverse economic conditions with capital adequacy assessments.",
            "Detailed methodology for conducting bank stress tests including scenario design, capital projection models, risk-weighted asset calculations, and supervisory evaluation criteria.",
            "ECB Banking Supervision",
            82,
            "2024-12-08",
        ),
        doc(
            "reg_004",
            "Operational Risk Management Framework",
            "Standardised approach for operational risk capital requirements based on business indicator component and internal loss multiplier.",
            "Framework for identifying, assessing, monitoring and controlling operational risk including governance structures, risk appetite statements, and business continuity planning requirements.",
            "Basel Committee Guidelines",
            79,
            "2024-12-05",
        ),
    ]
}

fn landscape_summary() -> SummaryBody {
    SummaryBody {
        overview: "The regulatory landscape for banking continues to evolve with enhanced capital requirements, liquidity standards, and stress testing frameworks. Key developments include Basel III implementation, digital banking regulations, and ESG compliance mandates.".to_string(),
        key_points: strings(&[
            "Basel III capital requirements are being phased in with stricter minimum ratios",
            "Liquidity Coverage Ratio (LCR) implementation varies by jurisdiction but maintains core principles",
            "Stress testing methodologies are becoming more sophisticated and frequent",
            "Digital banking regulations are emerging to address fintech and cryptocurrency risks",
            "ESG factors are increasingly integrated into regulatory frameworks",
        ]),
        implications: strings(&[
            "Banks need to maintain higher capital buffers",
            "Enhanced liquidity management processes required",
            "Regular stress testing and scenario planning mandatory",
            "Investment in compliance technology and reporting systems",
        ]),
        recommendations: strings(&[
            "Develop comprehensive compliance monitoring systems",
            "Enhance risk management frameworks",
            "Invest in regulatory technology solutions",
            "Maintain close dialogue with regulatory authorities",
        ]),
    }
}
