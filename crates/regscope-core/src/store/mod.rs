//! Regulatory extract storage
//!
//! Extracts, keywords and saved summaries live behind the [`Storage`] trait.
//! Two backends are provided: the seeded in-memory store and a CSV-file store.

mod csv;
mod memory;

pub use self::csv::CsvStorage;
pub use memory::MemStorage;

use crate::config::{StorageBackend, StorageConfig};
use crate::error::Result;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::sync::Arc;

/// A regulatory text extract
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Extract {
    pub id: u32,
    pub title: String,
    pub source: String,
    pub excerpt: String,
    pub category: String,
    pub jurisdiction: String,
    /// "High Priority", "Medium" or "Low"
    pub priority: String,
    pub effective_date: Option<String>,
    pub last_updated: String,
    /// 1-100
    pub relevance_score: u32,
    pub keywords: Vec<String>,
    pub full_text: String,
    pub created_by: Option<String>,
    pub updated_by: Option<String>,
    pub created_date: Option<String>,
    pub updated_date: Option<String>,
}

/// Extract fields supplied on creation
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewExtract {
    pub title: String,
    pub source: String,
    pub excerpt: String,
    pub category: String,
    pub jurisdiction: String,
    pub priority: String,
    #[serde(default)]
    pub effective_date: Option<String>,
    pub last_updated: String,
    pub relevance_score: u32,
    #[serde(default)]
    pub keywords: Vec<String>,
    pub full_text: String,
    #[serde(default)]
    pub created_by: Option<String>,
    #[serde(default)]
    pub updated_by: Option<String>,
    #[serde(default)]
    pub created_date: Option<String>,
    #[serde(default)]
    pub updated_date: Option<String>,
}

impl NewExtract {
    pub(crate) fn into_extract(self, id: u32) -> Extract {
        Extract {
            id,
            title: self.title,
            source: self.source,
            excerpt: self.excerpt,
            category: self.category,
            jurisdiction: self.jurisdiction,
            priority: self.priority,
            effective_date: self.effective_date,
            last_updated: self.last_updated,
            relevance_score: self.relevance_score,
            keywords: self.keywords,
            full_text: self.full_text,
            created_by: self.created_by,
            updated_by: self.updated_by,
            created_date: self.created_date,
            updated_date: self.updated_date,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Keyword {
    pub id: u32,
    pub term: String,
    pub category: String,
    pub usage_count: u32,
}

/// A saved research summary
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Summary {
    pub id: u32,
    pub title: String,
    pub content: String,
    pub extract_ids: Vec<u32>,
    pub keywords: Vec<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewSummary {
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub content: String,
    #[serde(default)]
    pub extract_ids: Vec<u32>,
    #[serde(default)]
    pub keywords: Vec<String>,
}

impl NewSummary {
    /// Title and content must both be non-blank
    pub fn is_valid(&self) -> bool {
        !self.title.trim().is_empty() && !self.content.trim().is_empty()
    }

    pub(crate) fn into_summary(self, id: u32, now: DateTime<Utc>) -> Summary {
        Summary {
            id,
            title: self.title,
            content: self.content,
            extract_ids: self.extract_ids,
            keywords: self.keywords,
            created_at: now,
            updated_at: now,
        }
    }
}

/// Structured extract filter; empty lists do not constrain
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExtractFilter {
    #[serde(default)]
    pub categories: Vec<String>,
    #[serde(default)]
    pub jurisdictions: Vec<String>,
    #[serde(default)]
    pub priorities: Vec<String>,
    #[serde(default)]
    pub keywords: Vec<String>,
    /// Inclusive lower bound on `effectiveDate` (YYYY-MM-DD)
    #[serde(default)]
    pub start_date: Option<String>,
    /// Inclusive upper bound on `effectiveDate` (YYYY-MM-DD)
    #[serde(default)]
    pub end_date: Option<String>,
}

impl ExtractFilter {
    pub fn matches(&self, extract: &Extract) -> bool {
        if !self.categories.is_empty() && !self.categories.contains(&extract.category) {
            return false;
        }
        if !self.jurisdictions.is_empty() && !self.jurisdictions.contains(&extract.jurisdiction) {
            return false;
        }
        if !self.priorities.is_empty() && !self.priorities.contains(&extract.priority) {
            return false;
        }
        if !self.keywords.is_empty() {
            let wanted: Vec<String> = self.keywords.iter().map(|k| k.to_lowercase()).collect();
            let hit = extract.keywords.iter().any(|k| {
                let k = k.to_lowercase();
                wanted.iter().any(|w| k.contains(w.as_str()))
            });
            if !hit {
                return false;
            }
        }
        if self.start_date.is_some() || self.end_date.is_some() {
            // Undated extracts cannot satisfy a date bound
            let Some(date) = extract.effective_date.as_deref() else {
                return false;
            };
            if self.start_date.as_deref().is_some_and(|start| date < start) {
                return false;
            }
            if self.end_date.as_deref().is_some_and(|end| date > end) {
                return false;
            }
        }
        true
    }
}

/// True when any whitespace-separated query term occurs in the extract's
/// title, excerpt, full text or keywords
pub fn extract_matches_query(extract: &Extract, query: &str) -> bool {
    let terms = crate::text::query_terms(query, 1);
    if terms.is_empty() {
        return false;
    }
    let haystack = format!(
        "{} {} {} {}",
        extract.title,
        extract.excerpt,
        extract.full_text,
        extract.keywords.join(" ")
    )
    .to_lowercase();
    terms.iter().any(|term| haystack.contains(term.as_str()))
}

pub(crate) fn keyword_matches_query(keyword: &Keyword, query: &str) -> bool {
    let needle = query.trim().to_lowercase();
    keyword.term.to_lowercase().contains(&needle) || keyword.category.to_lowercase().contains(&needle)
}

/// Storage backend for extracts, keywords and summaries
#[async_trait]
pub trait Storage: Send + Sync {
    async fn all_extracts(&self) -> Result<Vec<Extract>>;

    async fn extract_by_id(&self, id: u32) -> Result<Option<Extract>>;

    /// Full-text search over extracts
    async fn search_extracts(&self, query: &str) -> Result<Vec<Extract>>;

    async fn filter_extracts(&self, filter: &ExtractFilter) -> Result<Vec<Extract>>;

    async fn create_extract(&self, extract: NewExtract) -> Result<Extract>;

    async fn all_keywords(&self) -> Result<Vec<Keyword>>;

    async fn keywords_by_category(&self, category: &str) -> Result<Vec<Keyword>>;

    /// Keywords whose term or category contains `query`
    async fn search_keywords(&self, query: &str) -> Result<Vec<Keyword>>;

    async fn create_summary(&self, summary: NewSummary) -> Result<Summary>;

    async fn summary_by_id(&self, id: u32) -> Result<Option<Summary>>;

    /// Short backend label for status output
    fn backend_name(&self) -> &'static str;
}

/// Open the configured storage backend
pub fn open(config: &StorageConfig) -> Result<Arc<dyn Storage>> {
    let storage: Arc<dyn Storage> = match config.backend {
        StorageBackend::Memory => Arc::new(MemStorage::new()),
        StorageBackend::Csv => Arc::new(CsvStorage::open(&config.data_dir)?),
    };
    tracing::debug!("Opened {} storage", storage.backend_name());
    Ok(storage)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> Extract {
        NewExtract {
            title: "Capital Conservation Buffer".into(),
            source: "Basel III Implementation Guidelines".into(),
            excerpt: "Maintain a buffer of 2.5 percent".into(),
            category: "Capital Buffer".into(),
            jurisdiction: "Basel III".into(),
            priority: "High Priority".into(),
            effective_date: Some("2019-01-01".into()),
            last_updated: "Dec 10, 2023".into(),
            relevance_score: 92,
            keywords: vec!["capital conservation".into(), "buffer".into()],
            full_text: "Constraints on capital distributions".into(),
            ..NewExtract::default()
        }
        .into_extract(3)
    }

    #[test]
    fn test_query_matching_any_term() {
        let extract = sample();
        assert!(extract_matches_query(&extract, "conservation"));
        assert!(extract_matches_query(&extract, "liquidity DISTRIBUTIONS"));
        assert!(!extract_matches_query(&extract, "liquidity leverage"));
        assert!(!extract_matches_query(&extract, "   "));
    }

    #[test]
    fn test_filter_empty_matches_everything() {
        assert!(ExtractFilter::default().matches(&sample()));
    }

    #[test]
    fn test_filter_lists_and_keywords() {
        let extract = sample();
        let filter = ExtractFilter {
            categories: vec!["Capital Buffer".into()],
            keywords: vec!["Conservation".into()],
            ..ExtractFilter::default()
        };
        assert!(filter.matches(&extract));

        let filter = ExtractFilter {
            jurisdictions: vec!["Federal".into()],
            ..ExtractFilter::default()
        };
        assert!(!filter.matches(&extract));
    }

    #[test]
    fn test_filter_date_bounds() {
        let mut extract = sample();
        let filter = ExtractFilter {
            start_date: Some("2018-06-01".into()),
            end_date: Some("2019-01-01".into()),
            ..ExtractFilter::default()
        };
        assert!(filter.matches(&extract));

        extract.effective_date = Some("2020-10-01".into());
        assert!(!filter.matches(&extract));

        extract.effective_date = None;
        assert!(!filter.matches(&extract));
    }

    #[test]
    fn test_new_summary_validation() {
        let mut summary = NewSummary {
            title: "Capital overview".into(),
            content: "Tier 1 ratios".into(),
            ..NewSummary::default()
        };
        assert!(summary.is_valid());
        summary.content = "  ".into();
        assert!(!summary.is_valid());
    }
}
