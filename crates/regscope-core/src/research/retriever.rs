//! Document retrieval across the catalog and local extracts

use super::keywords::KeywordSet;
use crate::catalog::{CatalogDocument, ContentSearch};
use crate::error::Result;
use crate::store::{Extract, Storage};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::sync::Arc;

/// Relevance assumed for catalog hits without a score
pub const DEFAULT_CATALOG_RELEVANCE: u32 = 85;
/// Relevance assumed for local extracts without a score
pub const DEFAULT_LOCAL_RELEVANCE: u32 = 75;
pub const DEFAULT_SOURCE: &str = "Regulatory Database";

/// A retrieved candidate source; identity is its title
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DocumentResult {
    pub title: String,
    pub source: String,
    pub excerpt: String,
    /// 0-100
    pub relevance_score: u32,
    pub category: String,
    pub keywords: Vec<String>,
}

impl DocumentResult {
    fn from_catalog(doc: CatalogDocument, keywords: &KeywordSet) -> Self {
        Self {
            title: doc.title,
            source: doc.source.unwrap_or_else(|| DEFAULT_SOURCE.to_string()),
            excerpt: doc.excerpt.or(doc.summary).unwrap_or_default(),
            relevance_score: doc
                .relevance_score
                .filter(|s| *s > 0)
                .unwrap_or(DEFAULT_CATALOG_RELEVANCE)
                .min(100),
            category: doc.category.unwrap_or_else(|| keywords.category.clone()),
            keywords: doc
                .keywords
                .unwrap_or_else(|| keywords.primary.iter().take(3).cloned().collect()),
        }
    }

    fn from_extract(extract: Extract) -> Self {
        Self {
            title: extract.title,
            source: extract.source,
            excerpt: extract.excerpt,
            relevance_score: match extract.relevance_score {
                0 => DEFAULT_LOCAL_RELEVANCE,
                score => score.min(100),
            },
            category: extract.category,
            keywords: extract.keywords,
        }
    }
}

/// Drop later entries whose title was already seen, order by descending
/// relevance and keep the first `max` entries
///
/// The sort is stable, so equal scores keep their first-seen order.
pub fn merge_results(documents: Vec<DocumentResult>, max: usize) -> Vec<DocumentResult> {
    let mut seen = HashSet::new();
    let mut unique: Vec<DocumentResult> = documents
        .into_iter()
        .filter(|doc| seen.insert(doc.title.clone()))
        .collect();

    unique.sort_by(|a, b| b.relevance_score.cmp(&a.relevance_score));
    unique.truncate(max);
    unique
}

/// Queries content search and local extract search with one search string
pub struct DocumentRetriever {
    content: Arc<dyn ContentSearch>,
    storage: Arc<dyn Storage>,
    keyword_limit: usize,
    max_documents: usize,
}

impl DocumentRetriever {
    pub fn new(
        content: Arc<dyn ContentSearch>,
        storage: Arc<dyn Storage>,
        keyword_limit: usize,
        max_documents: usize,
    ) -> Self {
        Self {
            content,
            storage,
            keyword_limit,
            max_documents,
        }
    }

    pub async fn retrieve(&self, keywords: &KeywordSet) -> Result<Vec<DocumentResult>> {
        let query = keywords.search_query(self.keyword_limit);
        tracing::debug!("Retrieving documents for '{}'", query);

        let catalog = self.content.content_search(&query, None).await?;
        let local = self.storage.search_extracts(&query).await?;
        let (catalog_hits, local_hits) = (catalog.results.len(), local.len());

        let documents = catalog
            .results
            .into_iter()
            .map(|doc| DocumentResult::from_catalog(doc, keywords))
            .chain(local.into_iter().map(DocumentResult::from_extract))
            .collect();

        let merged = merge_results(documents, self.max_documents);
        tracing::info!(
            "Retrieved {} documents ({} catalog, {} local)",
            merged.len(),
            catalog_hits,
            local_hits
        );
        Ok(merged)
    }
}
