//! In-memory storage seeded with sample regulatory extracts

use super::{
    extract_matches_query, keyword_matches_query, Extract, ExtractFilter, Keyword, NewExtract,
    NewSummary, Storage, Summary,
};
use crate::error::Result;
use async_trait::async_trait;
use std::collections::BTreeMap;
use std::sync::RwLock;

#[derive(Default)]
struct Tables {
    extracts: BTreeMap<u32, Extract>,
    keywords: BTreeMap<u32, Keyword>,
    summaries: BTreeMap<u32, Summary>,
}

impl Tables {
    fn next_id<T>(map: &BTreeMap<u32, T>) -> u32 {
        map.keys().next_back().map_or(1, |id| id + 1)
    }
}

/// Process-local storage; contents are lost on restart
pub struct MemStorage {
    tables: RwLock<Tables>,
}

impl Default for MemStorage {
    fn default() -> Self {
        Self::new()
    }
}

impl MemStorage {
    /// Storage seeded with six extracts and twelve keywords
    pub fn new() -> Self {
        let storage = Self::empty();
        {
            let mut tables = storage.write();
            for extract in seed_extracts() {
                let id = Tables::next_id(&tables.extracts);
                tables.extracts.insert(id, extract.into_extract(id));
            }
            for (term, category) in SEED_KEYWORDS {
                let id = Tables::next_id(&tables.keywords);
                tables.keywords.insert(
                    id,
                    Keyword {
                        id,
                        term: term.to_string(),
                        category: category.to_string(),
                        usage_count: 0,
                    },
                );
            }
        }
        storage
    }

    pub fn empty() -> Self {
        Self {
            tables: RwLock::new(Tables::default()),
        }
    }

    // A poisoned lock only means a writer panicked mid-insert; the maps are
    // still structurally valid
    fn read(&self) -> std::sync::RwLockReadGuard<'_, Tables> {
        self.tables.read().unwrap_or_else(|e| e.into_inner())
    }

    fn write(&self) -> std::sync::RwLockWriteGuard<'_, Tables> {
        self.tables.write().unwrap_or_else(|e| e.into_inner())
    }
}

#[async_trait]
impl Storage for MemStorage {
    async fn all_extracts(&self) -> Result<Vec<Extract>> {
        Ok(self.read().extracts.values().cloned().collect())
    }

    async fn extract_by_id(&self, id: u32) -> Result<Option<Extract>> {
        Ok(self.read().extracts.get(&id).cloned())
    }

    async fn search_extracts(&self, query: &str) -> Result<Vec<Extract>> {
        Ok(self
            .read()
            .extracts
            .values()
            .filter(|e| extract_matches_query(e, query))
            .cloned()
            .collect())
    }

    async fn filter_extracts(&self, filter: &ExtractFilter) -> Result<Vec<Extract>> {
        Ok(self
            .read()
            .extracts
            .values()
            .filter(|e| filter.matches(e))
            .cloned()
            .collect())
    }

    async fn create_extract(&self, extract: NewExtract) -> Result<Extract> {
        let mut tables = self.write();
        let id = Tables::next_id(&tables.extracts);
        let extract = extract.into_extract(id);
        tables.extracts.insert(id, extract.clone());
        Ok(extract)
    }

    async fn all_keywords(&self) -> Result<Vec<Keyword>> {
        Ok(self.read().keywords.values().cloned().collect())
    }

    async fn keywords_by_category(&self, category: &str) -> Result<Vec<Keyword>> {
        Ok(self
            .read()
            .keywords
            .values()
            .filter(|k| k.category == category)
            .cloned()
            .collect())
    }

    async fn search_keywords(&self, query: &str) -> Result<Vec<Keyword>> {
        Ok(self
            .read()
            .keywords
            .values()
            .filter(|k| keyword_matches_query(k, query))
            .cloned()
            .collect())
    }

    async fn create_summary(&self, summary: NewSummary) -> Result<Summary> {
        let mut tables = self.write();
        let id = Tables::next_id(&tables.summaries);
        let summary = summary.into_summary(id, chrono::Utc::now());
        tables.summaries.insert(id, summary.clone());
        Ok(summary)
    }

    async fn summary_by_id(&self, id: u32) -> Result<Option<Summary>> {
        Ok(self.read().summaries.get(&id).cloned())
    }

    fn backend_name(&self) -> &'static str {
        "memory"
    }
}

const SEED_KEYWORDS: [(&str, &str); 12] = [
    ("capital requirements", "Capital"),
    ("basel iii", "Regulation"),
    ("leverage ratio", "Ratios"),
    ("stress testing", "Testing"),
    ("risk management", "Risk"),
    ("consumer protection", "Consumer"),
    ("data privacy", "Privacy"),
    ("aml compliance", "AML"),
    ("tier 1", "Capital"),
    ("buffer", "Capital"),
    ("tlac", "Capital"),
    ("g-sib", "Regulation"),
];

#[allow(clippy::too_many_arguments)]
fn seed(
    title: &str,
    source: &str,
    excerpt: &str,
    category: &str,
    jurisdiction: &str,
    priority: &str,
    effective_date: &str,
    last_updated: &str,
    relevance_score: u32,
    keywords: [&str; 4],
    full_text: &str,
    people: (&str, &str),
) -> NewExtract {
    NewExtract {
        title: title.to_string(),
        source: source.to_string(),
        excerpt: excerpt.to_string(),
        category: category.to_string(),
        jurisdiction: jurisdiction.to_string(),
        priority: priority.to_string(),
        effective_date: Some(effective_date.to_string()),
        last_updated: last_updated.to_string(),
        relevance_score,
        keywords: keywords.iter().map(|k| k.to_string()).collect(),
        full_text: full_text.to_string(),
        created_by: Some(people.0.to_string()),
        updated_by: Some(people.1.to_string()),
        created_date: Some(effective_date.to_string()),
        updated_date: Some(last_updated.to_string()),
    }
}

fn seed_extracts() -> Vec<NewExtract> {
    vec![
        seed(
            "Basel III: Minimum Capital Requirements",
            "Federal Register, 12 CFR Part 3",
            "A banking organization must maintain minimum capital ratios as specified in this section. The minimum common equity tier 1 capital ratio is 4.5 percent. The minimum tier 1 capital ratio is 6.0 percent...",
            "Capital Adequacy",
            "Federal",
            "High Priority",
            "2019-01-01",
            "Dec 15, 2023",
            95,
            ["capital requirements", "basel iii", "tier 1", "common equity"],
            "A banking organization must maintain minimum capital ratios as specified in this section. The minimum common equity tier 1 capital ratio is 4.5 percent. The minimum tier 1 capital ratio is 6.0 percent. The minimum total capital ratio is 8.0 percent. These ratios must be calculated in accordance with the definitions and methods set forth in this part.",
            ("Sarah Martinez", "Michael Chen"),
        ),
        seed(
            "Tier 1 Leverage Ratio Requirements",
            "12 CFR Part 217, Section 217.10",
            "A banking organization must maintain a minimum tier 1 leverage ratio of 4.0 percent. Advanced approaches banking organizations must maintain a minimum supplementary leverage ratio...",
            "Leverage Ratio",
            "Federal",
            "Medium",
            "2018-01-01",
            "Nov 28, 2023",
            87,
            ["leverage ratio", "tier 1", "supplementary", "advanced approaches"],
            "A banking organization must maintain a minimum tier 1 leverage ratio of 4.0 percent. Advanced approaches banking organizations must maintain a minimum supplementary leverage ratio of 3.0 percent, calculated as the ratio of tier 1 capital to total leverage exposure.",
            ("David Kim", "Jennifer Wilson"),
        ),
        seed(
            "Capital Conservation Buffer",
            "Basel III Implementation Guidelines",
            "Banking organizations must maintain a capital conservation buffer of 2.5 percent of common equity tier 1 capital above the minimum capital ratios. Failure to maintain the buffer results in constraints...",
            "Capital Buffer",
            "Basel III",
            "High Priority",
            "2019-01-01",
            "Dec 10, 2023",
            92,
            ["capital conservation", "buffer", "constraints", "distributions"],
            "Banking organizations must maintain a capital conservation buffer of 2.5 percent of common equity tier 1 capital above the minimum capital ratios. Failure to maintain the buffer results in automatic constraints on capital distributions and discretionary bonus payments.",
            ("Amanda Rodriguez", "Robert Thompson"),
        ),
        seed(
            "TLAC Holdings Requirements",
            "12 CFR Part 252, Subpart P",
            "A global systemically important bank holding company must comply with total loss-absorbing capacity requirements. The minimum external TLAC amount must equal...",
            "TLAC",
            "G-SIB",
            "Low",
            "2022-01-01",
            "Oct 15, 2023",
            78,
            ["tlac", "loss absorbing", "g-sib", "systemically important"],
            "A global systemically important bank holding company must comply with total loss-absorbing capacity requirements. The minimum external TLAC amount must equal the greater of 18 percent of the company's risk-weighted assets or 6.75 percent of the company's total leverage exposure.",
            ("Lisa Zhang", "Carlos Mendez"),
        ),
        seed(
            "Countercyclical Capital Buffer",
            "Federal Register Notice 2023-15847",
            "The countercyclical capital buffer is set at 0% for exposures to private sector credit in the United States for the four-quarter period beginning January 1, 2024...",
            "Countercyclical Buffer",
            "Federal",
            "Medium",
            "2024-01-01",
            "Dec 20, 2023",
            85,
            ["countercyclical", "buffer", "private sector", "credit exposures"],
            "The countercyclical capital buffer is set at 0% for exposures to private sector credit in the United States for the four-quarter period beginning January 1, 2024. This buffer may be increased if systemic risks warrant additional capital protection.",
            ("Thomas Anderson", "Rachel Green"),
        ),
        seed(
            "Stress Testing Capital Planning",
            "12 CFR Part 252, Subpart F",
            "A bank holding company with total consolidated assets of $100 billion or more must develop and maintain a capital plan that assesses the company's capital adequacy under baseline and stressed scenarios...",
            "Stress Testing",
            "Federal",
            "High Priority",
            "2020-10-01",
            "Nov 30, 2023",
            90,
            ["stress testing", "capital planning", "scenarios", "adequacy"],
            "A bank holding company with total consolidated assets of $100 billion or more must develop and maintain a capital plan that assesses the company's capital adequacy under baseline and stressed scenarios. The capital plan must include detailed projections of revenues, losses, reserves, and capital levels.",
            ("Emily Johnson", "Kevin Park"),
        ),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_seeded_contents() {
        let storage = MemStorage::new();
        let extracts = storage.all_extracts().await.unwrap();
        assert_eq!(extracts.len(), 6);
        assert_eq!(extracts[0].id, 1);
        assert_eq!(extracts[0].title, "Basel III: Minimum Capital Requirements");
        assert_eq!(storage.all_keywords().await.unwrap().len(), 12);
    }

    #[tokio::test]
    async fn test_search_and_filter() {
        let storage = MemStorage::new();

        let hits = storage.search_extracts("TLAC").await.unwrap();
        assert_eq!(hits.len(), 1);
        assert_eq!(hits[0].category, "TLAC");

        let high = storage
            .filter_extracts(&ExtractFilter {
                priorities: vec!["High Priority".into()],
                ..ExtractFilter::default()
            })
            .await
            .unwrap();
        assert_eq!(high.len(), 3);
    }

    #[tokio::test]
    async fn test_keywords_by_category_and_search() {
        let storage = MemStorage::new();
        let capital = storage.keywords_by_category("Capital").await.unwrap();
        assert_eq!(capital.len(), 4);

        let privacy = storage.search_keywords("priv").await.unwrap();
        assert_eq!(privacy.len(), 1);
        assert_eq!(privacy[0].term, "data privacy");
    }

    #[tokio::test]
    async fn test_create_assigns_next_id() {
        let storage = MemStorage::new();
        let created = storage
            .create_extract(NewExtract {
                title: "Net Stable Funding Ratio".into(),
                relevance_score: 70,
                ..NewExtract::default()
            })
            .await
            .unwrap();
        assert_eq!(created.id, 7);
        assert_eq!(storage.extract_by_id(7).await.unwrap(), Some(created));
        assert_eq!(storage.extract_by_id(99).await.unwrap(), None);
    }

    #[tokio::test]
    async fn test_summary_roundtrip() {
        let storage = MemStorage::empty();
        let summary = storage
            .create_summary(NewSummary {
                title: "Capital stack".into(),
                content: "CET1, AT1 and Tier 2".into(),
                extract_ids: vec![1, 3],
                keywords: vec!["tier 1".into()],
            })
            .await
            .unwrap();
        assert_eq!(summary.id, 1);
        assert_eq!(summary.created_at, summary.updated_at);
        assert_eq!(storage.summary_by_id(1).await.unwrap(), Some(summary));
    }
}
