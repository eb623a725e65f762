//! Request-scoped research memory

use super::keywords::KeywordSet;
use super::quality::QualityCheck;
use super::retriever::DocumentResult;
use super::retry::RetryState;
use crate::error::{RegscopeError, Result};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Assessment attempts allowed per question (one initial, one retry)
pub const MAX_ATTEMPTS: u32 = 2;

/// Everything gathered while answering one question
///
/// Built fresh by each workflow run and dropped with it.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct WorkflowMemory {
    /// Keyword sets keyed by the label they were generated for
    keywords: Vec<(String, KeywordSet)>,
    /// Documents unique by title, in first-seen order
    documents: Vec<DocumentResult>,
    #[serde(skip)]
    document_index: HashMap<String, usize>,
    quality_checks: Vec<QualityCheck>,
    current_attempt: u32,
    max_attempts: u32,
    retry_state: RetryState,
}

impl Default for WorkflowMemory {
    fn default() -> Self {
        Self::new()
    }
}

impl WorkflowMemory {
    pub fn new() -> Self {
        Self {
            keywords: Vec::new(),
            documents: Vec::new(),
            document_index: HashMap::new(),
            quality_checks: Vec::new(),
            current_attempt: 0,
            max_attempts: MAX_ATTEMPTS,
            retry_state: RetryState::FirstAttempt,
        }
    }

    /// Store a keyword set, replacing any set under the same label
    pub fn record_keywords(&mut self, label: impl Into<String>, keywords: KeywordSet) {
        let label = label.into();
        match self.keywords.iter_mut().find(|(l, _)| *l == label) {
            Some(slot) => slot.1 = keywords,
            None => self.keywords.push((label, keywords)),
        }
    }

    /// Store documents; a repeated title overwrites the stored entry in place
    pub fn record_documents(&mut self, documents: &[DocumentResult]) {
        for doc in documents {
            match self.document_index.get(&doc.title) {
                Some(&idx) => self.documents[idx] = doc.clone(),
                None => {
                    self.document_index
                        .insert(doc.title.clone(), self.documents.len());
                    self.documents.push(doc.clone());
                }
            }
        }
    }

    /// Append an assessment and count the attempt
    ///
    /// The budget error is an invariant guard; the workflow checks
    /// [`Self::has_attempts_left`] before assessing again.
    pub fn record_quality_check(&mut self, check: QualityCheck) -> Result<()> {
        if self.current_attempt >= self.max_attempts {
            return Err(RegscopeError::Workflow(format!(
                "attempt budget of {} exhausted",
                self.max_attempts
            )));
        }
        self.quality_checks.push(check);
        self.current_attempt += 1;
        Ok(())
    }

    pub fn has_attempts_left(&self) -> bool {
        self.current_attempt < self.max_attempts
    }

    pub(crate) fn set_retry_state(&mut self, state: RetryState) {
        self.retry_state = state;
    }

    pub fn retry_state(&self) -> RetryState {
        self.retry_state
    }

    pub fn keyword_sets(&self) -> impl Iterator<Item = &KeywordSet> {
        self.keywords.iter().map(|(_, set)| set)
    }

    pub fn keywords_for(&self, label: &str) -> Option<&KeywordSet> {
        self.keywords
            .iter()
            .find(|(l, _)| l == label)
            .map(|(_, set)| set)
    }

    pub fn documents(&self) -> &[DocumentResult] {
        &self.documents
    }

    pub fn quality_checks(&self) -> &[QualityCheck] {
        &self.quality_checks
    }

    pub fn latest_quality(&self) -> Option<&QualityCheck> {
        self.quality_checks.last()
    }

    pub fn current_attempt(&self) -> u32 {
        self.current_attempt
    }

    pub fn max_attempts(&self) -> u32 {
        self.max_attempts
    }

    pub fn summary(&self) -> MemorySummary {
        MemorySummary {
            keywords_count: self.keywords.len(),
            documents_count: self.documents.len(),
            quality_score: self.latest_quality().map_or(0, |q| q.score),
            attempts: self.current_attempt,
        }
    }
}

/// Counters reported alongside an answer
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MemorySummary {
    /// Number of keyword sets generated
    pub keywords_count: usize,
    pub documents_count: usize,
    pub quality_score: u8,
    pub attempts: u32,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn doc(title: &str, score: u32) -> DocumentResult {
        DocumentResult {
            title: title.into(),
            source: "src".into(),
            excerpt: String::new(),
            relevance_score: score,
            category: "c".into(),
            keywords: vec![],
        }
    }

    #[test]
    fn test_documents_replace_in_place() {
        let mut memory = WorkflowMemory::new();
        memory.record_documents(&[doc("a", 90), doc("b", 80)]);
        memory.record_documents(&[doc("c", 99), doc("a", 60)]);

        let titles: Vec<_> = memory.documents().iter().map(|d| d.title.as_str()).collect();
        assert_eq!(titles, ["a", "b", "c"]);
        assert_eq!(memory.documents()[0].relevance_score, 60);
    }

    #[test]
    fn test_attempt_budget() {
        let mut memory = WorkflowMemory::new();
        assert!(memory.has_attempts_left());
        memory.record_quality_check(QualityCheck::unparsed()).unwrap();
        memory.record_quality_check(QualityCheck::unparsed()).unwrap();
        assert!(!memory.has_attempts_left());

        let err = memory.record_quality_check(QualityCheck::unparsed()).unwrap_err();
        assert!(matches!(err, RegscopeError::Workflow(_)));
        assert_eq!(memory.current_attempt(), MAX_ATTEMPTS);
        assert_eq!(memory.quality_checks().len(), 2);
    }

    #[test]
    fn test_keywords_keyed_by_label() {
        let mut memory = WorkflowMemory::new();
        memory.record_keywords("q", KeywordSet::empty_generated());
        memory.record_keywords("q_retry", KeywordSet::alternative_fallback());
        memory.record_keywords("q", KeywordSet::alternative_fallback());

        assert_eq!(memory.keyword_sets().count(), 2);
        assert_eq!(
            memory.keywords_for("q").map(|k| k.category.as_str()),
            Some("Alternative Search")
        );
    }

    #[test]
    fn test_summary() {
        let mut memory = WorkflowMemory::new();
        assert_eq!(memory.summary().quality_score, 0);

        memory.record_keywords("q", KeywordSet::empty_generated());
        memory.record_documents(&[doc("a", 90)]);
        memory.record_quality_check(QualityCheck::unparsed()).unwrap();

        let summary = memory.summary();
        assert_eq!(
            summary,
            MemorySummary {
                keywords_count: 1,
                documents_count: 1,
                quality_score: 60,
                attempts: 1,
            }
        );
        let value = serde_json::to_value(summary).unwrap();
        assert_eq!(value["keywordsCount"], 1);
        assert_eq!(value["qualityScore"], 60);
    }
}
