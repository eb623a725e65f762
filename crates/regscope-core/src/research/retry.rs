//! Single-shot retry with alternative keywords

use super::keywords::KeywordSet;
use super::memory::WorkflowMemory;
use super::quality::{QualityCheck, Recommendation};
use crate::error::Result;
use crate::llm::{json::decode_or_else, ChatMessage, LLMClient};
use serde::{Deserialize, Serialize};
use std::sync::Arc;

/// Retry progress of one workflow run
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RetryState {
    FirstAttempt,
    Retried,
}

impl RetryState {
    /// `FirstAttempt -> Retried` fires only on a `retry` recommendation with
    /// attempt budget left; every other case is terminal
    pub fn transition(self, check: &QualityCheck, memory: &WorkflowMemory) -> Option<RetryState> {
        match self {
            RetryState::FirstAttempt
                if check.recommendation == Recommendation::Retry && memory.has_attempts_left() =>
            {
                Some(RetryState::Retried)
            }
            _ => None,
        }
    }
}

/// Produces the alternative keyword set for a retry
pub struct RetryController {
    client: Arc<dyn LLMClient>,
}

impl RetryController {
    pub fn new(client: Arc<dyn LLMClient>) -> Self {
        Self { client }
    }

    /// Ask for keywords that differ from `original`
    pub async fn alternative_keywords(
        &self,
        question: &str,
        original: &KeywordSet,
    ) -> Result<KeywordSet> {
        let messages = vec![
            ChatMessage::system(
                "You are a banking regulation research assistant. Respond ONLY with valid JSON.",
            ),
            ChatMessage::user(build_alternative_prompt(question, original)),
        ];
        let response = self.client.chat_completion(messages).await?;

        let alternative: KeywordSet = decode_or_else(
            &response,
            "alternative keywords",
            KeywordSet::alternative_fallback,
        );
        if alternative.is_empty() {
            tracing::warn!("alternative keywords: reply had no terms, using fallback");
            return Ok(KeywordSet::alternative_fallback());
        }

        tracing::info!(
            "Retrying with {} alternative terms ({})",
            alternative.terms().count(),
            alternative.category
        );
        Ok(alternative)
    }
}

fn build_alternative_prompt(question: &str, original: &KeywordSet) -> String {
    let original_json = serde_json::to_string(original).unwrap_or_default();
    format!(
        r#"The initial keyword search didn't yield sufficient results. Generate alternative keywords for this banking regulation question:

Question: "{}"
Original Keywords: {}

Generate alternative approaches using:
- Broader regulatory terms
- Different regulatory frameworks
- Alternative legal terminology
- Related compliance areas
- Industry synonyms

Return JSON format:
{{
  "primary": ["alternative1", "alternative2", ...],
  "secondary": ["broader1", "broader2", ...],
  "generated": ["creative1", "creative2", ...],
  "category": "category_name"
}}"#,
        question, original_json
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    fn check(recommendation: Recommendation) -> QualityCheck {
        QualityCheck {
            recommendation,
            ..QualityCheck::unparsed()
        }
    }

    #[test]
    fn test_retry_fires_once() {
        let mut memory = WorkflowMemory::new();
        memory.record_quality_check(check(Recommendation::Retry)).unwrap();

        let next = RetryState::FirstAttempt.transition(&check(Recommendation::Retry), &memory);
        assert_eq!(next, Some(RetryState::Retried));

        memory.record_quality_check(check(Recommendation::Retry)).unwrap();
        assert_eq!(
            RetryState::Retried.transition(&check(Recommendation::Retry), &memory),
            None
        );
    }

    #[test]
    fn test_terminal_recommendations() {
        let mut memory = WorkflowMemory::new();
        memory.record_quality_check(check(Recommendation::Proceed)).unwrap();

        for rec in [Recommendation::Proceed, Recommendation::Insufficient] {
            assert_eq!(RetryState::FirstAttempt.transition(&check(rec), &memory), None);
        }
    }

    #[test]
    fn test_no_retry_without_budget() {
        let mut memory = WorkflowMemory::new();
        memory.record_quality_check(check(Recommendation::Retry)).unwrap();
        memory.record_quality_check(check(Recommendation::Retry)).unwrap();

        assert_eq!(
            RetryState::FirstAttempt.transition(&check(Recommendation::Retry), &memory),
            None
        );
    }

    #[test]
    fn test_prompt_seeds_original_keywords() {
        let prompt = build_alternative_prompt("What is TLAC?", &KeywordSet::alternative_fallback());
        assert!(prompt.contains("\"category\":\"Alternative Search\""));
    }
}
