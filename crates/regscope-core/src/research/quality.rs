//! Quality assessment of a retrieved document set

use super::keywords::KeywordSet;
use super::retriever::DocumentResult;
use crate::config::RecommendationPolicy;
use crate::error::Result;
use crate::llm::{json::decode_logged, ChatMessage, LLMClient};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fmt;
use std::sync::Arc;

/// Score assumed for a dimension the model left out
const MISSING_SCORE: u8 = 50;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum Recommendation {
    #[default]
    Proceed,
    Retry,
    Insufficient,
}

impl Recommendation {
    /// Unknown labels are treated as `Proceed`
    pub fn from_label(label: &str) -> Self {
        match label.trim().to_lowercase().as_str() {
            "retry" => Self::Retry,
            "insufficient" => Self::Insufficient,
            _ => Self::Proceed,
        }
    }

    /// Threshold rule the prompt asks the model to follow
    pub fn from_score(score: u8) -> Self {
        match score {
            0..=39 => Self::Insufficient,
            40..=69 => Self::Retry,
            _ => Self::Proceed,
        }
    }
}

impl fmt::Display for Recommendation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            Self::Proceed => "proceed",
            Self::Retry => "retry",
            Self::Insufficient => "insufficient",
        };
        f.write_str(label)
    }
}

/// One scored assessment; scores are 0-100
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "RawQualityCheck")]
pub struct QualityCheck {
    pub score: u8,
    pub coverage: u8,
    pub relevance: u8,
    pub completeness: u8,
    pub recommendation: Recommendation,
    pub issues: Vec<String>,
}

impl QualityCheck {
    /// Assessment used when the model's reply cannot be parsed
    pub fn unparsed() -> Self {
        Self {
            score: 60,
            coverage: 60,
            relevance: 60,
            completeness: 60,
            recommendation: Recommendation::Proceed,
            issues: vec!["Unable to parse quality assessment".to_string()],
        }
    }
}

/// Model reply shape: numbers may arrive as floats or strings
#[derive(Deserialize)]
struct RawQualityCheck {
    #[serde(default)]
    score: Option<Value>,
    #[serde(default)]
    coverage: Option<Value>,
    #[serde(default)]
    relevance: Option<Value>,
    #[serde(default)]
    completeness: Option<Value>,
    #[serde(default)]
    recommendation: Option<String>,
    #[serde(default)]
    issues: Option<Vec<String>>,
}

fn to_score(value: Option<Value>) -> u8 {
    let number = match value {
        Some(Value::Number(n)) => n.as_f64(),
        Some(Value::String(s)) => s.trim().trim_end_matches('%').parse::<f64>().ok(),
        _ => None,
    };
    number
        .filter(|n| n.is_finite())
        .map(|n| n.round().clamp(0.0, 100.0) as u8)
        .unwrap_or(MISSING_SCORE)
}

impl From<RawQualityCheck> for QualityCheck {
    fn from(raw: RawQualityCheck) -> Self {
        Self {
            score: to_score(raw.score),
            coverage: to_score(raw.coverage),
            relevance: to_score(raw.relevance),
            completeness: to_score(raw.completeness),
            recommendation: raw
                .recommendation
                .as_deref()
                .map(Recommendation::from_label)
                .unwrap_or_default(),
            issues: raw.issues.unwrap_or_default(),
        }
    }
}

/// Scores documents against the question with one completion call
pub struct QualityAssessor {
    client: Arc<dyn LLMClient>,
    policy: RecommendationPolicy,
}

impl QualityAssessor {
    pub fn new(client: Arc<dyn LLMClient>, policy: RecommendationPolicy) -> Self {
        Self { client, policy }
    }

    pub async fn assess(
        &self,
        question: &str,
        keywords: &KeywordSet,
        documents: &[DocumentResult],
    ) -> Result<QualityCheck> {
        let messages = vec![
            ChatMessage::system(
                "You are a banking compliance research reviewer. Respond ONLY with valid JSON.",
            ),
            ChatMessage::user(build_quality_prompt(question, keywords, documents)),
        ];
        let response = self.client.chat_completion(messages).await?;
        let check = match decode_logged(&response, "quality assessment") {
            Some(check) => self.apply_policy(check),
            None => QualityCheck::unparsed(),
        };

        tracing::info!(
            "Quality score {}/100 over {} documents, recommendation {}",
            check.score,
            documents.len(),
            check.recommendation
        );
        Ok(check)
    }
}

impl QualityAssessor {
    /// Re-derive the recommendation from the score under the score policy;
    /// only applied to decoded replies
    fn apply_policy(&self, mut check: QualityCheck) -> QualityCheck {
        if self.policy == RecommendationPolicy::Score {
            let derived = Recommendation::from_score(check.score);
            if derived != check.recommendation {
                tracing::debug!(
                    "Overriding model recommendation {} with {} (score {})",
                    check.recommendation,
                    derived,
                    check.score
                );
            }
            check.recommendation = derived;
        }
        check
    }
}

fn build_quality_prompt(question: &str, keywords: &KeywordSet, documents: &[DocumentResult]) -> String {
    let keywords_json = serde_json::to_string(keywords).unwrap_or_default();
    let listing = documents
        .iter()
        .map(|d| {
            format!(
                "- {} (Score: {}, Category: {})",
                d.title, d.relevance_score, d.category
            )
        })
        .collect::<Vec<_>>()
        .join("\n");

    format!(
        r#"Assess the quality of this document collection for answering a banking compliance question:

Question: "{}"
Keywords Used: {}
Documents Found: {}

Document Titles and Relevance Scores:
{}

Evaluate and return JSON:
{{
  "score": 0-100,
  "coverage": 0-100,
  "relevance": 0-100,
  "completeness": 0-100,
  "recommendation": "proceed|retry|insufficient",
  "issues": ["issue1", "issue2"]
}}

Scoring criteria:
- Coverage: How well do documents cover the question topic?
- Relevance: How relevant are documents to the specific question?
- Completeness: Can the question be fully answered with these documents?
- Overall score: Average of the above

Recommend "retry" if score < 70, "proceed" if >= 70, "insufficient" if < 40."#,
        question,
        keywords_json,
        documents.len(),
        listing
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::llm::json::{decode_json, decode_or_else};
    use async_trait::async_trait;

    struct FixedReply(&'static str);

    #[async_trait]
    impl LLMClient for FixedReply {
        async fn chat_completion(&self, _messages: Vec<ChatMessage>) -> Result<String> {
            Ok(self.0.to_string())
        }

        fn model_name(&self) -> &str {
            "fixed"
        }
    }

    async fn assess_with(reply: &'static str, policy: RecommendationPolicy) -> QualityCheck {
        QualityAssessor::new(Arc::new(FixedReply(reply)), policy)
            .assess("What is TLAC?", &KeywordSet::empty_generated(), &[])
            .await
            .unwrap()
    }

    #[test]
    fn test_full_reply() {
        let check: QualityCheck = decode_json(
            r#"{"score": 82, "coverage": 80, "relevance": 90, "completeness": 76,
                "recommendation": "proceed", "issues": []}"#,
        )
        .unwrap();
        assert_eq!(check.score, 82);
        assert_eq!(check.relevance, 90);
        assert_eq!(check.recommendation, Recommendation::Proceed);
    }

    #[test]
    fn test_missing_fields_default() {
        let check: QualityCheck = decode_json(r#"{"score": 65.6, "recommendation": "RETRY"}"#).unwrap();
        assert_eq!(check.score, 66);
        assert_eq!(check.coverage, MISSING_SCORE);
        assert_eq!(check.recommendation, Recommendation::Retry);
        assert!(check.issues.is_empty());
    }

    #[test]
    fn test_lenient_numbers() {
        let check: QualityCheck =
            decode_json(r#"{"score": "45%", "coverage": 140, "relevance": -3}"#).unwrap();
        assert_eq!(check.score, 45);
        assert_eq!(check.coverage, 100);
        assert_eq!(check.relevance, 0);
        assert_eq!(check.recommendation, Recommendation::Proceed);
    }

    #[test]
    fn test_unknown_label_proceeds() {
        assert_eq!(Recommendation::from_label("maybe"), Recommendation::Proceed);
        assert_eq!(Recommendation::from_label(" Insufficient "), Recommendation::Insufficient);
    }

    #[test]
    fn test_from_score_thresholds() {
        assert_eq!(Recommendation::from_score(39), Recommendation::Insufficient);
        assert_eq!(Recommendation::from_score(40), Recommendation::Retry);
        assert_eq!(Recommendation::from_score(69), Recommendation::Retry);
        assert_eq!(Recommendation::from_score(70), Recommendation::Proceed);
    }

    #[test]
    fn test_unparsed_fallback() {
        let check = decode_or_else("no idea", "test", QualityCheck::unparsed);
        assert_eq!(check.score, 60);
        assert_eq!(check.recommendation, Recommendation::Proceed);
        assert_eq!(check.issues, vec!["Unable to parse quality assessment"]);
    }

    #[test]
    fn test_null_issues_keep_model_verdict() {
        let reply = r#"{"score": 85, "coverage": 80, "relevance": 90, "completeness": 85,
                        "recommendation": "retry", "issues": null}"#;
        let check = decode_or_else(reply, "test", QualityCheck::unparsed);
        assert_eq!(check.score, 85);
        assert_eq!(check.recommendation, Recommendation::Retry);
        assert!(check.issues.is_empty());
    }

    #[tokio::test]
    async fn test_model_policy_keeps_label() {
        let check = assess_with(
            r#"{"score": 55, "recommendation": "proceed"}"#,
            RecommendationPolicy::Model,
        )
        .await;
        assert_eq!(check.score, 55);
        assert_eq!(check.recommendation, Recommendation::Proceed);
    }

    #[tokio::test]
    async fn test_score_policy_overrides_label() {
        let check = assess_with(
            r#"{"score": 55, "recommendation": "proceed"}"#,
            RecommendationPolicy::Score,
        )
        .await;
        assert_eq!(check.recommendation, Recommendation::Retry);

        let check = assess_with(
            r#"{"score": 30, "recommendation": "proceed"}"#,
            RecommendationPolicy::Score,
        )
        .await;
        assert_eq!(check.recommendation, Recommendation::Insufficient);
    }

    #[tokio::test]
    async fn test_score_policy_leaves_unparsed_fallback_alone() {
        let check = assess_with("I cannot rate these documents.", RecommendationPolicy::Score).await;
        assert_eq!(check, QualityCheck::unparsed());
        assert_eq!(check.recommendation, Recommendation::Proceed);
    }

    #[test]
    fn test_serialized_shape_round_trips() {
        let value = serde_json::to_value(QualityCheck::unparsed()).unwrap();
        assert_eq!(value["recommendation"], "proceed");
        let back: QualityCheck = serde_json::from_value(value).unwrap();
        assert_eq!(back, QualityCheck::unparsed());
    }

    #[test]
    fn test_prompt_lists_documents() {
        let keywords = KeywordSet::empty_generated();
        let docs = vec![DocumentResult {
            title: "TLAC Holdings Requirements".into(),
            source: "12 CFR Part 252".into(),
            excerpt: String::new(),
            relevance_score: 78,
            category: "TLAC".into(),
            keywords: vec![],
        }];
        let prompt = build_quality_prompt("What is TLAC?", &keywords, &docs);
        assert!(prompt.contains("Documents Found: 1"));
        assert!(prompt.contains("- TLAC Holdings Requirements (Score: 78, Category: TLAC)"));
    }
}
