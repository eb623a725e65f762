//! Final answer composition

use super::memory::WorkflowMemory;
use crate::error::Result;
use crate::llm::{ChatMessage, LLMClient};
use std::sync::Arc;

/// Returned when the model produces no text
pub const APOLOGY: &str = "Unable to generate comprehensive answer with available information.";

pub struct AnswerSynthesizer {
    client: Arc<dyn LLMClient>,
}

impl AnswerSynthesizer {
    pub fn new(client: Arc<dyn LLMClient>) -> Self {
        Self { client }
    }

    /// Compose the answer from everything in `memory`; the reply is used verbatim
    pub async fn synthesize(&self, question: &str, memory: &WorkflowMemory) -> Result<String> {
        let messages = vec![
            ChatMessage::system("You are an expert banking compliance consultant."),
            ChatMessage::user(build_answer_prompt(question, memory)),
        ];
        let response = self.client.chat_completion(messages).await?;

        if response.trim().is_empty() {
            tracing::warn!("Answer synthesis returned no text");
            return Ok(APOLOGY.to_string());
        }
        Ok(response)
    }
}

fn build_answer_prompt(question: &str, memory: &WorkflowMemory) -> String {
    let keywords_used = memory
        .keyword_sets()
        .map(|k| k.primary.join(", "))
        .collect::<Vec<_>>()
        .join("; ");
    let quality_score = memory.latest_quality().map_or(0, |q| q.score);

    let documents = memory
        .documents()
        .iter()
        .map(|doc| {
            format!(
                "\nTitle: {}\nSource: {}\nCategory: {}\nRelevance: {}%\nContent: {}\n---",
                doc.title, doc.source, doc.category, doc.relevance_score, doc.excerpt
            )
        })
        .collect::<Vec<_>>()
        .join("\n");

    format!(
        r#"Answer this question using the research conducted:

QUESTION: "{}"

RESEARCH SUMMARY:
- Search Attempts: {}
- Documents Found: {}
- Quality Score: {}/100
- Keywords Used: {}

RELEVANT DOCUMENTS:
{}

INSTRUCTIONS:
1. Provide a comprehensive, authoritative answer
2. Use specific regulatory references from the documents
3. Include practical implementation guidance
4. Highlight key compliance requirements
5. Use clear formatting with bullet points and bold text
6. Cite relevant document sources
7. If information is incomplete, acknowledge limitations

Format your response professionally for banking compliance professionals."#,
        question,
        memory.current_attempt(),
        memory.documents().len(),
        quality_score,
        keywords_used,
        documents
    )
}
