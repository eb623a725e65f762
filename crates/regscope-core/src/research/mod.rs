//! Multi-step research workflow
//!
//! Answers a compliance question in four reported steps:
//!
//! 1. Keyword Generation: catalog baseline merged with model suggestions
//! 2. Document Retrieval: catalog search plus local extract search, deduplicated
//! 3. Quality Assessment: model-scored coverage, with at most one retry using
//!    alternative keywords
//! 4. Answer Generation: model-written answer over the accumulated research
//!
//! Every call is awaited in sequence. State lives in a [`WorkflowMemory`]
//! created for the request and returned with the answer.

mod keywords;
mod memory;
mod quality;
mod retriever;
mod retry;
mod synthesizer;

pub use keywords::{KeywordGenerator, KeywordSet, DEFAULT_KEYWORD_CATEGORY};
pub use memory::{MemorySummary, WorkflowMemory, MAX_ATTEMPTS};
pub use quality::{QualityAssessor, QualityCheck, Recommendation};
pub use retriever::{merge_results, DocumentResult, DocumentRetriever};
pub use retry::{RetryController, RetryState};
pub use synthesizer::{AnswerSynthesizer, APOLOGY};

use crate::catalog::{ContentSearch, KeywordProvider};
use crate::config::ResearchConfig;
use crate::error::{RegscopeError, Result};
use crate::llm::LLMClient;
use crate::store::Storage;
use crate::text::preview;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::sync::Arc;

/// Synchronous observer invoked with the step list whenever it changes
pub type ProgressHook<'a> = &'a (dyn Fn(&[WorkflowStep]) + Send + Sync);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StepStatus {
    Pending,
    Processing,
    Completed,
    Failed,
}

impl std::fmt::Display for StepStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let label = match self {
            Self::Pending => "pending",
            Self::Processing => "processing",
            Self::Completed => "completed",
            Self::Failed => "failed",
        };
        f.write_str(label)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WorkflowStep {
    pub step: u8,
    pub name: String,
    pub status: StepStatus,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub result: Option<Value>,
    pub message: String,
}

impl WorkflowStep {
    fn pending(step: u8, name: &str, message: &str) -> Self {
        Self {
            step,
            name: name.to_string(),
            status: StepStatus::Pending,
            result: None,
            message: message.to_string(),
        }
    }
}

const KEYWORDS: usize = 0;
const RETRIEVAL: usize = 1;
const QUALITY: usize = 2;
const ANSWER: usize = 3;

fn initial_steps() -> Vec<WorkflowStep> {
    vec![
        WorkflowStep::pending(
            1,
            "Keyword Generation",
            "Preparing to analyze question and generate keywords...",
        ),
        WorkflowStep::pending(
            2,
            "Document Retrieval",
            "Ready to search for relevant documents...",
        ),
        WorkflowStep::pending(
            3,
            "Quality Assessment",
            "Waiting to evaluate document quality...",
        ),
        WorkflowStep::pending(
            4,
            "Answer Generation",
            "Ready to compile comprehensive answer...",
        ),
    ]
}

/// Document entry shown in the documents visualization
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DocumentPreview {
    pub title: String,
    pub source: String,
    pub category: String,
    pub relevance_score: u32,
    pub excerpt: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DocumentsView {
    pub total_found: usize,
    pub documents: Vec<DocumentPreview>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QualityView {
    pub score: u8,
    pub coverage: u8,
    pub relevance: u8,
    pub completeness: u8,
    pub attempts: u32,
    pub recommendation: Recommendation,
}

/// Chart-ready summaries of the workflow's intermediate results
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum Visualization {
    Keywords { title: String, data: KeywordSet },
    Documents { title: String, data: DocumentsView },
    Quality { title: String, data: QualityView },
}

impl Visualization {
    fn keywords(keywords: &KeywordSet) -> Self {
        Self::Keywords {
            title: "Generated Keywords".to_string(),
            data: keywords.clone(),
        }
    }

    fn documents(documents: &[DocumentResult]) -> Self {
        Self::Documents {
            title: "Retrieved Documents".to_string(),
            data: DocumentsView {
                total_found: documents.len(),
                documents: documents
                    .iter()
                    .map(|d| DocumentPreview {
                        title: d.title.clone(),
                        source: d.source.clone(),
                        category: d.category.clone(),
                        relevance_score: d.relevance_score,
                        excerpt: preview(&d.excerpt, 150),
                    })
                    .collect(),
            },
        }
    }

    fn quality(check: &QualityCheck, attempts: u32) -> Self {
        Self::Quality {
            title: "Quality Assessment".to_string(),
            data: QualityView {
                score: check.score,
                coverage: check.coverage,
                relevance: check.relevance,
                completeness: check.completeness,
                attempts,
                recommendation: check.recommendation,
            },
        }
    }
}

/// Result of a completed workflow run
#[derive(Debug, Clone, Serialize)]
pub struct ResearchOutcome {
    pub answer: String,
    pub steps: Vec<WorkflowStep>,
    pub visualizations: Vec<Visualization>,
    pub memory: WorkflowMemory,
}

/// Per-request run context: step list, visualizations and memory
struct WorkflowRun<'a> {
    steps: Vec<WorkflowStep>,
    visualizations: Vec<Visualization>,
    memory: WorkflowMemory,
    progress: Option<ProgressHook<'a>>,
}

impl<'a> WorkflowRun<'a> {
    fn new(progress: Option<ProgressHook<'a>>) -> Self {
        Self {
            steps: initial_steps(),
            visualizations: Vec::new(),
            memory: WorkflowMemory::new(),
            progress,
        }
    }

    fn report(&self) {
        if let Some(progress) = self.progress {
            progress(&self.steps);
        }
    }

    fn start(&mut self, idx: usize, message: &str) {
        self.steps[idx].status = StepStatus::Processing;
        self.steps[idx].message = message.to_string();
        self.report();
    }

    fn note(&mut self, idx: usize, message: &str) {
        self.steps[idx].message = message.to_string();
        self.report();
    }

    fn complete<T: Serialize>(&mut self, idx: usize, result: &T, message: String) {
        let step = &mut self.steps[idx];
        step.status = StepStatus::Completed;
        step.result = serde_json::to_value(result).ok();
        step.message = message;
        tracing::info!("Step {} ({}): {}", step.step, step.name, step.message);
    }

    /// Mark the in-flight step failed and notify the observer
    fn fail(&mut self, error: &RegscopeError) {
        if let Some(step) = self
            .steps
            .iter_mut()
            .find(|s| s.status == StepStatus::Processing)
        {
            step.status = StepStatus::Failed;
            step.message = format!("Error: {}", error);
            tracing::error!("Step {} ({}) failed: {}", step.step, step.name, error);
        }
        self.report();
    }
}

/// The research pipeline; shared across requests, holds no per-request state
pub struct ResearchWorkflow {
    keywords: KeywordGenerator,
    retriever: DocumentRetriever,
    assessor: QualityAssessor,
    retry: RetryController,
    synthesizer: AnswerSynthesizer,
}

impl ResearchWorkflow {
    pub fn new(
        client: Arc<dyn LLMClient>,
        keyword_provider: Arc<dyn KeywordProvider>,
        content_search: Arc<dyn ContentSearch>,
        storage: Arc<dyn Storage>,
        config: &ResearchConfig,
    ) -> Self {
        Self {
            keywords: KeywordGenerator::new(keyword_provider, client.clone()),
            retriever: DocumentRetriever::new(
                content_search,
                storage,
                config.search_keyword_limit,
                config.max_documents,
            ),
            assessor: QualityAssessor::new(client.clone(), config.recommendation_policy),
            retry: RetryController::new(client.clone()),
            synthesizer: AnswerSynthesizer::new(client),
        }
    }

    /// Run the full workflow for one question
    ///
    /// Blank questions are rejected before any external call. A failing
    /// collaborator aborts the run; the step in flight is reported as failed
    /// through `progress` before the error is returned.
    pub async fn process_question(
        &self,
        question: &str,
        progress: Option<ProgressHook<'_>>,
    ) -> Result<ResearchOutcome> {
        let question = question.trim();
        if question.is_empty() {
            return Err(RegscopeError::InvalidInput(
                "question must not be blank".to_string(),
            ));
        }

        let mut run = WorkflowRun::new(progress);
        match self.execute(question, &mut run).await {
            Ok(answer) => Ok(ResearchOutcome {
                answer,
                steps: run.steps,
                visualizations: run.visualizations,
                memory: run.memory,
            }),
            Err(e) => {
                run.fail(&e);
                Err(e)
            }
        }
    }

    async fn execute(&self, question: &str, run: &mut WorkflowRun<'_>) -> Result<String> {
        run.start(KEYWORDS, "Analyzing question and generating targeted keywords...");
        let keywords = self.keywords.generate(question).await?;
        run.complete(
            KEYWORDS,
            &keywords,
            format!(
                "Generated {} primary keywords and {} secondary keywords",
                keywords.primary.len(),
                keywords.secondary.len()
            ),
        );
        run.memory.record_keywords(question, keywords.clone());
        run.visualizations.push(Visualization::keywords(&keywords));
        run.report();

        run.start(RETRIEVAL, "Searching for relevant regulatory documents...");
        let documents = self.retriever.retrieve(&keywords).await?;
        run.complete(
            RETRIEVAL,
            &documents,
            format!("Found {} relevant documents", documents.len()),
        );
        run.memory.record_documents(&documents);
        run.visualizations.push(Visualization::documents(&documents));
        run.report();

        run.start(QUALITY, "Evaluating document quality and relevance...");
        let first = self.assessor.assess(question, &keywords, &documents).await?;
        run.memory.record_quality_check(first.clone())?;

        let (check, message) = match RetryState::FirstAttempt.transition(&first, &run.memory) {
            Some(next) => {
                run.note(
                    QUALITY,
                    "Quality insufficient, generating alternative keywords and retrying...",
                );
                let alternative = self.retry.alternative_keywords(question, &keywords).await?;
                run.memory
                    .record_keywords(format!("{}_retry", question), alternative.clone());

                let retry_documents = self.retriever.retrieve(&alternative).await?;
                run.memory.record_documents(&retry_documents);

                let second = self
                    .assessor
                    .assess(question, &alternative, &retry_documents)
                    .await?;
                run.memory.record_quality_check(second.clone())?;
                run.memory.set_retry_state(next);

                let message = format!(
                    "Quality assessment complete (attempt {}). Score: {}/100",
                    run.memory.current_attempt(),
                    second.score
                );
                (second, message)
            }
            None => {
                let message = format!("Quality assessment complete. Score: {}/100", first.score);
                (first, message)
            }
        };
        run.complete(QUALITY, &check, message);
        run.visualizations.push(Visualization::quality(
            &check,
            run.memory.current_attempt(),
        ));
        run.report();

        run.start(
            ANSWER,
            "Compiling comprehensive answer using all collected information...",
        );
        let answer = self.synthesizer.synthesize(question, &run.memory).await?;
        run.complete(
            ANSWER,
            &serde_json::json!({ "answer": answer }),
            "Comprehensive answer generated successfully".to_string(),
        );
        run.report();

        Ok(answer)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_initial_steps_pending() {
        let steps = initial_steps();
        assert_eq!(steps.len(), 4);
        assert!(steps.iter().all(|s| s.status == StepStatus::Pending));
        assert_eq!(steps[QUALITY].name, "Quality Assessment");
    }

    #[test]
    fn test_visualization_shapes() {
        let docs = vec![DocumentResult {
            title: "TLAC Holdings Requirements".into(),
            source: "12 CFR Part 252".into(),
            excerpt: "x".repeat(200),
            relevance_score: 78,
            category: "TLAC".into(),
            keywords: vec!["tlac".into()],
        }];
        let value = serde_json::to_value(Visualization::documents(&docs)).unwrap();
        assert_eq!(value["type"], "documents");
        assert_eq!(value["data"]["totalFound"], 1);
        let excerpt = value["data"]["documents"][0]["excerpt"].as_str().unwrap();
        assert_eq!(excerpt.len(), 153);
        assert!(excerpt.ends_with("..."));

        let value =
            serde_json::to_value(Visualization::quality(&QualityCheck::unparsed(), 1)).unwrap();
        assert_eq!(value["type"], "quality");
        assert_eq!(value["data"]["attempts"], 1);
        assert_eq!(value["data"]["recommendation"], "proceed");
    }

    #[test]
    fn test_failure_marks_processing_step() {
        let seen = std::sync::Mutex::new(Vec::new());
        let hook = |steps: &[WorkflowStep]| {
            seen.lock().unwrap().push(steps.to_vec());
        };
        let mut run = WorkflowRun::new(Some(&hook));
        run.start(RETRIEVAL, "Searching...");
        run.fail(&RegscopeError::ExternalError("search down".into()));

        let last = seen.lock().unwrap().last().cloned().unwrap();
        assert_eq!(last[RETRIEVAL].status, StepStatus::Failed);
        assert_eq!(
            last[RETRIEVAL].message,
            "Error: External service error: search down"
        );
        assert_eq!(last[ANSWER].status, StepStatus::Pending);
    }
}
