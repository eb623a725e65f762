//! Ask command: run the research workflow for one question

use crate::app::{AskArgs, OutputFormat};
use crate::output;
use crate::progress::StepReporter;
use anyhow::Result;
use regscope_core::{Services, WorkflowStep};

pub async fn run(
    args: AskArgs,
    services: &Services,
    format: OutputFormat,
    verbose: bool,
) -> Result<()> {
    let question = args.question.join(" ");
    let reporter = StepReporter::new();
    let hook = |steps: &[WorkflowStep]| reporter.report(steps);

    let outcome = services
        .workflow
        .process_question(&question, Some(&hook))
        .await?;

    print!("{}", output::format_outcome(&outcome, format));

    if verbose {
        let memory = outcome.memory.summary();
        eprintln!(
            "Attempts: {} | Documents: {} | Quality: {}/100 | Model: {}",
            memory.attempts,
            memory.documents_count,
            memory.quality_score,
            services.client.model_name()
        );
        if let Some(metrics) = services.client.metrics() {
            eprintln!(
                "LLM requests: {} (cache hits: {})",
                metrics.total_requests, metrics.cache_hits
            );
        }
    }
    Ok(())
}
