//! Research summary commands

use crate::app::{OutputFormat, SummariesAction, SummariesArgs};
use crate::output;
use anyhow::Result;
use regscope_core::{NewSummary, RegscopeError, Storage};

pub async fn run(args: SummariesArgs, storage: &dyn Storage, format: OutputFormat) -> Result<()> {
    let summary = match args.action {
        SummariesAction::Create {
            title,
            content,
            extract_ids,
            keywords,
        } => {
            let summary = NewSummary {
                title,
                content,
                extract_ids,
                keywords,
            };
            if !summary.is_valid() {
                return Err(RegscopeError::InvalidInput("Invalid summary data".to_string()).into());
            }
            let created = storage.create_summary(summary).await?;
            eprintln!("Saved summary #{}", created.id);
            created
        }
        SummariesAction::Get { id } => storage
            .summary_by_id(id)
            .await?
            .ok_or_else(|| RegscopeError::NotFound(format!("summary {}", id)))?,
    };

    print!("{}", output::format_summary(&summary, format));
    Ok(())
}
