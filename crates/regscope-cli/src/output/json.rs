//! JSON output formatter

use regscope_core::ResearchOutcome;
use serde::Serialize;

pub fn to_pretty<T: Serialize + ?Sized>(value: &T) -> String {
    serde_json::to_string_pretty(value).unwrap_or_else(|_| "null".to_string()) + "\n"
}

/// Same shape as the HTTP chat response
pub fn format_outcome(outcome: &ResearchOutcome) -> String {
    to_pretty(&serde_json::json!({
        "response": outcome.answer,
        "workflow": {
            "steps": outcome.steps,
            "visualizations": outcome.visualizations,
            "memory": outcome.memory.summary(),
        }
    }))
}
