//! Output formatters

pub mod csv;
pub mod json;
pub mod markdown;
pub mod terminal;

use crate::app::OutputFormat;
use regscope_core::{Extract, Keyword, ResearchOutcome, Summary};

pub fn format_extracts(extracts: &[Extract], format: OutputFormat) -> String {
    match format {
        OutputFormat::Json => json::to_pretty(&extracts),
        OutputFormat::Csv => csv::format_extracts(extracts),
        OutputFormat::Md => markdown::format_extracts(extracts),
        OutputFormat::Cli => terminal::format_extracts(extracts),
    }
}

pub fn format_extract(extract: &Extract, format: OutputFormat) -> String {
    match format {
        OutputFormat::Json => json::to_pretty(extract),
        OutputFormat::Csv => csv::format_extracts(std::slice::from_ref(extract)),
        OutputFormat::Md => markdown::format_extract(extract),
        OutputFormat::Cli => terminal::format_extract(extract),
    }
}

pub fn format_keywords(keywords: &[Keyword], format: OutputFormat) -> String {
    match format {
        OutputFormat::Json => json::to_pretty(&keywords),
        OutputFormat::Csv => csv::format_keywords(keywords),
        OutputFormat::Md => markdown::format_keywords(keywords),
        OutputFormat::Cli => terminal::format_keywords(keywords),
    }
}

pub fn format_summary(summary: &Summary, format: OutputFormat) -> String {
    match format {
        OutputFormat::Json => json::to_pretty(summary),
        OutputFormat::Csv => csv::format_summary(summary),
        OutputFormat::Md => markdown::format_summary(summary),
        OutputFormat::Cli => terminal::format_summary(summary),
    }
}

pub fn format_outcome(outcome: &ResearchOutcome, format: OutputFormat) -> String {
    match format {
        OutputFormat::Json => json::format_outcome(outcome),
        OutputFormat::Csv => csv::format_steps(outcome),
        OutputFormat::Md => markdown::format_outcome(outcome),
        OutputFormat::Cli => terminal::format_outcome(outcome),
    }
}
