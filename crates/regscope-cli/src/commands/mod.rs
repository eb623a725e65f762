//! CLI command handlers

pub mod ask;
pub mod extracts;
pub mod keywords;
pub mod status;
pub mod summaries;
