//! Keyword listing

use crate::app::{KeywordsArgs, OutputFormat};
use crate::output;
use anyhow::Result;
use regscope_core::Storage;

pub async fn run(args: KeywordsArgs, storage: &dyn Storage, format: OutputFormat) -> Result<()> {
    let keywords = match (args.category, args.search) {
        (Some(category), _) => storage.keywords_by_category(&category).await?,
        (None, Some(query)) => storage.search_keywords(&query).await?,
        (None, None) => storage.all_keywords().await?,
    };
    print!("{}", output::format_keywords(&keywords, format));
    Ok(())
}
