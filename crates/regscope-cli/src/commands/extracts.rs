//! Extract listing, search and filtering

use crate::app::{ExtractsAction, ExtractsArgs, FilterArgs, OutputFormat};
use crate::output;
use anyhow::Result;
use regscope_core::{ExtractFilter, RegscopeError, Storage};

pub async fn run(args: ExtractsArgs, storage: &dyn Storage, format: OutputFormat) -> Result<()> {
    let extracts = match args.action {
        ExtractsAction::List => storage.all_extracts().await?,
        ExtractsAction::Search { query } => {
            let query = query.join(" ");
            let hits = storage.search_extracts(&query).await?;
            tracing::info!("'{}' matched {} extracts", query, hits.len());
            hits
        }
        ExtractsAction::Get { id } => {
            let extract = storage
                .extract_by_id(id)
                .await?
                .ok_or_else(|| RegscopeError::NotFound(format!("extract {}", id)))?;
            print!("{}", output::format_extract(&extract, format));
            return Ok(());
        }
        ExtractsAction::Filter(filter) => storage.filter_extracts(&filter.into()).await?,
    };

    if extracts.is_empty() && format == OutputFormat::Cli {
        eprintln!("No extracts found");
        return Ok(());
    }
    print!("{}", output::format_extracts(&extracts, format));
    Ok(())
}

impl From<FilterArgs> for ExtractFilter {
    fn from(args: FilterArgs) -> Self {
        ExtractFilter {
            categories: args.categories,
            jurisdictions: args.jurisdictions,
            priorities: args.priorities,
            keywords: args.keywords,
            start_date: args.from,
            end_date: args.to,
        }
    }
}
