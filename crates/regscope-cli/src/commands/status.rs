//! Status command

use crate::app::OutputFormat;
use anyhow::Result;
use regscope_core::config::CONFIG_ENV_VAR;
use regscope_core::{store, Config};
use std::path::PathBuf;

pub async fn run(config: &Config, format: OutputFormat) -> Result<()> {
    let storage = store::open(&config.storage)?;
    let extracts = storage.all_extracts().await?.len();
    let keywords = storage.all_keywords().await?.len();
    let config_path = std::env::var(CONFIG_ENV_VAR)
        .map(PathBuf::from)
        .unwrap_or_else(|_| Config::default_path());
    let llm = &config.llm_service;

    match format {
        OutputFormat::Json => {
            let status = serde_json::json!({
                "configPath": config_path,
                "configFound": config_path.exists(),
                "storage": {
                    "backend": storage.backend_name(),
                    "dataDir": config.storage.data_dir,
                    "extracts": extracts,
                    "keywords": keywords,
                },
                "llm": {
                    "provider": llm.provider,
                    "url": llm.url,
                    "model": llm.model,
                    "apiKeySet": llm.api_key.is_some(),
                    "cacheTtlSecs": llm.cache_ttl_secs,
                },
                "server": { "bind": config.server.bind },
                "research": config.research,
            });
            println!("{}", serde_json::to_string_pretty(&status)?);
        }
        _ => {
            println!(
                "Config:          {}{}",
                config_path.display(),
                if config_path.exists() { "" } else { " (defaults)" }
            );
            println!();
            println!("Storage:");
            println!("  Backend:       {}", storage.backend_name());
            println!("  Data dir:      {}", config.storage.data_dir.display());
            println!("  Extracts:      {}", extracts);
            println!("  Keywords:      {}", keywords);
            println!();
            println!("LLM:");
            println!("  Provider:      {}", llm.provider);
            println!("  URL:           {}", llm.url);
            println!("  Model:         {}", llm.model);
            println!(
                "  API key:       {}",
                if llm.api_key.is_some() { "set" } else { "not set" }
            );
            println!();
            println!("Server bind:     {}", config.server.bind);
        }
    }
    Ok(())
}
