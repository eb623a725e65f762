//! Regscope CLI
//!
//! Regulatory extract search, keyword catalog and LLM-driven compliance research.

use anyhow::Result;
use clap::Parser;
use regscope_core::error::exit_codes;
use regscope_core::{store, Config, RegscopeError, Services};
use std::sync::Arc;
use tracing_subscriber::EnvFilter;

mod app;
mod commands;
mod output;
mod progress;

use app::{Cli, Commands};

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    if let Err(e) = run(cli).await {
        eprintln!("Error: {:#}", e);
        std::process::exit(exit_code(&e));
    }
}

async fn run(cli: Cli) -> Result<()> {
    let config = Config::load()?;
    init_tracing(&cli, &config);

    match cli.command {
        Commands::Serve(args) => {
            let bind = args.bind.unwrap_or_else(|| config.server.bind.clone());
            let services = Services::from_config(config)?;
            regscope_api::serve(Arc::new(services), &bind).await
        }
        Commands::Mcp => {
            let services = Services::from_config(config)?;
            regscope_mcp::start_server(Arc::new(services)).await
        }
        Commands::Ask(args) => {
            let services = Services::from_config(config)?;
            commands::ask::run(args, &services, cli.format, cli.verbose).await
        }
        Commands::Extracts(args) => {
            let storage = store::open(&config.storage)?;
            commands::extracts::run(args, storage.as_ref(), cli.format).await
        }
        Commands::Keywords(args) => {
            let storage = store::open(&config.storage)?;
            commands::keywords::run(args, storage.as_ref(), cli.format).await
        }
        Commands::Summaries(args) => {
            let storage = store::open(&config.storage)?;
            commands::summaries::run(args, storage.as_ref(), cli.format).await
        }
        Commands::Status => commands::status::run(&config, cli.format).await,
    }
}

/// Logs always go to stderr; stdout carries command output and the MCP channel
fn init_tracing(cli: &Cli, config: &Config) {
    let default_directive = match cli.command {
        Commands::Serve(_) | Commands::Mcp => config.server.log_level.as_str(),
        _ if cli.verbose => "info",
        _ => "warn",
    };
    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(default_directive))
        .unwrap_or_else(|_| EnvFilter::new("warn"));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn exit_code(err: &anyhow::Error) -> i32 {
    err.downcast_ref::<RegscopeError>()
        .map_or(exit_codes::GENERAL_ERROR, RegscopeError::exit_code)
}
