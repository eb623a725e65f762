//! CLI argument definitions

use clap::{Args, Parser, Subcommand, ValueEnum};

#[derive(Parser)]
#[command(name = "regscope")]
#[command(
    author,
    version,
    about = "Regulatory compliance research: extract search, keyword catalog and LLM-driven answers"
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Output format
    #[arg(long, global = true, value_enum, default_value = "cli")]
    pub format: OutputFormat,

    /// Verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Start the HTTP API server
    Serve(ServeArgs),

    /// Start MCP server on stdio
    Mcp,

    /// Research a compliance question
    Ask(AskArgs),

    /// Browse and search regulatory extracts
    Extracts(ExtractsArgs),

    /// List regulatory keywords
    Keywords(KeywordsArgs),

    /// Create or fetch research summaries
    Summaries(SummariesArgs),

    /// Show configuration and storage status
    Status,
}

#[derive(Args)]
pub struct ServeArgs {
    /// Address to bind (default: server.bind from config)
    #[arg(long)]
    pub bind: Option<String>,
}

#[derive(Args)]
pub struct AskArgs {
    /// The question to research
    #[arg(required = true)]
    pub question: Vec<String>,
}

#[derive(Args)]
pub struct ExtractsArgs {
    #[command(subcommand)]
    pub action: ExtractsAction,
}

#[derive(Subcommand)]
pub enum ExtractsAction {
    /// List all extracts
    #[command(alias = "ls")]
    List,
    /// Full-text search (any term matches)
    Search {
        #[arg(required = true)]
        query: Vec<String>,
    },
    /// Show one extract
    Get { id: u32 },
    /// Filter by structured fields
    Filter(FilterArgs),
}

#[derive(Args)]
pub struct FilterArgs {
    /// Category (repeatable)
    #[arg(long = "category")]
    pub categories: Vec<String>,

    /// Jurisdiction (repeatable)
    #[arg(long = "jurisdiction")]
    pub jurisdictions: Vec<String>,

    /// Priority, e.g. "High Priority" (repeatable)
    #[arg(long = "priority")]
    pub priorities: Vec<String>,

    /// Keyword substring (repeatable)
    #[arg(long = "keyword")]
    pub keywords: Vec<String>,

    /// Earliest effective date (YYYY-MM-DD)
    #[arg(long)]
    pub from: Option<String>,

    /// Latest effective date (YYYY-MM-DD)
    #[arg(long)]
    pub to: Option<String>,
}

#[derive(Args)]
pub struct KeywordsArgs {
    /// Only keywords in this category
    #[arg(short, long, conflicts_with = "search")]
    pub category: Option<String>,

    /// Keywords whose term or category contains this text
    #[arg(short, long)]
    pub search: Option<String>,
}

#[derive(Args)]
pub struct SummariesArgs {
    #[command(subcommand)]
    pub action: SummariesAction,
}

#[derive(Subcommand)]
pub enum SummariesAction {
    /// Save a summary
    Create {
        #[arg(long)]
        title: String,
        #[arg(long)]
        content: String,
        /// Related extract id (repeatable)
        #[arg(long = "extract")]
        extract_ids: Vec<u32>,
        /// Keyword (repeatable)
        #[arg(long = "keyword")]
        keywords: Vec<String>,
    },
    /// Show a saved summary
    Get { id: u32 },
}

#[derive(Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    Cli,
    Json,
    Csv,
    Md,
}
