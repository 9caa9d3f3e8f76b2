//! CLI command definitions

use clap::{Parser, ValueEnum};
use std::path::PathBuf;

/// Output format for council results
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    /// Every stage, the ranking table and costs
    Full,
    /// Only the chairman's answer
    Synthesis,
    /// The complete outcome as JSON
    Json,
}

impl From<OutputFormat> for council_domain::OutputFormat {
    fn from(format: OutputFormat) -> Self {
        match format {
            OutputFormat::Full => council_domain::OutputFormat::Full,
            OutputFormat::Synthesis => council_domain::OutputFormat::Synthesis,
            OutputFormat::Json => council_domain::OutputFormat::Json,
        }
    }
}

/// CLI arguments for llm-council
#[derive(Parser, Debug)]
#[command(name = "llm-council")]
#[command(author, version, about = "LLM Council - several models answer, rank each other and agree")]
#[command(long_about = r#"
LLM Council asks a panel of models the same question and combines their answers.

A run has three stages:
1. Collect: every council model answers the question in parallel
2. Rank: every model that answered ranks the anonymized answers
3. Synthesize: the chairman model writes the final answer

With --quorum, each stage advances as soon as a majority has answered
instead of waiting for the slowest model.

Configuration files are loaded from (in priority order):
1. --config <path>     Explicit config file
2. ./council.toml      Project-level config
3. ~/.config/llm-council/config.toml   Global config
Environment variables prefixed with COUNCIL_ override both
(e.g. COUNCIL_COUNCIL__QUORUM=true).

Example:
  llm-council "What's the best way to handle errors in Rust?"
  llm-council -m openai/gpt-5.1 -m x-ai/grok-4 --chairman openai/gpt-5.1 "Compare async runtimes"
  llm-council --quorum --web-search -o full "Latest stable Rust release?"
"#)]
pub struct Cli {
    /// The question to ask the council
    #[arg(required_unless_present = "show_config")]
    pub question: Option<String>,

    /// Models to include in the council (can be specified multiple times)
    #[arg(short, long, value_name = "MODEL")]
    pub model: Vec<String>,

    /// Model that synthesizes the final answer
    #[arg(long, value_name = "MODEL")]
    pub chairman: Option<String>,

    /// Advance each stage once a majority of models has answered
    #[arg(long)]
    pub quorum: bool,

    /// Let browse-capable models search the web
    #[arg(long)]
    pub web_search: bool,

    /// Include coding specialists in the council
    #[arg(long)]
    pub coding: bool,

    /// Generate a short title for the conversation
    #[arg(long)]
    pub title: bool,

    /// Output format (defaults to the config file setting, then synthesis)
    #[arg(short, long, value_enum)]
    pub output: Option<OutputFormat>,

    /// Stream progress events as JSON lines on stdout instead of formatted output
    #[arg(long)]
    pub events: bool,

    /// Verbosity level (-v = info, -vv = debug, -vvv = trace)
    #[arg(short, long, action = clap::ArgAction::Count)]
    pub verbose: u8,

    /// Suppress progress indicators
    #[arg(short, long)]
    pub quiet: bool,

    /// Write diagnostic logs to this file
    #[arg(long, value_name = "PATH")]
    pub log_file: Option<PathBuf>,

    /// Path to configuration file
    #[arg(long, value_name = "PATH")]
    pub config: Option<PathBuf>,

    /// Disable loading of configuration files
    #[arg(long)]
    pub no_config: bool,

    /// Show configuration file locations and exit
    #[arg(long)]
    pub show_config: bool,
}
