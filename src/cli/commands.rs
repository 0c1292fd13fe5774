//! CLI commands and argument parsing

use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// SharePoint list source CLI
#[derive(Parser, Debug)]
#[command(name = "sharepoint-source")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Configuration file (JSON, or YAML by extension)
    #[arg(short = 'C', long, global = true)]
    pub config: Option<PathBuf>,

    /// Inline config JSON (takes precedence over --config)
    #[arg(long, global = true)]
    pub config_json: Option<String>,

    /// Output format of protocol messages
    #[arg(short, long, global = true, default_value = "json")]
    pub format: OutputFormat,

    /// Verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Commands,
}

/// CLI subcommands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Authenticate and enumerate the site's lists
    Check,

    /// Print the table schemas of the selected lists
    Discover,

    /// Stream every selected list
    Sync {
        /// Directory for Parquet files; RECORD messages go to stdout when absent
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Rows buffered per table before a Parquet batch is written
        #[arg(long, default_value = "10000")]
        batch_size: usize,
    },

    /// Validate the configuration and print it with secrets masked
    Validate,
}

/// Output format
#[derive(Debug, Clone, Copy, PartialEq, Eq, clap::ValueEnum)]
pub enum OutputFormat {
    /// JSON output (one message per line)
    Json,
    /// Human-readable output
    Pretty,
}
