//! CLI module
//!
//! Command-line interface for running the source.
//!
//! # Commands
//!
//! - `check` - Authenticate and enumerate lists
//! - `discover` - Print table schemas
//! - `sync` - Stream rows to stdout or Parquet files
//! - `validate` - Check the configuration

mod commands;
mod runner;

pub use commands::{Cli, Commands, OutputFormat};
pub use runner::Runner;
