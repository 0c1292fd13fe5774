// Allow common clippy pedantic lints that aren't critical for this codebase
#![allow(clippy::cast_possible_truncation)]
#![allow(clippy::cast_sign_loss)]
#![allow(clippy::cast_lossless)]
#![allow(clippy::too_many_lines)]
#![allow(clippy::unused_self)]
#![allow(clippy::must_use_candidate)]
#![allow(clippy::items_after_statements)]
#![allow(clippy::unnecessary_wraps)]
#![allow(clippy::match_same_arms)]
#![allow(clippy::needless_pass_by_value)]
#![allow(clippy::unused_async)]

//! # SharePoint List Source
//!
//! Extracts SharePoint lists as relational tables and streams their items
//! as typed rows.
//!
//! ## Features
//!
//! - **Schema Inference**: list fields become snake_case columns with mapped types
//! - **Selection & Overrides**: per-list field selection, ignore rules, type overrides
//! - **Streaming Extraction**: paged, cancellable, one row per list item
//! - **Add-in Authentication**: realm discovery and ACS client credentials
//! - **Output**: JSON-lines RECORD messages or one Parquet file per table
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use sharepoint_source::{ChannelSink, RestGateway, Result, Spec, SyncEngine};
//! use std::sync::Arc;
//! use tokio_util::sync::CancellationToken;
//!
//! #[tokio::main]
//! async fn main() -> Result<()> {
//!     let spec = Spec::from_file("sharepoint.yaml")?.prepare()?;
//!     let gateway = Arc::new(RestGateway::from_spec(&spec)?);
//!     let mut engine = SyncEngine::new(spec, gateway);
//!
//!     let (sink, mut rows) = ChannelSink::channel(1024);
//!     tokio::spawn(async move {
//!         while let Some(row) = rows.recv().await {
//!             println!("{} {:?}", row.table, row.values);
//!         }
//!     });
//!
//!     engine.sync(&sink, CancellationToken::new()).await
//! }
//! ```
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────────┐
//! │                           SyncEngine                            │
//! │  resolve_lists() → discover() → sync_tables(sink, cancel)       │
//! └─────────────────────────────────────────────────────────────────┘
//!                                │
//! ┌───────────────┬──────────────┴──┬────────────────┬──────────────┐
//! │    Schema     │    Extract      │    Gateway     │    Output    │
//! ├───────────────┼─────────────────┼────────────────┼──────────────┤
//! │ Normalize     │ Paged items     │ REST (OData)   │ RowSink      │
//! │ Type mapping  │ Row building    │ In-memory      │ JSON lines   │
//! │ Selection     │ Currency        │ Auth / HTTP    │ Parquet      │
//! │ Column naming │ Cancellation    │ Retry / limit  │              │
//! └───────────────┴─────────────────┴────────────────┴──────────────┘
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::missing_errors_doc)]
#![allow(clippy::missing_panics_doc)]
#![allow(clippy::doc_markdown)]

// ============================================================================
// Module declarations
// ============================================================================

/// Error types
pub mod error;

/// Common types and type aliases
pub mod types;

/// Source configuration
pub mod spec;

/// Authentication for SharePoint add-ins
pub mod auth;

/// HTTP client with retry and rate limiting
pub mod http;

/// Access to SharePoint lists
pub mod gateway;

/// Table schemas derived from list fields
pub mod schema;

/// Item extraction into rows
pub mod extract;

/// Row sinks, Arrow and Parquet output
pub mod output;

/// Main execution engine
pub mod engine;

/// Command-line interface
pub mod cli;

// ============================================================================
// Re-exports
// ============================================================================

pub use error::{Error, Result};
pub use types::*;

// Re-export commonly used types
pub use engine::{SyncEngine, SyncStats, Table};
pub use extract::{Row, TableMetrics};
pub use gateway::{MemoryGateway, RestGateway, SharePointGateway};
pub use output::{ChannelSink, RowSink};
pub use spec::Spec;

/// Crate version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Crate name
pub const NAME: &str = env!("CARGO_PKG_NAME");
