//! Output module
//!
//! Row sinks and their storage formats.
//!
//! # Overview
//!
//! - `RowSink` / `ChannelSink` - the destination seen by the extractor
//! - Arrow mapping of table schemas and conversion of rows to RecordBatches
//! - `JsonLinesWriter` - RECORD messages on any `Write`
//! - `ParquetTableWriter` - one Parquet file per table

mod jsonl;
mod schema;
mod sink;
mod writer;

pub use jsonl::JsonLinesWriter;
pub use schema::{arrow_schema, arrow_type, rows_to_batch, TIMESTAMP_TZ};
pub use sink::{ChannelSink, RowSink};
pub use writer::{ParquetTableWriter, ParquetWriter, ParquetWriterConfig};
