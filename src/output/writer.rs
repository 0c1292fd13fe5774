//! Parquet output
//!
//! One file per table, `<dir>/<table>.parquet`, written in row groups as
//! rows arrive.

use super::schema::{arrow_schema, rows_to_batch};
use super::sink::RowSink;
use crate::error::{Error, Result};
use crate::extract::Row;
use crate::schema::TableSchema;
use arrow::record_batch::RecordBatch;
use async_trait::async_trait;
use parquet::arrow::ArrowWriter;
use parquet::basic::Compression;
use parquet::file::properties::WriterProperties;
use std::collections::HashMap;
use std::fs::File;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};
use tracing::{debug, info};

/// Configuration for Parquet output
#[derive(Debug, Clone)]
pub struct ParquetWriterConfig {
    compression: Compression,
    batch_size: usize,
}

impl Default for ParquetWriterConfig {
    fn default() -> Self {
        Self {
            compression: Compression::SNAPPY,
            batch_size: 10_000,
        }
    }
}

impl ParquetWriterConfig {
    /// Create a new config with default settings
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Rows buffered per table before a batch is written
    #[must_use]
    pub fn with_batch_size(mut self, size: usize) -> Self {
        self.batch_size = size.max(1);
        self
    }

    /// Use no compression
    #[must_use]
    pub fn uncompressed(mut self) -> Self {
        self.compression = Compression::UNCOMPRESSED;
        self
    }

    /// Use ZSTD compression
    #[must_use]
    pub fn zstd(mut self) -> Self {
        self.compression = Compression::ZSTD(parquet::basic::ZstdLevel::default());
        self
    }

    /// Rows buffered per table before a batch is written
    pub fn batch_size(&self) -> usize {
        self.batch_size
    }

    fn build_properties(&self) -> WriterProperties {
        WriterProperties::builder()
            .set_compression(self.compression)
            .build()
    }
}

/// Parquet file writer for a single table
pub struct ParquetWriter {
    writer: ArrowWriter<File>,
    rows_written: usize,
}

impl ParquetWriter {
    /// Create the file at `path` for `table`
    pub fn new(
        path: impl AsRef<Path>,
        table: &TableSchema,
        config: &ParquetWriterConfig,
    ) -> Result<Self> {
        let file = File::create(path.as_ref()).map_err(|e| {
            Error::output(format!(
                "Failed to create {}: {e}",
                path.as_ref().display()
            ))
        })?;

        let writer = ArrowWriter::try_new(
            file,
            Arc::new(arrow_schema(table)),
            Some(config.build_properties()),
        )?;

        Ok(Self {
            writer,
            rows_written: 0,
        })
    }

    /// Write a RecordBatch to the file
    pub fn write(&mut self, batch: &RecordBatch) -> Result<()> {
        self.writer.write(batch)?;
        self.rows_written += batch.num_rows();
        Ok(())
    }

    /// Number of rows written so far
    pub fn rows_written(&self) -> usize {
        self.rows_written
    }

    /// Finalize the file
    pub fn close(self) -> Result<usize> {
        let rows = self.rows_written;
        self.writer.close()?;
        Ok(rows)
    }
}

struct TableFile {
    schema: TableSchema,
    path: PathBuf,
    pending: Vec<Row>,
    writer: Option<ParquetWriter>,
}

impl TableFile {
    fn flush(&mut self, config: &ParquetWriterConfig) -> Result<()> {
        if self.pending.is_empty() {
            return Ok(());
        }
        let batch = rows_to_batch(&self.schema, &self.pending)?;
        let writer = match self.writer.take() {
            Some(writer) => writer,
            None => ParquetWriter::new(&self.path, &self.schema, config)?,
        };
        self.writer.insert(writer).write(&batch)?;
        debug!(table = %self.schema.name, rows = batch.num_rows(), "wrote batch");
        self.pending.clear();
        Ok(())
    }
}

/// Sink writing each table to its own Parquet file
pub struct ParquetTableWriter {
    config: ParquetWriterConfig,
    tables: Mutex<HashMap<String, TableFile>>,
}

impl ParquetTableWriter {
    /// Create a writer for `tables` under `dir`, creating the directory
    pub fn new(
        dir: impl AsRef<Path>,
        tables: &[TableSchema],
        config: ParquetWriterConfig,
    ) -> Result<Self> {
        let dir = dir.as_ref();
        std::fs::create_dir_all(dir)?;

        let tables = tables
            .iter()
            .map(|schema| {
                let file = TableFile {
                    schema: schema.clone(),
                    path: dir.join(format!("{}.parquet", schema.name)),
                    pending: Vec::new(),
                    writer: None,
                };
                (schema.name.clone(), file)
            })
            .collect();

        Ok(Self {
            config,
            tables: Mutex::new(tables),
        })
    }

    /// Flush everything and close the files
    ///
    /// Tables that received no rows still get a file with their schema.
    /// Returns `(path, rows)` per table, sorted by path.
    pub fn finish(self) -> Result<Vec<(PathBuf, usize)>> {
        let tables = self
            .tables
            .into_inner()
            .map_err(|_| Error::output("parquet writer state is poisoned"))?;

        let mut written = Vec::with_capacity(tables.len());
        for (_, mut file) in tables {
            file.flush(&self.config)?;
            let writer = match file.writer.take() {
                Some(writer) => writer,
                None => ParquetWriter::new(&file.path, &file.schema, &self.config)?,
            };
            let rows = writer.close()?;
            info!(table = %file.schema.name, rows, path = %file.path.display(), "parquet file written");
            written.push((file.path, rows));
        }
        written.sort();
        Ok(written)
    }
}

#[async_trait]
impl RowSink for ParquetTableWriter {
    async fn send(&self, row: Row) -> Result<()> {
        let mut tables = self
            .tables
            .lock()
            .map_err(|_| Error::output("parquet writer state is poisoned"))?;
        let file = tables
            .get_mut(&row.table)
            .ok_or_else(|| Error::output(format!("no schema registered for table {}", row.table)))?;

        file.pending.push(row);
        if file.pending.len() >= self.config.batch_size {
            file.flush(&self.config)?;
        }
        Ok(())
    }
}
