//! JSON-lines output
//!
//! Every row becomes one RECORD message:
//! `{"type":"RECORD","record":{"stream":...,"data":{...},"emitted_at":...}}`.

use super::sink::RowSink;
use crate::error::{Error, Result};
use crate::extract::Row;
use crate::schema::TableSchema;
use crate::types::JsonObject;
use async_trait::async_trait;
use serde_json::json;
use std::collections::HashMap;
use std::io::Write;
use std::sync::Mutex;

/// Sink writing RECORD messages, one per line
pub struct JsonLinesWriter<W> {
    columns: HashMap<String, Vec<String>>,
    out: Mutex<W>,
}

impl<W: Write + Send> JsonLinesWriter<W> {
    /// Create a writer for rows of `tables`
    pub fn new(out: W, tables: &[TableSchema]) -> Self {
        let columns = tables
            .iter()
            .map(|t| {
                let names = t.columns.iter().map(|c| c.name.clone()).collect();
                (t.name.clone(), names)
            })
            .collect();
        Self {
            columns,
            out: Mutex::new(out),
        }
    }

    /// The RECORD message for a row
    pub fn record(&self, row: &Row) -> Result<serde_json::Value> {
        let names = self
            .columns
            .get(&row.table)
            .ok_or_else(|| Error::output(format!("no schema registered for table {}", row.table)))?;

        let data: JsonObject = names
            .iter()
            .cloned()
            .zip(row.values.iter().cloned())
            .collect();

        Ok(json!({
            "type": "RECORD",
            "record": {
                "stream": row.table,
                "data": data,
                "emitted_at": chrono::Utc::now().timestamp_millis()
            }
        }))
    }

    /// Recover the underlying writer
    pub fn into_inner(self) -> Result<W> {
        self.out
            .into_inner()
            .map_err(|_| Error::output("json lines writer state is poisoned"))
    }
}

#[async_trait]
impl<W: Write + Send> RowSink for JsonLinesWriter<W> {
    async fn send(&self, row: Row) -> Result<()> {
        let message = self.record(&row)?;
        let mut out = self
            .out
            .lock()
            .map_err(|_| Error::output("json lines writer state is poisoned"))?;
        serde_json::to_writer(&mut *out, &message)?;
        out.write_all(b"\n")?;
        Ok(())
    }
}
