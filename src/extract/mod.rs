//! Extraction module
//!
//! Streams the items of one SharePoint list into a `RowSink`.
//!
//! # Overview
//!
//! - `Extractor` - pages through a list and emits one `Row` per item
//! - `Row` - converted item, aligned with the table's columns
//! - `TableMetrics` - rows emitted and failures per table
//! - `convert` - per-column value conversion (currency formatting)
//!
//! Every page fetch and every row emission is raced against the run's
//! cancellation token; no row is emitted once cancellation is observed.

mod convert;
mod types;

pub use convert::{convert, format_currency, CURRENCY_TYPE};
pub use types::{Row, TableMetrics};

use crate::error::{Error, Result};
use crate::gateway::{ItemPage, SharePointGateway};
use crate::output::RowSink;
use crate::schema::{TableMeta, TableSchema};
use crate::types::{JsonObject, JsonValue};
use std::future::Future;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};
use uuid::Uuid;

/// Streams list items as rows
pub struct Extractor<'a> {
    gateway: &'a dyn SharePointGateway,
    cancel: CancellationToken,
}

impl<'a> Extractor<'a> {
    /// Create an extractor reading from `gateway`
    pub fn new(gateway: &'a dyn SharePointGateway, cancel: CancellationToken) -> Self {
        Self { gateway, cancel }
    }

    /// Stream every item of the list behind `meta` into `sink`
    ///
    /// A list that disappears mid-run ends the table successfully. Any other
    /// failure, cancellation included, is counted in `metrics.errors` and
    /// returned.
    pub async fn run(
        &self,
        schema: &TableSchema,
        meta: &TableMeta,
        sink: &dyn RowSink,
        metrics: &mut TableMetrics,
    ) -> Result<()> {
        let result = self.stream(schema, meta, sink, metrics).await;
        if result.is_err() {
            metrics.add_error();
        }
        result
    }

    async fn stream(
        &self,
        schema: &TableSchema,
        meta: &TableMeta,
        sink: &dyn RowSink,
        metrics: &mut TableMetrics,
    ) -> Result<()> {
        info!(table = %schema.name, list = %meta.title, "syncing table");

        let mut page = match self.fetch(self.gateway.list_items_paged(&meta.title)).await {
            Ok(page) => page,
            Err(e) if e.is_not_found() => {
                info!(table = %schema.name, "list not found, nothing to sync");
                return Ok(());
            }
            Err(e) => return Err(e),
        };

        let mut pages = 1usize;
        loop {
            let items = decode_page(&page, &meta.title)?;
            debug!(table = %schema.name, page = pages, items = items.len(), "processing page");

            for item in items {
                let row = build_row(schema, meta, item);
                self.emit(sink, row).await?;
                metrics.add_resource();
            }

            if !page.has_next_page() {
                break;
            }
            page = match self.fetch(self.gateway.next_page(&page)).await {
                Ok(next) => next,
                Err(e) if e.is_not_found() => {
                    info!(table = %schema.name, "list disappeared mid-run, stopping");
                    break;
                }
                Err(e) => return Err(e),
            };
            pages += 1;
        }

        info!(
            table = %schema.name,
            pages,
            resources = metrics.resources,
            "table synced"
        );
        Ok(())
    }

    async fn fetch<F>(&self, request: F) -> Result<ItemPage>
    where
        F: Future<Output = Result<ItemPage>>,
    {
        tokio::select! {
            biased;
            () = self.cancel.cancelled() => Err(Error::Cancelled),
            page = request => page,
        }
    }

    async fn emit(&self, sink: &dyn RowSink, row: Row) -> Result<()> {
        if self.cancel.is_cancelled() {
            return Err(Error::Cancelled);
        }
        tokio::select! {
            biased;
            () = self.cancel.cancelled() => Err(Error::Cancelled),
            sent = sink.send(row) => sent,
        }
    }
}

/// Decode a page payload into item objects
fn decode_page(page: &ItemPage, title: &str) -> Result<Vec<JsonObject>> {
    serde_json::from_slice(page.items_json()).map_err(|e| {
        Error::decode(format!(
            "items page of list {title:?} is not a JSON array of objects: {e}"
        ))
    })
}

/// Build the row for one item
///
/// Each mapped key is taken out of the item, so whatever is left afterwards
/// was not selected.
pub fn build_row(schema: &TableSchema, meta: &TableMeta, mut item: JsonObject) -> Row {
    let mut values = Vec::with_capacity(schema.columns.len());
    let mut missing = Vec::new();

    for column in &schema.columns {
        if column.is_primary_key {
            values.push(JsonValue::String(Uuid::new_v4().to_string()));
            continue;
        }
        let Some(column_meta) = meta.column_map.get(&column.name) else {
            values.push(JsonValue::Null);
            continue;
        };
        match item.remove(&column_meta.sharepoint_name) {
            Some(raw) => values.push(convert(column_meta, raw)),
            None => {
                missing.push(column_meta.sharepoint_name.as_str());
                values.push(JsonValue::Null);
            }
        }
    }

    if !missing.is_empty() {
        missing.sort_unstable();
        warn!(table = %schema.name, missing_columns = ?missing, "item is missing columns");
    }
    if !item.is_empty() {
        let mut extra: Vec<&str> = item.keys().map(String::as_str).collect();
        extra.sort_unstable();
        warn!(table = %schema.name, extra_columns = ?extra, "item has extra columns");
    }

    Row::new(schema.name.clone(), values)
}
