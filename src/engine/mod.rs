//! Execution engine module
//!
//! Resolves which lists to sync, builds their schemas and runs the
//! extractor over each table in order.
//!
//! # Overview
//!
//! - `SyncEngine` - orchestrates a run and keeps its statistics
//! - `Table` - schema and metadata of one list
//! - `SyncStats` - per-table metrics of the last run
//!
//! Tables are synced one after the other; the first failure aborts the run
//! and is returned wrapped with the table's name.

mod types;

pub use types::{SyncStats, Table};

use crate::error::{Error, Result};
use crate::extract::Extractor;
use crate::gateway::SharePointGateway;
use crate::output::RowSink;
use crate::schema::{normalize, table_name, SchemaBuilder};
use crate::spec::Spec;
use std::collections::HashMap;
use std::sync::Arc;
use std::time::Instant;
use tokio_util::sync::CancellationToken;
use tracing::{error, info, warn};

/// Sync engine for one prepared spec
pub struct SyncEngine {
    /// Prepared configuration
    spec: Spec,
    /// Source of lists and items
    gateway: Arc<dyn SharePointGateway>,
    /// Schema builder derived from the `Spec`
    builder: SchemaBuilder,
    /// Statistics of the last run
    stats: SyncStats,
}

impl SyncEngine {
    /// Create an engine; `spec` must already be prepared
    pub fn new(spec: Spec, gateway: Arc<dyn SharePointGateway>) -> Self {
        let builder = SchemaBuilder::from_spec(&spec);
        Self {
            spec,
            gateway,
            builder,
            stats: SyncStats::default(),
        }
    }

    /// Get the source config
    pub fn spec(&self) -> &Spec {
        &self.spec
    }

    /// Get statistics of the last run
    pub fn stats(&self) -> &SyncStats {
        &self.stats
    }

    /// Titles of the lists to sync
    ///
    /// Configured lists are used verbatim. Otherwise every list on the site
    /// is taken, except later lists whose normalized title collides with an
    /// earlier one.
    pub async fn resolve_lists(&self) -> Result<Vec<String>> {
        if !self.spec.lists.is_empty() {
            return Ok(self.spec.lists.clone());
        }

        let lists = self.gateway.list_all().await?;
        let mut accepted: HashMap<String, String> = HashMap::with_capacity(lists.len());
        let mut titles = Vec::with_capacity(lists.len());

        for list in lists {
            let name = normalize(&list.title);
            if let Some(first) = accepted.get(&name) {
                warn!(
                    list = %list.title,
                    conflicts_with = %first,
                    name = %name,
                    "skipping list with duplicate normalized name"
                );
                continue;
            }
            accepted.insert(name, list.title.clone());
            titles.push(list.title);
        }

        info!(lists = titles.len(), "discovered lists");
        Ok(titles)
    }

    /// Build the tables of every resolved list, in order
    ///
    /// Lists whose fields are not found are left out.
    pub async fn discover(&self) -> Result<Vec<Table>> {
        let titles = self.resolve_lists().await?;
        let mut tables = Vec::with_capacity(titles.len());

        for title in &titles {
            match self.builder.build(self.gateway.as_ref(), title).await {
                Ok(Some(table)) => tables.push(Table::from(table)),
                Ok(None) => {}
                Err(e) => return Err(Error::table(table_name(title), e)),
            }
        }

        Ok(tables)
    }

    /// Discover and sync every table into `sink`
    pub async fn sync(&mut self, sink: &dyn RowSink, cancel: CancellationToken) -> Result<()> {
        let tables = self.discover().await?;
        self.sync_tables(&tables, sink, cancel).await
    }

    /// Sync already discovered tables into `sink`
    ///
    /// Stops at the first failing table; its metrics record the error.
    pub async fn sync_tables(
        &mut self,
        tables: &[Table],
        sink: &dyn RowSink,
        cancel: CancellationToken,
    ) -> Result<()> {
        let start = Instant::now();
        self.stats = SyncStats::new();
        for table in tables {
            self.stats
                .tables
                .insert(table.name().to_string(), Default::default());
        }

        let extractor = Extractor::new(self.gateway.as_ref(), cancel);
        let mut result = Ok(());

        for table in tables {
            let metrics = self.stats.tables.entry(table.name().to_string()).or_default();
            if let Err(e) = extractor.run(&table.schema, &table.meta, sink, metrics).await {
                if e.is_cancelled() {
                    warn!(table = %table.name(), "sync cancelled");
                } else {
                    error!(table = %table.name(), error = %e, "table sync failed");
                }
                result = Err(Error::table(table.name(), e));
                break;
            }
        }

        self.stats.set_duration(start.elapsed().as_millis() as u64);
        info!(
            tables = tables.len(),
            resources = self.stats.total_resources(),
            errors = self.stats.total_errors(),
            duration_ms = self.stats.duration_ms,
            "sync finished"
        );
        result
    }
}
