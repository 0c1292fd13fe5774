//! Engine types

use crate::extract::TableMetrics;
use crate::schema::{TableMeta, TableSchema};
use serde::Serialize;
use std::collections::BTreeMap;

/// A list resolved to a table: its schema plus how to fill it
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Table {
    /// Emitted schema
    pub schema: TableSchema,
    /// Upstream mapping
    pub meta: TableMeta,
}

impl Table {
    /// Pair a schema with its metadata
    pub fn new(schema: TableSchema, meta: TableMeta) -> Self {
        Self { schema, meta }
    }

    /// Table name
    pub fn name(&self) -> &str {
        &self.schema.name
    }
}

impl From<(TableSchema, TableMeta)> for Table {
    fn from((schema, meta): (TableSchema, TableMeta)) -> Self {
        Self::new(schema, meta)
    }
}

/// Statistics from a sync run
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct SyncStats {
    /// Metrics per table name
    pub tables: BTreeMap<String, TableMetrics>,
    /// Duration in milliseconds
    pub duration_ms: u64,
}

impl SyncStats {
    /// Create new stats
    pub fn new() -> Self {
        Self::default()
    }

    /// Metrics of one table
    pub fn table(&self, name: &str) -> Option<&TableMetrics> {
        self.tables.get(name)
    }

    /// Rows emitted across all tables
    pub fn total_resources(&self) -> u64 {
        self.tables.values().map(|m| m.resources).sum()
    }

    /// Failures across all tables
    pub fn total_errors(&self) -> u64 {
        self.tables.values().map(|m| m.errors).sum()
    }

    /// Set duration
    pub fn set_duration(&mut self, ms: u64) {
        self.duration_ms = ms;
    }
}
