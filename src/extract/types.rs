//! Extraction types

use crate::types::JsonValue;
use serde::{Deserialize, Serialize};

/// One converted list item
///
/// `values` is aligned with the columns of the table's schema.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Row {
    /// Table name
    pub table: String,
    /// Column values in schema order
    pub values: Vec<JsonValue>,
}

impl Row {
    /// Create a row
    pub fn new(table: impl Into<String>, values: Vec<JsonValue>) -> Self {
        Self {
            table: table.into(),
            values,
        }
    }

    /// Number of values
    pub fn len(&self) -> usize {
        self.values.len()
    }

    /// Whether the row has no values
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}

/// Per-table counters of a sync run
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TableMetrics {
    /// Rows accepted by the sink
    pub resources: u64,
    /// Failures while syncing the table
    pub errors: u64,
}

impl TableMetrics {
    /// Create zeroed metrics
    pub fn new() -> Self {
        Self::default()
    }

    /// Count an emitted row
    pub fn add_resource(&mut self) {
        self.resources += 1;
    }

    /// Count a failure
    pub fn add_error(&mut self) {
        self.errors += 1;
    }
}
