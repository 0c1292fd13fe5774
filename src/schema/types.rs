//! Schema types

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Semantic column type, independent of any storage format
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SemanticType {
    /// Text
    String,
    /// 64-bit integer
    Int64,
    /// 64-bit float
    Float64,
    /// Point in time, UTC
    Timestamp,
    /// Boolean
    Bool,
    /// UUID in its text form
    Uuid,
    /// List of integers (lookup ids)
    Int64Array,
    /// List of strings
    StringArray,
    /// Arbitrary JSON
    Json,
}

impl std::fmt::Display for SemanticType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SemanticType::String => write!(f, "string"),
            SemanticType::Int64 => write!(f, "int64"),
            SemanticType::Float64 => write!(f, "float64"),
            SemanticType::Timestamp => write!(f, "timestamp"),
            SemanticType::Bool => write!(f, "bool"),
            SemanticType::Uuid => write!(f, "uuid"),
            SemanticType::Int64Array => write!(f, "int64[]"),
            SemanticType::StringArray => write!(f, "string[]"),
            SemanticType::Json => write!(f, "json"),
        }
    }
}

/// A column of a table schema
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Column {
    /// Column name
    pub name: String,

    /// Column description (the field description upstream)
    #[serde(default)]
    pub description: String,

    /// Column type
    #[serde(rename = "type")]
    pub semantic_type: SemanticType,

    /// Whether the column is the table's primary key
    #[serde(default)]
    pub is_primary_key: bool,
}

impl Column {
    /// Create a new non-key column
    pub fn new(name: impl Into<String>, semantic_type: SemanticType) -> Self {
        Self {
            name: name.into(),
            description: String::new(),
            semantic_type,
            is_primary_key: false,
        }
    }

    /// Set description
    #[must_use]
    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }

    /// Mark as primary key
    #[must_use]
    pub fn primary_key(mut self) -> Self {
        self.is_primary_key = true;
        self
    }
}

/// Relational schema derived from one SharePoint list
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TableSchema {
    /// Table name (`sharepoint_<normalized title>`)
    pub name: String,

    /// Table description (the original list title)
    pub description: String,

    /// Ordered columns; the first one is always the primary key
    pub columns: Vec<Column>,
}

impl TableSchema {
    /// Create an empty schema
    pub fn new(name: impl Into<String>, description: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            description: description.into(),
            columns: Vec::new(),
        }
    }

    /// Get a column by name
    pub fn column(&self, name: &str) -> Option<&Column> {
        self.columns.iter().find(|c| c.name == name)
    }

    /// Column names in order
    pub fn column_names(&self) -> Vec<&str> {
        self.columns.iter().map(|c| c.name.as_str()).collect()
    }

    /// Index of the primary key column
    pub fn primary_key_index(&self) -> Option<usize> {
        self.columns.iter().position(|c| c.is_primary_key)
    }
}

/// Where a column's values come from upstream
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ColumnMeta {
    /// Field internal name in the list item payload
    pub sharepoint_name: String,

    /// Effective SharePoint type (after overrides)
    pub sharepoint_type: String,
}

/// Extraction metadata paired with a `TableSchema`
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct TableMeta {
    /// Original list title, used to address the list upstream
    pub title: String,

    /// Table column name -> upstream field
    pub column_map: BTreeMap<String, ColumnMeta>,
}

impl TableMeta {
    /// Create empty metadata for a list
    pub fn new(title: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            column_map: BTreeMap::new(),
        }
    }
}
