//! Schema module
//!
//! Turns SharePoint list metadata into relational table schemas.
//!
//! # Overview
//!
//! - **Normalization**: list titles and field names -> snake_case identifiers
//! - **Type Mapping**: SharePoint field types -> semantic column types, with overrides
//! - **Selection**: include/ignore rules per list and field
//! - **Building**: one `TableSchema` + `TableMeta` per list, with collision-free column names

mod builder;
mod mapping;
mod normalize;
mod select;
mod types;

pub use builder::{table_name, ColumnNamer, SchemaBuilder, PK_COLUMN, TABLE_PREFIX};
pub use mapping::{effective_type, map_sharepoint_type, map_type};
pub use normalize::normalize;
pub use select::Selector;
pub use types::{Column, ColumnMeta, SemanticType, TableMeta, TableSchema};

#[cfg(test)]
mod tests;
