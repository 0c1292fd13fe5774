//! Table schema building

use super::mapping::{effective_type, map_type};
use super::normalize::normalize;
use super::select::Selector;
use super::types::{Column, ColumnMeta, SemanticType, TableMeta, TableSchema};
use crate::error::Result;
use crate::gateway::SharePointGateway;
use crate::spec::Spec;
use std::collections::{BTreeMap, HashMap, HashSet};
use tracing::{debug, info};

/// Name of the synthesized primary-key column
pub const PK_COLUMN: &str = "sharepoint_listrow_id";

/// Prefix of every emitted table name
pub const TABLE_PREFIX: &str = "sharepoint_";

/// Table name for a list title
pub fn table_name(title: &str) -> String {
    format!("{TABLE_PREFIX}{}", normalize(title))
}

/// Assigns unique column names within one table
///
/// The first occurrence of a name is kept as is; later ones get `_<n>`
/// where `n` is the number of prior occurrences. A suffixed name that is
/// itself already taken keeps counting up.
#[derive(Debug, Default)]
pub struct ColumnNamer {
    seen_count: HashMap<String, usize>,
    taken: HashSet<String>,
}

impl ColumnNamer {
    /// Create a namer with nothing seen yet
    pub fn new() -> Self {
        Self::default()
    }

    /// Reserve a name without counting it as an occurrence
    pub fn reserve(&mut self, name: impl Into<String>) {
        self.taken.insert(name.into());
    }

    /// Next unique column name for `base`
    pub fn assign(&mut self, base: &str) -> String {
        let count = self.seen_count.entry(base.to_string()).or_insert(0);
        let mut candidate = if *count == 0 {
            base.to_string()
        } else {
            format!("{base}_{count}")
        };
        *count += 1;

        while self.taken.contains(&candidate) {
            candidate = format!("{base}_{count}");
            *count += 1;
        }
        self.taken.insert(candidate.clone());
        candidate
    }
}

/// Builds a `TableSchema` and its `TableMeta` for one list
#[derive(Debug, Clone)]
pub struct SchemaBuilder {
    selector: Selector,
    overrides: BTreeMap<String, String>,
}

impl SchemaBuilder {
    /// Create a builder from its parts
    pub fn new(selector: Selector, overrides: BTreeMap<String, String>) -> Self {
        Self {
            selector,
            overrides,
        }
    }

    /// Builder for a prepared spec
    pub fn from_spec(spec: &Spec) -> Self {
        Self::new(Selector::from_spec(spec), spec.field_overrides.clone())
    }

    /// Build the schema of list `title`
    ///
    /// Returns `Ok(None)` when the list's fields are not found.
    pub async fn build(
        &self,
        gateway: &dyn SharePointGateway,
        title: &str,
    ) -> Result<Option<(TableSchema, TableMeta)>> {
        let fields = match gateway.list_fields(title).await {
            Ok(fields) => fields,
            Err(e) if e.is_not_found() => {
                info!(list = %title, "list not found, skipping");
                return Ok(None);
            }
            Err(e) => return Err(e),
        };

        let mut schema = TableSchema::new(table_name(title), title);
        let mut meta = TableMeta::new(title);
        let mut namer = ColumnNamer::new();

        namer.reserve(PK_COLUMN);
        schema
            .columns
            .push(Column::new(PK_COLUMN, SemanticType::Uuid).primary_key());

        for field in &fields {
            if !self.selector.should_select(title, &field.internal_name) {
                continue;
            }

            let name = namer.assign(&normalize(&field.internal_name));
            let semantic_type = map_type(field, &self.overrides);
            schema.columns.push(
                Column::new(name.clone(), semantic_type).with_description(field.description.clone()),
            );
            meta.column_map.insert(
                name,
                ColumnMeta {
                    sharepoint_name: field.internal_name.clone(),
                    sharepoint_type: effective_type(field, &self.overrides).to_string(),
                },
            );
        }

        debug!(
            list = %title,
            table = %schema.name,
            columns = schema.columns.len(),
            fields = fields.len(),
            "built table schema"
        );
        Ok(Some((schema, meta)))
    }
}
