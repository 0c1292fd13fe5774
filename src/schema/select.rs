//! Field selection

use crate::spec::Spec;
use std::collections::{HashMap, HashSet};

/// Decides which fields of which list end up as columns
///
/// Membership is exact and case-sensitive on field internal names.
#[derive(Debug, Clone, Default)]
pub struct Selector {
    list_fields: HashMap<String, HashSet<String>>,
    default_fields: HashSet<String>,
    ignore_fields: HashSet<String>,
}

impl Selector {
    /// Build a selector from a prepared spec
    pub fn from_spec(spec: &Spec) -> Self {
        Self {
            list_fields: spec
                .list_fields
                .iter()
                .filter(|(_, fields)| !fields.is_empty())
                .map(|(list, fields)| (list.clone(), fields.iter().cloned().collect()))
                .collect(),
            default_fields: spec.default_fields.iter().cloned().collect(),
            ignore_fields: spec.ignore_fields.iter().cloned().collect(),
        }
    }

    /// Whether `field` of list `list_title` is emitted
    pub fn should_select(&self, list_title: &str, field: &str) -> bool {
        if self.ignore_fields.contains(field) {
            return false;
        }
        match self.list_fields.get(list_title) {
            Some(selected) => selected.contains(field),
            None => self.default_fields.contains(field),
        }
    }
}
