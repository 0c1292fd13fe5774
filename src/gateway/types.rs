//! Gateway types

use bytes::Bytes;
use serde::{Deserialize, Deserializer, Serialize};

/// A list as returned by list enumeration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct ListDescriptor {
    /// List title
    pub title: String,
}

impl ListDescriptor {
    /// Create a descriptor
    pub fn new(title: impl Into<String>) -> Self {
        Self {
            title: title.into(),
        }
    }
}

/// Field (column) definition of a SharePoint list
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct FieldInfo {
    /// Stable machine name, the key used in item payloads
    pub internal_name: String,

    /// Display title
    #[serde(default, deserialize_with = "null_as_default")]
    pub title: String,

    /// Field description
    #[serde(default, deserialize_with = "null_as_default")]
    pub description: String,

    /// SharePoint type name (e.g. `Text`, `Counter`, `Lookup`)
    pub type_as_string: String,

    /// Numeric SharePoint field kind
    #[serde(default)]
    pub field_type_kind: i64,

    /// Field GUID
    #[serde(default, deserialize_with = "null_as_default")]
    pub id: String,
}

impl FieldInfo {
    /// Create a field with internal name and type; title mirrors the internal name
    pub fn new(internal_name: impl Into<String>, type_as_string: impl Into<String>) -> Self {
        let internal_name = internal_name.into();
        Self {
            title: internal_name.clone(),
            internal_name,
            type_as_string: type_as_string.into(),
            ..Self::default()
        }
    }

    /// Set description
    #[must_use]
    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }
}

fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

/// One page of list items
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ItemPage {
    /// JSON array of item objects
    items_json: Bytes,
    /// Continuation link, if more pages exist
    next_link: Option<String>,
}

impl ItemPage {
    /// Create a page
    pub fn new(items_json: impl Into<Bytes>, next_link: Option<String>) -> Self {
        Self {
            items_json: items_json.into(),
            next_link,
        }
    }

    /// Raw JSON array of the page's items
    pub fn items_json(&self) -> &[u8] {
        &self.items_json
    }

    /// Whether another page follows
    pub fn has_next_page(&self) -> bool {
        self.next_link.is_some()
    }

    /// Continuation link
    pub fn next_link(&self) -> Option<&str> {
        self.next_link.as_deref()
    }
}
