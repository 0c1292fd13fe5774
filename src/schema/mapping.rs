//! SharePoint field type -> semantic type

use super::types::SemanticType;
use crate::gateway::FieldInfo;
use crate::spec::ID_FIELD;
use std::collections::BTreeMap;
use tracing::warn;

/// The type string a field is treated as, after overrides
///
/// `Id` is always `Integer`; otherwise an override for the field's internal
/// name replaces the reported `TypeAsString`.
pub fn effective_type<'a>(field: &'a FieldInfo, overrides: &'a BTreeMap<String, String>) -> &'a str {
    if field.internal_name == ID_FIELD {
        return "Integer";
    }
    overrides
        .get(&field.internal_name)
        .map_or(field.type_as_string.as_str(), String::as_str)
}

/// Map a SharePoint type string to a semantic type
///
/// Returns `None` for types this source does not know about.
pub fn map_sharepoint_type(sharepoint_type: &str) -> Option<SemanticType> {
    let ty = match sharepoint_type {
        "Text" | "Note" | "ContentTypeId" | "Choice" => SemanticType::String,
        // Currency values are emitted as formatted decimal strings
        "Currency" => SemanticType::String,
        "Integer" | "Counter" => SemanticType::Int64,
        "Number" => SemanticType::Float64,
        "DateTime" => SemanticType::Timestamp,
        "Boolean" => SemanticType::Bool,
        "Guid" => SemanticType::Uuid,
        "Lookup" => SemanticType::Int64Array,
        "MultiChoice" => SemanticType::StringArray,
        "User" | "Computed" => SemanticType::Json,
        _ => return None,
    };
    Some(ty)
}

/// Map a field to its semantic column type, honoring overrides
pub fn map_type(field: &FieldInfo, overrides: &BTreeMap<String, String>) -> SemanticType {
    let ty = effective_type(field, overrides);
    map_sharepoint_type(ty).unwrap_or_else(|| {
        warn!(
            sharepoint_type = ty,
            kind = field.field_type_kind,
            field_title = %field.title,
            field_id = %field.id,
            "unknown type, assuming JSON"
        );
        SemanticType::Json
    })
}
