//! Schema tests

use super::*;
use crate::gateway::{FieldInfo, MemoryGateway, PageFault, SharePointGateway};
use crate::spec::Spec;
use pretty_assertions::assert_eq;
use proptest::prelude::*;
use std::collections::{BTreeMap, HashSet};
use test_case::test_case;

fn spec() -> Spec {
    Spec {
        site_url: "https://contoso.sharepoint.com/sites/ops".to_string(),
        client_id: "id".to_string(),
        client_secret: "secret".to_string(),
        ..Spec::default()
    }
    .prepare()
    .unwrap()
}

fn field(name: &str, ty: &str) -> FieldInfo {
    FieldInfo::new(name, ty)
}

// ============================================================================
// Normalization
// ============================================================================

#[test_case("My Tasks", "my_tasks")]
#[test_case("A-B", "a_b")]
#[test_case("a_b", "a_b")]
#[test_case("DueDate", "due_date")]
#[test_case("AuthorId", "author_id")]
#[test_case("Title", "title")]
#[test_case("Id", "id")]
#[test_case("", "")]
fn test_normalize(input: &str, expected: &str) {
    assert_eq!(normalize(input), expected);
}

#[test]
fn test_table_name() {
    assert_eq!(table_name("My Tasks"), "sharepoint_my_tasks");
    assert_eq!(table_name("A-B"), table_name("a_b"));
}

proptest! {
    #[test]
    fn prop_normalize_is_idempotent(s in "\\PC{0,24}") {
        let once = normalize(&s);
        prop_assert_eq!(normalize(&once), once);
    }
}

// ============================================================================
// Type mapping
// ============================================================================

#[test_case("Text", SemanticType::String)]
#[test_case("Note", SemanticType::String)]
#[test_case("ContentTypeId", SemanticType::String)]
#[test_case("Choice", SemanticType::String)]
#[test_case("Currency", SemanticType::String)]
#[test_case("Integer", SemanticType::Int64)]
#[test_case("Counter", SemanticType::Int64)]
#[test_case("Number", SemanticType::Float64)]
#[test_case("DateTime", SemanticType::Timestamp)]
#[test_case("Boolean", SemanticType::Bool)]
#[test_case("Guid", SemanticType::Uuid)]
#[test_case("Lookup", SemanticType::Int64Array)]
#[test_case("MultiChoice", SemanticType::StringArray)]
#[test_case("User", SemanticType::Json)]
#[test_case("Computed", SemanticType::Json)]
fn test_map_sharepoint_type(sharepoint_type: &str, expected: SemanticType) {
    assert_eq!(map_sharepoint_type(sharepoint_type), Some(expected));
    assert_eq!(
        map_type(&field("F", sharepoint_type), &BTreeMap::new()),
        expected
    );
}

#[test]
fn test_unknown_type_is_json() {
    assert_eq!(map_sharepoint_type("TaxonomyFieldType"), None);
    assert_eq!(
        map_type(&field("Tags", "TaxonomyFieldType"), &BTreeMap::new()),
        SemanticType::Json
    );
}

#[test]
fn test_override_precedence() {
    let overrides = BTreeMap::from([("Score".to_string(), "Integer".to_string())]);
    let score = field("Score", "Text");

    assert_eq!(effective_type(&score, &overrides), "Integer");
    assert_eq!(map_type(&score, &overrides), SemanticType::Int64);
}

#[test]
fn test_id_is_always_integer() {
    let overrides = BTreeMap::from([("Id".to_string(), "Text".to_string())]);
    let id = field("Id", "Counter");

    assert_eq!(effective_type(&id, &overrides), "Integer");
    assert_eq!(map_type(&id, &overrides), SemanticType::Int64);
}

// ============================================================================
// Selection
// ============================================================================

#[test]
fn test_selector_defaults() {
    let selector = Selector::from_spec(&spec());

    assert!(selector.should_select("Tasks", "Id"));
    assert!(selector.should_select("Tasks", "Title"));
    assert!(!selector.should_select("Tasks", "DueDate"));
    assert!(!selector.should_select("Tasks", "__metadata"));
    assert!(!selector.should_select("Tasks", "version"));
    // Exact, case-sensitive
    assert!(!selector.should_select("Tasks", "title"));
}

#[test]
fn test_selector_list_fields() {
    let spec = Spec {
        lists: vec!["Tasks".to_string(), "Docs".to_string()],
        list_fields: BTreeMap::from([
            ("Tasks".to_string(), vec!["DueDate".to_string()]),
            ("Docs".to_string(), vec![]),
        ]),
        ignore_fields: vec!["__metadata".to_string(), "Secret".to_string()],
        ..spec()
    }
    .prepare()
    .unwrap();
    let selector = Selector::from_spec(&spec);

    assert!(selector.should_select("Tasks", "DueDate"));
    assert!(selector.should_select("Tasks", "Id"));
    assert!(!selector.should_select("Tasks", "Title"));
    // Empty entry falls back to the defaults
    assert!(selector.should_select("Docs", "Title"));
    assert!(!selector.should_select("Docs", "DueDate"));
    assert!(!selector.should_select("Tasks", "Secret"));
}

// ============================================================================
// Column naming
// ============================================================================

#[test]
fn test_column_namer_suffixes() {
    let mut namer = ColumnNamer::new();
    assert_eq!(namer.assign("foo"), "foo");
    assert_eq!(namer.assign("foo"), "foo_1");
    assert_eq!(namer.assign("foo"), "foo_2");
    assert_eq!(namer.assign("bar"), "bar");
}

#[test]
fn test_column_namer_skips_taken_suffix() {
    let mut namer = ColumnNamer::new();
    assert_eq!(namer.assign("foo_1"), "foo_1");
    assert_eq!(namer.assign("foo"), "foo");
    assert_eq!(namer.assign("foo"), "foo_2");
}

#[test]
fn test_column_namer_reserved() {
    let mut namer = ColumnNamer::new();
    namer.reserve(PK_COLUMN);
    assert_eq!(namer.assign(PK_COLUMN), format!("{PK_COLUMN}_1"));
}

// ============================================================================
// SchemaBuilder
// ============================================================================

#[tokio::test]
async fn test_build_simple_list() {
    let gateway = MemoryGateway::new().with_list(
        "My Tasks",
        vec![
            field("Id", "Counter"),
            field("Title", "Text").with_description("Task name"),
            field("DueDate", "DateTime"),
        ],
        vec![],
    );

    let (schema, meta) = SchemaBuilder::from_spec(&spec())
        .build(&gateway, "My Tasks")
        .await
        .unwrap()
        .unwrap();

    assert_eq!(schema.name, "sharepoint_my_tasks");
    assert_eq!(schema.description, "My Tasks");
    assert_eq!(
        schema.columns,
        vec![
            Column::new(PK_COLUMN, SemanticType::Uuid).primary_key(),
            Column::new("id", SemanticType::Int64),
            Column::new("title", SemanticType::String).with_description("Task name"),
        ]
    );

    assert_eq!(meta.title, "My Tasks");
    assert_eq!(meta.column_map.len(), 2);
    assert!(!meta.column_map.contains_key(PK_COLUMN));
    assert_eq!(
        meta.column_map["id"],
        ColumnMeta {
            sharepoint_name: "Id".to_string(),
            sharepoint_type: "Integer".to_string(),
        }
    );
    assert_eq!(meta.column_map["title"].sharepoint_type, "Text");
}

#[tokio::test]
async fn test_build_column_collision() {
    let spec = Spec {
        lists: vec!["L".to_string()],
        list_fields: BTreeMap::from([(
            "L".to_string(),
            vec!["FooBar".to_string(), "foo_bar".to_string()],
        )]),
        ..spec()
    }
    .prepare()
    .unwrap();
    let gateway = MemoryGateway::new().with_list(
        "L",
        vec![field("FooBar", "Text"), field("foo_bar", "Number")],
        vec![],
    );

    let (schema, meta) = SchemaBuilder::from_spec(&spec)
        .build(&gateway, "L")
        .await
        .unwrap()
        .unwrap();

    assert_eq!(
        schema.column_names(),
        vec![PK_COLUMN, "id", "foo_bar", "foo_bar_1"]
    );
    assert_eq!(meta.column_map["foo_bar"].sharepoint_name, "FooBar");
    assert_eq!(meta.column_map["foo_bar_1"].sharepoint_name, "foo_bar");
    assert_eq!(
        schema.column("foo_bar_1").unwrap().semantic_type,
        SemanticType::Float64
    );
}

#[tokio::test]
async fn test_build_applies_default_overrides() {
    let gateway = MemoryGateway::new().with_list(
        "L",
        vec![field("AuthorId", "Lookup"), field("FSObjType", "Lookup")],
        vec![],
    );

    let (schema, meta) = SchemaBuilder::from_spec(&spec())
        .build(&gateway, "L")
        .await
        .unwrap()
        .unwrap();

    assert_eq!(
        schema.column("author_id").unwrap().semantic_type,
        SemanticType::Int64
    );
    let fs_obj_type = meta
        .column_map
        .values()
        .find(|m| m.sharepoint_name == "FSObjType")
        .unwrap();
    assert_eq!(fs_obj_type.sharepoint_type, "Integer");
}

#[tokio::test]
async fn test_build_not_found_is_skipped() {
    let gateway = MemoryGateway::new().with_missing_list("Gone");
    let builder = SchemaBuilder::from_spec(&spec());

    assert!(builder.build(&gateway, "Gone").await.unwrap().is_none());
    assert!(builder.build(&gateway, "Never").await.unwrap().is_none());
}

#[tokio::test]
async fn test_build_propagates_other_errors() {
    struct Failing;

    #[async_trait::async_trait]
    impl SharePointGateway for Failing {
        async fn list_all(&self) -> crate::Result<Vec<crate::gateway::ListDescriptor>> {
            Ok(vec![])
        }
        async fn list_fields(&self, _title: &str) -> crate::Result<Vec<FieldInfo>> {
            Err(crate::Error::http_status(500, "boom"))
        }
        async fn list_items_paged(&self, title: &str) -> crate::Result<crate::gateway::ItemPage> {
            MemoryGateway::new().list_items_paged(title).await
        }
        async fn next_page(
            &self,
            page: &crate::gateway::ItemPage,
        ) -> crate::Result<crate::gateway::ItemPage> {
            MemoryGateway::new().next_page(page).await
        }
    }

    let err = SchemaBuilder::from_spec(&spec())
        .build(&Failing, "L")
        .await
        .unwrap_err();
    assert!(!err.is_not_found());
}

#[tokio::test]
async fn test_build_columns_unique_and_pk_first() {
    let names = ["Id", "Title", "title", "TITLE", "Ti-tle", "Ti tle", "AuthorId"];
    let spec = Spec {
        lists: vec!["L".to_string()],
        list_fields: BTreeMap::from([(
            "L".to_string(),
            names.iter().map(|n| (*n).to_string()).collect(),
        )]),
        ..spec()
    }
    .prepare()
    .unwrap();
    let gateway = MemoryGateway::new()
        .with_list(
            "L",
            names.iter().map(|n| field(n, "Text")).collect(),
            vec![],
        )
        .with_page_fault("L", 0, PageFault::NotFound);

    let (schema, meta) = SchemaBuilder::from_spec(&spec)
        .build(&gateway, "L")
        .await
        .unwrap()
        .unwrap();

    let unique: HashSet<_> = schema.column_names().into_iter().collect();
    assert_eq!(unique.len(), schema.columns.len());
    assert_eq!(schema.columns[0].name, PK_COLUMN);
    assert_eq!(schema.primary_key_index(), Some(0));
    assert_eq!(schema.columns.iter().filter(|c| c.is_primary_key).count(), 1);
    assert_eq!(meta.column_map.len(), schema.columns.len() - 1);
}
