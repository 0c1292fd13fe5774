//! Tests for the gateway module

use super::*;
use crate::error::Error;
use crate::http::{HttpClient, HttpClientConfig};
use crate::types::JsonValue;
use serde_json::json;
use wiremock::matchers::{method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn rest_gateway(server: &MockServer, page_size: u32) -> RestGateway {
    let client = HttpClient::with_config(HttpClientConfig::builder().no_rate_limit().build()).unwrap();
    RestGateway::new(
        client,
        RestGatewayConfig::new(format!("{}/sites/ops/", server.uri()), page_size),
    )
    .unwrap()
}

fn decode(page: &ItemPage) -> Vec<JsonValue> {
    serde_json::from_slice(page.items_json()).unwrap()
}

// ============================================================================
// FieldInfo
// ============================================================================

#[test]
fn test_field_info_from_verbose_payload() {
    let field: FieldInfo = serde_json::from_value(json!({
        "__metadata": {"type": "SP.FieldText"},
        "InternalName": "Title",
        "Title": "Title",
        "Description": null,
        "TypeAsString": "Text",
        "FieldTypeKind": 2,
        "Id": "fa564e0f-0c70-4ab9-b863-0177e6ddd247"
    }))
    .unwrap();

    assert_eq!(field.internal_name, "Title");
    assert_eq!(field.description, "");
    assert_eq!(field.type_as_string, "Text");
    assert_eq!(field.field_type_kind, 2);
    assert_eq!(field.id, "fa564e0f-0c70-4ab9-b863-0177e6ddd247");
}

// ============================================================================
// MemoryGateway
// ============================================================================

#[tokio::test]
async fn test_memory_gateway_pages() {
    let gateway = MemoryGateway::new().with_list(
        "Tasks",
        vec![FieldInfo::new("Id", "Counter")],
        vec![vec![json!({"Id": 1})], vec![json!({"Id": 2}), json!({"Id": 3})]],
    );

    let first = gateway.list_items_paged("Tasks").await.unwrap();
    assert_eq!(decode(&first), vec![json!({"Id": 1})]);
    assert!(first.has_next_page());

    let second = gateway.next_page(&first).await.unwrap();
    assert_eq!(decode(&second).len(), 2);
    assert!(!second.has_next_page());
}

#[tokio::test]
async fn test_memory_gateway_not_found() {
    let gateway = MemoryGateway::new().with_missing_list("Gone");

    assert_eq!(gateway.list_all().await.unwrap(), vec![ListDescriptor::new("Gone")]);
    assert!(gateway.list_fields("Gone").await.unwrap_err().is_not_found());
    assert!(gateway.list_fields("Other").await.unwrap_err().is_not_found());
}

#[tokio::test]
async fn test_memory_gateway_faults() {
    let gateway = MemoryGateway::new()
        .with_list("A", vec![], vec![vec![], vec![]])
        .with_page_fault("A", 1, PageFault::Status(500))
        .with_list_all_failure(503);

    let first = gateway.list_items_paged("A").await.unwrap();
    let err = gateway.next_page(&first).await.unwrap_err();
    assert!(matches!(err, Error::HttpStatus { status: 500, .. }));
    assert!(gateway.list_all().await.is_err());
}

// ============================================================================
// RestGateway
// ============================================================================

#[tokio::test]
async fn test_rest_list_all() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/sites/ops/_api/web/lists"))
        .and(query_param("$select", "Title"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "d": {"results": [
                {"__metadata": {"type": "SP.List"}, "Title": "Documents"},
                {"__metadata": {"type": "SP.List"}, "Title": "My Tasks"}
            ]}
        })))
        .mount(&server)
        .await;

    let lists = rest_gateway(&server, 100).list_all().await.unwrap();
    assert_eq!(
        lists,
        vec![ListDescriptor::new("Documents"), ListDescriptor::new("My Tasks")]
    );
}

#[tokio::test]
async fn test_rest_list_fields_escapes_title() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/sites/ops/_api/web/lists/getbytitle('Bob''s%20Tasks')/fields"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "d": {"results": [
                {"InternalName": "ID", "Title": "ID", "TypeAsString": "Counter", "FieldTypeKind": 5, "Id": "1d22ea11"},
                {"InternalName": "Title", "Title": "Title", "TypeAsString": "Text", "FieldTypeKind": 2, "Id": "fa564e0f"}
            ]}
        })))
        .mount(&server)
        .await;

    let fields = rest_gateway(&server, 100)
        .list_fields("Bob's Tasks")
        .await
        .unwrap();
    assert_eq!(fields.len(), 2);
    assert_eq!(fields[0].type_as_string, "Counter");
    assert_eq!(fields[1].internal_name, "Title");
}

#[tokio::test]
async fn test_rest_list_fields_not_found() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(404).set_body_json(json!({
            "error": {"code": "-1, System.ArgumentException", "message": {"value": "List 'Nope' does not exist"}}
        })))
        .mount(&server)
        .await;

    let err = rest_gateway(&server, 100)
        .list_fields("Nope")
        .await
        .unwrap_err();
    assert!(err.is_not_found());
}

#[tokio::test]
async fn test_rest_items_follow_next_link() {
    let server = MockServer::start().await;
    let next = format!(
        "{}/sites/ops/_api/web/lists/getbytitle('Tasks')/items?%24skiptoken=Paged%3dTRUE%26p_ID%3d2&%24top=2",
        server.uri()
    );

    Mock::given(method("GET"))
        .and(path("/sites/ops/_api/web/lists/getbytitle('Tasks')/items"))
        .and(query_param("$top", "2"))
        .and(query_param("$skiptoken", "Paged=TRUE&p_ID=2"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "d": {"results": [{"Id": 3}]}
        })))
        .mount(&server)
        .await;

    Mock::given(method("GET"))
        .and(path("/sites/ops/_api/web/lists/getbytitle('Tasks')/items"))
        .and(query_param("$top", "2"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "d": {"results": [
                {"__metadata": {"type": "SP.Data.TasksListItem"}, "Id": 1},
                {"__metadata": {"type": "SP.Data.TasksListItem"}, "Id": 2}
            ], "__next": next}
        })))
        .mount(&server)
        .await;

    let gateway = rest_gateway(&server, 2);
    let first = gateway.list_items_paged("Tasks").await.unwrap();
    assert_eq!(decode(&first), vec![json!({"Id": 1}), json!({"Id": 2})]);
    assert!(first.has_next_page());

    let second = gateway.next_page(&first).await.unwrap();
    assert_eq!(decode(&second), vec![json!({"Id": 3})]);
    assert!(!second.has_next_page());
}

#[tokio::test]
async fn test_rest_relative_next_link_stays_below_site() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/sites/ops/_api/web/lists/getbytitle('Tasks')/items"))
        .and(query_param("$skiptoken", "Paged=TRUE&p_ID=1"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "d": {"results": [{"Id": 2}]}
        })))
        .mount(&server)
        .await;

    Mock::given(method("GET"))
        .and(path("/sites/ops/_api/web/lists/getbytitle('Tasks')/items"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "d": {
                "results": [{"Id": 1}],
                "__next": "_api/web/lists/getbytitle('Tasks')/items?%24skiptoken=Paged%3dTRUE%26p_ID%3d1&%24top=1"
            }
        })))
        .mount(&server)
        .await;

    let gateway = rest_gateway(&server, 1);
    let first = gateway.list_items_paged("Tasks").await.unwrap();
    let second = gateway.next_page(&first).await.unwrap();

    assert_eq!(decode(&second), vec![json!({"Id": 2})]);
}

#[tokio::test]
async fn test_rest_malformed_envelope() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"value": []})))
        .mount(&server)
        .await;

    let err = rest_gateway(&server, 10)
        .list_items_paged("Tasks")
        .await
        .unwrap_err();
    assert!(matches!(err, Error::Decode { .. }));
}
