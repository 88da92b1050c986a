//! Integration tests for the GraphQL module listing

use wiremock::matchers::{body_string_contains, header, method, path};
use wiremock::{Mock, ResponseTemplate};

use canvas_sync_api::modules::fetch_all_module_items;
use canvas_sync_api::ApiError;
use canvas_sync_core::domain::ModuleItem;

use crate::common::{page_cursor_is, setup, COURSE_ID};

fn connection(
    nodes: serde_json::Value,
    has_next: bool,
    end_cursor: Option<&str>,
) -> serde_json::Value {
    serde_json::json!({
        "data": {"course": {"modulesConnection": {
            "nodes": nodes,
            "pageInfo": {"hasNextPage": has_next, "endCursor": end_cursor}
        }}}
    })
}

fn file_item(id: &str, name: &str, module: &str) -> serde_json::Value {
    serde_json::json!({"content": {
        "__typename": "File", "id": format!("RmlsZS0{id}"), "_id": id,
        "displayName": name, "modules": [{"name": module}]
    }})
}

fn sub_header(title: &str, module: &str) -> serde_json::Value {
    serde_json::json!({"content": {
        "__typename": "SubHeader", "title": title, "modules": [{"name": module}]
    }})
}

#[tokio::test]
async fn test_walks_connection_pages_in_order() {
    let (server, client) = setup().await;

    Mock::given(method("POST"))
        .and(path("/api/graphql"))
        .and(page_cursor_is(""))
        .and(body_string_contains(format!("variables%5BcourseId%5D={COURSE_ID}").as_str()))
        .and(header("content-type", "application/x-www-form-urlencoded"))
        .respond_with(ResponseTemplate::new(200).set_body_json(connection(
            serde_json::json!([{"name": "Week 1", "id": "m1", "moduleItems": [
                sub_header("Readings", "Week 1"),
                file_item("11", "a.pdf", "Week 1")
            ]}]),
            true,
            Some("MQ"),
        )))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/api/graphql"))
        .and(page_cursor_is("MQ"))
        .respond_with(ResponseTemplate::new(200).set_body_json(connection(
            serde_json::json!([{"name": "Week 2", "id": "m2", "moduleItems": [
                {"content": {}},
                file_item("12", "b.pdf", "Week 2")
            ]}]),
            false,
            Some("Mg"),
        )))
        .expect(1)
        .mount(&server)
        .await;

    let items = fetch_all_module_items(&client, COURSE_ID)
        .await
        .expect("module items");
    assert_eq!(items.len(), 4);
    assert!(matches!(&items[0], ModuleItem::SubHeader { title, .. } if title == "Readings"));
    assert!(matches!(&items[1], ModuleItem::File { legacy_id, .. } if legacy_id == "11"));
    assert!(matches!(&items[2], ModuleItem::Other { .. }));
    assert!(matches!(&items[3], ModuleItem::File { legacy_id, .. } if legacy_id == "12"));
}

#[tokio::test]
async fn test_graphql_errors_array_fails() {
    let (server, client) = setup().await;

    Mock::given(method("POST"))
        .and(path("/api/graphql"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "data": null,
            "errors": [{"message": "not authorized"}]
        })))
        .mount(&server)
        .await;

    let err = fetch_all_module_items(&client, COURSE_ID).await.unwrap_err();
    match err {
        ApiError::GraphQl { messages, .. } => assert_eq!(messages, vec!["not authorized"]),
        other => panic!("expected GraphQl, got {other:?}"),
    }
}

#[tokio::test]
async fn test_unknown_course_fails() {
    let (server, client) = setup().await;

    Mock::given(method("POST"))
        .and(path("/api/graphql"))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(serde_json::json!({"data": {"course": null}})),
        )
        .mount(&server)
        .await;

    let err = fetch_all_module_items(&client, COURSE_ID).await.unwrap_err();
    assert!(matches!(err, ApiError::GraphQl { .. }));
}

#[tokio::test]
async fn test_stuck_cursor_is_reported_not_refetched() {
    let (server, client) = setup().await;

    Mock::given(method("POST"))
        .and(path("/api/graphql"))
        .respond_with(ResponseTemplate::new(200).set_body_json(connection(
            serde_json::json!([]),
            true,
            None,
        )))
        .expect(1)
        .mount(&server)
        .await;

    let err = fetch_all_module_items(&client, COURSE_ID).await.unwrap_err();
    assert!(err.to_string().contains("without a new endCursor"));
}

#[tokio::test]
async fn test_http_failure_propagates() {
    let (server, client) = setup().await;

    Mock::given(method("POST"))
        .and(path("/api/graphql"))
        .respond_with(ResponseTemplate::new(502).set_body_string("bad gateway"))
        .mount(&server)
        .await;

    let err = fetch_all_module_items(&client, COURSE_ID).await.unwrap_err();
    assert!(matches!(err, ApiError::HttpStatus { .. }));
}
