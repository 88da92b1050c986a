//! Integration tests for `Link` header pagination

use wiremock::matchers::{header, method, path, query_param};
use wiremock::{Mock, ResponseTemplate};

use canvas_sync_api::pagination::fetch_first_page;
use canvas_sync_api::{ApiError, CursorDirection};

use crate::common::{file_json, link_header, mount_paginated, setup, COURSE_ID, TOKEN};

fn files_route() -> String {
    format!("/api/v1/courses/{COURSE_ID}/files")
}

#[tokio::test]
async fn test_cursor_walks_forward_then_exhausts() {
    let (server, client) = setup().await;
    let route = files_route();
    mount_paginated(
        &server,
        &route,
        vec![
            serde_json::json!([file_json(1, "a.pdf", 0)]),
            serde_json::json!([file_json(2, "b.pdf", 0)]),
            serde_json::json!([file_json(3, "c.pdf", 0)]),
        ],
    )
    .await;

    let url = format!("{}{}", server.uri(), route);
    let page = fetch_first_page::<serde_json::Value>(&client, &url)
        .await
        .expect("first page");
    assert_eq!(page.items.len(), 1);
    let mut cursor = page.cursor.expect("paginated listing");
    assert!(cursor.has_next());
    assert!(!cursor.has_prev());

    let second = cursor.advance().await.expect("second page");
    assert_eq!(second[0]["id"], 2);
    assert!(cursor.has_next());
    assert!(cursor.has_prev());

    let third = cursor.advance().await.expect("third page");
    assert_eq!(third[0]["id"], 3);
    assert!(!cursor.has_next());

    let err = cursor.advance().await.unwrap_err();
    assert!(matches!(
        err,
        ApiError::ExhaustedCursor {
            direction: CursorDirection::Next
        }
    ));
}

#[tokio::test]
async fn test_cursor_retreats_to_previous_page() {
    let (server, client) = setup().await;
    let route = files_route();
    let base = format!("{}{}", server.uri(), route);

    Mock::given(method("GET"))
        .and(path(route.as_str()))
        .and(query_param("page", "2"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(serde_json::json!([file_json(2, "b.pdf", 0)]))
                .insert_header("Link", link_header(&base, 2, 2).as_str()),
        )
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path(route.as_str()))
        .and(query_param("page", "1"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(serde_json::json!([file_json(1, "a.pdf", 0)]))
                .insert_header("Link", link_header(&base, 1, 2).as_str()),
        )
        .expect(1)
        .mount(&server)
        .await;

    let url = format!("{base}?page=2&per_page=2");
    let page = fetch_first_page::<serde_json::Value>(&client, &url)
        .await
        .expect("last page");
    let mut cursor = page.cursor.expect("paginated listing");
    assert!(!cursor.has_next());
    assert!(cursor.has_prev());

    let first = cursor.retreat().await.expect("first page");
    assert_eq!(first[0]["id"], 1);
    assert!(!cursor.has_prev());
    assert!(cursor.has_next());
}

#[tokio::test]
async fn test_single_page_without_link_header() {
    let (server, client) = setup().await;
    let route = files_route();

    Mock::given(method("GET"))
        .and(path(route.as_str()))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(serde_json::json!([file_json(9, "x", 0)])),
        )
        .mount(&server)
        .await;

    let url = format!("{}{}", server.uri(), route);
    let page = fetch_first_page::<serde_json::Value>(&client, &url)
        .await
        .expect("page");
    assert_eq!(page.items.len(), 1);
    assert!(page.cursor.is_none());
}

#[tokio::test]
async fn test_requests_carry_bearer_token_and_per_page() {
    let (server, client) = setup().await;
    let client = client.with_per_page(2);
    let route = files_route();

    Mock::given(method("GET"))
        .and(path(route.as_str()))
        .and(query_param("per_page", "2"))
        .and(header("authorization", format!("Bearer {TOKEN}").as_str()))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!([])))
        .expect(1)
        .mount(&server)
        .await;

    let url = client.build_url(&route).expect("url");
    let page = fetch_first_page::<serde_json::Value>(&client, &url)
        .await
        .expect("page");
    assert!(page.items.is_empty());
}

#[tokio::test]
async fn test_non_200_status_carries_body() {
    let (server, client) = setup().await;
    let route = files_route();

    Mock::given(method("GET"))
        .and(path(route.as_str()))
        .respond_with(ResponseTemplate::new(401).set_body_string(
            r#"{"errors":[{"message":"Invalid access token."}]}"#,
        ))
        .mount(&server)
        .await;

    let url = format!("{}{}", server.uri(), route);
    let err = fetch_first_page::<serde_json::Value>(&client, &url)
        .await
        .unwrap_err();
    match err {
        ApiError::HttpStatus { status, body, .. } => {
            assert_eq!(status.as_u16(), 401);
            assert!(body.contains("Invalid access token."));
        }
        other => panic!("expected HttpStatus, got {other:?}"),
    }
}

#[tokio::test]
async fn test_non_200_success_status_is_still_an_error() {
    let (server, client) = setup().await;
    let route = files_route();

    Mock::given(method("GET"))
        .and(path(route.as_str()))
        .respond_with(ResponseTemplate::new(204))
        .mount(&server)
        .await;

    let url = format!("{}{}", server.uri(), route);
    let err = fetch_first_page::<serde_json::Value>(&client, &url)
        .await
        .unwrap_err();
    assert!(matches!(err, ApiError::HttpStatus { status, .. } if status.as_u16() == 204));
}

#[tokio::test]
async fn test_malformed_body_is_decode_error() {
    let (server, client) = setup().await;
    let route = files_route();

    Mock::given(method("GET"))
        .and(path(route.as_str()))
        .respond_with(ResponseTemplate::new(200).set_body_string("<html>maintenance</html>"))
        .mount(&server)
        .await;

    let url = format!("{}{}", server.uri(), route);
    let err = fetch_first_page::<serde_json::Value>(&client, &url)
        .await
        .unwrap_err();
    assert!(matches!(err, ApiError::Decode { .. }));
}
