//! Integration tests for draining paginated listings

use wiremock::matchers::{method, path, query_param, query_param_is_missing};
use wiremock::{Mock, ResponseTemplate};

use canvas_sync_api::{files, ApiError};

use crate::common::{file_json, folder_json, link_header, mount_paginated, setup, COURSE_ID};

#[tokio::test]
async fn test_get_all_files_merges_every_page() {
    let (server, client) = setup().await;
    let route = format!("/api/v1/courses/{COURSE_ID}/files");
    mount_paginated(
        &server,
        &route,
        vec![
            serde_json::json!([file_json(1, "a.pdf", 5), file_json(2, "b.pdf", 5)]),
            serde_json::json!([file_json(3, "c.pdf", 6), file_json(4, "d.pdf", 6)]),
            serde_json::json!([file_json(5, "e.pdf", 0)]),
        ],
    )
    .await;

    let files = files::get_all_files(&client, COURSE_ID)
        .await
        .expect("listing");
    assert_eq!(files.len(), 5);
    assert_eq!(files[&3].display_name, "c.pdf");
    assert_eq!(files[&5].folder(), 0);
}

#[tokio::test]
async fn test_duplicate_id_on_later_page_wins() {
    let (server, client) = setup().await;
    let route = format!("/api/v1/courses/{COURSE_ID}/files");
    mount_paginated(
        &server,
        &route,
        vec![
            serde_json::json!([file_json(1, "old.pdf", 0)]),
            serde_json::json!([file_json(1, "new.pdf", 0)]),
        ],
    )
    .await;

    let files = files::get_all_files(&client, COURSE_ID)
        .await
        .expect("listing");
    assert_eq!(files.len(), 1);
    assert_eq!(files[&1].display_name, "new.pdf");
}

#[tokio::test]
async fn test_get_all_folders_single_page() {
    let (server, client) = setup().await;
    let route = format!("/api/v1/courses/{COURSE_ID}/folders");

    Mock::given(method("GET"))
        .and(path(route.as_str()))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!([
            folder_json(1, "course files", None),
            folder_json(5, "X", Some(1)),
        ])))
        .expect(1)
        .mount(&server)
        .await;

    let folders = files::get_all_folders(&client, COURSE_ID)
        .await
        .expect("listing");
    assert_eq!(folders.len(), 2);
    assert_eq!(folders[&5].parent(), 1);
    assert_eq!(folders[&1].parent(), 0);
}

#[tokio::test]
async fn test_page_error_returns_partial_collection() {
    let (server, client) = setup().await;
    let route = format!("/api/v1/courses/{COURSE_ID}/files");
    let base = format!("{}{}", server.uri(), route);

    Mock::given(method("GET"))
        .and(path(route.as_str()))
        .and(query_param_is_missing("page"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(serde_json::json!([
                    file_json(1, "a.pdf", 0),
                    file_json(2, "b.pdf", 0)
                ]))
                .insert_header("Link", link_header(&base, 1, 3).as_str()),
        )
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path(route.as_str()))
        .and(query_param("page", "2"))
        .respond_with(ResponseTemplate::new(500).set_body_string("boom"))
        .expect(1)
        .mount(&server)
        .await;
    // Never reached: the listing stops at the failed page.
    Mock::given(method("GET"))
        .and(path(route.as_str()))
        .and(query_param("page", "3"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!([])))
        .expect(0)
        .mount(&server)
        .await;

    let err = files::get_all_files(&client, COURSE_ID)
        .await
        .unwrap_err();
    assert_eq!(err.partial.len(), 2);
    assert!(err.partial.contains_key(&1));
    match &err.source {
        ApiError::HttpStatus { status, body, .. } => {
            assert_eq!(status.as_u16(), 500);
            assert_eq!(body, "boom");
        }
        other => panic!("expected HttpStatus, got {other:?}"),
    }
}

#[tokio::test]
async fn test_first_page_error_returns_empty_partial() {
    let (server, client) = setup().await;

    Mock::given(method("GET"))
        .and(path(format!("/api/v1/courses/{COURSE_ID}/folders").as_str()))
        .respond_with(ResponseTemplate::new(403).set_body_string("forbidden"))
        .mount(&server)
        .await;

    let err = files::get_all_folders(&client, COURSE_ID)
        .await
        .unwrap_err();
    assert!(err.partial.is_empty());
    assert!(err.to_string().starts_with("listing stopped after 0 items"));
}

#[tokio::test]
async fn test_next_link_to_current_page_stops_listing() {
    let (server, client) = setup().await;
    let route = format!("/api/v1/courses/{COURSE_ID}/files");
    let base = format!("{}{}", server.uri(), route);
    let page2 = format!("{base}?page=2&per_page=2");

    Mock::given(method("GET"))
        .and(path(route.as_str()))
        .and(query_param_is_missing("page"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(serde_json::json!([file_json(1, "a.pdf", 0)]))
                .insert_header("Link", format!("<{page2}>; rel=\"next\"").as_str()),
        )
        .expect(1)
        .mount(&server)
        .await;
    // Page 2 keeps advertising itself as the next page.
    Mock::given(method("GET"))
        .and(path(route.as_str()))
        .and(query_param("page", "2"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(serde_json::json!([file_json(2, "b.pdf", 0)]))
                .insert_header(
                    "Link",
                    format!("<{page2}>; rel=\"current\",<{page2}>; rel=\"next\"").as_str(),
                ),
        )
        .expect(1)
        .mount(&server)
        .await;

    let err = files::get_all_files(&client, COURSE_ID)
        .await
        .unwrap_err();
    assert_eq!(err.partial.len(), 2);
    match &err.source {
        ApiError::StalledCursor { url, .. } => assert_eq!(url, &page2),
        other => panic!("expected StalledCursor, got {other:?}"),
    }
}
