//! Integration tests for single-file lookups

use wiremock::matchers::{method, path};
use wiremock::{Mock, ResponseTemplate};

use canvas_sync_api::{files, ApiError};

use crate::common::{file_json, setup};

#[tokio::test]
async fn test_get_file_by_id() {
    let (server, client) = setup().await;

    Mock::given(method("GET"))
        .and(path("/api/v1/files/77"))
        .respond_with(ResponseTemplate::new(200).set_body_json(file_json(77, "notes.pdf", 3)))
        .expect(1)
        .mount(&server)
        .await;

    let file = files::get_file(&client, 77).await.expect("file");
    assert_eq!(file.id, 77);
    assert_eq!(file.display_name, "notes.pdf");
    assert_eq!(file.size, 177);
    assert_eq!(file.modified_at.as_deref(), Some("2026-01-06T00:00:00Z"));
}

#[tokio::test]
async fn test_get_file_ignores_per_page() {
    let (server, client) = setup().await;
    let client = client.with_per_page(10);

    Mock::given(method("GET"))
        .and(path("/api/v1/files/8"))
        .and(|req: &wiremock::Request| req.url.query().is_none())
        .respond_with(ResponseTemplate::new(200).set_body_json(file_json(8, "x", 0)))
        .expect(1)
        .mount(&server)
        .await;

    files::get_file(&client, 8).await.expect("file");
}

#[tokio::test]
async fn test_get_file_not_found() {
    let (server, client) = setup().await;

    Mock::given(method("GET"))
        .and(path("/api/v1/files/404"))
        .respond_with(ResponseTemplate::new(404).set_body_string(r#"{"message":"not found"}"#))
        .mount(&server)
        .await;

    let err = files::get_file(&client, 404).await.unwrap_err();
    assert!(matches!(err, ApiError::HttpStatus { status, .. } if status.as_u16() == 404));
}
