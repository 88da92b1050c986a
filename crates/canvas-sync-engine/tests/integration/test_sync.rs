//! End-to-end sync runs against a mock Canvas instance

use std::sync::Arc;

use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

use canvas_sync_api::CanvasClient;
use canvas_sync_core::config::{Config, ConfigBuilder};
use canvas_sync_core::ports::IKeyValueStore;
use canvas_sync_engine::{HttpTransferQueue, SyncEngine};

use crate::common::{
    file_json, memory_store, mount_download, mount_two_page_files, COURSE_ID, MODIFIED,
};

fn config(server: &MockServer, root: &std::path::Path, use_modules: bool) -> Config {
    ConfigBuilder::new()
        .course_id(COURSE_ID)
        .host(server.uri())
        .token("token")
        .worker_count(2)
        .use_modules(use_modules)
        .root(root)
        .build()
}

fn engine(config: Config, store: Arc<dyn IKeyValueStore>) -> SyncEngine {
    let client = CanvasClient::from_config(&config);
    SyncEngine::with_parts(config, client, store, Arc::new(HttpTransferQueue::default()))
}

async fn mount_folders(server: &MockServer) {
    Mock::given(method("GET"))
        .and(path(format!("/api/v1/courses/{COURSE_ID}/folders")))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!([
            {"id": 5, "name": "X", "parent_folder_id": null}
        ])))
        .mount(server)
        .await;
}

#[tokio::test]
async fn test_two_page_listing_downloads_three_files() {
    let server = MockServer::start().await;
    let root = tempfile::tempdir().unwrap();
    mount_folders(&server).await;
    mount_two_page_files(
        &server,
        serde_json::json!([
            file_json(&server, 1, "a.pdf", 5, 10),
            file_json(&server, 2, "b.pdf", 5, 20)
        ]),
        serde_json::json!([file_json(&server, 3, "c.pdf", 0, 30)]),
    )
    .await;
    mount_download(&server, 1, 10, 1).await;
    mount_download(&server, 2, 20, 1).await;
    mount_download(&server, 3, 30, 1).await;

    let store = memory_store().await;
    let engine = engine(config(&server, root.path(), false), store.clone());

    let report = engine.run().await.expect("sync run");
    assert_eq!(report.downloaded, 3);
    assert!(report.is_success());
    assert_eq!(store.len().await.unwrap(), 3);
    assert_eq!(std::fs::read(root.path().join("X/a.pdf")).unwrap().len(), 10);
    assert_eq!(std::fs::read(root.path().join("c.pdf")).unwrap().len(), 30);
    assert!(!root.path().join("c.pdf.part").exists());
    assert_eq!(
        store.get("ModifiedTime_X/b.pdf").await.unwrap().as_deref(),
        Some(MODIFIED)
    );

    // Unchanged listing: nothing is fetched again (download mocks expect one call each).
    let report = engine.run().await.expect("second run");
    assert_eq!(report.downloaded, 0);
    assert_eq!(report.up_to_date, 3);
}

#[tokio::test]
async fn test_failed_download_is_retried_next_run() {
    let server = MockServer::start().await;
    let root = tempfile::tempdir().unwrap();
    mount_folders(&server).await;
    mount_two_page_files(
        &server,
        serde_json::json!([file_json(&server, 1, "a.pdf", 5, 10)]),
        serde_json::json!([file_json(&server, 2, "b.pdf", 0, 4)]),
    )
    .await;
    mount_download(&server, 1, 10, 2).await;
    Mock::given(method("GET"))
        .and(path("/download/2"))
        .respond_with(ResponseTemplate::new(503))
        .up_to_n_times(1)
        .mount(&server)
        .await;
    mount_download(&server, 2, 4, 1).await;

    let store = memory_store().await;
    let engine = engine(config(&server, root.path(), false), store.clone());

    let report = engine.run().await.expect("sync run");
    assert_eq!(report.downloaded, 1);
    assert_eq!(report.failed.len(), 1);
    assert!(!root.path().join("b.pdf").exists());
    assert!(!root.path().join("b.pdf.part").exists());
    assert_eq!(store.get("ModifiedTime_b.pdf").await.unwrap(), None);

    // Remove a.pdf locally so it is fetched again as well.
    std::fs::remove_file(root.path().join("X/a.pdf")).unwrap();
    let report = engine.run().await.expect("second run");
    assert_eq!(report.downloaded, 2);
    assert!(report.is_success());
}

#[tokio::test]
async fn test_listing_error_is_fatal() {
    let server = MockServer::start().await;
    let root = tempfile::tempdir().unwrap();
    mount_folders(&server).await;
    Mock::given(method("GET"))
        .and(path(format!("/api/v1/courses/{COURSE_ID}/files")))
        .respond_with(ResponseTemplate::new(401).set_body_string("unauthorized"))
        .mount(&server)
        .await;

    let engine = engine(config(&server, root.path(), false), memory_store().await);
    let err = engine.run().await.unwrap_err();
    assert!(format!("{err:#}").contains("Failed to list course files"));
}

#[tokio::test]
async fn test_plan_reports_without_downloading() {
    let server = MockServer::start().await;
    let root = tempfile::tempdir().unwrap();
    mount_folders(&server).await;
    mount_two_page_files(
        &server,
        serde_json::json!([file_json(&server, 1, "a.pdf", 5, 10)]),
        serde_json::json!([]),
    )
    .await;
    mount_download(&server, 1, 10, 0).await;

    let engine = engine(config(&server, root.path(), false), memory_store().await);
    let plan = engine.plan().await.expect("plan");
    assert_eq!(plan.pending.len(), 1);
    assert_eq!(plan.up_to_date, 0);
}

#[tokio::test]
async fn test_modules_strategy_resolves_and_skips_bad_items() {
    let server = MockServer::start().await;
    let root = tempfile::tempdir().unwrap();

    Mock::given(method("POST"))
        .and(path("/api/graphql"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "data": {"course": {"modulesConnection": {
                "nodes": [{"name": "Week 1", "id": "m1", "moduleItems": [
                    {"content": {"__typename": "SubHeader", "title": "Slides", "modules": [{"name": "Week 1"}]}},
                    {"content": {"__typename": "File", "_id": "21", "displayName": "s.pdf", "modules": [{"name": "Week 1"}]}},
                    {"content": {"__typename": "File", "_id": "not-a-number", "displayName": "bad", "modules": [{"name": "Week 1"}]}},
                    {"content": {"__typename": "File", "_id": "404", "displayName": "gone", "modules": [{"name": "Week 1"}]}}
                ]}],
                "pageInfo": {"hasNextPage": false, "endCursor": null}
            }}}
        })))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/api/v1/files/21"))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(file_json(&server, 21, "slides.pdf", 9, 7)),
        )
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/api/v1/files/404"))
        .respond_with(ResponseTemplate::new(404))
        .mount(&server)
        .await;
    mount_download(&server, 21, 7, 1).await;

    let store = memory_store().await;
    let engine = engine(config(&server, root.path(), true), store.clone());

    let targets = engine.list_targets().await.expect("targets");
    assert_eq!(targets.len(), 1);
    assert_eq!(targets[0].folder_path, vec!["Modules", "Week 1", "Slides"]);
    assert_eq!(targets[0].file_name, "slides.pdf");
    assert_eq!(targets[0].modified_at, MODIFIED);

    let report = engine.run().await.expect("sync run");
    assert_eq!(report.downloaded, 1);
    assert!(root
        .path()
        .join("Modules/Week 1/Slides/slides.pdf")
        .is_file());

    let report = engine.run().await.expect("second run");
    assert_eq!(report.up_to_date, 1);
}
