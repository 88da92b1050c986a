//! Course file and folder listings
//!
//! - `GET /api/v1/courses/:id/files` and `GET /api/v1/courses/:id/folders`,
//!   paginated through the `Link` header and drained with [`collect`]
//! - `GET /api/v1/files/:id` for single-file lookups

use std::collections::HashMap;

use tracing::{debug, info};

use canvas_sync_core::domain::{RemoteFile, RemoteFolder};

use crate::client::CanvasClient;
use crate::collect::{collect, CollectError};
use crate::pagination::{fetch_first_page, Page};
use crate::ApiError;

/// First page of a course's file listing
pub async fn list_files(client: &CanvasClient, course_id: i64) -> Result<Page<RemoteFile>, ApiError> {
    let url = client.build_url(&format!("/api/v1/courses/{course_id}/files"))?;
    fetch_first_page(client, &url).await
}

/// First page of a course's folder listing
pub async fn list_folders(
    client: &CanvasClient,
    course_id: i64,
) -> Result<Page<RemoteFolder>, ApiError> {
    let url = client.build_url(&format!("/api/v1/courses/{course_id}/folders"))?;
    fetch_first_page(client, &url).await
}

/// Every file of a course, keyed by file id
pub async fn get_all_files(
    client: &CanvasClient,
    course_id: i64,
) -> Result<HashMap<i64, RemoteFile>, CollectError<RemoteFile>> {
    let first = list_files(client, course_id)
        .await
        .map_err(CollectError::empty)?;
    let files = collect(first).await?;
    info!(course_id, files = files.len(), "Listed course files");
    Ok(files)
}

/// Every folder of a course, keyed by folder id
pub async fn get_all_folders(
    client: &CanvasClient,
    course_id: i64,
) -> Result<HashMap<i64, RemoteFolder>, CollectError<RemoteFolder>> {
    let first = list_folders(client, course_id)
        .await
        .map_err(CollectError::empty)?;
    let folders = collect(first).await?;
    info!(course_id, folders = folders.len(), "Listed course folders");
    Ok(folders)
}

/// Look up one file by id
pub async fn get_file(client: &CanvasClient, file_id: i64) -> Result<RemoteFile, ApiError> {
    let url = client.build_plain_url(&format!("/api/v1/files/{file_id}"))?;
    debug!(file_id, "Looking up file");
    let (file, _) = client.get_json::<RemoteFile>(&url).await?;
    Ok(file)
}
