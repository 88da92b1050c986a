//! Listing strategies
//!
//! Both strategies produce the complete set of [`SyncTarget`]s for one
//! course; they differ in where the folder structure comes from.
//!
//! - [`FilesListing`]: course files plus folders, paths from the folder walk
//! - [`ModulesListing`]: module items over GraphQL, paths from the module
//!   walk, metadata from one file lookup per item

use std::collections::HashMap;

use anyhow::Context;
use async_trait::async_trait;
use futures_util::{stream, StreamExt};
use tracing::{debug, info, warn};

use canvas_sync_api::{files, modules, CanvasClient};
use canvas_sync_core::domain::{DomainError, RemoteFile, RemoteFolder, SyncTarget};
use canvas_sync_core::paths::{resolve_folder_path, resolve_module_paths, ModuleFile};

/// Produces the targets of one sync run
#[async_trait]
pub trait ListingStrategy: Send + Sync {
    /// Short name for logs and output
    fn name(&self) -> &'static str;

    /// Lists every remote file with its resolved destination
    async fn list_targets(&self) -> anyhow::Result<Vec<SyncTarget>>;
}

/// Lists course files through the files and folders APIs
#[derive(Debug, Clone)]
pub struct FilesListing {
    client: CanvasClient,
    course_id: i64,
}

impl FilesListing {
    pub fn new(client: CanvasClient, course_id: i64) -> Self {
        Self { client, course_id }
    }
}

#[async_trait]
impl ListingStrategy for FilesListing {
    fn name(&self) -> &'static str {
        "files"
    }

    async fn list_targets(&self) -> anyhow::Result<Vec<SyncTarget>> {
        let (folders, files) = tokio::join!(
            files::get_all_folders(&self.client, self.course_id),
            files::get_all_files(&self.client, self.course_id),
        );
        let folders = folders.context("Failed to list course folders")?;
        let files = files.context("Failed to list course files")?;

        let targets = targets_from_folders(files, &folders)?;
        info!(course_id = self.course_id, targets = targets.len(), "Resolved file listing");
        Ok(targets)
    }
}

/// Resolves every file's folder path; sorted by destination
pub fn targets_from_folders(
    files: HashMap<i64, RemoteFile>,
    folders: &HashMap<i64, RemoteFolder>,
) -> Result<Vec<SyncTarget>, DomainError> {
    let mut targets = files
        .into_values()
        .map(|file| {
            let folder_path = resolve_folder_path(file.folder(), folders)?;
            Ok(SyncTarget::from_remote(file, folder_path))
        })
        .collect::<Result<Vec<_>, DomainError>>()?;
    targets.sort_by_key(|t| t.relative_path());
    Ok(targets)
}

/// Lists course files through the module structure
#[derive(Debug, Clone)]
pub struct ModulesListing {
    client: CanvasClient,
    course_id: i64,
    /// File lookups in flight at once
    lookups: usize,
}

impl ModulesListing {
    pub fn new(client: CanvasClient, course_id: i64) -> Self {
        Self {
            client,
            course_id,
            lookups: 1,
        }
    }

    pub fn with_lookup_concurrency(mut self, lookups: usize) -> Self {
        self.lookups = lookups.max(1);
        self
    }

    /// Looks up one module file; `None` when it has to be skipped
    async fn resolve(&self, item: ModuleFile) -> Option<SyncTarget> {
        let file_id = match parse_file_id(&item.legacy_id) {
            Ok(id) => id,
            Err(e) => {
                warn!(name = %item.display_name, error = %e, "Skipping module item");
                return None;
            }
        };

        match files::get_file(&self.client, file_id).await {
            Ok(file) => {
                debug!(file_id, name = %file.display_name, "Resolved module file");
                Some(SyncTarget::from_remote(file, item.folder_path))
            }
            Err(e) => {
                warn!(file_id, name = %item.display_name, error = %e, "File lookup failed, skipping");
                None
            }
        }
    }
}

/// Parses a module item's string-encoded legacy id
pub fn parse_file_id(legacy_id: &str) -> Result<i64, DomainError> {
    legacy_id
        .trim()
        .parse()
        .map_err(|_| DomainError::InvalidFileId(legacy_id.to_string()))
}

#[async_trait]
impl ListingStrategy for ModulesListing {
    fn name(&self) -> &'static str {
        "modules"
    }

    async fn list_targets(&self) -> anyhow::Result<Vec<SyncTarget>> {
        let items = modules::fetch_all_module_items(&self.client, self.course_id)
            .await
            .context("Failed to list course modules")?;
        let module_files = resolve_module_paths(&items);
        debug!(
            items = items.len(),
            files = module_files.len(),
            "Walked module items"
        );

        let targets: Vec<SyncTarget> = stream::iter(module_files)
            .map(|item| self.resolve(item))
            .buffered(self.lookups)
            .filter_map(|target| async move { target })
            .collect()
            .await;

        info!(course_id = self.course_id, targets = targets.len(), "Resolved module listing");
        Ok(targets)
    }
}
