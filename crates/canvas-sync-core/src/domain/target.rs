//! Resolved download targets

use std::path::PathBuf;

use serde::Serialize;

use crate::domain::RemoteFile;
use crate::sanitize::sanitize_component;

/// A file to mirror, with its destination resolved
///
/// Constructed once per file per run and never mutated afterwards. Path
/// segments and the filename are stored unsanitized; [`SyncTarget::relative_path`]
/// applies the substitution table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SyncTarget {
    /// Folder segments from the root, outermost first
    pub folder_path: Vec<String>,
    pub file_name: String,
    pub size: u64,
    pub created_at: String,
    pub updated_at: String,
    /// Remote modification timestamp, recorded in the change cache
    pub modified_at: String,
    pub url: String,
}

impl SyncTarget {
    /// Target for `file` placed under `folder_path`
    ///
    /// Absent timestamps become empty strings; an empty `modified_at`
    /// still round-trips through the change cache unchanged.
    pub fn from_remote(file: RemoteFile, folder_path: Vec<String>) -> Self {
        Self {
            folder_path,
            file_name: file.display_name,
            size: file.size,
            created_at: file.created_at.unwrap_or_default(),
            updated_at: file.updated_at.unwrap_or_default(),
            modified_at: file.modified_at.unwrap_or_default(),
            url: file.url,
        }
    }

    /// Sanitized destination path relative to the sync root
    ///
    /// Every segment and the filename are sanitized independently, then
    /// joined with the platform separator.
    pub fn relative_path(&self) -> PathBuf {
        let mut path: PathBuf = self
            .folder_path
            .iter()
            .map(|segment| sanitize_component(segment))
            .collect();
        path.push(sanitize_component(&self.file_name));
        path
    }
}
