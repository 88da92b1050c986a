//! Records returned by the Canvas REST API
//!
//! Only the fields the sync engine reads are decoded; unknown fields are
//! ignored. Timestamps are kept as the server's own strings and compared
//! verbatim, never reparsed.

use serde::{Deserialize, Serialize};

/// Folder id that terminates a parent walk
pub const ROOT_FOLDER_ID: i64 = 0;

/// Items that can be merged into an id-keyed collection
pub trait Keyed {
    /// Stable identifier within one sync run
    fn key(&self) -> i64;
}

/// A file record from `GET /api/v1/courses/:id/files` or `GET /api/v1/files/:id`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RemoteFile {
    /// Numeric id, unique within the remote system
    pub id: i64,
    /// Containing folder (absent or 0 means root)
    #[serde(default)]
    pub folder_id: Option<i64>,
    /// Name shown to users; used as the local filename
    pub display_name: String,
    /// Size in bytes
    #[serde(default)]
    pub size: u64,
    #[serde(default)]
    pub created_at: Option<String>,
    #[serde(default)]
    pub updated_at: Option<String>,
    /// Content modification timestamp, the change-detection key
    #[serde(default)]
    pub modified_at: Option<String>,
    /// Download URL (pre-signed, no bearer token needed)
    #[serde(default)]
    pub url: String,
}

impl RemoteFile {
    /// Containing folder id, with an absent folder mapped to the root
    pub fn folder(&self) -> i64 {
        self.folder_id.unwrap_or(ROOT_FOLDER_ID)
    }
}

impl Keyed for RemoteFile {
    fn key(&self) -> i64 {
        self.id
    }
}

/// A folder record from `GET /api/v1/courses/:id/folders`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RemoteFolder {
    pub id: i64,
    pub name: String,
    /// Parent folder (absent or 0 terminates the path walk)
    #[serde(default)]
    pub parent_folder_id: Option<i64>,
}

impl RemoteFolder {
    pub fn parent(&self) -> i64 {
        self.parent_folder_id.unwrap_or(ROOT_FOLDER_ID)
    }
}

impl Keyed for RemoteFolder {
    fn key(&self) -> i64 {
        self.id
    }
}
