//! Change detection against the persisted modification timestamps
//!
//! A file is up to date only when all of these hold, checked in order:
//!
//! 1. a file exists at the destination
//! 2. its size equals the remote size
//! 3. a timestamp is recorded for its path
//! 4. the recorded timestamp string equals the remote one exactly
//!
//! Timestamps are never parsed. Equal strings mean unchanged, anything
//! else means changed, which keeps the check independent of clocks and
//! time zones.

use std::path::{Component, Path, PathBuf};
use std::sync::Arc;

use anyhow::Context;
use tracing::{debug, trace};

use canvas_sync_core::ports::IKeyValueStore;

/// Prefix of every change cache key
pub const KEY_PREFIX: &str = "ModifiedTime_";

/// Cache key for a path relative to the sync root
///
/// Segments are joined with `/` on every platform so a cache written on
/// one system stays valid on another.
pub fn cache_key(relative_path: &Path) -> String {
    let joined = relative_path
        .components()
        .filter_map(|c| match c {
            Component::Normal(s) => Some(s.to_string_lossy()),
            _ => None,
        })
        .collect::<Vec<_>>()
        .join("/");
    format!("{KEY_PREFIX}{joined}")
}

/// Outcome of a freshness check, in the order the checks run
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Freshness {
    /// Nothing on disk at the destination
    Missing,
    /// On-disk size differs from the remote size
    SizeMismatch { local: u64, remote: u64 },
    /// No timestamp recorded for this path
    NotRecorded,
    /// Recorded timestamp differs from the remote one
    Modified { recorded: String },
    UpToDate,
}

impl Freshness {
    pub fn is_up_to_date(&self) -> bool {
        matches!(self, Freshness::UpToDate)
    }
}

/// Decides whether files need downloading and remembers completed ones
#[derive(Clone)]
pub struct ChangeCache {
    store: Arc<dyn IKeyValueStore>,
    root: PathBuf,
}

impl ChangeCache {
    /// Creates a cache for files mirrored under `root`
    pub fn new(store: Arc<dyn IKeyValueStore>, root: impl Into<PathBuf>) -> Self {
        Self {
            store,
            root: root.into(),
        }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Runs the checks for the file at `relative_path` and reports the first that fails
    ///
    /// # Errors
    ///
    /// Fails only when the store itself fails; a missing file or entry is
    /// a normal outcome.
    pub async fn check(
        &self,
        relative_path: &Path,
        remote_size: u64,
        remote_modified_at: &str,
    ) -> anyhow::Result<Freshness> {
        let local = self.root.join(relative_path);

        let metadata = match tokio::fs::metadata(&local).await {
            Ok(m) if m.is_file() => m,
            _ => return Ok(Freshness::Missing),
        };

        if metadata.len() != remote_size {
            return Ok(Freshness::SizeMismatch {
                local: metadata.len(),
                remote: remote_size,
            });
        }

        let key = cache_key(relative_path);
        let recorded = self
            .store
            .get(&key)
            .await
            .with_context(|| format!("Failed to read change cache entry {key}"))?;

        Ok(match recorded {
            None => Freshness::NotRecorded,
            Some(recorded) if recorded == remote_modified_at => Freshness::UpToDate,
            Some(recorded) => Freshness::Modified { recorded },
        })
    }

    /// True when the file at `relative_path` can be skipped
    pub async fn is_up_to_date(
        &self,
        relative_path: &Path,
        remote_size: u64,
        remote_modified_at: &str,
    ) -> anyhow::Result<bool> {
        let freshness = self
            .check(relative_path, remote_size, remote_modified_at)
            .await?;
        trace!(path = %relative_path.display(), ?freshness, "Freshness check");
        Ok(freshness.is_up_to_date())
    }

    /// Records a completed download of `relative_path` at `modified_at`
    pub async fn record(&self, relative_path: &Path, modified_at: &str) -> anyhow::Result<()> {
        let key = cache_key(relative_path);
        self.store
            .put(&key, modified_at)
            .await
            .with_context(|| format!("Failed to write change cache entry {key}"))?;
        debug!(path = %relative_path.display(), modified_at, "Recorded download");
        Ok(())
    }
}

impl std::fmt::Debug for ChangeCache {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ChangeCache")
            .field("root", &self.root)
            .finish_non_exhaustive()
    }
}
