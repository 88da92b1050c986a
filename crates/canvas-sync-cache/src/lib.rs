//! canvas-sync Cache - Local change tracking
//!
//! SQLite-backed persistence for the one piece of state that survives a
//! run: the remote modification timestamp of every file last downloaded.
//!
//! ## Architecture
//!
//! [`SqliteKeyValueStore`] implements the `IKeyValueStore` port from
//! `canvas-sync-core`. [`ChangeCache`] sits on top of any store and
//! combines it with the local filesystem to decide whether a file needs
//! downloading.
//!
//! ## Usage
//!
//! ```no_run
//! use std::path::Path;
//! use std::sync::Arc;
//! use canvas_sync_cache::{ChangeCache, DatabasePool, SqliteKeyValueStore};
//!
//! # async fn example() -> anyhow::Result<()> {
//! let pool = DatabasePool::new(Path::new("course/.canvas-sync/state.db")).await?;
//! let store = Arc::new(SqliteKeyValueStore::new(pool.pool().clone()));
//! let cache = ChangeCache::new(store, "course");
//! let fresh = cache
//!     .is_up_to_date(Path::new("Week 1/a.pdf"), 1024, "2026-01-01T00:00:00Z")
//!     .await?;
//! # Ok(())
//! # }
//! ```

pub mod change_cache;
pub mod pool;
pub mod store;

pub use change_cache::{cache_key, ChangeCache, Freshness};
pub use pool::DatabasePool;
pub use store::SqliteKeyValueStore;

/// Errors that can occur during cache operations
#[derive(Debug, thiserror::Error)]
pub enum CacheError {
    /// Failed to establish a database connection
    #[error("Connection failed: {0}")]
    ConnectionFailed(String),

    /// A database query failed
    #[error("Query failed: {0}")]
    QueryFailed(String),

    /// Schema migration failed
    #[error("Migration failed: {0}")]
    MigrationFailed(String),
}

impl From<sqlx::Error> for CacheError {
    fn from(e: sqlx::Error) -> Self {
        CacheError::QueryFailed(e.to_string())
    }
}
