//! SQLite implementation of IKeyValueStore
//!
//! Every `put` is an upsert inside its own transaction, committed before
//! the call returns. Concurrent writers to distinct keys only contend on
//! SQLite's write lock, which the pool's busy timeout absorbs.

use async_trait::async_trait;
use chrono::Utc;
use sqlx::{Row, SqlitePool};

use canvas_sync_core::ports::IKeyValueStore;

use crate::pool::DatabasePool;
use crate::CacheError;

/// String key-value store on the `kv` table
#[derive(Debug, Clone)]
pub struct SqliteKeyValueStore {
    pool: SqlitePool,
}

impl SqliteKeyValueStore {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    /// Store backed by a fresh in-memory database
    pub async fn in_memory() -> Result<Self, CacheError> {
        let pool = DatabasePool::in_memory().await?;
        Ok(Self::new(pool.pool().clone()))
    }

    /// Number of stored keys
    pub async fn len(&self) -> Result<usize, CacheError> {
        let row = sqlx::query("SELECT COUNT(*) AS n FROM kv")
            .fetch_one(&self.pool)
            .await?;
        let n: i64 = row.try_get("n")?;
        Ok(n as usize)
    }

    pub async fn is_empty(&self) -> Result<bool, CacheError> {
        Ok(self.len().await? == 0)
    }
}

#[async_trait]
impl IKeyValueStore for SqliteKeyValueStore {
    async fn get(&self, key: &str) -> anyhow::Result<Option<String>> {
        let row = sqlx::query("SELECT value FROM kv WHERE key = ?")
            .bind(key)
            .fetch_optional(&self.pool)
            .await?;

        match row {
            Some(ref r) => Ok(Some(r.try_get("value")?)),
            None => Ok(None),
        }
    }

    async fn put(&self, key: &str, value: &str) -> anyhow::Result<()> {
        let updated_at = Utc::now().to_rfc3339();

        let mut tx = self.pool.begin().await?;
        sqlx::query(
            "INSERT INTO kv (key, value, updated_at) VALUES (?, ?, ?) \
             ON CONFLICT(key) DO UPDATE SET value = excluded.value, \
             updated_at = excluded.updated_at",
        )
        .bind(key)
        .bind(value)
        .bind(&updated_at)
        .execute(&mut *tx)
        .await?;
        tx.commit().await?;

        tracing::trace!(key, "Stored cache entry");
        Ok(())
    }
}
