//! Key-value store port
//!
//! The change cache needs nothing more than string get/put. Each call is
//! its own short-lived transaction; callers never hold a transaction
//! across awaits, so concurrent writers for distinct keys cannot
//! deadlock one another.

use async_trait::async_trait;

/// Persistent string key-value storage
#[async_trait]
pub trait IKeyValueStore: Send + Sync {
    /// Read the value stored under `key`, `None` if absent
    async fn get(&self, key: &str) -> anyhow::Result<Option<String>>;

    /// Insert or overwrite the value stored under `key`
    async fn put(&self, key: &str, value: &str) -> anyhow::Result<()>;
}
