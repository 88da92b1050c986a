//! canvas-sync core - Domain logic and business rules
//!
//! This crate contains the I/O-free heart of the sync engine:
//! - **Domain entities** - `RemoteFile`, `RemoteFolder`, `ModuleItem`, `SyncTarget`
//! - **Path resolution** - folder-walk and module-walk algorithms
//! - **Sanitization** - the fixed filename substitution table
//! - **Port definitions** - the `IKeyValueStore` trait backing the change cache
//! - **Configuration** - typed YAML configuration with validation
//!
//! # Architecture
//!
//! Adapter crates (`canvas-sync-api`, `canvas-sync-cache`) depend on this
//! crate; the engine composes them through the ports defined here.

pub mod config;
pub mod domain;
pub mod paths;
pub mod ports;
pub mod sanitize;
