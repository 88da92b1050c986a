//! Port definitions (driven/secondary ports)
//!
//! Traits implemented by adapter crates. The engine only talks to
//! persistence through these interfaces.

pub mod key_value_store;

pub use key_value_store::IKeyValueStore;
