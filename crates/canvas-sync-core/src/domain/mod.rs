//! Domain model for canvas-sync
//!
//! Entities fetched from the remote system are immutable once decoded.
//! [`SyncTarget`] is the resolved, path-bearing description handed to the
//! download orchestrator.

pub mod errors;
pub mod module_item;
pub mod remote;
pub mod target;

pub use errors::DomainError;
pub use module_item::{ModuleItem, ModuleRef};
pub use remote::{Keyed, RemoteFile, RemoteFolder, ROOT_FOLDER_ID};
pub use target::SyncTarget;
