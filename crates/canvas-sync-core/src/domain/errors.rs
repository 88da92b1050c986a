//! Domain error types
//!
//! Errors raised by the pure parts of the sync engine: hierarchy
//! reconstruction, module item interpretation, and configuration checks.

use thiserror::Error;

/// Errors that can occur in domain operations
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum DomainError {
    /// The folder parent chain did not terminate within the walk bound
    #[error("Cyclic folder hierarchy starting at folder {folder_id} (walk bound {bound} exceeded)")]
    CyclicHierarchy {
        /// Folder the walk started from
        folder_id: i64,
        /// Maximum number of steps allowed (the folder map's size)
        bound: usize,
    },

    /// A module item carried a legacy file id that is not an integer
    #[error("Invalid file id: {0}")]
    InvalidFileId(String),

    /// Generic validation failure
    #[error("Validation failed: {0}")]
    Validation(String),
}
