//! canvas-sync Engine - Listing and download orchestration
//!
//! Composes the API client and the change cache into a complete sync run:
//!
//! ```text
//! Config ─► SyncEngine ─► ListingStrategy ─► Vec<SyncTarget>
//!                              (files | modules)       │
//!                                                      ▼
//!                 ChangeCache ◄── DownloadOrchestrator ──► TransferQueue
//! ```
//!
//! ## Modules
//!
//! - [`engine`] - the [`SyncEngine`] context object
//! - [`listing`] - files-API and modules-API listing strategies
//! - [`orchestrator`] - cache filtering, dispatch loop, progress ticks
//! - [`transfer`] - bounded-concurrency HTTP transfers
//! - [`progress`] - progress snapshots and sinks

pub mod engine;
pub mod listing;
pub mod orchestrator;
pub mod progress;
pub mod transfer;

pub use engine::SyncEngine;
pub use listing::{FilesListing, ListingStrategy, ModulesListing};
pub use orchestrator::{DownloadOrchestrator, FailedFile, Plan, SyncReport};
pub use progress::{ProgressSink, ProgressSnapshot};
pub use transfer::{HttpTransferQueue, TransferError, TransferHandle, TransferQueue, TransferRequest};
