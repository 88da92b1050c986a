//! Transfer progress reporting

use std::fmt;
use std::sync::Arc;
use std::time::Duration;

use serde::Serialize;

use crate::transfer::TransferHandle;

/// Point-in-time view of one active transfer
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ProgressSnapshot {
    /// Destination relative to the sync root
    pub path: String,
    pub bytes_complete: u64,
    pub total: u64,
    pub percent: f64,
    /// Whole seconds left; `None` until the first bytes arrive
    pub eta_secs: Option<u64>,
}

impl ProgressSnapshot {
    pub fn of(path: impl Into<String>, handle: &TransferHandle) -> Self {
        Self {
            path: path.into(),
            bytes_complete: handle.bytes_complete(),
            total: handle.total(),
            percent: handle.progress(),
            eta_secs: handle.eta().map(|d: Duration| d.as_secs()),
        }
    }
}

impl fmt::Display for ProgressSnapshot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} {}/{} bytes ({:.2}%) [ETA: ",
            self.path, self.bytes_complete, self.total, self.percent
        )?;
        match self.eta_secs {
            Some(secs) => write!(f, "{secs}s]"),
            None => write!(f, "?]"),
        }
    }
}

/// Receives progress snapshots on every tick
pub type ProgressSink = Arc<dyn Fn(&ProgressSnapshot) + Send + Sync>;

/// Sink that drops every snapshot
pub fn discard() -> ProgressSink {
    Arc::new(|_| {})
}

/// Sink that emits each snapshot as a `tracing` event at debug level
pub fn trace_sink() -> ProgressSink {
    Arc::new(|snapshot| {
        tracing::debug!(
            path = %snapshot.path,
            bytes = snapshot.bytes_complete,
            total = snapshot.total,
            "Transfer progress"
        )
    })
}
