//! Bounded-concurrency file transfers
//!
//! The orchestrator hands a batch of [`TransferRequest`]s to a
//! [`TransferQueue`] and receives one [`TransferHandle`] per transfer as
//! it starts. A handle exposes live progress and resolves once the
//! transfer finishes.
//!
//! ```text
//! submit(batch) ──► dispatcher ──► Semaphore(workers) ──► download task
//!                       │                                     │
//!                       └── mpsc<Arc<TransferHandle>> ◄── progress / outcome
//! ```
//!
//! The channel closes once every request of the batch has started.

use std::fmt;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};

use futures_util::StreamExt;
use reqwest::Client;
use thiserror::Error;
use tokio::io::AsyncWriteExt;
use tokio::sync::{mpsc, watch, Semaphore};
use tracing::{debug, warn};

/// Suffix of the file a transfer writes before it is renamed into place
pub const PARTIAL_SUFFIX: &str = ".part";

/// Reasons a single transfer fails
///
/// Cloneable so every observer of a finished handle gets the same outcome.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum TransferError {
    #[error("HTTP {status} downloading {url}")]
    HttpStatus { status: u16, url: String },

    #[error("Network error: {0}")]
    Network(String),

    #[error("I/O error on {path}: {message}")]
    Io { path: PathBuf, message: String },
}

impl TransferError {
    fn io(path: &Path, e: std::io::Error) -> Self {
        TransferError::Io {
            path: path.to_path_buf(),
            message: e.to_string(),
        }
    }
}

/// One file to fetch
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransferRequest {
    /// Caller-chosen id, echoed back on the handle
    pub id: u64,
    pub url: String,
    /// Final on-disk location
    pub destination: PathBuf,
    /// Expected size in bytes, used for progress until the server reports one
    pub size: u64,
}

/// A started transfer
pub struct TransferHandle {
    request: TransferRequest,
    transferred: AtomicU64,
    total: AtomicU64,
    started: Instant,
    outcome: watch::Sender<Option<Result<(), TransferError>>>,
}

impl TransferHandle {
    pub fn new(request: TransferRequest) -> Self {
        let (outcome, _) = watch::channel(None);
        Self {
            total: AtomicU64::new(request.size),
            request,
            transferred: AtomicU64::new(0),
            started: Instant::now(),
            outcome,
        }
    }

    pub fn id(&self) -> u64 {
        self.request.id
    }

    pub fn request(&self) -> &TransferRequest {
        &self.request
    }

    pub fn bytes_complete(&self) -> u64 {
        self.transferred.load(Ordering::Relaxed)
    }

    pub fn total(&self) -> u64 {
        self.total.load(Ordering::Relaxed)
    }

    /// Completed fraction as a percentage in `0.0..=100.0`
    ///
    /// An empty file counts as complete.
    pub fn progress(&self) -> f64 {
        let total = self.total();
        if total == 0 {
            return 100.0;
        }
        (self.bytes_complete() as f64 / total as f64 * 100.0).min(100.0)
    }

    /// Time left at the average rate so far; `None` before any byte arrives
    pub fn eta(&self) -> Option<Duration> {
        let done = self.bytes_complete();
        if done == 0 {
            return None;
        }
        let elapsed = self.started.elapsed().as_secs_f64();
        let remaining = self.total().saturating_sub(done) as f64;
        Some(Duration::from_secs_f64(remaining * elapsed / done as f64))
    }

    pub fn add_transferred(&self, bytes: u64) {
        self.transferred.fetch_add(bytes, Ordering::Relaxed);
    }

    pub fn set_total(&self, total: u64) {
        self.total.store(total, Ordering::Relaxed);
    }

    /// Settles the transfer; later calls are ignored
    pub fn finish(&self, result: Result<(), TransferError>) {
        self.outcome.send_if_modified(|slot| {
            if slot.is_some() {
                return false;
            }
            *slot = Some(result);
            true
        });
    }

    pub fn is_finished(&self) -> bool {
        self.outcome.borrow().is_some()
    }

    /// Waits until the transfer finishes and returns its outcome
    pub async fn wait(&self) -> Result<(), TransferError> {
        let mut rx = self.outcome.subscribe();
        let outcome = match rx.wait_for(Option::is_some).await {
            Ok(outcome) => (*outcome).clone().unwrap_or(Ok(())),
            // The sender lives in `self`, so the channel cannot close here.
            Err(_) => Err(TransferError::Network("transfer abandoned".to_string())),
        };
        outcome
    }
}

impl fmt::Debug for TransferHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TransferHandle")
            .field("id", &self.request.id)
            .field("destination", &self.request.destination)
            .field("bytes_complete", &self.bytes_complete())
            .field("total", &self.total())
            .field("finished", &self.is_finished())
            .finish()
    }
}

/// Runs batches of transfers with bounded concurrency
pub trait TransferQueue: Send + Sync {
    /// Starts `requests` with at most `workers` in flight
    ///
    /// Each handle is sent as its transfer starts; the receiver yields
    /// `None` once the whole batch has started.
    fn submit(
        &self,
        requests: Vec<TransferRequest>,
        workers: usize,
    ) -> mpsc::Receiver<Arc<TransferHandle>>;
}

/// [`TransferQueue`] that streams each URL to disk with reqwest
///
/// Download URLs are pre-signed, so no credentials are attached.
#[derive(Debug, Clone, Default)]
pub struct HttpTransferQueue {
    client: Client,
}

impl HttpTransferQueue {
    pub fn new(client: Client) -> Self {
        Self { client }
    }
}

impl TransferQueue for HttpTransferQueue {
    fn submit(
        &self,
        requests: Vec<TransferRequest>,
        workers: usize,
    ) -> mpsc::Receiver<Arc<TransferHandle>> {
        let (tx, rx) = mpsc::channel(requests.len().max(1));
        let semaphore = Arc::new(Semaphore::new(workers.max(1)));
        let client = self.client.clone();

        tokio::spawn(async move {
            for request in requests {
                let Ok(permit) = semaphore.clone().acquire_owned().await else {
                    break;
                };

                let handle = Arc::new(TransferHandle::new(request));
                if tx.send(handle.clone()).await.is_err() {
                    debug!("Transfer receiver dropped, stopping dispatch");
                    break;
                }

                let client = client.clone();
                tokio::spawn(async move {
                    let result = download(&client, &handle).await;
                    if let Err(e) = &result {
                        warn!(id = handle.id(), error = %e, "Transfer failed");
                    }
                    handle.finish(result);
                    drop(permit);
                });
            }
        });

        rx
    }
}

/// Location a transfer writes to before the final rename
pub fn partial_path(destination: &Path) -> PathBuf {
    let mut name = destination.as_os_str().to_os_string();
    name.push(PARTIAL_SUFFIX);
    PathBuf::from(name)
}

async fn download(client: &Client, handle: &TransferHandle) -> Result<(), TransferError> {
    let request = handle.request();
    let partial = partial_path(&request.destination);

    let result = stream_to(client, handle, &partial).await;
    if result.is_err() {
        let _ = tokio::fs::remove_file(&partial).await;
        return result;
    }

    tokio::fs::rename(&partial, &request.destination)
        .await
        .map_err(|e| TransferError::io(&request.destination, e))?;

    debug!(
        id = request.id,
        path = %request.destination.display(),
        bytes = handle.bytes_complete(),
        "Transfer complete"
    );
    Ok(())
}

async fn stream_to(
    client: &Client,
    handle: &TransferHandle,
    partial: &Path,
) -> Result<(), TransferError> {
    let request = handle.request();
    let response = client
        .get(&request.url)
        .send()
        .await
        .map_err(|e| TransferError::Network(e.to_string()))?;

    let status = response.status();
    if !status.is_success() {
        return Err(TransferError::HttpStatus {
            status: status.as_u16(),
            url: request.url.clone(),
        });
    }
    if let Some(len) = response.content_length() {
        handle.set_total(len);
    }

    let mut file = tokio::fs::File::create(partial)
        .await
        .map_err(|e| TransferError::io(partial, e))?;

    let mut stream = response.bytes_stream();
    while let Some(chunk) = stream.next().await {
        let chunk = chunk.map_err(|e| TransferError::Network(e.to_string()))?;
        file.write_all(&chunk)
            .await
            .map_err(|e| TransferError::io(partial, e))?;
        handle.add_transferred(chunk.len() as u64);
    }
    file.flush().await.map_err(|e| TransferError::io(partial, e))?;

    Ok(())
}
