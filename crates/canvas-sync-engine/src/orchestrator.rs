//! Download orchestration
//!
//! Turns resolved [`SyncTarget`]s into transfers:
//!
//! 1. compute the sanitized destination and create its directory
//! 2. skip files the [`ChangeCache`] reports as up to date
//! 3. submit the rest to the [`TransferQueue`] as one batch
//! 4. wait on every started transfer, recording successes in the cache,
//!    while a ticker reports progress of the active ones
//!
//! A failed transfer is reported and leaves its cache entry untouched, so
//! the next run retries it. It never stops sibling transfers.

use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::{Duration, Instant};

use dashmap::DashMap;
use serde::Serialize;
use tokio::task::JoinSet;
use tokio::time::MissedTickBehavior;
use tracing::{debug, error, info, warn};

use canvas_sync_cache::ChangeCache;
use canvas_sync_core::domain::SyncTarget;

use crate::progress::{self, ProgressSink, ProgressSnapshot};
use crate::transfer::{TransferHandle, TransferQueue, TransferRequest};

/// How often active transfers are reported
pub const PROGRESS_INTERVAL: Duration = Duration::from_millis(500);

/// A target that needs downloading
#[derive(Debug, Clone)]
pub struct PendingTransfer {
    pub target: SyncTarget,
    /// Sanitized path relative to the sync root; also the cache key
    pub relative_path: PathBuf,
    pub destination: PathBuf,
}

impl PendingTransfer {
    pub fn display_path(&self) -> String {
        self.relative_path.display().to_string()
    }
}

/// A file that could not be synced this run
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FailedFile {
    pub path: String,
    pub error: String,
}

/// Targets split by what a sync would do with them
#[derive(Debug, Default)]
pub struct Plan {
    pub pending: Vec<PendingTransfer>,
    pub up_to_date: usize,
    pub failed: Vec<FailedFile>,
}

/// Outcome of one [`DownloadOrchestrator::sync`] call
#[derive(Debug, Clone, Default, Serialize)]
pub struct SyncReport {
    pub downloaded: usize,
    pub up_to_date: usize,
    pub failed: Vec<FailedFile>,
    /// Bytes written by successful transfers
    pub bytes: u64,
    pub elapsed_secs: f64,
}

impl SyncReport {
    pub fn is_success(&self) -> bool {
        self.failed.is_empty()
    }
}

enum Completion {
    Downloaded { bytes: u64 },
    Failed(String),
}

/// Filters targets through the change cache and drives their transfers
pub struct DownloadOrchestrator {
    cache: ChangeCache,
    queue: Arc<dyn TransferQueue>,
    workers: usize,
    progress_interval: Duration,
    sink: ProgressSink,
}

impl DownloadOrchestrator {
    /// Creates an orchestrator running up to `workers` transfers at once
    pub fn new(cache: ChangeCache, queue: Arc<dyn TransferQueue>, workers: usize) -> Self {
        Self {
            cache,
            queue,
            workers: workers.max(1),
            progress_interval: PROGRESS_INTERVAL,
            sink: progress::discard(),
        }
    }

    pub fn with_progress_interval(mut self, interval: Duration) -> Self {
        self.progress_interval = interval;
        self
    }

    pub fn with_progress_sink(mut self, sink: ProgressSink) -> Self {
        self.sink = sink;
        self
    }

    /// Decides what [`sync`](Self::sync) would do without touching the filesystem
    pub async fn plan(&self, targets: Vec<SyncTarget>) -> Plan {
        self.partition(targets, false).await
    }

    /// Brings every target up to date
    pub async fn sync(&self, targets: Vec<SyncTarget>) -> SyncReport {
        let started = Instant::now();
        let total = targets.len();
        let plan = self.partition(targets, true).await;

        let mut report = SyncReport {
            up_to_date: plan.up_to_date,
            failed: plan.failed,
            ..SyncReport::default()
        };

        if plan.pending.is_empty() {
            info!(total, up_to_date = report.up_to_date, "Nothing to download");
            report.elapsed_secs = started.elapsed().as_secs_f64();
            return report;
        }

        let mut pending: HashMap<u64, PendingTransfer> = HashMap::with_capacity(plan.pending.len());
        let requests: Vec<TransferRequest> = plan
            .pending
            .into_iter()
            .enumerate()
            .map(|(i, p)| {
                let id = i as u64;
                let request = TransferRequest {
                    id,
                    url: p.target.url.clone(),
                    destination: p.destination.clone(),
                    size: p.target.size,
                };
                pending.insert(id, p);
                request
            })
            .collect();

        info!(
            count = requests.len(),
            workers = self.workers,
            "Starting transfers"
        );
        self.drive(requests, pending, &mut report).await;

        report.elapsed_secs = started.elapsed().as_secs_f64();
        info!(
            downloaded = report.downloaded,
            up_to_date = report.up_to_date,
            failed = report.failed.len(),
            "Sync finished"
        );
        report
    }

    async fn partition(&self, targets: Vec<SyncTarget>, prepare: bool) -> Plan {
        let mut plan = Plan::default();
        let mut claimed: HashMap<PathBuf, String> = HashMap::new();

        for target in targets {
            let relative_path = target.relative_path();
            let destination = self.cache.root().join(&relative_path);
            let path = relative_path.display().to_string();

            if let Some(first) = claimed.get(&relative_path) {
                warn!(%path, url = %target.url, claimed_by = %first, "Another remote file maps to this path, skipping");
                plan.failed.push(FailedFile {
                    path,
                    error: format!("path collides with {first}"),
                });
                continue;
            }
            claimed.insert(relative_path.clone(), target.url.clone());

            if prepare {
                if let Some(parent) = destination.parent() {
                    if let Err(e) = tokio::fs::create_dir_all(parent).await {
                        error!(%path, error = %e, "Failed to create directory");
                        plan.failed.push(FailedFile {
                            path,
                            error: format!("create {}: {e}", parent.display()),
                        });
                        continue;
                    }
                }
            }

            match self
                .cache
                .is_up_to_date(&relative_path, target.size, &target.modified_at)
                .await
            {
                Ok(true) => {
                    info!(%path, "Up to date, skipping");
                    plan.up_to_date += 1;
                    continue;
                }
                Ok(false) => {}
                Err(e) => warn!(%path, error = %format!("{e:#}"), "Change cache read failed, downloading"),
            }

            plan.pending.push(PendingTransfer {
                target,
                relative_path,
                destination,
            });
        }

        plan
    }

    async fn drive(
        &self,
        requests: Vec<TransferRequest>,
        mut pending: HashMap<u64, PendingTransfer>,
        report: &mut SyncReport,
    ) {
        let active: Arc<DashMap<u64, (String, Arc<TransferHandle>)>> = Arc::new(DashMap::new());
        let mut waiters: JoinSet<(String, Completion)> = JoinSet::new();
        let mut handles = self.queue.submit(requests, self.workers);
        let mut submissions_open = true;

        let mut ticker = tokio::time::interval(self.progress_interval);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);
        ticker.tick().await;

        while submissions_open || !waiters.is_empty() {
            tokio::select! {
                received = handles.recv(), if submissions_open => match received {
                    Some(handle) => match pending.remove(&handle.id()) {
                        Some(transfer) => self.watch(handle, transfer, &active, &mut waiters),
                        None => warn!(id = handle.id(), "Transfer queue started an unknown request"),
                    },
                    None => {
                        debug!("All transfers started");
                        submissions_open = false;
                    }
                },
                Some(joined) = waiters.join_next() => match joined {
                    Ok((path, Completion::Downloaded { bytes })) => {
                        info!(%path, bytes, "Downloaded");
                        report.downloaded += 1;
                        report.bytes += bytes;
                    }
                    Ok((path, Completion::Failed(error))) => {
                        error!(%path, %error, "Download failed");
                        report.failed.push(FailedFile { path, error });
                    }
                    Err(e) => {
                        error!(error = %e, "Transfer waiter aborted");
                        report.failed.push(FailedFile {
                            path: String::from("<unknown>"),
                            error: e.to_string(),
                        });
                    }
                },
                _ = ticker.tick() => self.report_progress(&active),
            }
        }

        for transfer in pending.into_values() {
            let path = transfer.display_path();
            error!(%path, "Transfer was never started");
            report.failed.push(FailedFile {
                path,
                error: "transfer was never started".to_string(),
            });
        }
    }

    /// Tracks `handle` and spawns the task that settles it
    fn watch(
        &self,
        handle: Arc<TransferHandle>,
        transfer: PendingTransfer,
        active: &Arc<DashMap<u64, (String, Arc<TransferHandle>)>>,
        waiters: &mut JoinSet<(String, Completion)>,
    ) {
        let id = handle.id();
        let path = transfer.display_path();
        debug!(%path, "Transfer started");
        active.insert(id, (path.clone(), handle.clone()));

        let cache = self.cache.clone();
        let active = Arc::clone(active);
        waiters.spawn(async move {
            let completion = match handle.wait().await {
                Ok(()) => match cache
                    .record(&transfer.relative_path, &transfer.target.modified_at)
                    .await
                {
                    Ok(()) => Completion::Downloaded {
                        bytes: handle.bytes_complete(),
                    },
                    Err(e) => Completion::Failed(format!("downloaded but not recorded: {e:#}")),
                },
                Err(e) => Completion::Failed(e.to_string()),
            };
            active.remove(&id);
            (path, completion)
        });
    }

    fn report_progress(&self, active: &DashMap<u64, (String, Arc<TransferHandle>)>) {
        let mut snapshots: Vec<ProgressSnapshot> = active
            .iter()
            .map(|entry| {
                let (path, handle) = entry.value();
                ProgressSnapshot::of(path.clone(), handle)
            })
            .collect();
        snapshots.sort_by(|a, b| a.path.cmp(&b.path));
        for snapshot in &snapshots {
            (self.sink)(snapshot);
        }
    }
}
