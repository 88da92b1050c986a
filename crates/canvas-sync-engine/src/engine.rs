//! The sync engine context
//!
//! [`SyncEngine`] is built once from a validated [`Config`] and owns every
//! long-lived resource of a run: the API client, the change cache, and
//! the transfer queue. Nothing is global.

use std::sync::Arc;
use std::time::Duration;

use anyhow::Context;
use tracing::info;

use canvas_sync_api::CanvasClient;
use canvas_sync_cache::{ChangeCache, DatabasePool, SqliteKeyValueStore};
use canvas_sync_core::config::Config;
use canvas_sync_core::domain::SyncTarget;
use canvas_sync_core::ports::IKeyValueStore;

use crate::listing::{FilesListing, ListingStrategy, ModulesListing};
use crate::orchestrator::{DownloadOrchestrator, Plan, SyncReport, PROGRESS_INTERVAL};
use crate::progress::{self, ProgressSink};
use crate::transfer::{HttpTransferQueue, TransferQueue};

/// Everything one sync run needs
pub struct SyncEngine {
    config: Config,
    client: CanvasClient,
    store: Arc<dyn IKeyValueStore>,
    queue: Arc<dyn TransferQueue>,
    sink: ProgressSink,
    progress_interval: Duration,
    pool: Option<DatabasePool>,
}

impl SyncEngine {
    /// Opens the change cache named by `config` and wires the HTTP collaborators
    ///
    /// # Errors
    ///
    /// Fails when the cache database cannot be opened.
    pub async fn new(config: Config) -> anyhow::Result<Self> {
        let cache_file = config.cache_file();
        let pool = DatabasePool::new(&cache_file)
            .await
            .with_context(|| format!("Failed to open change cache at {}", cache_file.display()))?;
        let store = Arc::new(SqliteKeyValueStore::new(pool.pool().clone()));
        let client = CanvasClient::from_config(&config);

        let mut engine = Self::with_parts(
            config,
            client,
            store,
            Arc::new(HttpTransferQueue::default()),
        );
        engine.pool = Some(pool);
        Ok(engine)
    }

    /// Assembles an engine from explicit collaborators
    pub fn with_parts(
        config: Config,
        client: CanvasClient,
        store: Arc<dyn IKeyValueStore>,
        queue: Arc<dyn TransferQueue>,
    ) -> Self {
        Self {
            config,
            client,
            store,
            queue,
            sink: progress::trace_sink(),
            progress_interval: PROGRESS_INTERVAL,
            pool: None,
        }
    }

    pub fn with_progress_sink(mut self, sink: ProgressSink) -> Self {
        self.sink = sink;
        self
    }

    pub fn with_progress_interval(mut self, interval: Duration) -> Self {
        self.progress_interval = interval;
        self
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    /// The listing strategy selected by `use_modules`
    pub fn strategy(&self) -> Box<dyn ListingStrategy> {
        if self.config.use_modules {
            Box::new(
                ModulesListing::new(self.client.clone(), self.config.course_id)
                    .with_lookup_concurrency(self.config.worker_count),
            )
        } else {
            Box::new(FilesListing::new(self.client.clone(), self.config.course_id))
        }
    }

    /// Lists every remote file with its resolved destination
    pub async fn list_targets(&self) -> anyhow::Result<Vec<SyncTarget>> {
        let strategy = self.strategy();
        info!(
            course_id = self.config.course_id,
            strategy = strategy.name(),
            "Listing course"
        );
        strategy.list_targets().await
    }

    /// Lists the course and reports what a sync would download
    pub async fn plan(&self) -> anyhow::Result<Plan> {
        let targets = self.list_targets().await?;
        Ok(self.orchestrator().plan(targets).await)
    }

    /// Lists the course and downloads everything that changed
    ///
    /// # Errors
    ///
    /// Only listing failures are returned; per-file failures are in the report.
    pub async fn run(&self) -> anyhow::Result<SyncReport> {
        let targets = self.list_targets().await?;
        Ok(self.orchestrator().sync(targets).await)
    }

    /// Closes the cache database, if this engine opened it
    pub async fn shutdown(&self) {
        if let Some(pool) = &self.pool {
            pool.close().await;
        }
    }

    fn orchestrator(&self) -> DownloadOrchestrator {
        let cache = ChangeCache::new(self.store.clone(), self.config.sync_root());
        DownloadOrchestrator::new(cache, self.queue.clone(), self.config.worker_count)
            .with_progress_interval(self.progress_interval)
            .with_progress_sink(self.sink.clone())
    }
}
