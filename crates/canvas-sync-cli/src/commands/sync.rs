//! Sync command - Download changed course files
//!
//! Provides the `canvas-sync sync` CLI command which:
//! 1. Loads and validates the configuration
//! 2. Opens the change cache and builds the sync engine
//! 3. Lists the course, then downloads (or with `--dry-run`, reports)
//!    every file that is not up to date

use std::sync::Arc;

use anyhow::Result;
use clap::Args;
use tracing::info;

use canvas_sync_engine::{ProgressSnapshot, SyncEngine};

use crate::commands::Globals;
use crate::output::{format_bytes, get_formatter, OutputFormatter};

#[derive(Debug, Args)]
pub struct SyncCommand {
    /// Show what would be downloaded without making changes
    #[arg(long)]
    pub dry_run: bool,
}

impl SyncCommand {
    pub async fn execute(&self, globals: &Globals) -> Result<()> {
        let formatter: Arc<dyn OutputFormatter + Send + Sync> =
            Arc::from(get_formatter(globals.format, globals.quiet));
        let config = globals.load_valid_config()?;

        info!(
            config_path = %globals.config_path.display(),
            root = %config.sync_root().display(),
            "Loaded configuration"
        );

        let sink = {
            let formatter = formatter.clone();
            Arc::new(move |snapshot: &ProgressSnapshot| formatter.progress(snapshot))
        };
        let engine = SyncEngine::new(config).await?.with_progress_sink(sink);

        if self.dry_run {
            formatter.info("Dry run mode - no changes will be made");
            let plan = engine.plan().await;
            engine.shutdown().await;
            let plan = plan?;

            if globals.is_json() {
                let pending: Vec<_> = plan
                    .pending
                    .iter()
                    .map(|p| {
                        serde_json::json!({
                            "path": p.display_path(),
                            "size": p.target.size,
                            "modified_at": p.target.modified_at,
                        })
                    })
                    .collect();
                formatter.print_json(&serde_json::json!({
                    "dry_run": true,
                    "would_download": pending,
                    "up_to_date": plan.up_to_date,
                }));
            } else {
                for p in &plan.pending {
                    formatter.info(&format!(
                        "would download {} ({})",
                        p.display_path(),
                        format_bytes(p.target.size)
                    ));
                }
                formatter.success(&format!(
                    "Dry run completed: {} to download, {} up to date",
                    plan.pending.len(),
                    plan.up_to_date
                ));
            }
            return Ok(());
        }

        formatter.info("Starting synchronization...");
        let report = engine.run().await;
        engine.shutdown().await;
        let report = report?;

        if globals.is_json() {
            formatter.print_json(&serde_json::to_value(&report)?);
            return Ok(());
        }

        for failed in &report.failed {
            formatter.warn(&format!("{}: {}", failed.path, failed.error));
        }
        let summary = format!(
            "{} downloaded ({}), {} up to date, {} failed in {:.1}s",
            report.downloaded,
            format_bytes(report.bytes),
            report.up_to_date,
            report.failed.len(),
            report.elapsed_secs
        );
        if report.is_success() {
            formatter.success(&summary);
        } else {
            formatter.error(&summary);
            formatter.info("Failed files will be retried on the next run");
        }

        Ok(())
    }
}
