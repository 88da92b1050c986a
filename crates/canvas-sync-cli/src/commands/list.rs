//! List command - Show the resolved course file set

use anyhow::Result;
use clap::Args;

use canvas_sync_engine::SyncEngine;

use crate::commands::Globals;
use crate::output::{format_bytes, get_formatter};

#[derive(Debug, Args)]
pub struct ListCommand {}

impl ListCommand {
    pub async fn execute(&self, globals: &Globals) -> Result<()> {
        let formatter = get_formatter(globals.format, globals.quiet);
        let config = globals.load_valid_config()?;

        let engine = SyncEngine::new(config).await?;
        let targets = engine.list_targets().await;
        engine.shutdown().await;
        let targets = targets?;

        if globals.is_json() {
            let entries: Vec<_> = targets
                .iter()
                .map(|t| {
                    serde_json::json!({
                        "path": t.relative_path().display().to_string(),
                        "size": t.size,
                        "modified_at": t.modified_at,
                        "url": t.url,
                    })
                })
                .collect();
            formatter.print_json(&serde_json::Value::Array(entries));
            return Ok(());
        }

        for t in &targets {
            formatter.info(&format!(
                "{}  {}  {}",
                t.relative_path().display(),
                format_bytes(t.size),
                t.modified_at
            ));
        }
        formatter.success(&format!("{} files", targets.len()));
        Ok(())
    }
}
