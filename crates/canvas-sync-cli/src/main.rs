//! canvas-sync CLI - Mirror a Canvas course's files locally
//!
//! Provides commands for:
//! - Synchronizing course files (`sync`, with `--dry-run`)
//! - Listing the resolved remote file set (`list`)
//! - Inspecting and validating configuration (`config`)

use std::path::PathBuf;

use anyhow::Result;
use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

mod commands;
mod output;

use canvas_sync_core::config::{Config, DEFAULT_CONFIG_FILE};
use commands::{config::ConfigCommand, list::ListCommand, sync::SyncCommand, Globals};
use output::OutputFormat;

#[derive(Debug, Parser)]
#[command(name = "canvas-sync", version, about = "Mirror Canvas LMS course files locally")]
pub struct Cli {
    /// Output in JSON format
    #[arg(long, global = true)]
    json: bool,

    /// Verbose output (can be repeated: -v, -vv)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    /// Use alternate config file
    #[arg(long, global = true, default_value = DEFAULT_CONFIG_FILE)]
    config: PathBuf,

    /// Minimal output
    #[arg(short, long, global = true)]
    quiet: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Download every course file that changed since the last run
    Sync(SyncCommand),
    /// List the course files and where they would be stored
    List(ListCommand),
    /// View and validate configuration
    #[command(subcommand)]
    Config(ConfigCommand),
}

impl Cli {
    /// Log filter: `RUST_LOG`, else `-v`/`-q`, else the configured level
    fn log_filter(&self) -> EnvFilter {
        if let Ok(filter) = EnvFilter::try_from_default_env() {
            return filter;
        }
        let level = match (self.verbose, self.quiet) {
            (0, true) => "error".to_string(),
            (0, false) => Config::load(&self.config)
                .map(|c| c.logging.level)
                .unwrap_or_else(|_| "info".to_string()),
            (1, _) => "debug".to_string(),
            _ => "trace".to_string(),
        };
        EnvFilter::new(level)
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    tracing_subscriber::fmt()
        .with_env_filter(cli.log_filter())
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    let globals = Globals {
        format: if cli.json {
            OutputFormat::Json
        } else {
            OutputFormat::Human
        },
        quiet: cli.quiet,
        config_path: cli.config.clone(),
    };

    match &cli.command {
        Commands::Sync(cmd) => cmd.execute(&globals).await,
        Commands::List(cmd) => cmd.execute(&globals).await,
        Commands::Config(cmd) => cmd.execute(&globals).await,
    }
}
