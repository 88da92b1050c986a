//! CLI command implementations

pub mod config;
pub mod list;
pub mod sync;

use std::path::PathBuf;

use anyhow::{Context, Result};

use canvas_sync_core::config::Config;

use crate::output::OutputFormat;

/// Options shared by every command
#[derive(Debug, Clone)]
pub struct Globals {
    pub format: OutputFormat,
    pub quiet: bool,
    pub config_path: PathBuf,
}

impl Globals {
    pub fn is_json(&self) -> bool {
        matches!(self.format, OutputFormat::Json)
    }

    /// Loads the configuration file
    pub fn load_config(&self) -> Result<Config> {
        Config::load(&self.config_path).with_context(|| {
            format!(
                "Failed to load configuration from {}",
                self.config_path.display()
            )
        })
    }

    /// Loads the configuration file and rejects it unless fully valid
    pub fn load_valid_config(&self) -> Result<Config> {
        let config = self.load_config()?;
        config
            .ensure_valid()
            .with_context(|| format!("Invalid configuration in {}", self.config_path.display()))?;
        Ok(config)
    }
}
