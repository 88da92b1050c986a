//! Config command - View and validate canvas-sync configuration

use anyhow::{bail, Context, Result};
use clap::Subcommand;
use tracing::info;

use crate::commands::Globals;
use crate::output::get_formatter;

#[derive(Debug, Subcommand)]
pub enum ConfigCommand {
    /// Display the effective configuration (token masked)
    Show,
    /// Validate the configuration file
    Validate,
}

impl ConfigCommand {
    pub async fn execute(&self, globals: &Globals) -> Result<()> {
        match self {
            ConfigCommand::Show => self.execute_show(globals),
            ConfigCommand::Validate => self.execute_validate(globals),
        }
    }

    fn execute_show(&self, globals: &Globals) -> Result<()> {
        let formatter = get_formatter(globals.format, globals.quiet);
        let config = globals.load_config()?.redacted();

        info!(config_path = %globals.config_path.display(), "Showing configuration");

        if globals.is_json() {
            let json = serde_json::to_value(&config)
                .context("Failed to serialize configuration to JSON")?;
            formatter.print_json(&json);
        } else {
            formatter.success(&format!("Configuration ({})", globals.config_path.display()));
            formatter.info(&format!("sync root: {}", config.sync_root().display()));
            formatter.info(&format!("change cache: {}", config.cache_file().display()));
            formatter.info("");
            let yaml = serde_yaml::to_string(&config)
                .context("Failed to serialize configuration to YAML")?;
            for line in yaml.lines() {
                formatter.info(line);
            }
        }
        Ok(())
    }

    fn execute_validate(&self, globals: &Globals) -> Result<()> {
        let formatter = get_formatter(globals.format, globals.quiet);
        let config = globals.load_config()?;
        let errors = config.validate();

        if globals.is_json() {
            let messages: Vec<_> = errors
                .iter()
                .map(|e| serde_json::json!({"field": e.field, "message": e.message}))
                .collect();
            formatter.print_json(&serde_json::json!({
                "valid": errors.is_empty(),
                "config_path": globals.config_path.display().to_string(),
                "errors": messages,
            }));
        } else if errors.is_empty() {
            formatter.success(&format!("{} is valid", globals.config_path.display()));
        } else {
            for e in &errors {
                formatter.error(&e.to_string());
            }
        }

        if !errors.is_empty() {
            bail!("{} configuration error(s)", errors.len());
        }
        Ok(())
    }
}
