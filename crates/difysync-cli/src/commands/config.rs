//! Config command - View and validate difysync configuration
//!
//! Provides the `difysync config` CLI command which:
//! 1. Shows the effective configuration (file plus flag overrides) as YAML
//!    or JSON, with the API key redacted
//! 2. Validates the effective configuration and reports every error

use anyhow::{bail, Context, Result};
use clap::Subcommand;
use tracing::info;

use difysync_core::config::Config;

use super::LoadedConfig;
use crate::output::{get_formatter, OutputFormat};

const REDACTED: &str = "********";

#[derive(Debug, Subcommand)]
pub enum ConfigCommand {
    /// Display the effective configuration
    Show,
    /// Validate the effective configuration
    Validate,
}

impl ConfigCommand {
    pub async fn execute(&self, loaded: LoadedConfig, format: OutputFormat) -> Result<()> {
        match self {
            ConfigCommand::Show => execute_show(&loaded, format),
            ConfigCommand::Validate => execute_validate(&loaded, format),
        }
    }
}

/// Copy of `config` that is safe to print
fn redacted(config: &Config) -> Config {
    let mut config = config.clone();
    if !config.dify.api_key.is_empty() {
        config.dify.api_key = REDACTED.to_string();
    }
    config
}

fn execute_show(loaded: &LoadedConfig, format: OutputFormat) -> Result<()> {
    let formatter = get_formatter(format);
    let config = redacted(&loaded.config);

    info!(source = %loaded.source(), "Showing configuration");

    match format {
        OutputFormat::Json => {
            let json = serde_json::json!({
                "source": loaded.source(),
                "config": serde_json::to_value(&config)
                    .context("Failed to serialize configuration to JSON")?,
            });
            formatter.print_json(&json);
        }
        OutputFormat::Human => {
            formatter.success(&format!("Configuration ({})", loaded.source()));
            formatter.info("");
            let yaml = serde_yaml::to_string(&config)
                .context("Failed to serialize configuration to YAML")?;
            for line in yaml.lines() {
                formatter.info(line);
            }
        }
    }

    Ok(())
}

fn execute_validate(loaded: &LoadedConfig, format: OutputFormat) -> Result<()> {
    let formatter = get_formatter(format);

    info!(source = %loaded.source(), "Validating configuration");

    let errors = loaded.config.validate();

    match format {
        OutputFormat::Json => {
            let error_strings: Vec<String> = errors.iter().map(|e| e.to_string()).collect();
            formatter.print_json(&serde_json::json!({
                "valid": errors.is_empty(),
                "source": loaded.source(),
                "errors": error_strings,
            }));
        }
        OutputFormat::Human if errors.is_empty() => {
            formatter.success("Configuration is valid");
            formatter.info(&format!("Source: {}", loaded.source()));
        }
        OutputFormat::Human => {
            formatter.error(&format!(
                "Configuration has {} error{}:",
                errors.len(),
                if errors.len() == 1 { "" } else { "s" }
            ));
            formatter.info(&format!("Source: {}", loaded.source()));
            formatter.info("");
            for error in &errors {
                formatter.info(&format!("  {} - {}", error.field, error.message));
            }
        }
    }

    if !errors.is_empty() {
        bail!("configuration is invalid");
    }
    Ok(())
}
