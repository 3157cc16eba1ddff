//! CLI subcommands and the configuration they share

pub mod config;
pub mod sync;
pub mod watch;

use std::path::PathBuf;

use anyhow::{bail, Context, Result};
use clap::Args;

use difysync_core::config::Config;

use crate::output::OutputFormatter;

/// Global flags that locate and override the configuration file
#[derive(Debug, Default, Args)]
pub struct ConfigOverrides {
    /// Use alternate config file
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    /// Folder to synchronize (overrides watch.folder)
    #[arg(long, global = true)]
    pub folder: Option<PathBuf>,

    /// Dify dataset API key (overrides dify.api_key)
    #[arg(long, global = true, env = "DIFYSYNC_API_KEY", hide_env_values = true)]
    pub api_key: Option<String>,

    /// Dify base URL (overrides dify.base_url)
    #[arg(long, global = true)]
    pub base_url: Option<String>,
}

/// Effective configuration plus the file it came from, if any
#[derive(Debug)]
pub struct LoadedConfig {
    pub config: Config,
    pub path: Option<PathBuf>,
}

impl ConfigOverrides {
    /// Loads the configuration file and applies the flag overrides
    ///
    /// An explicit `--config` must exist and parse. Without it the first
    /// discovered file is used, or the defaults when none exists.
    pub fn resolve(&self) -> Result<LoadedConfig> {
        let path = match &self.config {
            Some(path) => Some(path.clone()),
            None => Config::discover(),
        };

        let mut config = match &path {
            Some(path) => Config::load(path)
                .with_context(|| format!("Failed to load configuration from {}", path.display()))?,
            None => Config::default(),
        };

        self.apply(&mut config);
        Ok(LoadedConfig { config, path })
    }

    fn apply(&self, config: &mut Config) {
        if let Some(folder) = &self.folder {
            config.watch.folder = folder.clone();
        }
        if let Some(api_key) = &self.api_key {
            config.dify.api_key = api_key.clone();
        }
        if let Some(base_url) = &self.base_url {
            config.dify.base_url = base_url.clone();
        }
    }
}

impl LoadedConfig {
    pub fn source(&self) -> String {
        self.path
            .as_ref()
            .map(|p| p.display().to_string())
            .unwrap_or_else(|| "defaults".to_string())
    }

    /// Reports validation errors and fails if there are any
    pub fn ensure_valid(&self, formatter: &dyn OutputFormatter) -> Result<()> {
        let errors = self.config.validate();
        if errors.is_empty() {
            return Ok(());
        }
        for error in &errors {
            formatter.error(&error.to_string());
        }
        bail!(
            "Invalid configuration ({}): {} error{}",
            self.source(),
            errors.len(),
            if errors.len() == 1 { "" } else { "s" }
        );
    }
}
