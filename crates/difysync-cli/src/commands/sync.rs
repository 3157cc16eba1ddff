//! Sync command - Run a single reconciliation pass
//!
//! Provides the `difysync sync` CLI command which:
//! 1. Validates the effective configuration
//! 2. Builds the Dify adapter and a fresh reconciliation engine
//! 3. Runs one pass over the watched folder and prints its summary
//!
//! A failed pass is returned as an error so the process exits non-zero.

use std::sync::Arc;

use anyhow::{Context, Result};
use clap::Args;
use tracing::info;

use difysync_dify::DifyRemoteDirectory;
use difysync_sync::{PassSummary, ReconciliationEngine};

use super::LoadedConfig;
use crate::output::{get_formatter, plural, OutputFormat};

#[derive(Debug, Args)]
pub struct SyncCommand {}

impl SyncCommand {
    pub async fn execute(&self, loaded: LoadedConfig, format: OutputFormat) -> Result<()> {
        let formatter = get_formatter(format);
        loaded.ensure_valid(formatter.as_ref())?;

        let source = loaded.source();
        let config = loaded.config;
        info!(
            %source,
            folder = %config.watch.folder.display(),
            base_url = %config.dify.base_url,
            "Starting one-shot sync"
        );

        let remote = Arc::new(DifyRemoteDirectory::from_config(&config.dify));
        let mut engine = ReconciliationEngine::new(remote);

        formatter.info(&format!("Synchronizing {}...", config.watch.folder.display()));
        let summary = engine
            .sync(&config.watch.folder)
            .await
            .context("Sync pass failed")?;

        match format {
            OutputFormat::Json => {
                let json = serde_json::to_value(&summary)
                    .context("Failed to serialize pass summary")?;
                formatter.print_json(&json);
            }
            OutputFormat::Human => {
                if summary.remote_changes() == 0 {
                    formatter.success("Already up to date");
                } else {
                    formatter.success(&format!("Sync completed in {}", duration(&summary)));
                }
                for line in summary_lines(&summary) {
                    formatter.info(&line);
                }
            }
        }

        Ok(())
    }
}

fn duration(summary: &PassSummary) -> String {
    if summary.duration_ms >= 1000 {
        format!("{:.1}s", summary.duration_ms as f64 / 1000.0)
    } else {
        format!("{}ms", summary.duration_ms)
    }
}

/// Non-zero counters of a pass, one line each
fn summary_lines(summary: &PassSummary) -> Vec<String> {
    let rows = [
        ("Collections created", summary.collections_created, "collection"),
        ("Documents created", summary.documents_created, "document"),
        ("Documents updated", summary.documents_updated, "document"),
        ("Documents deleted", summary.documents_deleted, "document"),
        ("Root files skipped", summary.files_skipped, "file"),
    ];
    rows.iter()
        .filter(|(_, count, _)| *count > 0)
        .map(|(label, count, noun)| format!("{:<20} {}", format!("{label}:"), plural(*count, noun)))
        .collect()
}
