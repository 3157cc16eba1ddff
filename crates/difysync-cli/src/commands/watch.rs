//! Watch command - Keep the folder in sync until interrupted
//!
//! Runs the sync scheduler in the foreground. Passes are triggered at
//! startup, every `watch.interval` seconds, after filesystem changes settle
//! (when `watch.notify` is on) and on SIGHUP. SIGINT or SIGTERM stops the
//! scheduler once the running pass completes.

use std::sync::Arc;
use std::time::Duration;

use anyhow::Result;
use clap::Args;
use tokio_util::sync::CancellationToken;
use tracing::{info, warn};

use difysync_dify::DifyRemoteDirectory;
use difysync_sync::watcher::FileWatcher;
use difysync_sync::{ReconciliationEngine, SchedulerConfig, SchedulerHandle, SyncScheduler};

use super::LoadedConfig;
use crate::output::{get_formatter, OutputFormat};

#[derive(Debug, Args)]
pub struct WatchCommand {
    /// Disable filesystem notifications and rely on the interval only
    #[arg(long)]
    pub no_notify: bool,
}

impl WatchCommand {
    pub async fn execute(&self, loaded: LoadedConfig, format: OutputFormat) -> Result<()> {
        let formatter = get_formatter(format);
        loaded.ensure_valid(formatter.as_ref())?;

        let source = loaded.source();
        let config = loaded.config;
        let folder = config.watch.folder.clone();
        let notify = config.watch.notify && !self.no_notify;
        info!(
            %source,
            folder = %folder.display(),
            base_url = %config.dify.base_url,
            interval_secs = config.watch.interval,
            notify,
            "Starting watch"
        );

        let remote = Arc::new(DifyRemoteDirectory::from_config(&config.dify));
        let engine = ReconciliationEngine::new(remote);
        let scheduler_config = SchedulerConfig::new(
            Duration::from_secs(config.watch.interval),
            Duration::from_secs(config.watch.debounce_delay),
        );

        let shutdown = CancellationToken::new();
        let (mut scheduler, handle) =
            SyncScheduler::new(engine, folder.clone(), scheduler_config, shutdown.clone());

        // The watcher must outlive the scheduler loop
        let _watcher = if notify {
            let (watcher, change_rx) = FileWatcher::start(&folder)?;
            scheduler = scheduler.with_change_events(change_rx);
            Some(watcher)
        } else {
            None
        };

        tokio::spawn(shutdown_signal(shutdown.clone()));
        tokio::spawn(resync_on_hangup(handle.clone(), shutdown.clone()));

        formatter.success(&format!("Watching {}", folder.display()));
        formatter.info("Press Ctrl+C to stop");

        let engine = scheduler.run().await;
        drop(handle);

        formatter.success(&format!(
            "Stopped; {} file{} tracked",
            engine.tracking().len(),
            if engine.tracking().len() == 1 { "" } else { "s" }
        ));
        Ok(())
    }
}

/// Waits for SIGTERM or SIGINT and triggers the cancellation token
async fn shutdown_signal(token: CancellationToken) {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            warn!(error = %e, "Failed to listen for Ctrl+C");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                warn!(error = %e, "Failed to install SIGTERM handler");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            info!("Received SIGINT (Ctrl+C)");
        }
        _ = terminate => {
            info!("Received SIGTERM");
        }
        _ = token.cancelled() => return,
    }

    token.cancel();
}

/// Requests a pass on every SIGHUP until shutdown
#[cfg(unix)]
async fn resync_on_hangup(handle: SchedulerHandle, token: CancellationToken) {
    use tokio::signal::unix::{signal, SignalKind};

    let mut hangup = match signal(SignalKind::hangup()) {
        Ok(signal) => signal,
        Err(e) => {
            warn!(error = %e, "Failed to install SIGHUP handler");
            return;
        }
    };

    loop {
        tokio::select! {
            _ = token.cancelled() => break,
            received = hangup.recv() => {
                if received.is_none() || !handle.request_sync() {
                    break;
                }
                info!("Received SIGHUP");
            }
        }
    }
}

#[cfg(not(unix))]
async fn resync_on_hangup(_handle: SchedulerHandle, _token: CancellationToken) {}
