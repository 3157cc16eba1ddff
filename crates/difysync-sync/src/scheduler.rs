//! Sync scheduler - the single task that runs reconciliation passes
//!
//! The [`SyncScheduler`] owns the [`ReconciliationEngine`] and is the only
//! place passes are started, so passes never overlap. Three kinds of
//! triggers are funnelled into its loop:
//!
//! ```text
//!  interval tick ─────────────────────────┐
//!  FileWatcher ──→ DebouncedChangeQueue ──┼──→ SyncScheduler ──→ engine.sync()
//!  SchedulerHandle::request_sync() ───────┘
//! ```
//!
//! A trigger arriving while a pass is running waits in its channel and
//! causes at most one follow-up pass.

use std::path::{Path, PathBuf};
use std::time::Duration;

use tokio::sync::mpsc;
use tokio::sync::mpsc::error::TrySendError;
use tokio::time::MissedTickBehavior;
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info};

use crate::engine::ReconciliationEngine;
use crate::scanner::is_hidden;
use crate::watcher::{ChangeEvent, DebouncedChangeQueue};

// ============================================================================
// SchedulerConfig
// ============================================================================

/// Timing settings for the scheduler loop
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SchedulerConfig {
    /// Time between periodic passes
    pub interval: Duration,
    /// Quiet period a changed path needs before it triggers a pass
    pub debounce_delay: Duration,
    /// How often the debounce queue is checked for settled changes
    pub poll_interval: Duration,
}

impl SchedulerConfig {
    pub fn new(interval: Duration, debounce_delay: Duration) -> Self {
        Self {
            interval,
            debounce_delay,
            poll_interval: Duration::from_millis(250),
        }
    }
}

// ============================================================================
// SchedulerHandle
// ============================================================================

/// Cloneable handle for requesting passes from outside the scheduler task
#[derive(Debug, Clone)]
pub struct SchedulerHandle {
    request_tx: mpsc::Sender<()>,
}

impl SchedulerHandle {
    /// Asks the scheduler to run a pass as soon as the current one finishes
    ///
    /// Requests made while one is already pending are merged. Returns
    /// `false` if the scheduler has stopped.
    pub fn request_sync(&self) -> bool {
        match self.request_tx.try_send(()) {
            Ok(()) => {
                info!("Manual sync requested");
                true
            }
            Err(TrySendError::Full(())) => {
                debug!("Manual sync already pending");
                true
            }
            Err(TrySendError::Closed(())) => false,
        }
    }
}

/// What started a pass
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Trigger {
    Startup,
    Interval,
    Changes,
    Manual,
}

impl Trigger {
    fn as_str(self) -> &'static str {
        match self {
            Trigger::Startup => "startup",
            Trigger::Interval => "interval",
            Trigger::Changes => "changes",
            Trigger::Manual => "manual",
        }
    }
}

// ============================================================================
// SyncScheduler
// ============================================================================

/// Runs reconciliation passes on timer, change and manual triggers
///
/// A failed pass is logged and the loop keeps waiting for the next trigger.
/// The loop ends when the cancellation token fires, or when both the change
/// channel and every [`SchedulerHandle`] are gone.
pub struct SyncScheduler {
    engine: ReconciliationEngine,
    root: PathBuf,
    config: SchedulerConfig,
    change_rx: Option<mpsc::Receiver<ChangeEvent>>,
    request_rx: mpsc::Receiver<()>,
    shutdown: CancellationToken,
}

impl SyncScheduler {
    /// Creates a scheduler for `root` and the handle used to request passes
    pub fn new(
        engine: ReconciliationEngine,
        root: impl Into<PathBuf>,
        config: SchedulerConfig,
        shutdown: CancellationToken,
    ) -> (Self, SchedulerHandle) {
        let (request_tx, request_rx) = mpsc::channel(1);
        let root = root.into();

        info!(
            root = %root.display(),
            interval_secs = config.interval.as_secs(),
            debounce_ms = config.debounce_delay.as_millis() as u64,
            "Creating sync scheduler"
        );

        let scheduler = Self {
            engine,
            root,
            config,
            change_rx: None,
            request_rx,
            shutdown,
        };
        (scheduler, SchedulerHandle { request_tx })
    }

    /// Feeds filesystem change events into the scheduler
    pub fn with_change_events(mut self, change_rx: mpsc::Receiver<ChangeEvent>) -> Self {
        self.change_rx = Some(change_rx);
        self
    }

    /// Runs the loop until shutdown and returns the engine
    ///
    /// An initial pass runs before any trigger is awaited.
    pub async fn run(self) -> ReconciliationEngine {
        let Self {
            mut engine,
            root,
            config,
            mut change_rx,
            mut request_rx,
            shutdown,
        } = self;

        info!("Sync scheduler starting");
        run_pass(&mut engine, &root, Trigger::Startup).await;

        let mut queue = DebouncedChangeQueue::new(config.debounce_delay);
        let mut requests_open = true;

        let mut ticker =
            tokio::time::interval_at(tokio::time::Instant::now() + config.interval, config.interval);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
        let mut poll_timer = tokio::time::interval(config.poll_interval);
        poll_timer.set_missed_tick_behavior(MissedTickBehavior::Delay);

        loop {
            if change_rx.is_none() && !requests_open {
                info!("All trigger channels closed");
                break;
            }

            tokio::select! {
                _ = shutdown.cancelled() => {
                    info!("Shutdown requested");
                    break;
                }

                _ = ticker.tick() => {
                    run_pass(&mut engine, &root, Trigger::Interval).await;
                }

                event = recv_change(&mut change_rx) => {
                    match event {
                        Some(change) if is_relevant(&root, &change) => queue.push(change),
                        Some(change) => debug!(event = ?change, "Ignoring hidden path"),
                        None => {
                            debug!("Change channel closed");
                            change_rx = None;
                        }
                    }
                }

                _ = poll_timer.tick(), if !queue.is_empty() => {
                    let settled = queue.poll();
                    if !settled.is_empty() {
                        info!(count = settled.len(), "Settled changes, starting pass");
                        run_pass(&mut engine, &root, Trigger::Changes).await;
                    }
                }

                request = request_rx.recv(), if requests_open => {
                    match request {
                        Some(()) => run_pass(&mut engine, &root, Trigger::Manual).await,
                        None => {
                            debug!("All scheduler handles dropped");
                            requests_open = false;
                        }
                    }
                }
            }
        }

        info!("Sync scheduler stopped");
        engine
    }
}

async fn recv_change(rx: &mut Option<mpsc::Receiver<ChangeEvent>>) -> Option<ChangeEvent> {
    match rx {
        Some(rx) => rx.recv().await,
        None => std::future::pending().await,
    }
}

/// Whether any path of the event is visible under `root`
fn is_relevant(root: &Path, event: &ChangeEvent) -> bool {
    event.paths().into_iter().any(|path| {
        let relative = path.strip_prefix(root).unwrap_or(path);
        !relative.as_os_str().is_empty() && !is_hidden(relative)
    })
}

async fn run_pass(engine: &mut ReconciliationEngine, root: &Path, trigger: Trigger) {
    match engine.sync(root).await {
        Ok(summary) => info!(
            trigger = trigger.as_str(),
            changes = summary.remote_changes(),
            duration_ms = summary.duration_ms,
            "Sync pass succeeded"
        ),
        Err(e) => error!(trigger = trigger.as_str(), error = %e, "Sync pass failed"),
    }
}
