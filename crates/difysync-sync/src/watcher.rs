//! Filesystem watching and debounced change queue
//!
//! [`FileWatcher`] wraps the `notify` crate and turns raw OS events under the
//! watched root into [`ChangeEvent`] values delivered over a tokio channel.
//!
//! [`DebouncedChangeQueue`] coalesces bursts of events per path so that an
//! editor saving a file several times in a row produces one sync trigger.
//!
//! ## Architecture
//!
//! ```text
//! inotify / kqueue / ReadDirectoryChangesW
//!       │
//!       ▼
//!  FileWatcher  ──→  mpsc::channel  ──→  SyncScheduler (DebouncedChangeQueue)
//! ```

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::time::{Duration, Instant};

use anyhow::{Context, Result};
use notify::event::{ModifyKind, RenameMode};
use notify::{EventKind, RecommendedWatcher, RecursiveMode, Watcher};
use tokio::sync::mpsc;
use tracing::{debug, error, info, warn};

/// Capacity of the watcher to scheduler channel
const EVENT_CHANNEL_CAPACITY: usize = 1024;

// ============================================================================
// ChangeEvent
// ============================================================================

/// A filesystem change under the watched root
///
/// Decoupled from `notify`'s event types so the scheduler can be driven by
/// any event source.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ChangeEvent {
    Created(PathBuf),
    Modified(PathBuf),
    Deleted(PathBuf),
    Renamed { old: PathBuf, new: PathBuf },
}

impl ChangeEvent {
    /// Primary path of the event (the destination for renames)
    pub fn path(&self) -> &Path {
        match self {
            ChangeEvent::Created(p) | ChangeEvent::Modified(p) | ChangeEvent::Deleted(p) => p,
            ChangeEvent::Renamed { new, .. } => new,
        }
    }

    /// Every path the event touches
    pub fn paths(&self) -> Vec<&Path> {
        match self {
            ChangeEvent::Renamed { old, new } => vec![old.as_path(), new.as_path()],
            other => vec![other.path()],
        }
    }
}

// ============================================================================
// FileWatcher
// ============================================================================

/// Recursive watch on the sync root
///
/// Dropping the watcher stops the OS watch and closes the event channel.
///
/// ```ignore
/// let (watcher, rx) = FileWatcher::start(Path::new("/data/knowledge"))?;
/// // rx.recv().await yields ChangeEvents
/// drop(watcher);
/// ```
pub struct FileWatcher {
    _watcher: RecommendedWatcher,
    root: PathBuf,
}

impl FileWatcher {
    /// Starts watching `root` and all of its subdirectories
    ///
    /// # Errors
    /// Returns an error if the OS watcher cannot be created or the root
    /// cannot be watched (missing path, permissions, inotify watch limit)
    pub fn start(root: &Path) -> Result<(Self, mpsc::Receiver<ChangeEvent>)> {
        let (event_tx, event_rx) = mpsc::channel::<ChangeEvent>(EVENT_CHANNEL_CAPACITY);

        let mut watcher = RecommendedWatcher::new(
            move |res: std::result::Result<notify::Event, notify::Error>| match res {
                Ok(event) => {
                    if let Some(change) = map_notify_event(&event) {
                        if let Err(e) = event_tx.blocking_send(change) {
                            warn!(error = %e, "Dropping change event, scheduler is gone");
                        }
                    }
                }
                Err(err) => {
                    error!(error = %err, "File watcher error");
                }
            },
            notify::Config::default(),
        )
        .context("Failed to create file watcher")?;

        watcher
            .watch(root, RecursiveMode::Recursive)
            .with_context(|| format!("Failed to watch path: {}", root.display()))?;

        info!(root = %root.display(), "Watching for filesystem changes");

        Ok((
            Self {
                _watcher: watcher,
                root: root.to_path_buf(),
            },
            event_rx,
        ))
    }

    pub fn root(&self) -> &Path {
        &self.root
    }
}

// ============================================================================
// Event mapping - notify::Event → ChangeEvent
// ============================================================================

/// Converts a `notify::Event` into a [`ChangeEvent`]
///
/// - `Create(*)` -> `Created`
/// - `Modify(Name(Both))` with two paths -> `Renamed`
/// - `Remove(*)` -> `Deleted`
/// - any other `Modify(*)` -> `Modified`
///
/// Access events and events without paths yield `None`.
fn map_notify_event(event: &notify::Event) -> Option<ChangeEvent> {
    let paths = &event.paths;

    let change = match &event.kind {
        EventKind::Create(_) => ChangeEvent::Created(paths.first()?.clone()),
        EventKind::Modify(ModifyKind::Name(RenameMode::Both)) => match paths.as_slice() {
            [old, new, ..] => ChangeEvent::Renamed {
                old: old.clone(),
                new: new.clone(),
            },
            [only] => ChangeEvent::Modified(only.clone()),
            [] => return None,
        },
        EventKind::Modify(_) => ChangeEvent::Modified(paths.first()?.clone()),
        EventKind::Remove(_) => ChangeEvent::Deleted(paths.first()?.clone()),
        _ => {
            debug!(kind = ?event.kind, "Ignoring event kind");
            return None;
        }
    };

    debug!(event = ?change, "Mapped filesystem event");
    Some(change)
}

// ============================================================================
// DebouncedChangeQueue
// ============================================================================

/// Coalesces rapid changes per path until they settle
///
/// A new event for a path replaces the pending one and restarts its quiet
/// period. [`poll`](DebouncedChangeQueue::poll) only releases events that
/// have been quiet for at least the debounce delay.
pub struct DebouncedChangeQueue {
    pending: HashMap<PathBuf, (ChangeEvent, Instant)>,
    debounce_delay: Duration,
}

impl DebouncedChangeQueue {
    pub fn new(debounce_delay: Duration) -> Self {
        Self {
            pending: HashMap::new(),
            debounce_delay,
        }
    }

    /// Inserts or replaces the pending event for the event's path
    pub fn push(&mut self, event: ChangeEvent) {
        let path = event.path().to_path_buf();
        self.pending.insert(path, (event, Instant::now()));
    }

    /// Removes and returns every event older than the debounce delay
    pub fn poll(&mut self) -> Vec<ChangeEvent> {
        let now = Instant::now();
        let delay = self.debounce_delay;
        let mut settled = Vec::new();

        self.pending.retain(|_, (event, timestamp)| {
            if now.duration_since(*timestamp) >= delay {
                settled.push(event.clone());
                false
            } else {
                true
            }
        });

        if !settled.is_empty() {
            debug!(count = settled.len(), "Changes settled");
        }
        settled
    }

    pub fn pending_count(&self) -> usize {
        self.pending.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pending.is_empty()
    }
}
