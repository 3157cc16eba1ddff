//! difysync Sync - Reconciliation engine and sync triggers
//!
//! Provides:
//! - One-pass reconciliation of a local tree against remote collections
//! - In-memory tracking of synced files for deletion detection
//! - Filesystem watching with debounced change events
//! - A scheduler that serializes timer, change and manual triggers
//!
//! ## Modules
//!
//! - [`scanner`] - Ordered, hidden-aware traversal of the watched root
//! - [`tracking`] - Relative path to remote document records
//! - [`engine`] - The reconciliation pass and its summary
//! - [`watcher`] - `notify` wrapper and debounced change queue
//! - [`scheduler`] - Single task owning the engine and running passes

pub mod engine;
pub mod scanner;
pub mod scheduler;
pub mod tracking;
pub mod watcher;

#[cfg(test)]
pub(crate) mod testing;

use std::path::PathBuf;

use thiserror::Error;

use difysync_core::domain::CollectionId;
use difysync_core::ports::RemoteError;

pub use engine::{PassSummary, ReconciliationEngine};
pub use scanner::TreeScanner;
pub use scheduler::{SchedulerConfig, SchedulerHandle, SyncScheduler};
pub use tracking::TrackingStore;

/// Errors raised while walking the local tree
#[derive(Debug, Error)]
pub enum ScanError {
    /// A directory could not be listed or an entry could not be inspected
    #[error("failed to traverse {path}: {source}")]
    Walk {
        path: PathBuf,
        #[source]
        source: walkdir::Error,
    },

    /// A file could not be read
    #[error("failed to read {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The walker produced a path that does not live under the root
    #[error("path is outside the watched root: {path}")]
    OutsideRoot { path: PathBuf },
}

/// Errors that abort a reconciliation pass
///
/// Every variant carries the local path or collection name it concerns.
#[derive(Debug, Error)]
pub enum SyncError {
    #[error("scan failed: {0}")]
    Scan(#[from] ScanError),

    #[error("failed to list collections: {0}")]
    ListCollections(#[source] RemoteError),

    #[error("failed to create collection '{name}': {source}")]
    CreateCollection {
        name: String,
        #[source]
        source: RemoteError,
    },

    /// A file's directory was not resolved before the file itself
    #[error("parent collection '{dir}' not found for {path}")]
    ParentCollectionMissing { path: PathBuf, dir: String },

    #[error("failed to list documents of collection {collection_id} for {path}: {source}")]
    ListDocuments {
        path: PathBuf,
        collection_id: CollectionId,
        #[source]
        source: RemoteError,
    },

    #[error("failed to update document for {path}: {source}")]
    UpdateDocument {
        path: PathBuf,
        #[source]
        source: RemoteError,
    },

    #[error("failed to create document for {path}: {source}")]
    CreateDocument {
        path: PathBuf,
        #[source]
        source: RemoteError,
    },

    #[error("failed to delete document for {path}: {source}")]
    DeleteDocument {
        path: PathBuf,
        #[source]
        source: RemoteError,
    },
}

impl SyncError {
    /// The remote error behind this failure, if any
    pub fn remote_error(&self) -> Option<&RemoteError> {
        match self {
            Self::ListCollections(source)
            | Self::CreateCollection { source, .. }
            | Self::ListDocuments { source, .. }
            | Self::UpdateDocument { source, .. }
            | Self::CreateDocument { source, .. }
            | Self::DeleteDocument { source, .. } => Some(source),
            Self::Scan(_) | Self::ParentCollectionMissing { .. } => None,
        }
    }
}
