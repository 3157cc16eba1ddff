//! Reconciliation engine
//!
//! The [`ReconciliationEngine`] converges the remote knowledge base towards
//! the local tree in one sequential pass.
//!
//! ## Pass Flow
//!
//! 1. **Index**: List remote collections and index them by name
//! 2. **Directories**: Create a collection for every directory not in the index
//! 3. **Files**: Update the document matching each file's name, or create it
//! 4. **Sweep**: Delete documents of tracked files not seen in this pass
//!
//! Any failure aborts the pass. Remote changes applied before the failure
//! are kept; the next pass picks up from the resulting state.

use std::collections::{HashMap, HashSet};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Instant;

use chrono::{DateTime, Utc};
use serde::Serialize;
use tracing::{debug, info, warn};

use difysync_core::domain::{slash_path, Collection, CollectionId, RemoteDocument, TreeEntry};
use difysync_core::ports::RemoteDirectory;

use crate::scanner::TreeScanner;
use crate::tracking::TrackingStore;
use crate::SyncError;

// ============================================================================
// PassSummary
// ============================================================================

/// Summary of a completed reconciliation pass
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PassSummary {
    /// Collections created for directories missing remotely
    pub collections_created: u32,
    /// Documents created for files with no same-named remote document
    pub documents_created: u32,
    /// Documents re-uploaded in place
    pub documents_updated: u32,
    /// Documents removed because their file vanished
    pub documents_deleted: u32,
    /// Files directly under the root, which have no target collection
    pub files_skipped: u32,
    /// When the pass started
    pub started_at: DateTime<Utc>,
    /// Wall-clock duration of the pass in milliseconds
    pub duration_ms: u64,
}

impl PassSummary {
    fn started(started_at: DateTime<Utc>) -> Self {
        Self {
            collections_created: 0,
            documents_created: 0,
            documents_updated: 0,
            documents_deleted: 0,
            files_skipped: 0,
            started_at,
            duration_ms: 0,
        }
    }

    /// Total number of remote mutations performed
    pub fn remote_changes(&self) -> u32 {
        self.collections_created
            + self.documents_created
            + self.documents_updated
            + self.documents_deleted
    }
}

// ============================================================================
// DatasetNameIndex
// ============================================================================

/// Collection name to ID, rebuilt from a fresh listing on every pass
#[derive(Debug, Default)]
struct DatasetNameIndex {
    by_name: HashMap<String, CollectionId>,
}

impl DatasetNameIndex {
    /// Later entries win when the remote lists duplicate names
    fn from_listing(collections: Vec<Collection>) -> Self {
        let by_name = collections.into_iter().map(|c| (c.name, c.id)).collect();
        Self { by_name }
    }

    fn get(&self, name: &str) -> Option<&CollectionId> {
        self.by_name.get(name)
    }

    fn insert(&mut self, name: String, id: CollectionId) {
        self.by_name.insert(name, id);
    }

    fn len(&self) -> usize {
        self.by_name.len()
    }
}

// ============================================================================
// ReconciliationEngine
// ============================================================================

/// One-way sync engine from a local tree to remote collections
///
/// ## Dependencies
///
/// - `remote`: Collection and document operations (RemoteDirectory)
/// - `tracking`: Files synced by this engine, used to detect deletions
///
/// `sync` takes `&mut self`, so one engine never runs two passes at once.
pub struct ReconciliationEngine {
    remote: Arc<dyn RemoteDirectory>,
    tracking: TrackingStore,
}

impl ReconciliationEngine {
    /// Creates an engine with an empty tracking store
    pub fn new(remote: Arc<dyn RemoteDirectory>) -> Self {
        Self {
            remote,
            tracking: TrackingStore::new(),
        }
    }

    /// Files currently tracked by this engine
    pub fn tracking(&self) -> &TrackingStore {
        &self.tracking
    }

    /// Runs one reconciliation pass over `root`
    ///
    /// # Errors
    /// Returns the first scan or remote failure, wrapped with the path or
    /// collection name it concerns.
    #[tracing::instrument(skip_all, fields(root = %root.display()))]
    pub async fn sync(&mut self, root: &Path) -> Result<PassSummary, SyncError> {
        let start = Instant::now();
        let mut summary = PassSummary::started(Utc::now());

        let collections = self
            .remote
            .list_collections()
            .await
            .map_err(SyncError::ListCollections)?;
        let mut index = DatasetNameIndex::from_listing(collections);
        debug!(collections = index.len(), "Indexed remote collections");

        let scanner = TreeScanner::new(root);
        let mut seen: HashSet<PathBuf> = HashSet::new();

        for entry in scanner.scan() {
            let entry = entry?;
            if entry.is_dir() {
                self.reconcile_directory(&entry, &mut index, &mut summary)
                    .await?;
            } else if self.reconcile_file(&entry, &index, &mut summary).await? {
                seen.insert(entry.relative_path);
            }
        }

        self.sweep_deleted(&seen, &mut summary).await?;

        summary.duration_ms = start.elapsed().as_millis() as u64;
        info!(
            collections_created = summary.collections_created,
            documents_created = summary.documents_created,
            documents_updated = summary.documents_updated,
            documents_deleted = summary.documents_deleted,
            files_skipped = summary.files_skipped,
            tracked = self.tracking.len(),
            duration_ms = summary.duration_ms,
            "Sync pass completed"
        );

        Ok(summary)
    }

    async fn reconcile_directory(
        &self,
        entry: &TreeEntry,
        index: &mut DatasetNameIndex,
        summary: &mut PassSummary,
    ) -> Result<(), SyncError> {
        let name = entry.key();
        if index.get(&name).is_some() {
            debug!(collection = %name, "Collection exists");
            return Ok(());
        }

        let id = self
            .remote
            .create_collection(&name)
            .await
            .map_err(|source| SyncError::CreateCollection {
                name: name.clone(),
                source,
            })?;

        info!(collection = %name, id = %id, "Created collection");
        index.insert(name, id);
        summary.collections_created += 1;
        Ok(())
    }

    /// Uploads one file; returns `false` if the file sits at the root and was skipped
    async fn reconcile_file(
        &mut self,
        entry: &TreeEntry,
        index: &DatasetNameIndex,
        summary: &mut PassSummary,
    ) -> Result<bool, SyncError> {
        let path = &entry.relative_path;
        let Some(dir) = entry.parent_dir() else {
            debug!(path = %path.display(), "Skipping file at root");
            summary.files_skipped += 1;
            return Ok(false);
        };

        let dir = slash_path(dir);
        let collection_id =
            index
                .get(&dir)
                .cloned()
                .ok_or_else(|| SyncError::ParentCollectionMissing {
                    path: path.clone(),
                    dir: dir.clone(),
                })?;

        let name = entry.name();
        let content = entry.content_text();

        let documents = self
            .remote
            .list_documents(&collection_id)
            .await
            .map_err(|source| SyncError::ListDocuments {
                path: path.clone(),
                collection_id: collection_id.clone(),
                source,
            })?;

        let document_id = match RemoteDocument::find_by_name(&documents, &name) {
            Some(existing) => {
                self.remote
                    .update_document(&collection_id, &existing.id, &name, &content)
                    .await
                    .map_err(|source| SyncError::UpdateDocument {
                        path: path.clone(),
                        source,
                    })?;
                debug!(path = %path.display(), document = %existing.id, "Updated document");
                summary.documents_updated += 1;
                existing.id.clone()
            }
            None => {
                let id = self
                    .remote
                    .create_document(&collection_id, &name, &content)
                    .await
                    .map_err(|source| SyncError::CreateDocument {
                        path: path.clone(),
                        source,
                    })?;
                info!(path = %path.display(), document = %id, "Created document");
                summary.documents_created += 1;
                id
            }
        };

        if self.tracking.record(path, collection_id, document_id) {
            debug!(path = %path.display(), "Now tracking file");
        }
        Ok(true)
    }

    async fn sweep_deleted(
        &mut self,
        seen: &HashSet<PathBuf>,
        summary: &mut PassSummary,
    ) -> Result<(), SyncError> {
        for tracked in self.tracking.vanished(seen) {
            let path = tracked.relative_path;
            if let Err(source) = self
                .remote
                .delete_document(&tracked.collection_id, &tracked.document_id)
                .await
            {
                warn!(path = %path.display(), error = %source, "Delete failed, keeping record");
                return Err(SyncError::DeleteDocument { path, source });
            }

            self.tracking.remove(&path);
            info!(path = %path.display(), document = %tracked.document_id, "Deleted document");
            summary.documents_deleted += 1;
        }
        Ok(())
    }
}
