//! Local tracking store
//!
//! Maps each synced file's relative path to the remote document it was last
//! uploaded to. The store lives in memory for the life of the engine and is
//! only consulted to find files that disappeared since an earlier pass.

use std::collections::{BTreeMap, HashSet};
use std::path::{Path, PathBuf};

use tracing::debug;

use difysync_core::domain::{CollectionId, DocumentId, TrackedFile};

/// Ordered map of relative path to [`TrackedFile`]
#[derive(Debug, Default, Clone)]
pub struct TrackingStore {
    entries: BTreeMap<PathBuf, TrackedFile>,
}

impl TrackingStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Records or refreshes the remote identifiers for `path`
    ///
    /// Returns `true` if the path was not tracked before.
    pub fn record(
        &mut self,
        path: &Path,
        collection_id: CollectionId,
        document_id: DocumentId,
    ) -> bool {
        let tracked = TrackedFile::new(path, collection_id, document_id);
        match self.entries.insert(path.to_path_buf(), tracked) {
            Some(previous) => {
                let current = &self.entries[path];
                if !current.points_to(&previous.collection_id, &previous.document_id) {
                    debug!(
                        path = %path.display(),
                        old_document = %previous.document_id,
                        new_document = %current.document_id,
                        "Tracked file moved to a different document"
                    );
                }
                false
            }
            None => true,
        }
    }

    pub fn get(&self, path: &Path) -> Option<&TrackedFile> {
        self.entries.get(path)
    }

    pub fn remove(&mut self, path: &Path) -> Option<TrackedFile> {
        self.entries.remove(path)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Tracked files whose path is not in `seen`, in path order
    pub fn vanished(&self, seen: &HashSet<PathBuf>) -> Vec<TrackedFile> {
        self.entries
            .iter()
            .filter(|(path, _)| !seen.contains(*path))
            .map(|(_, tracked)| tracked.clone())
            .collect()
    }
}
