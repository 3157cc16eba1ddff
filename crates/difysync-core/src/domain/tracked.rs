//! Tracking records
//!
//! A [`TrackedFile`] remembers which remote document a local file was last
//! synced to. It is local-only state, used to notice files that disappeared
//! between passes.

use std::path::PathBuf;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::newtypes::{CollectionId, DocumentId};

/// Link between a local file and the remote document mirroring it
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TrackedFile {
    /// File path relative to the watched root
    pub relative_path: PathBuf,
    /// Collection holding the document
    pub collection_id: CollectionId,
    /// Document mirroring the file
    pub document_id: DocumentId,
    /// When the file was last uploaded
    pub synced_at: DateTime<Utc>,
}

impl TrackedFile {
    pub fn new(
        relative_path: impl Into<PathBuf>,
        collection_id: CollectionId,
        document_id: DocumentId,
    ) -> Self {
        Self {
            relative_path: relative_path.into(),
            collection_id,
            document_id,
            synced_at: Utc::now(),
        }
    }

    /// Whether this record points at the given remote document
    pub fn points_to(&self, collection_id: &CollectionId, document_id: &DocumentId) -> bool {
        &self.collection_id == collection_id && &self.document_id == document_id
    }
}
