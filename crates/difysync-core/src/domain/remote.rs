//! Remote entity descriptors
//!
//! These are the views the remote directory returns when listing. Both
//! entities are addressed by opaque IDs and matched by name.

use serde::{Deserialize, Serialize};

use super::newtypes::{CollectionId, DocumentId};

/// A remote collection (one per synced local directory)
///
/// `name` is the natural key and equals the directory's path relative to
/// the watched root, using `/` as separator.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Collection {
    pub id: CollectionId,
    pub name: String,
}

impl Collection {
    pub fn new(id: CollectionId, name: impl Into<String>) -> Self {
        Self {
            id,
            name: name.into(),
        }
    }
}

/// A remote document inside one collection
///
/// `name` equals the base name of the local file it mirrors.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RemoteDocument {
    pub id: DocumentId,
    pub name: String,
}

impl RemoteDocument {
    pub fn new(id: DocumentId, name: impl Into<String>) -> Self {
        Self {
            id,
            name: name.into(),
        }
    }

    /// Returns the first document in `documents` whose name equals `name`
    pub fn find_by_name<'a>(documents: &'a [RemoteDocument], name: &str) -> Option<&'a Self> {
        documents.iter().find(|doc| doc.name == name)
    }
}
