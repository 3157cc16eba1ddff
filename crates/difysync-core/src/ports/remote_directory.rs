//! Remote directory port (driven/secondary port)
//!
//! This module defines the interface the reconciliation engine uses to read
//! and mutate the remote knowledge base. Collections are addressed by name
//! when created and by opaque ID afterwards; documents are always scoped to
//! one collection.
//!
//! ## Design Notes
//!
//! - Errors are typed as [`RemoteError`] so the engine can wrap them with the
//!   path or name they concern.
//! - Uses `#[async_trait]` for async trait methods.

use thiserror::Error;

use crate::domain::{Collection, CollectionId, DocumentId, RemoteDocument};

// ============================================================================
// RemoteError
// ============================================================================

/// Failure of a single remote call
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum RemoteError {
    /// Connection or network failure before a response was received
    #[error("transport error: {0}")]
    Transport(String),

    /// The service answered with a non-2xx status
    #[error("request to {url} failed with status {status}: {body}")]
    Status {
        status: u16,
        url: String,
        body: String,
    },

    /// The response body was malformed or lacked an expected identifier
    #[error("decode error: {0}")]
    Decode(String),
}

impl RemoteError {
    /// Returns the HTTP status code for [`RemoteError::Status`]
    pub fn status(&self) -> Option<u16> {
        match self {
            Self::Status { status, .. } => Some(*status),
            _ => None,
        }
    }
}

// ============================================================================
// RemoteDirectory trait
// ============================================================================

/// Port trait for knowledge-base operations
///
/// Implementations must be thread-safe (`Send + Sync`) so the engine can be
/// moved into a scheduler task.
#[async_trait::async_trait]
pub trait RemoteDirectory: Send + Sync {
    /// Lists every collection visible to the configured credentials
    async fn list_collections(&self) -> Result<Vec<Collection>, RemoteError>;

    /// Creates a collection and returns its ID
    async fn create_collection(&self, name: &str) -> Result<CollectionId, RemoteError>;

    /// Lists the documents of one collection
    async fn list_documents(
        &self,
        collection_id: &CollectionId,
    ) -> Result<Vec<RemoteDocument>, RemoteError>;

    /// Creates a document from text content and returns its ID
    async fn create_document(
        &self,
        collection_id: &CollectionId,
        name: &str,
        content: &str,
    ) -> Result<DocumentId, RemoteError>;

    /// Replaces the name and content of an existing document
    async fn update_document(
        &self,
        collection_id: &CollectionId,
        document_id: &DocumentId,
        name: &str,
        content: &str,
    ) -> Result<(), RemoteError>;

    /// Deletes a document
    async fn delete_document(
        &self,
        collection_id: &CollectionId,
        document_id: &DocumentId,
    ) -> Result<(), RemoteError>;
}
