//! Domain entities
//!
//! This module contains the core domain types for difysync:
//! - Newtypes for remote identifiers
//! - Remote collection and document descriptors
//! - Local tree entries produced by a scan
//! - Tracking records linking local files to remote documents
//! - Domain-specific error types

pub mod errors;
pub mod newtypes;
pub mod remote;
pub mod tracked;
pub mod tree;

// Re-export commonly used types
pub use errors::DomainError;
pub use newtypes::{CollectionId, DocumentId};
pub use remote::{Collection, RemoteDocument};
pub use tracked::TrackedFile;
pub use tree::{slash_path, EntryKind, TreeEntry};
