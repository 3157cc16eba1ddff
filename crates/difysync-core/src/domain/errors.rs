//! Domain error types
//!
//! This module defines error types specific to domain operations,
//! such as malformed remote identifiers.

use thiserror::Error;

/// Errors that can occur in domain operations
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum DomainError {
    /// Invalid remote identifier (collection or document ID)
    #[error("Invalid remote ID: {0}")]
    InvalidRemoteId(String),
}
