//! Port definitions
//!
//! Ports are the interfaces the sync engine depends on, implemented by
//! adapter crates.
//!
//! ## Ports Overview
//!
//! - [`RemoteDirectory`] - Collection and document operations on the
//!   knowledge-base service (Dify, or an in-memory fake in tests)

pub mod remote_directory;

pub use remote_directory::{RemoteDirectory, RemoteError};
