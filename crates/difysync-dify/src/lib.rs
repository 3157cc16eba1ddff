//! difysync Dify - Dify knowledge-base API client
//!
//! Provides an async client for the Dify dataset API:
//! - Paginated listing of datasets and documents
//! - Dataset creation
//! - Document create/update by text and deletion
//!
//! ## Modules
//!
//! - [`client`] - HTTP client with bearer auth and typed responses
//! - [`provider`] - `RemoteDirectory` implementation on top of the client

pub mod client;
pub mod provider;

pub use client::DifyClient;
pub use provider::DifyRemoteDirectory;
