//! difysync Core - Domain types, ports and configuration
//!
//! This crate contains the hexagonal architecture core with:
//! - **Domain entities** - `Collection`, `RemoteDocument`, `TreeEntry`, `TrackedFile`
//! - **Newtypes** - `CollectionId`, `DocumentId` opaque remote identifiers
//! - **Port definitions** - The `RemoteDirectory` trait implemented by remote adapters
//! - **Configuration** - YAML-backed settings with validation and a builder
//!
//! # Architecture
//!
//! The domain module contains plain data with no I/O. Ports define the trait
//! interfaces that adapter crates (`difysync-dify`) implement, and the sync
//! crate drives them from the reconciliation engine.

pub mod config;
pub mod domain;
pub mod ports;
