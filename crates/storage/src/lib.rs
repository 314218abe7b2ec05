//! Storage layer for kvlayer
//!
//! This crate implements the physical stores behind the key-value façade:
//! - StorageBackend: the adapter contract (point get/upsert/delete, scan, truncate)
//! - MemoryBackend: process-local map
//! - SqliteBackend: relational engine (feature `sqlite`)
//! - DocumentBackend: one JSON document per record (feature `document`)
//! - RedbBackend: embedded file-backed engine (feature `redb`)
//! - Backend / BackendConfig: store selection, resolved once at construction

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod backend;
pub mod backends;
pub mod traits;

#[cfg(test)]
mod testing;

pub use backend::{Backend, BackendConfig};
pub use backends::MemoryBackend;
pub use traits::{BackendKind, StorageBackend};

#[cfg(feature = "document")]
pub use backends::DocumentBackend;
#[cfg(feature = "redb")]
pub use backends::RedbBackend;
#[cfg(feature = "sqlite")]
pub use backends::SqliteBackend;
