//! Backend adapter trait
//!
//! This trait lets the façade swap the physical store without knowing
//! anything about its query language. Every adapter keeps one
//! table/collection per store name with two fields: `key` and `value`
//! (the serialized payload).

use async_trait::async_trait;
use kvlayer_core::StorageResult;
use std::fmt;

/// Kind of physical store behind an adapter
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BackendKind {
    /// Process-local map, nothing persisted
    Memory,
    /// Relational engine (SQLite)
    Relational,
    /// Document store (one JSON document per record)
    Document,
    /// Embedded file-backed engine (redb)
    Embedded,
}

impl BackendKind {
    /// Short name used in logs and errors
    pub fn as_str(&self) -> &'static str {
        match self {
            BackendKind::Memory => "memory",
            BackendKind::Relational => "sqlite",
            BackendKind::Document => "document",
            BackendKind::Embedded => "redb",
        }
    }
}

impl fmt::Display for BackendKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Storage abstraction for one physical store
///
/// Thread safety: all methods must be safe to call concurrently from
/// multiple tasks (requires Send + Sync).
///
/// Errors from the underlying engine are wrapped in
/// [`kvlayer_core::StorageError`] without translation.
#[async_trait]
pub trait StorageBackend: Send + Sync {
    /// Which kind of store this adapter talks to
    fn kind(&self) -> BackendKind;

    /// Make the store ready for use (create the table, directory, ...)
    ///
    /// Must be idempotent.
    async fn connect(&self) -> StorageResult<()>;

    /// Release the store. The default does nothing.
    async fn disconnect(&self) -> StorageResult<()> {
        Ok(())
    }

    /// Point lookup
    ///
    /// Returns `None` if the key doesn't exist.
    async fn point_get(&self, key: &str) -> StorageResult<Option<String>>;

    /// Insert the record, or update it if the key already exists
    async fn upsert(&self, key: &str, value: &str) -> StorageResult<()>;

    /// Point delete
    ///
    /// Returns the number of records removed; 0 if the key didn't exist.
    async fn point_delete(&self, key: &str) -> StorageResult<u64>;

    /// Every record, in backend-defined order
    async fn scan_all(&self) -> StorageResult<Vec<(String, String)>>;

    /// Delete every record
    ///
    /// Returns the number of records removed.
    async fn truncate_all(&self) -> StorageResult<u64>;
}
