//! In-memory backend
//!
//! A `HashMap` behind a `RwLock`. Nothing survives the process; useful for
//! tests and for stores that only need the façade's path and event logic.

use crate::traits::{BackendKind, StorageBackend};
use async_trait::async_trait;
use kvlayer_core::StorageResult;
use parking_lot::RwLock;
use std::collections::HashMap;
use std::sync::Arc;

/// Process-local backend
///
/// Clones share the same records.
#[derive(Debug, Clone, Default)]
pub struct MemoryBackend {
    records: Arc<RwLock<HashMap<String, String>>>,
}

impl MemoryBackend {
    /// Create an empty backend
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of stored records
    pub fn len(&self) -> usize {
        self.records.read().len()
    }

    /// True if nothing is stored
    pub fn is_empty(&self) -> bool {
        self.records.read().is_empty()
    }
}

#[async_trait]
impl StorageBackend for MemoryBackend {
    fn kind(&self) -> BackendKind {
        BackendKind::Memory
    }

    async fn connect(&self) -> StorageResult<()> {
        Ok(())
    }

    async fn point_get(&self, key: &str) -> StorageResult<Option<String>> {
        Ok(self.records.read().get(key).cloned())
    }

    async fn upsert(&self, key: &str, value: &str) -> StorageResult<()> {
        self.records
            .write()
            .insert(key.to_string(), value.to_string());
        Ok(())
    }

    async fn point_delete(&self, key: &str) -> StorageResult<u64> {
        Ok(u64::from(self.records.write().remove(key).is_some()))
    }

    async fn scan_all(&self) -> StorageResult<Vec<(String, String)>> {
        Ok(self
            .records
            .read()
            .iter()
            .map(|(k, v)| (k.clone(), v.clone()))
            .collect())
    }

    async fn truncate_all(&self) -> StorageResult<u64> {
        let mut records = self.records.write();
        let removed = records.len() as u64;
        records.clear();
        Ok(removed)
    }
}
