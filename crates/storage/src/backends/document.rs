//! Document-store adapter
//!
//! Each store name is a collection directory; each record is one JSON
//! document `{"key": ..., "value": ...}` in that directory. Document file
//! names are the SHA-256 of the key, so any valid key maps to a safe file
//! name and the key itself lives inside the document.
//!
//! ```text
//! <root>/
//!   <collection>/
//!     3a7bd3e2360a3d29eea436fcfb7e44c735d117c42d1c1835420b6b9942dd4f1b.json
//! ```
//!
//! Writes go to a uniquely named temporary file first and are renamed into
//! place, so a reader never sees a half-written document.

use crate::traits::{BackendKind, StorageBackend};
use async_trait::async_trait;
use kvlayer_core::{is_valid_table_name, StorageError, StorageResult};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use std::io;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicU64, Ordering};
use tokio::fs;

const BACKEND: &str = "document";
const DOC_EXT: &str = "json";
const TMP_EXT: &str = "tmp";

static NEXT_TMP: AtomicU64 = AtomicU64::new(0);

fn io_err(e: io::Error) -> StorageError {
    StorageError::new(BACKEND, e)
}

/// One stored record
#[derive(Debug, Serialize, Deserialize)]
struct Document {
    key: String,
    value: String,
}

/// Document backend rooted at a directory
#[derive(Debug, Clone)]
pub struct DocumentBackend {
    collection_dir: PathBuf,
}

impl DocumentBackend {
    /// Create a backend for `collection` under `root`
    ///
    /// Nothing touches the filesystem until [`StorageBackend::connect`].
    pub fn new(root: impl AsRef<Path>, collection: &str) -> StorageResult<Self> {
        if !is_valid_table_name(collection) {
            return Err(StorageError::new(
                BACKEND,
                format!("invalid collection name '{}'", collection),
            ));
        }
        Ok(DocumentBackend {
            collection_dir: root.as_ref().join(collection),
        })
    }

    /// Directory holding the collection's documents
    pub fn collection_dir(&self) -> &Path {
        &self.collection_dir
    }

    fn document_path(&self, key: &str) -> PathBuf {
        let digest = Sha256::digest(key.as_bytes());
        let mut name = String::with_capacity(digest.len() * 2 + DOC_EXT.len() + 1);
        for byte in digest.iter() {
            name.push_str(&format!("{:02x}", byte));
        }
        name.push('.');
        name.push_str(DOC_EXT);
        self.collection_dir.join(name)
    }

    async fn read_document(path: &Path) -> StorageResult<Option<Document>> {
        let bytes = match fs::read(path).await {
            Ok(bytes) => bytes,
            Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(None),
            Err(e) => return Err(io_err(e)),
        };
        serde_json::from_slice(&bytes)
            .map(Some)
            .map_err(|e| StorageError::new(BACKEND, e))
    }

    /// Paths of every document in the collection
    async fn document_paths(&self) -> StorageResult<Vec<PathBuf>> {
        let mut entries = fs::read_dir(&self.collection_dir).await.map_err(io_err)?;
        let mut paths = Vec::new();
        while let Some(entry) = entries.next_entry().await.map_err(io_err)? {
            let path = entry.path();
            if path.extension().and_then(|e| e.to_str()) == Some(DOC_EXT) {
                paths.push(path);
            }
        }
        Ok(paths)
    }
}

#[async_trait]
impl StorageBackend for DocumentBackend {
    fn kind(&self) -> BackendKind {
        BackendKind::Document
    }

    async fn connect(&self) -> StorageResult<()> {
        fs::create_dir_all(&self.collection_dir)
            .await
            .map_err(io_err)?;
        tracing::debug!(
            target: "kvlayer::storage",
            dir = %self.collection_dir.display(),
            "document collection ready"
        );
        Ok(())
    }

    async fn point_get(&self, key: &str) -> StorageResult<Option<String>> {
        let doc = Self::read_document(&self.document_path(key)).await?;
        // a digest collision would surface as a foreign key
        Ok(doc.filter(|d| d.key == key).map(|d| d.value))
    }

    async fn upsert(&self, key: &str, value: &str) -> StorageResult<()> {
        let path = self.document_path(key);
        let doc = Document {
            key: key.to_string(),
            value: value.to_string(),
        };
        let bytes = serde_json::to_vec(&doc).map_err(|e| StorageError::new(BACKEND, e))?;
        let n = NEXT_TMP.fetch_add(1, Ordering::Relaxed);
        let tmp = path.with_extension(format!("{}.{}", n, TMP_EXT));
        if let Err(e) = fs::write(&tmp, bytes).await {
            let _ = fs::remove_file(&tmp).await;
            return Err(io_err(e));
        }
        if let Err(e) = fs::rename(&tmp, &path).await {
            let _ = fs::remove_file(&tmp).await;
            return Err(io_err(e));
        }
        Ok(())
    }

    async fn point_delete(&self, key: &str) -> StorageResult<u64> {
        let path = self.document_path(key);
        match Self::read_document(&path).await? {
            Some(doc) if doc.key == key => {}
            _ => return Ok(0),
        }
        match fs::remove_file(&path).await {
            Ok(()) => Ok(1),
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(0),
            Err(e) => Err(io_err(e)),
        }
    }

    async fn scan_all(&self) -> StorageResult<Vec<(String, String)>> {
        let mut records = Vec::new();
        for path in self.document_paths().await? {
            if let Some(doc) = Self::read_document(&path).await? {
                records.push((doc.key, doc.value));
            }
        }
        Ok(records)
    }

    async fn truncate_all(&self) -> StorageResult<u64> {
        let mut removed = 0;
        for path in self.document_paths().await? {
            match fs::remove_file(&path).await {
                Ok(()) => removed += 1,
                Err(e) if e.kind() == io::ErrorKind::NotFound => {}
                Err(e) => return Err(io_err(e)),
            }
        }
        Ok(removed)
    }
}
