//! Backend selection
//!
//! [`Backend`] names the physical store once, at construction. The façade
//! turns it into an `Arc<dyn StorageBackend>` with
//! [`Backend::into_adapter`] and never looks at the variant again.

use crate::backends::MemoryBackend;
#[cfg(feature = "document")]
use crate::backends::DocumentBackend;
#[cfg(feature = "redb")]
use crate::backends::RedbBackend;
#[cfg(feature = "sqlite")]
use crate::backends::SqliteBackend;
use crate::traits::{BackendKind, StorageBackend};
use kvlayer_core::{Error, Result};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::PathBuf;
use std::sync::Arc;

/// Backend section of a store configuration
///
/// ```toml
/// [backend]
/// kind = "sqlite"          # "memory" | "sqlite" | "document" | "redb"
/// path = "data/kv.db"      # file (sqlite, redb) or directory (document)
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum BackendConfig {
    /// Process-local map
    #[default]
    Memory,
    /// SQLite database file, or `":memory:"`
    Sqlite {
        /// Database file
        path: PathBuf,
    },
    /// Directory of JSON documents
    Document {
        /// Root directory; the collection is a subdirectory
        path: PathBuf,
    },
    /// redb database file
    Redb {
        /// Database file
        path: PathBuf,
    },
}

/// The physical store behind a key-value store
pub enum Backend {
    /// Process-local map
    Memory(MemoryBackend),
    /// Relational engine
    #[cfg(feature = "sqlite")]
    Relational(SqliteBackend),
    /// Document store
    #[cfg(feature = "document")]
    Document(DocumentBackend),
    /// Embedded file-backed engine
    #[cfg(feature = "redb")]
    Embedded(RedbBackend),
    /// Any other adapter
    Custom(Arc<dyn StorageBackend>),
}

impl Backend {
    /// Build a backend from configuration
    ///
    /// `table` names the table/collection inside the store. Adapter
    /// failures come back as [`Error::Storage`]; a kind that was not
    /// compiled in is an [`Error::Config`].
    pub async fn open(config: &BackendConfig, table: &str) -> Result<Self> {
        match config {
            BackendConfig::Memory => Ok(Backend::Memory(MemoryBackend::new())),
            #[cfg(feature = "sqlite")]
            BackendConfig::Sqlite { path } => {
                Ok(Backend::Relational(SqliteBackend::open(path, table).await?))
            }
            #[cfg(feature = "document")]
            BackendConfig::Document { path } => {
                Ok(Backend::Document(DocumentBackend::new(path, table)?))
            }
            #[cfg(feature = "redb")]
            BackendConfig::Redb { path } => Ok(Backend::Embedded(RedbBackend::open(path, table).await?)),
            #[allow(unreachable_patterns)]
            other => Err(Error::Config(format!(
                "backend '{}' is not compiled in (table '{}')",
                config_kind_name(other),
                table
            ))),
        }
    }

    /// Kind of store behind this backend
    pub fn kind(&self) -> BackendKind {
        match self {
            Backend::Memory(_) => BackendKind::Memory,
            #[cfg(feature = "sqlite")]
            Backend::Relational(_) => BackendKind::Relational,
            #[cfg(feature = "document")]
            Backend::Document(_) => BackendKind::Document,
            #[cfg(feature = "redb")]
            Backend::Embedded(_) => BackendKind::Embedded,
            Backend::Custom(b) => b.kind(),
        }
    }

    /// Erase the variant, keeping only the adapter contract
    pub fn into_adapter(self) -> Arc<dyn StorageBackend> {
        match self {
            Backend::Memory(b) => Arc::new(b),
            #[cfg(feature = "sqlite")]
            Backend::Relational(b) => Arc::new(b),
            #[cfg(feature = "document")]
            Backend::Document(b) => Arc::new(b),
            #[cfg(feature = "redb")]
            Backend::Embedded(b) => Arc::new(b),
            Backend::Custom(b) => b,
        }
    }
}

fn config_kind_name(config: &BackendConfig) -> &'static str {
    match config {
        BackendConfig::Memory => "memory",
        BackendConfig::Sqlite { .. } => "sqlite",
        BackendConfig::Document { .. } => "document",
        BackendConfig::Redb { .. } => "redb",
    }
}

impl fmt::Debug for Backend {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("Backend").field(&self.kind()).finish()
    }
}

impl From<MemoryBackend> for Backend {
    fn from(b: MemoryBackend) -> Self {
        Backend::Memory(b)
    }
}

#[cfg(feature = "sqlite")]
impl From<SqliteBackend> for Backend {
    fn from(b: SqliteBackend) -> Self {
        Backend::Relational(b)
    }
}

#[cfg(feature = "document")]
impl From<DocumentBackend> for Backend {
    fn from(b: DocumentBackend) -> Self {
        Backend::Document(b)
    }
}

#[cfg(feature = "redb")]
impl From<RedbBackend> for Backend {
    fn from(b: RedbBackend) -> Self {
        Backend::Embedded(b)
    }
}

impl From<Arc<dyn StorageBackend>> for Backend {
    fn from(b: Arc<dyn StorageBackend>) -> Self {
        Backend::Custom(b)
    }
}
