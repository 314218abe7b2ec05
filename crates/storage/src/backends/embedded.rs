//! Embedded file-backed adapter on redb.
//!
//! One redb table per store name, keyed by `&str` with the serialized value
//! as `&str`. Each operation is its own redb transaction, run on tokio's
//! blocking pool.

use crate::traits::{BackendKind, StorageBackend};
use async_trait::async_trait;
use kvlayer_core::{is_valid_table_name, StorageError, StorageResult};
use redb::{Database, ReadableTable, TableDefinition, TableError};
use std::path::{Path, PathBuf};
use std::sync::Arc;

const BACKEND: &str = "redb";

fn db_err<E: Into<redb::Error>>(e: E) -> StorageError {
    StorageError::new(BACKEND, e.into())
}

fn table_def(name: &str) -> TableDefinition<'_, &'static str, &'static str> {
    TableDefinition::new(name)
}

/// Embedded backend on a single redb file
#[derive(Clone)]
pub struct RedbBackend {
    db: Arc<Database>,
    table: String,
    path: PathBuf,
}

impl std::fmt::Debug for RedbBackend {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RedbBackend")
            .field("table", &self.table)
            .field("path", &self.path)
            .finish_non_exhaustive()
    }
}

impl RedbBackend {
    /// Open (or create) a redb file
    pub async fn open(path: impl AsRef<Path>, table: &str) -> StorageResult<Self> {
        if !is_valid_table_name(table) {
            return Err(StorageError::new(
                BACKEND,
                format!("invalid table name '{}'", table),
            ));
        }
        let path = path.as_ref().to_path_buf();
        let open_path = path.clone();
        let db = tokio::task::spawn_blocking(move || Database::create(open_path))
            .await
            .map_err(|e| StorageError::new(BACKEND, e))?
            .map_err(db_err)?;
        Ok(RedbBackend {
            db: Arc::new(db),
            table: table.to_string(),
            path,
        })
    }

    /// Table holding the records
    pub fn table(&self) -> &str {
        &self.table
    }

    /// Run `f` against the database on the blocking pool
    async fn blocking<T, F>(&self, f: F) -> StorageResult<T>
    where
        T: Send + 'static,
        F: FnOnce(&Database, &str) -> StorageResult<T> + Send + 'static,
    {
        let db = Arc::clone(&self.db);
        let table = self.table.clone();
        tokio::task::spawn_blocking(move || f(&db, &table))
            .await
            .map_err(|e| StorageError::new(BACKEND, e))?
    }
}

#[async_trait]
impl StorageBackend for RedbBackend {
    fn kind(&self) -> BackendKind {
        BackendKind::Embedded
    }

    async fn connect(&self) -> StorageResult<()> {
        self.blocking(|db, table| {
            let txn = db.begin_write().map_err(db_err)?;
            txn.open_table(table_def(table)).map_err(db_err)?;
            txn.commit().map_err(db_err)
        })
        .await?;
        tracing::debug!(target: "kvlayer::storage", table = %self.table, "redb table ready");
        Ok(())
    }

    async fn point_get(&self, key: &str) -> StorageResult<Option<String>> {
        let key = key.to_string();
        self.blocking(move |db, table| {
            let txn = db.begin_read().map_err(db_err)?;
            let table = match txn.open_table(table_def(table)) {
                Ok(t) => t,
                Err(TableError::TableDoesNotExist(_)) => return Ok(None),
                Err(e) => return Err(db_err(e)),
            };
            let value = table.get(key.as_str()).map_err(db_err)?;
            Ok(value.map(|guard| guard.value().to_string()))
        })
        .await
    }

    async fn upsert(&self, key: &str, value: &str) -> StorageResult<()> {
        let key = key.to_string();
        let value = value.to_string();
        self.blocking(move |db, table| {
            let txn = db.begin_write().map_err(db_err)?;
            {
                let mut table = txn.open_table(table_def(table)).map_err(db_err)?;
                table
                    .insert(key.as_str(), value.as_str())
                    .map_err(db_err)?;
            }
            txn.commit().map_err(db_err)
        })
        .await
    }

    async fn point_delete(&self, key: &str) -> StorageResult<u64> {
        let key = key.to_string();
        self.blocking(move |db, table| {
            let txn = db.begin_write().map_err(db_err)?;
            let removed = {
                let mut table = txn.open_table(table_def(table)).map_err(db_err)?;
                let old = table.remove(key.as_str()).map_err(db_err)?;
                u64::from(old.is_some())
            };
            txn.commit().map_err(db_err)?;
            Ok(removed)
        })
        .await
    }

    async fn scan_all(&self) -> StorageResult<Vec<(String, String)>> {
        self.blocking(|db, table| {
            let txn = db.begin_read().map_err(db_err)?;
            let table = match txn.open_table(table_def(table)) {
                Ok(t) => t,
                Err(TableError::TableDoesNotExist(_)) => return Ok(Vec::new()),
                Err(e) => return Err(db_err(e)),
            };
            let mut records = Vec::new();
            for entry in table.iter().map_err(db_err)? {
                let (k, v) = entry.map_err(db_err)?;
                records.push((k.value().to_string(), v.value().to_string()));
            }
            Ok(records)
        })
        .await
    }

    async fn truncate_all(&self) -> StorageResult<u64> {
        self.blocking(|db, table| {
            let txn = db.begin_write().map_err(db_err)?;
            let removed = {
                let mut table = txn.open_table(table_def(table)).map_err(db_err)?;
                let mut keys = Vec::new();
                for entry in table.iter().map_err(db_err)? {
                    let (k, _) = entry.map_err(db_err)?;
                    keys.push(k.value().to_string());
                }
                for key in &keys {
                    table.remove(key.as_str()).map_err(db_err)?;
                }
                keys.len() as u64
            };
            txn.commit().map_err(db_err)?;
            Ok(removed)
        })
        .await
    }
}
