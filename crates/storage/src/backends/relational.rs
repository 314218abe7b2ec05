//! SQLite-backed (relational) adapter.
//!
//! ## Schema
//! ```sql
//! CREATE TABLE IF NOT EXISTS "<table>" (
//!     key   TEXT PRIMARY KEY,
//!     value TEXT NOT NULL
//! );
//! ```
//!
//! rusqlite is synchronous; every call runs on tokio's blocking pool while
//! the calling task awaits it. The connection sits behind a mutex, so calls
//! on one adapter execute one at a time.

use crate::traits::{BackendKind, StorageBackend};
use async_trait::async_trait;
use kvlayer_core::{is_valid_table_name, StorageError, StorageResult};
use parking_lot::Mutex;
use rusqlite::{params, Connection, OptionalExtension};
use std::path::{Path, PathBuf};
use std::sync::Arc;

const BACKEND: &str = "sqlite";

fn sql_err(e: rusqlite::Error) -> StorageError {
    StorageError::new(BACKEND, e)
}

/// Relational backend on a single SQLite database
///
/// ## Example
/// ```rust,no_run
/// use kvlayer_storage::{SqliteBackend, StorageBackend};
///
/// # async fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let backend = SqliteBackend::open("/tmp/kvlayer.db", "keyv").await?;
/// backend.connect().await?;
/// backend.upsert("key", "\"value\"").await?;
/// # Ok(())
/// # }
/// ```
#[derive(Clone)]
pub struct SqliteBackend {
    conn: Arc<Mutex<Connection>>,
    table: String,
    path: Option<PathBuf>,
}

impl std::fmt::Debug for SqliteBackend {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SqliteBackend")
            .field("table", &self.table)
            .field("path", &self.path)
            .finish_non_exhaustive()
    }
}

impl SqliteBackend {
    /// Open (or create) a database file
    ///
    /// `":memory:"` opens a private in-memory database.
    pub async fn open(path: impl AsRef<Path>, table: &str) -> StorageResult<Self> {
        check_table(table)?;
        let path = path.as_ref().to_path_buf();
        let open_path = path.clone();
        let conn = tokio::task::spawn_blocking(move || Connection::open(open_path))
            .await
            .map_err(|e| StorageError::new(BACKEND, e))?
            .map_err(sql_err)?;
        let path = (path != Path::new(":memory:")).then_some(path);
        Ok(Self::from_connection(conn, table, path))
    }

    /// Open a private in-memory database
    pub async fn in_memory(table: &str) -> StorageResult<Self> {
        Self::open(":memory:", table).await
    }

    fn from_connection(conn: Connection, table: &str, path: Option<PathBuf>) -> Self {
        SqliteBackend {
            conn: Arc::new(Mutex::new(conn)),
            table: table.to_string(),
            path,
        }
    }

    /// Table holding the records
    pub fn table(&self) -> &str {
        &self.table
    }

    /// Run `f` against the connection on the blocking pool
    async fn with_conn<T, F>(&self, f: F) -> StorageResult<T>
    where
        T: Send + 'static,
        F: FnOnce(&Connection, &str) -> rusqlite::Result<T> + Send + 'static,
    {
        let conn = Arc::clone(&self.conn);
        let table = self.table.clone();
        tokio::task::spawn_blocking(move || {
            let conn = conn.lock();
            f(&conn, &table)
        })
        .await
        .map_err(|e| StorageError::new(BACKEND, e))?
        .map_err(sql_err)
    }
}

fn check_table(table: &str) -> StorageResult<()> {
    if is_valid_table_name(table) {
        Ok(())
    } else {
        Err(StorageError::new(
            BACKEND,
            format!("invalid table name '{}'", table),
        ))
    }
}

#[async_trait]
impl StorageBackend for SqliteBackend {
    fn kind(&self) -> BackendKind {
        BackendKind::Relational
    }

    async fn connect(&self) -> StorageResult<()> {
        self.with_conn(|conn, table| {
            conn.execute_batch(&format!(
                "CREATE TABLE IF NOT EXISTS \"{table}\" (
                    key TEXT PRIMARY KEY,
                    value TEXT NOT NULL
                );"
            ))
        })
        .await?;
        tracing::debug!(target: "kvlayer::storage", table = %self.table, "sqlite table ready");
        Ok(())
    }

    async fn point_get(&self, key: &str) -> StorageResult<Option<String>> {
        let key = key.to_string();
        self.with_conn(move |conn, table| {
            conn.prepare_cached(&format!("SELECT value FROM \"{table}\" WHERE key = ?1"))?
                .query_row(params![key], |row| row.get::<_, String>(0))
                .optional()
        })
        .await
    }

    async fn upsert(&self, key: &str, value: &str) -> StorageResult<()> {
        let key = key.to_string();
        let value = value.to_string();
        self.with_conn(move |conn, table| {
            conn.prepare_cached(&format!(
                "INSERT INTO \"{table}\" (key, value) VALUES (?1, ?2)
                 ON CONFLICT(key) DO UPDATE SET value = excluded.value"
            ))?
            .execute(params![key, value])
            .map(|_| ())
        })
        .await
    }

    async fn point_delete(&self, key: &str) -> StorageResult<u64> {
        let key = key.to_string();
        self.with_conn(move |conn, table| {
            conn.prepare_cached(&format!("DELETE FROM \"{table}\" WHERE key = ?1"))?
                .execute(params![key])
                .map(|n| n as u64)
        })
        .await
    }

    async fn scan_all(&self) -> StorageResult<Vec<(String, String)>> {
        self.with_conn(|conn, table| {
            let mut stmt = conn.prepare_cached(&format!("SELECT key, value FROM \"{table}\""))?;
            let rows = stmt.query_map([], |row| Ok((row.get(0)?, row.get(1)?)))?;
            rows.collect()
        })
        .await
    }

    async fn truncate_all(&self) -> StorageResult<u64> {
        self.with_conn(|conn, table| {
            conn.execute(&format!("DELETE FROM \"{table}\""), [])
                .map(|n| n as u64)
        })
        .await
    }
}
