//! Store configuration via `kvlayer.toml`
//!
//! A config file names the backend and the few façade options that make
//! sense outside code (custom caches and codecs are code-only, see
//! [`StoreOptions`](crate::StoreOptions)). On first use a commented
//! default file can be written next to the data.

use kvlayer_core::{is_valid_table_name, Error, Result, DEFAULT_TABLE};
use kvlayer_storage::BackendConfig;
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Config file name placed in the data directory.
pub const CONFIG_FILE_NAME: &str = "kvlayer.toml";

/// Default broadcast buffer for the event stream.
pub const DEFAULT_EVENT_CAPACITY: usize = 256;

/// Largest accepted event buffer.
pub const MAX_EVENT_CAPACITY: usize = 65_536;

/// Store configuration loaded from `kvlayer.toml`.
///
/// # Example
///
/// ```toml
/// table = "keyv"
/// cache = true
/// serialize_writes = false
///
/// [backend]
/// kind = "sqlite"
/// path = "data/kv.db"
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StoreConfig {
    /// Table (or collection) name inside the backend.
    #[serde(default = "default_table")]
    pub table: String,
    /// Keep an in-process write-through cache.
    #[serde(default = "default_true")]
    pub cache: bool,
    /// Serialize `set`/`delete` per key.
    #[serde(default)]
    pub serialize_writes: bool,
    /// Events buffered per subscriber before the slowest one lags.
    #[serde(default = "default_event_capacity")]
    pub event_capacity: usize,
    /// Which backend to open.
    #[serde(default)]
    pub backend: BackendConfig,
}

fn default_table() -> String {
    DEFAULT_TABLE.to_string()
}

fn default_true() -> bool {
    true
}

fn default_event_capacity() -> usize {
    DEFAULT_EVENT_CAPACITY
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            table: default_table(),
            cache: true,
            serialize_writes: false,
            event_capacity: DEFAULT_EVENT_CAPACITY,
            backend: BackendConfig::default(),
        }
    }
}

impl StoreConfig {
    /// Config for the given backend with every other option at its default.
    pub fn with_backend(backend: BackendConfig) -> Self {
        Self {
            backend,
            ..Self::default()
        }
    }

    /// Check values serde cannot check.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Config`] for a bad table name or an event capacity
    /// outside `1..=MAX_EVENT_CAPACITY`.
    pub fn validate(&self) -> Result<()> {
        if !is_valid_table_name(&self.table) {
            return Err(Error::Config(format!(
                "Invalid table name '{}'. Expected an identifier of letters, digits and '_'.",
                self.table
            )));
        }
        if self.event_capacity == 0 {
            return Err(Error::Config(
                "event_capacity must be greater than zero".to_string(),
            ));
        }
        if self.event_capacity > MAX_EVENT_CAPACITY {
            return Err(Error::Config(format!(
                "event_capacity {} exceeds the maximum of {}",
                self.event_capacity, MAX_EVENT_CAPACITY
            )));
        }
        Ok(())
    }

    /// Returns the default config file content with comments.
    pub fn default_toml() -> &'static str {
        r#"# kvlayer store configuration
#
# Table (or document collection) holding the records (default: "keyv")
table = "keyv"

# In-process write-through cache (default: true)
cache = true

# Serialize set/delete per key so concurrent writers to one key cannot
# lose an update (default: false)
serialize_writes = false

# Events buffered per subscriber, at most 65536 (default: 256)
event_capacity = 256

# Backend: "memory" (default), "sqlite", "document" or "redb"
#   sqlite   -> path is the database file, or ":memory:"
#   document -> path is the root directory; the table is a subdirectory
#   redb     -> path is the database file
[backend]
kind = "memory"
# path = "data/kv.db"
"#
    }

    /// Parse and validate config from TOML text.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Config`] if the text does not parse or validate.
    pub fn from_toml_str(content: &str) -> Result<Self> {
        let config: StoreConfig = toml::from_str(content)
            .map_err(|e| Error::Config(format!("Failed to parse config: {}", e)))?;
        config.validate()?;
        Ok(config)
    }

    /// Read and parse config from a file path.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read, parsed or validated.
    pub fn from_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path).map_err(|e| {
            Error::Config(format!(
                "Failed to read config file '{}': {}",
                path.display(),
                e
            ))
        })?;
        let config: StoreConfig = toml::from_str(&content).map_err(|e| {
            Error::Config(format!(
                "Failed to parse config file '{}': {}",
                path.display(),
                e
            ))
        })?;
        config.validate()?;
        Ok(config)
    }

    /// Write the default config file if it does not already exist.
    ///
    /// Returns `Ok(())` whether the file was created or already existed.
    pub fn write_default_if_missing(path: &Path) -> Result<()> {
        if !path.exists() {
            std::fs::write(path, Self::default_toml()).map_err(|e| {
                Error::Config(format!(
                    "Failed to write default config file '{}': {}",
                    path.display(),
                    e
                ))
            })?;
        }
        Ok(())
    }

    /// Serialize this config to TOML and write it to the given path.
    pub fn write_to_file(&self, path: &Path) -> Result<()> {
        let content = toml::to_string_pretty(self)
            .map_err(|e| Error::Config(format!("Failed to serialize config: {}", e)))?;
        std::fs::write(path, content).map_err(|e| {
            Error::Config(format!(
                "Failed to write config file '{}': {}",
                path.display(),
                e
            ))
        })
    }
}
