//! Error types for kvlayer
//!
//! This module defines the error kinds surfaced by every public store
//! operation. We use `thiserror` for automatic `Display` and `Error`
//! trait implementations.
//!
//! | Kind | Raised when |
//! |------|-------------|
//! | `NoKey` | the key is empty |
//! | `InvalidKey` | the key is not a valid literal |
//! | `NoValue` | a write would persist nothing |
//! | `ValueNotObject` | a path operation meets a non-object value |
//! | `InvalidParameters` | the key/path pair is malformed |
//! | `Codec` | the serializer or deserializer failed |
//! | `Config` | a configuration value is unusable |
//! | `Storage` | the backend failed (passed through untouched) |
//!
//! Validation kinds are produced before any backend I/O happens.

use std::error::Error as StdError;
use std::fmt;
use thiserror::Error;

/// Boxed error produced by a storage engine
pub type BoxError = Box<dyn StdError + Send + Sync + 'static>;

/// Result type alias for kvlayer operations
pub type Result<T> = std::result::Result<T, Error>;

/// Error types for kvlayer
#[derive(Debug, Error)]
pub enum Error {
    /// Key is missing or empty
    #[error("No key was provided")]
    NoKey,

    /// Key is not a valid literal
    #[error("Invalid key '{key}': {reason}")]
    InvalidKey {
        /// The offending key
        key: String,
        /// Why the key was rejected
        reason: String,
    },

    /// Write attempted with an empty value
    #[error("No value was provided for key '{key}'")]
    NoValue {
        /// Key being written
        key: String,
    },

    /// Path operation attempted on a non-object value
    #[error("Value at key '{key}' is not an object{}", path_suffix(.path))]
    ValueNotObject {
        /// Key holding the value
        key: String,
        /// Path (or path segment) where an object was required
        path: Option<String>,
    },

    /// Key parameter is neither a key nor a valid key/path pair
    #[error("Invalid parameters: {reason}")]
    InvalidParameters {
        /// What was wrong with the parameters
        reason: String,
    },

    /// Serialization/deserialization error
    #[error("Codec error: {0}")]
    Codec(String),

    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),

    /// Backend error, passed through from the storage engine
    #[error(transparent)]
    Storage(#[from] StorageError),
}

fn path_suffix(path: &Option<String>) -> String {
    match path {
        Some(p) => format!(" (path '{}')", p),
        None => String::new(),
    }
}

impl Error {
    /// Build an `InvalidKey` error
    pub fn invalid_key(key: impl Into<String>, reason: impl fmt::Display) -> Self {
        Error::InvalidKey {
            key: key.into(),
            reason: reason.to_string(),
        }
    }

    /// Build an `InvalidParameters` error
    pub fn invalid_parameters(reason: impl fmt::Display) -> Self {
        Error::InvalidParameters {
            reason: reason.to_string(),
        }
    }

    /// Build a `ValueNotObject` error
    pub fn value_not_object(key: impl Into<String>, path: Option<String>) -> Self {
        Error::ValueNotObject {
            key: key.into(),
            path,
        }
    }

    /// True for the kinds raised before any backend I/O
    pub fn is_validation(&self) -> bool {
        matches!(
            self,
            Error::NoKey
                | Error::InvalidKey { .. }
                | Error::NoValue { .. }
                | Error::ValueNotObject { .. }
                | Error::InvalidParameters { .. }
        )
    }

    /// Get the storage error, if this is one
    pub fn as_storage(&self) -> Option<&StorageError> {
        match self {
            Error::Storage(e) => Some(e),
            _ => None,
        }
    }
}

impl From<serde_json::Error> for Error {
    fn from(e: serde_json::Error) -> Self {
        Error::Codec(e.to_string())
    }
}

/// Error raised by a storage backend
///
/// Wraps the engine's own error without translating it. Callers that care
/// about a particular engine can recover the original with
/// [`StorageError::downcast_ref`].
#[derive(Debug, Error)]
#[error("{backend} backend error: {source}")]
pub struct StorageError {
    backend: &'static str,
    #[source]
    source: BoxError,
}

impl StorageError {
    /// Wrap an engine error
    pub fn new(backend: &'static str, source: impl Into<BoxError>) -> Self {
        StorageError {
            backend,
            source: source.into(),
        }
    }

    /// Name of the backend that failed
    pub fn backend(&self) -> &'static str {
        self.backend
    }

    /// Borrow the original engine error as a concrete type
    pub fn downcast_ref<E: StdError + 'static>(&self) -> Option<&E> {
        self.source.downcast_ref::<E>()
    }

    /// Consume the wrapper, returning the original engine error
    pub fn into_source(self) -> BoxError {
        self.source
    }
}

/// Result type alias for backend adapters
pub type StorageResult<T> = std::result::Result<T, StorageError>;
