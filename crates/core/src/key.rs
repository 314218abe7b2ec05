//! Key validation and key parameters
//!
//! Every store operation names its target with a [`KeyParam`]: either a
//! plain key, or a key plus a dotted path into the value stored there.
//!
//! ## Key rules
//!
//! - Keys must not be empty
//! - Keys must not contain NUL or other control characters
//! - Keys must not exceed [`MAX_KEY_BYTES`]
//!
//! Dots inside a plain key are literal; only the second half of a
//! [`KeyParam::Path`] is parsed as a path.

use crate::error::{Error, Result};
use crate::limits::{MAX_KEY_BYTES, MAX_TABLE_NAME_BYTES};
use crate::path::KeyPath;
use std::fmt;
use thiserror::Error;

/// Key validation errors
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum KeyError {
    /// Key is empty (length 0)
    #[error("Key cannot be empty")]
    Empty,

    /// Key contains NUL byte (\0)
    #[error("Key cannot contain NUL bytes")]
    ContainsNul,

    /// Key contains a control character other than NUL
    #[error("Key cannot contain control character {0:?}")]
    ControlChar(char),

    /// Key exceeds maximum length
    #[error("Key too long: {actual} bytes exceeds maximum {max}")]
    TooLong {
        /// Actual key length in bytes
        actual: usize,
        /// Maximum allowed length
        max: usize,
    },
}

/// Validate a key against the literal rules
///
/// # Examples
///
/// ```
/// use kvlayer_core::key::validate_key;
///
/// assert!(validate_key("user:123").is_ok());
/// assert!(validate_key("config.timeout").is_ok());
/// assert!(validate_key("").is_err());
/// assert!(validate_key("a\x00b").is_err());
/// ```
pub fn validate_key(key: &str) -> std::result::Result<(), KeyError> {
    if key.is_empty() {
        return Err(KeyError::Empty);
    }

    if key.contains('\x00') {
        return Err(KeyError::ContainsNul);
    }

    if let Some(c) = key.chars().find(|c| c.is_control()) {
        return Err(KeyError::ControlChar(c));
    }

    let len = key.len();
    if len > MAX_KEY_BYTES {
        return Err(KeyError::TooLong {
            actual: len,
            max: MAX_KEY_BYTES,
        });
    }

    Ok(())
}

/// Validate a key, mapping failures onto the public error kinds
///
/// Empty keys become [`Error::NoKey`]; everything else becomes
/// [`Error::InvalidKey`].
pub fn check_key(key: &str) -> Result<()> {
    match validate_key(key) {
        Ok(()) => Ok(()),
        Err(KeyError::Empty) => Err(Error::NoKey),
        Err(e) => Err(Error::invalid_key(key, e)),
    }
}

/// True if `name` can be used as a table/collection name
///
/// Names must look like an SQL identifier: an ASCII letter or underscore
/// followed by ASCII letters, digits or underscores.
pub fn is_valid_table_name(name: &str) -> bool {
    let mut chars = name.chars();
    match chars.next() {
        Some(c) if c.is_ascii_alphabetic() || c == '_' => {}
        _ => return false,
    }
    name.len() <= MAX_TABLE_NAME_BYTES && chars.all(|c| c.is_ascii_alphanumeric() || c == '_')
}

/// Target of a store operation
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum KeyParam {
    /// A whole stored value
    Key(String),
    /// A location inside the value stored at a key: `(key, "a.b.c")`
    Path(String, String),
}

impl KeyParam {
    /// The key part, unvalidated
    pub fn key(&self) -> &str {
        match self {
            KeyParam::Key(k) | KeyParam::Path(k, _) => k,
        }
    }

    /// Validate the parameter and parse its path
    pub fn resolve(&self) -> Result<Target> {
        match self {
            KeyParam::Key(key) => {
                check_key(key)?;
                Ok(Target {
                    key: key.clone(),
                    path: None,
                })
            }
            KeyParam::Path(key, path) => {
                check_key(key)?;
                let path: KeyPath = path
                    .parse()
                    .map_err(|e| Error::invalid_parameters(format!("bad path '{}': {}", path, e)))?;
                Ok(Target {
                    key: key.clone(),
                    path: Some(path),
                })
            }
        }
    }
}

impl fmt::Display for KeyParam {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            KeyParam::Key(k) => write!(f, "{}", k),
            KeyParam::Path(k, p) => write!(f, "{}[{}]", k, p),
        }
    }
}

impl From<&str> for KeyParam {
    fn from(key: &str) -> Self {
        KeyParam::Key(key.to_string())
    }
}

impl From<String> for KeyParam {
    fn from(key: String) -> Self {
        KeyParam::Key(key)
    }
}

impl From<&String> for KeyParam {
    fn from(key: &String) -> Self {
        KeyParam::Key(key.clone())
    }
}

impl From<(&str, &str)> for KeyParam {
    fn from((key, path): (&str, &str)) -> Self {
        KeyParam::Path(key.to_string(), path.to_string())
    }
}

impl From<(String, String)> for KeyParam {
    fn from((key, path): (String, String)) -> Self {
        KeyParam::Path(key, path)
    }
}

/// A validated key with an optional parsed path
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Target {
    /// The validated key
    pub key: String,
    /// Parsed path inside the stored value
    pub path: Option<KeyPath>,
}

impl Target {
    /// Path as a display string, if any
    pub fn path_string(&self) -> Option<String> {
        self.path.as_ref().map(|p| p.to_string())
    }
}
