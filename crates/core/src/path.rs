//! Dotted paths into stored values
//!
//! A [`KeyPath`] addresses a location inside a JSON object using dot
//! notation: `user.address.city` is the segments `["user", "address",
//! "city"]`. Segments are always object keys; there is no array indexing.
//!
//! - [`get_at_path`] reads a nested value. Missing data is `None`, never an
//!   error.
//! - [`set_at_path`] writes a nested value, creating intermediate objects
//!   as needed and leaving sibling fields alone.

use crate::limits::MAX_PATH_LENGTH;
use serde_json::{Map, Value};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// Error type for path parsing
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum PathParseError {
    /// The path string is empty
    #[error("path is empty")]
    Empty,
    /// Empty segment in path (`a..b`, leading or trailing dot)
    #[error("empty segment in path at position {0}")]
    EmptySegment(usize),
    /// Path exceeds maximum length
    #[error("path length {length} exceeds maximum of {max} segments")]
    TooLong {
        /// Actual path length
        length: usize,
        /// Maximum allowed length
        max: usize,
    },
}

/// Error type for path mutation
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum PathError {
    /// A segment that must hold an object holds something else
    #[error("expected object at '{segment}', found {found}")]
    NotObject {
        /// Path of the container that is not an object (empty for the root)
        segment: String,
        /// Type actually found there
        found: &'static str,
    },
}

/// A dotted path into a stored value
///
/// # Examples
///
/// ```
/// use kvlayer_core::path::KeyPath;
///
/// let path: KeyPath = "user.profile.name".parse().unwrap();
/// assert_eq!(path.segments(), &["user", "profile", "name"]);
/// assert_eq!(path.to_string(), "user.profile.name");
///
/// assert!("user..name".parse::<KeyPath>().is_err());
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct KeyPath {
    segments: Vec<String>,
}

impl KeyPath {
    /// Create a path from segments
    ///
    /// Returns an error if there are no segments, a segment is empty, or
    /// the path is longer than [`MAX_PATH_LENGTH`].
    pub fn from_segments<I, S>(segments: I) -> Result<Self, PathParseError>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let segments: Vec<String> = segments.into_iter().map(Into::into).collect();
        if segments.is_empty() {
            return Err(PathParseError::Empty);
        }
        if let Some(i) = segments.iter().position(|s| s.is_empty()) {
            return Err(PathParseError::EmptySegment(i));
        }
        if segments.len() > MAX_PATH_LENGTH {
            return Err(PathParseError::TooLong {
                length: segments.len(),
                max: MAX_PATH_LENGTH,
            });
        }
        Ok(KeyPath { segments })
    }

    /// Get the path segments
    pub fn segments(&self) -> &[String] {
        &self.segments
    }

    /// Get the number of segments in the path
    pub fn len(&self) -> usize {
        self.segments.len()
    }

    /// Always false; a parsed path has at least one segment
    pub fn is_empty(&self) -> bool {
        self.segments.is_empty()
    }

    /// Get the last segment
    pub fn last_segment(&self) -> &str {
        self.segments.last().map(String::as_str).unwrap_or_default()
    }

    /// Prefix of this path up to and including segment `idx`
    fn prefix(&self, idx: usize) -> String {
        self.segments[..=idx].join(".")
    }
}

impl FromStr for KeyPath {
    type Err = PathParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s.is_empty() {
            return Err(PathParseError::Empty);
        }
        let mut segments = Vec::new();
        let mut pos = 0;
        for segment in s.split('.') {
            if segment.is_empty() {
                return Err(PathParseError::EmptySegment(pos));
            }
            pos += segment.len() + 1;
            segments.push(segment.to_string());
        }
        KeyPath::from_segments(segments)
    }
}

impl fmt::Display for KeyPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.segments.join("."))
    }
}

/// Get value at path within a stored value
///
/// Returns `None` when any segment is missing or an intermediate value is
/// not an object.
///
/// ```
/// use kvlayer_core::path::{get_at_path, KeyPath};
/// use serde_json::json;
///
/// let doc = json!({"user": {"name": "Alice"}});
/// let path: KeyPath = "user.name".parse().unwrap();
/// assert_eq!(get_at_path(&doc, &path), Some(&json!("Alice")));
///
/// let missing: KeyPath = "user.email".parse().unwrap();
/// assert_eq!(get_at_path(&doc, &missing), None);
/// ```
pub fn get_at_path<'a>(value: &'a Value, path: &KeyPath) -> Option<&'a Value> {
    let mut current = value;
    for segment in path.segments() {
        current = current.as_object()?.get(segment)?;
    }
    Some(current)
}

/// Set value at path within a stored value
///
/// Takes ownership of `root`, writes `value` at `path`, and returns the
/// whole updated value. Missing intermediate segments become empty
/// objects. An intermediate or root that exists but is not an object fails
/// with [`PathError::NotObject`] naming the segment.
///
/// ```
/// use kvlayer_core::path::{set_at_path, KeyPath};
/// use serde_json::json;
///
/// let doc = json!({"a": 1, "b": 2});
/// let path: KeyPath = "a".parse().unwrap();
/// let doc = set_at_path(doc, &path, json!(99)).unwrap();
/// assert_eq!(doc, json!({"a": 99, "b": 2}));
/// ```
pub fn set_at_path(mut root: Value, path: &KeyPath, value: Value) -> Result<Value, PathError> {
    let segments = path.segments();
    let (last, parents) = match segments.split_last() {
        Some(split) => split,
        None => return Ok(value),
    };

    let mut current = &mut root;
    for (i, segment) in parents.iter().enumerate() {
        let obj = match current {
            Value::Object(obj) => obj,
            other => {
                return Err(PathError::NotObject {
                    segment: parent_name(path, i),
                    found: value_type_name(other),
                })
            }
        };
        current = obj
            .entry(segment.clone())
            .or_insert_with(|| Value::Object(Map::new()));
    }

    match current {
        Value::Object(obj) => {
            obj.insert(last.clone(), value);
        }
        other => {
            return Err(PathError::NotObject {
                segment: parent_name(path, parents.len()),
                found: value_type_name(other),
            })
        }
    }
    Ok(root)
}

/// Name of the container that segment `idx` is looked up in
fn parent_name(path: &KeyPath, idx: usize) -> String {
    if idx == 0 {
        String::new()
    } else {
        path.prefix(idx - 1)
    }
}

/// Helper to get type name for error messages
pub fn value_type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}
