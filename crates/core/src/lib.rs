//! Core types for kvlayer
//!
//! This crate defines the foundational types used throughout the system:
//! - Error: error kinds shared by every layer
//! - KeyParam / Target: operation targets and key validation
//! - KeyPath: dotted paths plus `get_at_path` / `set_at_path`
//! - Pair: result shape of reads and writes
//! - Codec: value ⇄ stored string conversion
//! - Limits: key, path and table name limits

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod codec;
pub mod error;
pub mod key;
pub mod limits;
pub mod pair;
pub mod path;

pub use codec::{Codec, FnCodec, JsonCodec};
pub use error::{BoxError, Error, Result, StorageError, StorageResult};
pub use key::{check_key, is_valid_table_name, validate_key, KeyError, KeyParam, Target};
pub use limits::{DEFAULT_TABLE, MAX_KEY_BYTES, MAX_PATH_LENGTH, MAX_TABLE_NAME_BYTES};
pub use pair::Pair;
pub use path::{get_at_path, set_at_path, KeyPath, PathError, PathParseError};

pub use serde_json::Value;
