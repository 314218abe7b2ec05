//! Value codec seam.
//!
//! Every value written to a backend goes through a [`Codec`], which turns a
//! structured value into the string the backend stores, and back.
//!
//! - [`JsonCodec`]: compact JSON (the default)
//! - [`FnCodec`]: a serializer closure paired with a deserializer closure
//!
//! # Usage
//!
//! ```
//! use kvlayer_core::codec::{Codec, JsonCodec};
//! use serde_json::json;
//!
//! let codec = JsonCodec;
//! let raw = codec.serialize(&json!({"a": 1})).unwrap();
//! assert_eq!(raw, r#"{"a":1}"#);
//! assert_eq!(codec.deserialize(&raw).unwrap(), json!({"a": 1}));
//! ```

use crate::error::{Error, Result};
use serde_json::Value;
use std::fmt;

/// Value codec trait.
///
/// Codecs must be `Send + Sync` so a store can be shared across tasks.
pub trait Codec: Send + Sync {
    /// Encode a value for storage.
    fn serialize(&self, value: &Value) -> Result<String>;

    /// Decode a stored string.
    fn deserialize(&self, raw: &str) -> Result<Value>;

    /// Codec identifier, used in logs.
    fn codec_id(&self) -> &str;
}

/// Compact JSON codec
#[derive(Debug, Clone, Copy, Default)]
pub struct JsonCodec;

impl Codec for JsonCodec {
    fn serialize(&self, value: &Value) -> Result<String> {
        Ok(serde_json::to_string(value)?)
    }

    fn deserialize(&self, raw: &str) -> Result<Value> {
        Ok(serde_json::from_str(raw)?)
    }

    fn codec_id(&self) -> &str {
        "json"
    }
}

/// Codec built from a serializer function and a deserializer function
///
/// ```
/// use kvlayer_core::codec::{Codec, FnCodec};
/// use kvlayer_core::Error;
/// use serde_json::{json, Value};
///
/// // Stores plain strings unquoted
/// let codec = FnCodec::new(
///     |v: &Value| Ok(v.as_str().map(str::to_string).unwrap_or_else(|| v.to_string())),
///     |raw: &str| Ok::<_, Error>(Value::String(raw.to_string())),
/// );
/// assert_eq!(codec.serialize(&json!("hi")).unwrap(), "hi");
/// ```
pub struct FnCodec<S, D> {
    serializer: S,
    deserializer: D,
}

impl<S, D> FnCodec<S, D>
where
    S: Fn(&Value) -> Result<String> + Send + Sync,
    D: Fn(&str) -> Result<Value> + Send + Sync,
{
    /// Pair a serializer with a deserializer
    pub fn new(serializer: S, deserializer: D) -> Self {
        FnCodec {
            serializer,
            deserializer,
        }
    }
}

impl<S, D> Codec for FnCodec<S, D>
where
    S: Fn(&Value) -> Result<String> + Send + Sync,
    D: Fn(&str) -> Result<Value> + Send + Sync,
{
    fn serialize(&self, value: &Value) -> Result<String> {
        (self.serializer)(value)
    }

    fn deserialize(&self, raw: &str) -> Result<Value> {
        (self.deserializer)(raw)
    }

    fn codec_id(&self) -> &str {
        "custom"
    }
}

impl<S, D> fmt::Debug for FnCodec<S, D> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FnCodec").finish_non_exhaustive()
    }
}

/// Map a codec failure message onto [`Error::Codec`]
pub fn codec_error(reason: impl fmt::Display) -> Error {
    Error::Codec(reason.to_string())
}
