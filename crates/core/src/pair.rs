//! Result shape of reads and writes

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// A key with its current value and, after an update, its previous value
///
/// `value` is `None` when nothing is stored; a stored JSON `null` is
/// `Some(Value::Null)`. `old` is only set when a write replaced an existing
/// value.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Pair {
    /// The key
    pub key: String,
    /// Current value, `None` if no record exists
    pub value: Option<Value>,
    /// Value before the write that produced this pair
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub old: Option<Value>,
}

impl Pair {
    /// Create a pair without a previous value
    pub fn new(key: impl Into<String>, value: Option<Value>) -> Self {
        Pair {
            key: key.into(),
            value,
            old: None,
        }
    }

    /// Attach the previous value
    pub fn with_old(mut self, old: Option<Value>) -> Self {
        self.old = old;
        self
    }

    /// True if a value is present
    pub fn exists(&self) -> bool {
        self.value.is_some()
    }

    /// True if this pair describes an update of an existing value
    pub fn is_update(&self) -> bool {
        self.old.is_some()
    }

    /// Consume the pair, returning the current value
    pub fn into_value(self) -> Option<Value> {
        self.value
    }
}
