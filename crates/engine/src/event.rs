//! Store events
//!
//! Every completed public operation (except `has`, `entries` and `empty`)
//! publishes exactly one [`StoreEvent`] on the store's broadcast channel.

use kvlayer_core::Pair;
use serde::Serialize;

/// Outcome of one store operation
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "event", content = "payload", rename_all = "camelCase")]
pub enum StoreEvent {
    /// A read completed
    ValueGet(Pair),
    /// A write created a new record
    ValueSet(Pair),
    /// A write replaced an existing record; the pair carries `old`
    ValueUpdate(Pair),
    /// A delete completed
    ValueDelete {
        /// Deleted key
        key: String,
        /// Records actually removed
        removed: u64,
    },
    /// A full scan completed
    ValueFetch(Vec<Pair>),
    /// Every record was removed
    Truncate {
        /// Records removed
        removed: u64,
    },
    /// Backend connected
    Connect,
    /// Backend disconnected
    Disconnect,
}

impl StoreEvent {
    /// Event name as seen by subscribers of other runtimes
    pub fn name(&self) -> &'static str {
        match self {
            StoreEvent::ValueGet(_) => "valueGet",
            StoreEvent::ValueSet(_) => "valueSet",
            StoreEvent::ValueUpdate(_) => "valueUpdate",
            StoreEvent::ValueDelete { .. } => "valueDelete",
            StoreEvent::ValueFetch(_) => "valueFetch",
            StoreEvent::Truncate { .. } => "truncate",
            StoreEvent::Connect => "connect",
            StoreEvent::Disconnect => "disconnect",
        }
    }

    /// Key the event is about, for single-key events
    pub fn key(&self) -> Option<&str> {
        match self {
            StoreEvent::ValueGet(p) | StoreEvent::ValueSet(p) | StoreEvent::ValueUpdate(p) => {
                Some(&p.key)
            }
            StoreEvent::ValueDelete { key, .. } => Some(key),
            _ => None,
        }
    }
}
