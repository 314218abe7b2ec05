//! In-process value cache
//!
//! The cache maps a key to the serialized value last read from or written
//! to the backend. It is a latency shadow of the backend, never a second
//! source of truth: the store only writes into it after the backend call
//! succeeded, and drops it wholesale on bulk operations.
//!
//! All methods are synchronous and infallible.

use dashmap::DashMap;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::Arc;

/// One cached record
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub struct CacheEntry {
    /// The key
    pub key: String,
    /// Serialized value as stored in the backend
    pub value: String,
}

/// Cache abstraction
///
/// Implementations must be safe to share across tasks. Alternative
/// strategies (size-bounded, TTL) plug in here without touching the store.
pub trait Cache: Send + Sync {
    /// Cached serialized value for `key`
    fn get(&self, key: &str) -> Option<String>;

    /// Cache `value` for `key`, replacing any previous entry
    fn set(&self, key: &str, value: String);

    /// Drop the entry for `key`, if any
    fn delete(&self, key: &str);

    /// Drop every entry
    fn empty(&self);

    /// Snapshot of every entry, in no particular order
    fn entries(&self) -> Vec<CacheEntry>;
}

/// Default cache: an unordered concurrent map
#[derive(Debug, Default)]
pub struct MemoryCache {
    map: DashMap<String, String>,
}

impl MemoryCache {
    /// Create an empty cache
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of cached entries
    pub fn len(&self) -> usize {
        self.map.len()
    }

    /// True if nothing is cached
    pub fn is_empty(&self) -> bool {
        self.map.is_empty()
    }
}

impl Cache for MemoryCache {
    fn get(&self, key: &str) -> Option<String> {
        self.map.get(key).map(|v| v.value().clone())
    }

    fn set(&self, key: &str, value: String) {
        self.map.insert(key.to_string(), value);
    }

    fn delete(&self, key: &str) {
        self.map.remove(key);
    }

    fn empty(&self) {
        self.map.clear();
    }

    fn entries(&self) -> Vec<CacheEntry> {
        self.map
            .iter()
            .map(|e| CacheEntry {
                key: e.key().clone(),
                value: e.value().clone(),
            })
            .collect()
    }
}

/// Produces a fresh cache for each store
pub type CacheFactory = Arc<dyn Fn() -> Arc<dyn Cache> + Send + Sync>;

/// How a store gets its cache
#[derive(Clone, Default)]
pub enum CacheSetting {
    /// A new [`MemoryCache`]
    #[default]
    Enabled,
    /// No cache; every read goes to the backend
    Disabled,
    /// Use this cache instance
    Instance(Arc<dyn Cache>),
    /// Build the cache with this factory
    Factory(CacheFactory),
}

impl CacheSetting {
    /// Resolve to the cache the store will own
    pub fn build(self) -> Option<Arc<dyn Cache>> {
        match self {
            CacheSetting::Enabled => Some(Arc::new(MemoryCache::new())),
            CacheSetting::Disabled => None,
            CacheSetting::Instance(cache) => Some(cache),
            CacheSetting::Factory(factory) => Some(factory()),
        }
    }

    /// Wrap a factory function
    pub fn factory<F>(f: F) -> Self
    where
        F: Fn() -> Arc<dyn Cache> + Send + Sync + 'static,
    {
        CacheSetting::Factory(Arc::new(f))
    }
}

impl From<bool> for CacheSetting {
    fn from(enabled: bool) -> Self {
        if enabled {
            CacheSetting::Enabled
        } else {
            CacheSetting::Disabled
        }
    }
}

impl fmt::Debug for CacheSetting {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CacheSetting::Enabled => f.write_str("Enabled"),
            CacheSetting::Disabled => f.write_str("Disabled"),
            CacheSetting::Instance(_) => f.write_str("Instance(..)"),
            CacheSetting::Factory(_) => f.write_str("Factory(..)"),
        }
    }
}
