//! Key-value store façade
//!
//! [`KvStore`] composes a backend adapter, an optional cache, a codec and
//! the path resolver into one contract: `get`, `set`, `delete`, `all`,
//! `truncate`, plus cache inspection (`entries`, `empty`).
//!
//! ## Consistency protocol
//!
//! - Reads consult the cache first. On a miss the backend is asked and a
//!   found record is written into the cache before returning.
//! - Writes go to the backend first. The cache is only updated after the
//!   backend call succeeded, so a failed write never leaves a value in the
//!   cache that the backend does not have.
//! - `all` drops the whole cache and repopulates it from the scan;
//!   `truncate` drops it after the backend is empty.
//!
//! `set` reads the current value before writing it. Without
//! [`StoreOptions::serialize_writes`] two concurrent `set`s on one key can
//! both read the same prior value and the later write wins. With it, reads
//! and writes of one key take the same per-key lock, so a read-through
//! fill can never land after a write or delete it overlapped.
//!
//! A read-through fill is also dropped when `empty`, `all` or `truncate`
//! reset the cache while the backend read was in flight.

use crate::cache::{Cache, CacheEntry, CacheSetting};
use crate::config::{StoreConfig, DEFAULT_EVENT_CAPACITY, MAX_EVENT_CAPACITY};
use crate::event::StoreEvent;
use crate::lock::{KeyGuard, KeyLocks};
use kvlayer_core::{
    check_key, get_at_path, set_at_path, Codec, Error, JsonCodec, KeyParam, Pair, PathError,
    Result, Target, Value,
};
use kvlayer_storage::{Backend, BackendKind, StorageBackend};
use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use tokio::sync::broadcast;
use tracing::{debug, info, trace, warn};

/// Construction options for [`KvStore`]
#[derive(Clone)]
pub struct StoreOptions {
    /// Cache strategy (default: in-process map)
    pub cache: CacheSetting,
    /// Value ⇄ string conversion (default: JSON)
    pub codec: Arc<dyn Codec>,
    /// Serialize `set` and `delete` per key (default: off)
    pub serialize_writes: bool,
    /// Events buffered per subscriber (default: 256)
    pub event_capacity: usize,
}

impl Default for StoreOptions {
    fn default() -> Self {
        Self {
            cache: CacheSetting::Enabled,
            codec: Arc::new(JsonCodec),
            serialize_writes: false,
            event_capacity: DEFAULT_EVENT_CAPACITY,
        }
    }
}

impl StoreOptions {
    /// Set the cache strategy; `true`/`false` work too
    pub fn cache(mut self, cache: impl Into<CacheSetting>) -> Self {
        self.cache = cache.into();
        self
    }

    /// Use `codec` instead of JSON
    pub fn codec(mut self, codec: impl Codec + 'static) -> Self {
        self.codec = Arc::new(codec);
        self
    }

    /// Toggle per-key write serialization
    pub fn serialize_writes(mut self, enabled: bool) -> Self {
        self.serialize_writes = enabled;
        self
    }

    /// Set the per-subscriber event buffer, clamped to
    /// `1..=MAX_EVENT_CAPACITY`
    pub fn event_capacity(mut self, capacity: usize) -> Self {
        self.event_capacity = capacity;
        self
    }
}

impl From<&StoreConfig> for StoreOptions {
    fn from(config: &StoreConfig) -> Self {
        StoreOptions::default()
            .cache(config.cache)
            .serialize_writes(config.serialize_writes)
            .event_capacity(config.event_capacity)
    }
}

impl fmt::Debug for StoreOptions {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("StoreOptions")
            .field("cache", &self.cache)
            .field("codec", &self.codec.codec_id())
            .field("serialize_writes", &self.serialize_writes)
            .field("event_capacity", &self.event_capacity)
            .finish()
    }
}

struct Inner {
    backend: Arc<dyn StorageBackend>,
    kind: BackendKind,
    cache: Option<Arc<dyn Cache>>,
    codec: Arc<dyn Codec>,
    events: broadcast::Sender<StoreEvent>,
    locks: Option<KeyLocks>,
    /// Bumped whenever the whole cache is reset
    cache_epoch: AtomicU64,
}

/// Key-value store over an interchangeable backend
///
/// Cloning is cheap; clones share the backend, cache and event stream.
///
/// # Example
///
/// ```
/// use kvlayer_engine::{KvStore, StoreOptions};
/// use kvlayer_storage::MemoryBackend;
/// use serde_json::json;
///
/// # tokio_test_block(async {
/// let store = KvStore::new(MemoryBackend::new(), StoreOptions::default());
/// store.connect().await?;
///
/// store.set("user", json!({"name": "ada", "age": 36})).await?;
/// store.set(("user", "age"), json!(37)).await?;
///
/// let age = store.get(("user", "age")).await?;
/// assert_eq!(age.value, Some(json!(37)));
/// # Ok::<(), kvlayer_core::Error>(())
/// # }).unwrap();
/// # fn tokio_test_block<F: std::future::Future>(f: F) -> F::Output {
/// #     tokio::runtime::Runtime::new().unwrap().block_on(f)
/// # }
/// ```
#[derive(Clone)]
pub struct KvStore {
    inner: Arc<Inner>,
}

impl KvStore {
    /// Build a store over `backend`
    ///
    /// Nothing is provisioned until [`KvStore::connect`].
    pub fn new(backend: impl Into<Backend>, options: StoreOptions) -> Self {
        let backend = backend.into();
        let kind = backend.kind();
        let capacity = options.event_capacity.clamp(1, MAX_EVENT_CAPACITY);
        let (events, _) = broadcast::channel(capacity);
        KvStore {
            inner: Arc::new(Inner {
                backend: backend.into_adapter(),
                kind,
                cache: options.cache.build(),
                codec: options.codec,
                events,
                locks: options.serialize_writes.then(KeyLocks::new),
                cache_epoch: AtomicU64::new(0),
            }),
        }
    }

    /// Open the backend named by `config`, build the store and connect it
    pub async fn open(config: &StoreConfig) -> Result<Self> {
        config.validate()?;
        let backend = Backend::open(&config.backend, &config.table).await?;
        let store = KvStore::new(backend, StoreOptions::from(config));
        store.connect().await?;
        Ok(store)
    }

    /// Kind of backend behind this store
    pub fn kind(&self) -> BackendKind {
        self.inner.kind
    }

    /// True if this store keeps a cache
    pub fn is_cached(&self) -> bool {
        self.inner.cache.is_some()
    }

    /// Receive every event published after this call
    pub fn subscribe(&self) -> broadcast::Receiver<StoreEvent> {
        self.inner.events.subscribe()
    }

    /// Provision the backend (idempotent)
    pub async fn connect(&self) -> Result<()> {
        self.inner.backend.connect().await?;
        info!(target: "kvlayer::store", backend = %self.inner.kind, "Store connected");
        self.emit(StoreEvent::Connect);
        Ok(())
    }

    /// Release the backend
    pub async fn disconnect(&self) -> Result<()> {
        self.inner.backend.disconnect().await?;
        info!(target: "kvlayer::store", backend = %self.inner.kind, "Store disconnected");
        self.emit(StoreEvent::Disconnect);
        Ok(())
    }

    /// Read a value, or the value at a path inside it
    ///
    /// A missing record, or a missing path inside an object, yields a pair
    /// whose value is `None`.
    ///
    /// # Errors
    ///
    /// `NoKey`/`InvalidKey`/`InvalidParameters` for a malformed target,
    /// `ValueNotObject` when a path is given and the stored value is not an
    /// object, or the backend's error.
    pub async fn get(&self, key: impl Into<KeyParam>) -> Result<Pair> {
        let target = key.into().resolve()?;
        let whole = {
            let _guard = self.lock_key(&target.key).await;
            self.read_value(&target.key).await?
        };
        let value = select(&target, whole)?;
        debug!(target: "kvlayer::store", key = %target.key, found = value.is_some(), "get");
        let pair = Pair::new(target.key, value);
        self.emit(StoreEvent::ValueGet(pair.clone()));
        Ok(pair)
    }

    /// True if [`KvStore::get`] would find a value. Publishes no event.
    pub async fn has(&self, key: impl Into<KeyParam>) -> Result<bool> {
        let target = key.into().resolve()?;
        let whole = {
            let _guard = self.lock_key(&target.key).await;
            self.read_value(&target.key).await?
        };
        Ok(select(&target, whole)?.is_some())
    }

    /// Write a whole value, or a value at a path inside the stored object
    ///
    /// Returns the pair of the whole value now stored, with `old` set to
    /// the whole previous value when one existed. Publishes `ValueSet` for
    /// a new record and `ValueUpdate` otherwise.
    ///
    /// With a path, a missing record starts from an empty object and
    /// missing intermediate objects are created; sibling fields are kept.
    ///
    /// # Errors
    ///
    /// Validation errors as for `get`, `ValueNotObject` when the path runs
    /// into a non-object, `NoValue` when the codec produces an empty string,
    /// or the backend's error. On any error the cache is left as it was.
    pub async fn set(&self, key: impl Into<KeyParam>, value: impl Into<Value>) -> Result<Pair> {
        let target = key.into().resolve()?;
        let _guard = self.lock_key(&target.key).await;

        let old = self.read_value(&target.key).await?;
        let new = merge(&target, old.as_ref(), value.into())?;

        let raw = self.inner.codec.serialize(&new)?;
        if raw.is_empty() {
            return Err(Error::NoValue { key: target.key });
        }

        if let Err(e) = self.inner.backend.upsert(&target.key, &raw).await {
            warn!(target: "kvlayer::store", key = %target.key, error = %e, "Backend write failed");
            return Err(e.into());
        }
        if let Some(cache) = &self.inner.cache {
            cache.set(&target.key, raw);
        }

        let updated = old.is_some();
        debug!(target: "kvlayer::store", key = %target.key, updated, "set");
        let pair = Pair::new(target.key, Some(new)).with_old(old);
        self.emit(if updated {
            StoreEvent::ValueUpdate(pair.clone())
        } else {
            StoreEvent::ValueSet(pair.clone())
        });
        Ok(pair)
    }

    /// Delete a record
    ///
    /// Returns the number of records removed; deleting a missing key is not
    /// an error and returns 0. The cache entry is dropped either way.
    pub async fn delete(&self, key: &str) -> Result<u64> {
        check_key(key)?;
        let _guard = self.lock_key(key).await;

        let removed = self.inner.backend.point_delete(key).await?;
        if let Some(cache) = &self.inner.cache {
            cache.delete(key);
        }
        debug!(target: "kvlayer::store", key = %key, removed, "delete");
        self.emit(StoreEvent::ValueDelete {
            key: key.to_string(),
            removed,
        });
        Ok(removed)
    }

    /// Every record, in backend order
    ///
    /// The cache is replaced by exactly the scanned records.
    pub async fn all(&self) -> Result<Vec<Pair>> {
        let records = self.inner.backend.scan_all().await?;
        let mut pairs = Vec::with_capacity(records.len());
        for (key, raw) in &records {
            let value = self.inner.codec.deserialize(raw)?;
            pairs.push(Pair::new(key.clone(), Some(value)));
        }

        if let Some(cache) = &self.inner.cache {
            self.reset_cache(cache.as_ref());
            for (key, raw) in records {
                cache.set(&key, raw);
            }
        }
        debug!(target: "kvlayer::store", count = pairs.len(), "all");
        self.emit(StoreEvent::ValueFetch(pairs.clone()));
        Ok(pairs)
    }

    /// Delete every record and drop the cache
    pub async fn truncate(&self) -> Result<u64> {
        let removed = self.inner.backend.truncate_all().await?;
        if let Some(cache) = &self.inner.cache {
            self.reset_cache(cache.as_ref());
        }
        debug!(target: "kvlayer::store", removed, "truncate");
        self.emit(StoreEvent::Truncate { removed });
        Ok(removed)
    }

    /// Snapshot of the cache; empty when caching is disabled
    pub fn entries(&self) -> Vec<CacheEntry> {
        self.inner
            .cache
            .as_ref()
            .map(|cache| cache.entries())
            .unwrap_or_default()
    }

    /// Drop the cache, leaving the backend alone
    pub fn empty(&self) {
        if let Some(cache) = &self.inner.cache {
            self.reset_cache(cache.as_ref());
        }
    }

    fn reset_cache(&self, cache: &dyn Cache) {
        self.inner.cache_epoch.fetch_add(1, Ordering::AcqRel);
        cache.empty();
    }

    /// Per-key lock when writes are serialized, nothing otherwise
    async fn lock_key(&self, key: &str) -> Option<KeyGuard<'_>> {
        match &self.inner.locks {
            Some(locks) => Some(locks.lock(key).await),
            None => None,
        }
    }

    async fn read_raw(&self, key: &str) -> Result<Option<String>> {
        if let Some(cache) = &self.inner.cache {
            if let Some(raw) = cache.get(key) {
                trace!(target: "kvlayer::store", key = %key, "cache hit");
                return Ok(Some(raw));
            }
            trace!(target: "kvlayer::store", key = %key, "cache miss");
        }

        let epoch = self.inner.cache_epoch.load(Ordering::Acquire);
        let raw = self.inner.backend.point_get(key).await?;
        if let (Some(cache), Some(raw)) = (&self.inner.cache, &raw) {
            if self.inner.cache_epoch.load(Ordering::Acquire) == epoch {
                cache.set(key, raw.clone());
            } else {
                trace!(target: "kvlayer::store", key = %key, "cache reset during read, not filling");
            }
        }
        Ok(raw)
    }

    async fn read_value(&self, key: &str) -> Result<Option<Value>> {
        match self.read_raw(key).await? {
            Some(raw) => Ok(Some(self.inner.codec.deserialize(&raw)?)),
            None => Ok(None),
        }
    }

    fn emit(&self, event: StoreEvent) {
        // no subscribers is fine
        let _ = self.inner.events.send(event);
    }
}

/// Narrow a whole stored value to the target's path
fn select(target: &Target, whole: Option<Value>) -> Result<Option<Value>> {
    match (&target.path, whole) {
        (None, whole) => Ok(whole),
        (Some(_), None) => Ok(None),
        (Some(path), Some(value)) => {
            if !value.is_object() {
                return Err(Error::value_not_object(
                    target.key.as_str(),
                    Some(path.to_string()),
                ));
            }
            Ok(get_at_path(&value, path).cloned())
        }
    }
}

/// Build the whole value to persist
fn merge(target: &Target, old: Option<&Value>, value: Value) -> Result<Value> {
    let path = match &target.path {
        None => return Ok(value),
        Some(path) => path,
    };
    let base = match old {
        None => Value::Object(Default::default()),
        Some(v) if v.is_object() => v.clone(),
        Some(_) => {
            return Err(Error::value_not_object(
                target.key.as_str(),
                Some(path.to_string()),
            ))
        }
    };
    set_at_path(base, path, value).map_err(|e| match e {
        PathError::NotObject { segment, .. } => {
            Error::value_not_object(target.key.as_str(), Some(segment))
        }
    })
}

impl fmt::Debug for KvStore {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("KvStore")
            .field("backend", &self.inner.kind)
            .field("cached", &self.is_cached())
            .field("codec", &self.inner.codec.codec_id())
            .field("serialize_writes", &self.inner.locks.is_some())
            .finish()
    }
}
