//! Injected caches, cache factories and cache-less stores.

use crate::common::*;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

/// Cache that records every call it receives
#[derive(Default)]
struct RecordingCache {
    inner: MemoryCache,
    calls: Mutex<Vec<String>>,
}

impl RecordingCache {
    fn record(&self, call: String) {
        self.calls.lock().unwrap().push(call);
    }

    fn take_calls(&self) -> Vec<String> {
        std::mem::take(&mut *self.calls.lock().unwrap())
    }
}

impl Cache for RecordingCache {
    fn get(&self, key: &str) -> Option<String> {
        self.record(format!("get {}", key));
        self.inner.get(key)
    }

    fn set(&self, key: &str, value: String) {
        self.record(format!("set {}", key));
        self.inner.set(key, value)
    }

    fn delete(&self, key: &str) {
        self.record(format!("delete {}", key));
        self.inner.delete(key)
    }

    fn empty(&self) {
        self.record("empty".to_string());
        self.inner.empty()
    }

    fn entries(&self) -> Vec<CacheEntry> {
        self.inner.entries()
    }
}

/// Cache that holds at most one entry
#[derive(Default)]
struct SingleSlotCache {
    slot: Mutex<Option<CacheEntry>>,
}

impl Cache for SingleSlotCache {
    fn get(&self, key: &str) -> Option<String> {
        let slot = self.slot.lock().unwrap();
        slot.as_ref()
            .filter(|e| e.key == key)
            .map(|e| e.value.clone())
    }

    fn set(&self, key: &str, value: String) {
        *self.slot.lock().unwrap() = Some(CacheEntry {
            key: key.to_string(),
            value,
        });
    }

    fn delete(&self, key: &str) {
        let mut slot = self.slot.lock().unwrap();
        if slot.as_ref().is_some_and(|e| e.key == key) {
            *slot = None;
        }
    }

    fn empty(&self) {
        *self.slot.lock().unwrap() = None;
    }

    fn entries(&self) -> Vec<CacheEntry> {
        self.slot.lock().unwrap().iter().cloned().collect()
    }
}

#[tokio::test]
async fn injected_cache_sees_the_protocol() {
    let cache = Arc::new(RecordingCache::default());
    let options = StoreOptions::default().cache(CacheSetting::Instance(cache.clone()));
    let store = TestStore::memory(options).await;

    store.get("k").await.unwrap();
    assert_eq!(cache.take_calls(), vec!["get k"]);

    store.set("k", 1).await.unwrap();
    assert_eq!(cache.take_calls(), vec!["get k", "set k"]);

    store.get("k").await.unwrap();
    assert_eq!(cache.take_calls(), vec!["get k"]);

    store.delete("k").await.unwrap();
    assert_eq!(cache.take_calls(), vec!["delete k"]);

    store.set("a", 1).await.unwrap();
    cache.take_calls();
    store.all().await.unwrap();
    assert_eq!(cache.take_calls(), vec!["empty", "set a"]);

    store.truncate().await.unwrap();
    assert_eq!(cache.take_calls(), vec!["empty"]);
}

#[tokio::test]
async fn read_through_fills_injected_cache() {
    let backend = MemoryBackend::new();
    backend.upsert("k", "\"v\"").await.unwrap();
    let cache = Arc::new(RecordingCache::default());
    let store = KvStore::new(
        backend,
        StoreOptions::default().cache(CacheSetting::Instance(cache.clone())),
    );

    store.get("k").await.unwrap();
    assert_eq!(cache.take_calls(), vec!["get k", "set k"]);
    assert_eq!(cache.inner.get("k").as_deref(), Some("\"v\""));

    // missing records are not cached
    store.get("nope").await.unwrap();
    assert_eq!(cache.take_calls(), vec!["get nope"]);
}

#[tokio::test]
async fn bounded_cache_stays_correct() {
    let options = StoreOptions::default().cache(CacheSetting::Instance(Arc::new(
        SingleSlotCache::default(),
    )));
    let store = TestStore::memory(options).await;

    store.set("a", 1).await.unwrap();
    store.set("b", 2).await.unwrap();
    assert_eq!(store.entries().len(), 1);

    assert_eq!(store.get("a").await.unwrap().value, Some(json!(1)));
    assert_eq!(store.get("b").await.unwrap().value, Some(json!(2)));

    let pair = store.set("a", 3).await.unwrap();
    assert_eq!(pair.old, Some(json!(1)));
}

#[tokio::test]
async fn factory_runs_once_per_store() {
    let built = Arc::new(AtomicUsize::new(0));
    let counter = Arc::clone(&built);
    let setting = CacheSetting::factory(move || {
        counter.fetch_add(1, Ordering::SeqCst);
        Arc::new(MemoryCache::new()) as Arc<dyn Cache>
    });

    let first = TestStore::memory(StoreOptions::default().cache(setting.clone())).await;
    let second = TestStore::memory(StoreOptions::default().cache(setting)).await;
    assert_eq!(built.load(Ordering::SeqCst), 2);

    // separate caches
    first.set("k", 1).await.unwrap();
    assert_eq!(first.entries().len(), 1);
    assert!(second.entries().is_empty());
}

#[tokio::test]
async fn clones_share_one_cache() {
    let store = TestStore::memory(StoreOptions::default()).await;
    let clone = store.store.clone();
    clone.set("k", 1).await.unwrap();
    assert_eq!(store.entries().len(), 1);
    store.empty();
    assert!(clone.entries().is_empty());
}

#[tokio::test]
async fn empty_touches_only_the_cache() {
    let store = TestStore::memory(StoreOptions::default()).await;
    store.set("k", 1).await.unwrap();
    store.empty();
    assert!(store.entries().is_empty());
    assert_eq!(store.get("k").await.unwrap().value, Some(json!(1)));
    assert_eq!(store.entries().len(), 1);
}

#[tokio::test]
async fn entries_never_touch_the_backend() {
    let backend = Arc::new(FailingBackend::default());
    let adapter: Arc<dyn StorageBackend> = backend.clone();
    let store = KvStore::new(adapter, StoreOptions::default());
    store.set("k", 1).await.unwrap();

    backend.set_failing(true);
    let entries = store.entries();
    assert_eq!(entries.len(), 1);
    assert_eq!(entries[0].key, "k");
    assert_eq!(entries[0].value, "1");
}
