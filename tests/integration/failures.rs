//! Backend failures surface unchanged and never touch the cache.

use crate::common::*;
use std::sync::Arc;

fn failing_store(options: StoreOptions) -> (Arc<FailingBackend>, KvStore) {
    init_tracing();
    let backend = Arc::new(FailingBackend::default());
    let adapter: Arc<dyn StorageBackend> = backend.clone();
    (backend, KvStore::new(adapter, options))
}

#[tokio::test]
async fn failed_set_leaves_cache_unchanged() {
    let (backend, store) = failing_store(StoreOptions::default());
    store.set("k", json!({"v": 1})).await.unwrap();
    let before = sorted_entries(&store);

    backend.set_failing(true);
    let err = store.set("k", json!({"v": 2})).await.unwrap_err();
    assert!(matches!(err, Error::Storage(_)));
    assert_eq!(sorted_entries(&store), before);

    backend.set_failing(false);
    assert_eq!(store.get("k").await.unwrap().value, Some(json!({"v": 1})));
}

#[tokio::test]
async fn failed_path_set_leaves_cache_unchanged() {
    let (backend, store) = failing_store(StoreOptions::default());
    store.set("k", json!({"a": 1})).await.unwrap();

    backend.set_failing(true);
    // the prior value comes from the cache, the write fails
    assert!(store.set(("k", "b"), 2).await.is_err());
    assert_eq!(sorted_entries(&store), vec![("k".to_string(), "{\"a\":1}".to_string())]);
}

#[tokio::test]
async fn failed_first_write_caches_nothing() {
    let (backend, store) = failing_store(StoreOptions::default());
    backend.set_failing(true);
    assert!(store.set("k", 1).await.is_err());
    assert!(store.entries().is_empty());
}

#[tokio::test]
async fn failed_delete_keeps_cache_entry() {
    let (backend, store) = failing_store(StoreOptions::default());
    store.set("k", 1).await.unwrap();

    backend.set_failing(true);
    assert!(store.delete("k").await.is_err());
    assert_eq!(store.entries().len(), 1);
}

#[tokio::test]
async fn failed_bulk_operations_keep_cache() {
    let (backend, store) = failing_store(StoreOptions::default());
    store.set("a", 1).await.unwrap();
    store.set("b", 2).await.unwrap();

    backend.set_failing(true);
    assert!(store.all().await.is_err());
    assert!(store.truncate().await.is_err());
    assert_eq!(store.entries().len(), 2);
}

#[tokio::test]
async fn failures_emit_no_events() {
    let (backend, store) = failing_store(StoreOptions::default());
    let mut rx = store.subscribe();
    backend.set_failing(true);

    assert!(store.connect().await.is_err());
    assert!(store.get("k").await.is_err());
    assert!(store.set("k", 1).await.is_err());
    assert!(store.delete("k").await.is_err());
    assert!(store.all().await.is_err());
    assert!(store.truncate().await.is_err());
    assert!(drain(&mut rx).is_empty());
}

#[tokio::test]
async fn backend_error_is_passed_through() {
    let (backend, store) = failing_store(StoreOptions::default());
    backend.set_failing(true);

    let err = store.get("k").await.unwrap_err();
    assert!(!err.is_validation());
    let storage = err.as_storage().unwrap();
    assert_eq!(storage.backend(), "failing");
    assert!(storage.downcast_ref::<Refused>().is_some());
    assert!(err.to_string().contains("backend refused the call"));
}

#[tokio::test]
async fn cached_reads_survive_backend_outage() {
    let (backend, store) = failing_store(StoreOptions::default());
    store.set("k", 1).await.unwrap();

    backend.set_failing(true);
    assert_eq!(store.get("k").await.unwrap().value, Some(json!(1)));
    assert!(store.get("other").await.is_err());
}
