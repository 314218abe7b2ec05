//! Observable store properties, checked against every compiled-in backend.

use crate::common::*;

fn sorted_pairs(mut pairs: Vec<Pair>) -> Vec<(String, Value)> {
    pairs.sort_by(|a, b| a.key.cmp(&b.key));
    pairs
        .into_iter()
        .map(|p| (p.key, p.value.expect("scanned pair has a value")))
        .collect()
}

#[tokio::test]
async fn round_trip_on_every_backend() {
    let values = vec![
        json!("text"),
        json!(""),
        json!(0),
        json!(-12.5),
        json!(true),
        json!(null),
        json!([1, "two", {"three": 3}]),
        json!({"nested": {"deep": [null, false]}}),
    ];

    for store in TestStore::all(StoreOptions::default()).await {
        for (i, value) in values.iter().enumerate() {
            let key = format!("key:{}", i);
            store.set(key.as_str(), value.clone()).await.unwrap();
            let pair = store.get(key.as_str()).await.unwrap();
            assert_eq!(pair.value.as_ref(), Some(value), "backend {}", store.name);

            // and again without the cache in the way
            store.empty();
            let pair = store.get(key.as_str()).await.unwrap();
            assert_eq!(pair.value.as_ref(), Some(value), "backend {}", store.name);
        }
    }
}

#[tokio::test]
async fn create_then_update_events() {
    for store in TestStore::all(StoreOptions::default()).await {
        let mut rx = store.subscribe();

        store.set("k", json!({"v": 1})).await.unwrap();
        store.set("k", json!({"v": 2})).await.unwrap();

        let events = drain(&mut rx);
        assert_eq!(events.len(), 2, "backend {}", store.name);
        match &events[0] {
            StoreEvent::ValueSet(pair) => {
                assert_eq!(pair.value, Some(json!({"v": 1})));
                assert_eq!(pair.old, None);
            }
            other => panic!("expected valueSet, got {:?}", other),
        }
        match &events[1] {
            StoreEvent::ValueUpdate(pair) => {
                assert_eq!(pair.value, Some(json!({"v": 2})));
                assert_eq!(pair.old, Some(json!({"v": 1})));
            }
            other => panic!("expected valueUpdate, got {:?}", other),
        }
    }
}

#[tokio::test]
async fn path_set_is_non_destructive() {
    for store in TestStore::all(StoreOptions::default()).await {
        store.set("k", json!({"a": 1, "b": 2})).await.unwrap();
        store.set(("k", "a"), 99).await.unwrap();

        store.empty();
        let pair = store.get("k").await.unwrap();
        assert_eq!(pair.value, Some(json!({"a": 99, "b": 2})), "backend {}", store.name);
    }
}

#[tokio::test]
async fn path_set_creates_intermediate_objects() {
    for store in TestStore::all(StoreOptions::default()).await {
        store.set("cfg", json!({"keep": true})).await.unwrap();
        let pair = store.set(("cfg", "db.pool.size"), 8).await.unwrap();
        assert_eq!(
            pair.value,
            Some(json!({"keep": true, "db": {"pool": {"size": 8}}})),
            "backend {}",
            store.name
        );
        let size = store.get(("cfg", "db.pool.size")).await.unwrap();
        assert_eq!(size.value, Some(json!(8)));
    }
}

#[tokio::test]
async fn path_get_on_missing_path_is_no_value() {
    for store in TestStore::all(StoreOptions::default()).await {
        store.set("k", json!({"a": 1})).await.unwrap();
        let pair = store.get(("k", "z")).await.unwrap();
        assert_eq!(pair.key, "k");
        assert_eq!(pair.value, None, "backend {}", store.name);
        assert!(!store.has(("k", "z")).await.unwrap());
        assert!(store.has(("k", "a")).await.unwrap());
    }
}

#[tokio::test]
async fn path_on_non_object_fails() {
    for store in TestStore::all(StoreOptions::default()).await {
        store.set("k", "hello").await.unwrap();
        let err = store.set(("k", "a"), 1).await.unwrap_err();
        assert!(
            matches!(err, Error::ValueNotObject { .. }),
            "backend {}: {}",
            store.name,
            err
        );
        assert_eq!(store.get("k").await.unwrap().value, Some(json!("hello")));
    }
}

#[tokio::test]
async fn delete_is_idempotent() {
    for store in TestStore::all(StoreOptions::default()).await {
        assert_eq!(store.delete("ghost").await.unwrap(), 0, "backend {}", store.name);
        assert_eq!(store.delete("ghost").await.unwrap(), 0);

        store.set("real", 1).await.unwrap();
        assert_eq!(store.delete("real").await.unwrap(), 1);
        assert_eq!(store.delete("real").await.unwrap(), 0);
        assert_eq!(store.get("real").await.unwrap().value, None);
    }
}

#[tokio::test]
async fn all_makes_cache_match_backend() {
    for store in TestStore::all(StoreOptions::default()).await {
        store.set("a", 1).await.unwrap();
        store.set("b", json!({"x": [1]})).await.unwrap();
        store.set("c", "three").await.unwrap();
        store.empty();
        store.get("a").await.unwrap();

        let pairs = sorted_pairs(store.all().await.unwrap());
        let cached: Vec<(String, Value)> = sorted_entries(&store)
            .into_iter()
            .map(|(k, raw)| (k, serde_json::from_str(&raw).unwrap()))
            .collect();
        assert_eq!(cached, pairs, "backend {}", store.name);
        assert_eq!(
            pairs,
            vec![
                ("a".to_string(), json!(1)),
                ("b".to_string(), json!({"x": [1]})),
                ("c".to_string(), json!("three")),
            ]
        );
    }
}

#[tokio::test]
async fn truncate_empties_both_layers() {
    for store in TestStore::all(StoreOptions::default()).await {
        store.set("a", 1).await.unwrap();
        store.set("b", 2).await.unwrap();
        assert_eq!(store.truncate().await.unwrap(), 2, "backend {}", store.name);
        assert!(store.all().await.unwrap().is_empty());
        assert!(store.entries().is_empty());
        assert_eq!(store.truncate().await.unwrap(), 0);
    }
}

#[tokio::test]
async fn cache_disabled_is_transparent() {
    for store in TestStore::all(StoreOptions::default().cache(false)).await {
        store.set("k", 1).await.unwrap();
        assert!(store.entries().is_empty(), "backend {}", store.name);
        let pair = store.set("k", 2).await.unwrap();
        assert_eq!(pair.old, Some(json!(1)));
        assert_eq!(store.get("k").await.unwrap().value, Some(json!(2)));
        assert_eq!(store.all().await.unwrap().len(), 1);
        assert!(store.entries().is_empty());
        assert_eq!(store.delete("k").await.unwrap(), 1);
        assert_eq!(store.get("k").await.unwrap().value, None);
        assert!(store.entries().is_empty());
    }
}

#[tokio::test]
async fn one_event_per_operation() {
    let store = TestStore::memory(StoreOptions::default()).await;
    let mut rx = store.subscribe();

    store.set("k", 1).await.unwrap();
    store.get("k").await.unwrap();
    store.get(("k2", "a")).await.unwrap();
    store.has("k").await.unwrap();
    store.entries();
    store.empty();
    store.delete("k").await.unwrap();
    store.all().await.unwrap();
    store.truncate().await.unwrap();

    assert_eq!(
        drain_names(&mut rx),
        vec!["valueSet", "valueGet", "valueGet", "valueDelete", "valueFetch", "truncate"]
    );
}

#[tokio::test]
async fn validation_happens_before_io() {
    let backend = std::sync::Arc::new(FailingBackend::default());
    let adapter: std::sync::Arc<dyn StorageBackend> = backend.clone();
    let store = KvStore::new(adapter, StoreOptions::default());
    backend.set_failing(true);

    // a failing backend would answer with Storage; these never reach it
    assert!(matches!(store.get("").await.unwrap_err(), Error::NoKey));
    assert!(matches!(
        store.set("bad\u{0}key", 1).await.unwrap_err(),
        Error::InvalidKey { .. }
    ));
    assert!(matches!(
        store.set(("k", ".a"), 1).await.unwrap_err(),
        Error::InvalidParameters { .. }
    ));
    assert!(matches!(store.delete("").await.unwrap_err(), Error::NoKey));
}
