//! Shared adapter checks
//!
//! Every adapter must behave identically at the trait boundary; each
//! adapter's test module runs [`check_backend_contract`] against a freshly
//! connected, empty instance.

use crate::traits::StorageBackend;

/// Exercise the whole adapter contract on an empty backend
pub(crate) async fn check_backend_contract(backend: &dyn StorageBackend) {
    backend.connect().await.unwrap();
    // connect is idempotent
    backend.connect().await.unwrap();

    // point lookup on a missing key
    assert_eq!(backend.point_get("missing").await.unwrap(), None);

    // insert then update
    backend.upsert("a", "1").await.unwrap();
    assert_eq!(backend.point_get("a").await.unwrap().as_deref(), Some("1"));
    backend.upsert("a", "2").await.unwrap();
    assert_eq!(backend.point_get("a").await.unwrap().as_deref(), Some("2"));

    // stored empty string is not a missing record
    backend.upsert("empty", "").await.unwrap();
    assert_eq!(backend.point_get("empty").await.unwrap().as_deref(), Some(""));

    // keys with awkward characters
    backend.upsert("dir/with space.and:colon", "\"x\"").await.unwrap();
    assert_eq!(
        backend
            .point_get("dir/with space.and:colon")
            .await
            .unwrap()
            .as_deref(),
        Some("\"x\"")
    );

    // scan returns everything
    let mut all = backend.scan_all().await.unwrap();
    all.sort();
    assert_eq!(
        all,
        vec![
            ("a".to_string(), "2".to_string()),
            ("dir/with space.and:colon".to_string(), "\"x\"".to_string()),
            ("empty".to_string(), String::new()),
        ]
    );

    // delete reports what it removed
    assert_eq!(backend.point_delete("a").await.unwrap(), 1);
    assert_eq!(backend.point_delete("a").await.unwrap(), 0);
    assert_eq!(backend.point_delete("never-there").await.unwrap(), 0);
    assert_eq!(backend.point_get("a").await.unwrap(), None);

    // truncate removes the rest
    assert_eq!(backend.truncate_all().await.unwrap(), 2);
    assert!(backend.scan_all().await.unwrap().is_empty());
    assert_eq!(backend.truncate_all().await.unwrap(), 0);

    // still usable after truncate
    backend.upsert("after", "true").await.unwrap();
    assert_eq!(
        backend.point_get("after").await.unwrap().as_deref(),
        Some("true")
    );

    backend.disconnect().await.unwrap();
}
