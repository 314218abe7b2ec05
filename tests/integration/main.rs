//! Integration Tests
//!
//! Cross-crate tests of the store façade, organized by concern:
//! - Contract: the observable properties, run against every backend
//! - Backends: persistence and configuration per backend kind
//! - Concurrency: interleaved writers, with and without per-key locks
//! - Failures: backend errors pass through and leave the cache alone
//! - Caching: injected caches, factories and no cache
//! - Codecs: custom serializers

#[path = "../common/mod.rs"]
mod common;

mod caching;
mod contract;
mod failures;
