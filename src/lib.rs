//! kvlayer - Key-value façade over interchangeable storage backends
//!
//! kvlayer exposes one contract (`get`, `set`, `delete`, `all`, `truncate`)
//! over a process-local map, SQLite, a directory of JSON documents or redb,
//! with an in-process write-through cache and dotted-path addressing inside
//! stored objects.
//!
//! # Quick Start
//!
//! ```
//! use kvlayer::{KvStore, MemoryBackend, StoreOptions};
//! use serde_json::json;
//!
//! # tokio::runtime::Runtime::new().unwrap().block_on(async {
//! let store = KvStore::new(MemoryBackend::new(), StoreOptions::default());
//! store.connect().await?;
//!
//! store.set("user", json!({"name": "ada", "langs": {"first": "analytical"}})).await?;
//! store.set(("user", "langs.second"), "rust").await?;
//!
//! let user = store.get("user").await?;
//! assert_eq!(user.value.unwrap()["langs"]["second"], "rust");
//! # Ok::<(), kvlayer::Error>(())
//! # }).unwrap();
//! ```
//!
//! # Architecture
//!
//! - `kvlayer-core`: errors, key and path handling, codecs, `Pair`
//! - `kvlayer-storage`: the `StorageBackend` trait and its adapters
//! - `kvlayer-engine`: `KvStore`, caches, events and configuration

pub use kvlayer_core::*;
pub use kvlayer_engine::*;
pub use kvlayer_storage::*;
