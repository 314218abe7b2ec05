//! Store façade for kvlayer
//!
//! This crate ties the storage adapters to the public contract:
//! - KvStore: get/set/delete/all/truncate with write-through caching and
//!   dotted-path reads and writes
//! - Cache: injectable cache capability, MemoryCache by default
//! - StoreEvent: one typed event per completed operation
//! - StoreConfig: `kvlayer.toml` loading

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod cache;
pub mod config;
pub mod event;
mod lock;
pub mod store;

pub use cache::{Cache, CacheEntry, CacheFactory, CacheSetting, MemoryCache};
pub use config::{StoreConfig, CONFIG_FILE_NAME, DEFAULT_EVENT_CAPACITY, MAX_EVENT_CAPACITY};
pub use event::StoreEvent;
pub use store::{KvStore, StoreOptions};
