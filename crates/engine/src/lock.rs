//! Per-key write serialization
//!
//! One async mutex per key that currently has a writer. Entries are created
//! on demand and removed when the last holder or waiter lets go, so the map
//! only ever holds keys with in-flight writes.

use dashmap::DashMap;
use std::sync::Arc;
use tokio::sync::{Mutex, OwnedMutexGuard};

#[derive(Debug, Default)]
pub(crate) struct KeyLocks {
    locks: DashMap<String, Arc<Mutex<()>>>,
}

impl KeyLocks {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    /// Wait for exclusive write access to `key`
    pub(crate) async fn lock(&self, key: &str) -> KeyGuard<'_> {
        // the map entry is released before awaiting
        let mutex = Arc::clone(self.locks.entry(key.to_string()).or_default().value());
        let guard = mutex.lock_owned().await;
        KeyGuard {
            locks: self,
            key: key.to_string(),
            guard: Some(guard),
        }
    }

    /// Keys with a holder or waiter
    #[cfg(test)]
    pub(crate) fn len(&self) -> usize {
        self.locks.len()
    }
}

pub(crate) struct KeyGuard<'a> {
    locks: &'a KeyLocks,
    key: String,
    guard: Option<OwnedMutexGuard<()>>,
}

impl Drop for KeyGuard<'_> {
    fn drop(&mut self) {
        drop(self.guard.take());
        // waiters hold a clone of the Arc, so a count of 1 means nobody else wants it
        self.locks
            .locks
            .remove_if(&self.key, |_, m| Arc::strong_count(m) == 1);
    }
}
