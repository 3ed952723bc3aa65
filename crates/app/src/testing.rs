//! In-memory port implementations for tests.
//!
//! Compiled for this crate's own tests and, through the `testing` feature,
//! for the tests of adapter crates.

use std::collections::BTreeMap;
use std::future::Future;
use std::sync::{Mutex, MutexGuard, PoisonError};

use hapdemo_domain::error::HapError;

use crate::ports::KeyValueStore;
use crate::ports::store::validate_key;

/// Key-value store kept in a map. Every call completes without suspending.
#[derive(Debug, Default)]
pub struct MemoryStore {
    entries: Mutex<BTreeMap<String, Vec<u8>>>,
}

impl MemoryStore {
    fn entries(&self) -> MutexGuard<'_, BTreeMap<String, Vec<u8>>> {
        self.entries.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl KeyValueStore for MemoryStore {
    fn get(&self, key: &str) -> impl Future<Output = Result<Option<Vec<u8>>, HapError>> + Send {
        let result = validate_key(key).map(|()| self.entries().get(key).cloned());
        async move { result }
    }

    fn set(&self, key: &str, value: &[u8]) -> impl Future<Output = Result<(), HapError>> + Send {
        let result = validate_key(key).map(|()| {
            self.entries().insert(key.to_string(), value.to_vec());
        });
        async move { result }
    }

    fn delete(&self, key: &str) -> impl Future<Output = Result<(), HapError>> + Send {
        let result = validate_key(key).map(|()| {
            self.entries().remove(key);
        });
        async move { result }
    }

    fn keys(&self) -> impl Future<Output = Result<Vec<String>, HapError>> + Send {
        let keys = self.entries().keys().cloned().collect();
        async move { Ok(keys) }
    }
}

/// [`MemoryStore`] that yields to the scheduler before touching its map,
/// the way a store doing real IO suspends between calls.
#[derive(Debug, Default)]
pub struct YieldingStore {
    inner: MemoryStore,
}

impl KeyValueStore for YieldingStore {
    fn get(&self, key: &str) -> impl Future<Output = Result<Option<Vec<u8>>, HapError>> + Send {
        async move {
            tokio::task::yield_now().await;
            self.inner.get(key).await
        }
    }

    fn set(&self, key: &str, value: &[u8]) -> impl Future<Output = Result<(), HapError>> + Send {
        async move {
            tokio::task::yield_now().await;
            self.inner.set(key, value).await
        }
    }

    fn delete(&self, key: &str) -> impl Future<Output = Result<(), HapError>> + Send {
        async move {
            tokio::task::yield_now().await;
            self.inner.delete(key).await
        }
    }

    fn keys(&self) -> impl Future<Output = Result<Vec<String>, HapError>> + Send {
        async move {
            tokio::task::yield_now().await;
            self.inner.keys().await
        }
    }
}
