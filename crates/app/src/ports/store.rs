//! Store port — durable key/value storage for pairing and identity state.
//!
//! Values are opaque bytes; the services decide how to encode them. Keys are
//! restricted to `[A-Za-z0-9._-]` and must not start with a dot so that
//! adapters can map them directly onto file names.

use std::future::Future;

use hapdemo_domain::error::{HapError, ValidationError};

/// Durable key/value storage.
pub trait KeyValueStore: Send + Sync {
    /// Read the value stored under `key`, if any.
    fn get(&self, key: &str) -> impl Future<Output = Result<Option<Vec<u8>>, HapError>> + Send;

    /// Store `value` under `key`, replacing any previous value.
    fn set(&self, key: &str, value: &[u8]) -> impl Future<Output = Result<(), HapError>> + Send;

    /// Remove `key`. Removing a missing key is not an error.
    fn delete(&self, key: &str) -> impl Future<Output = Result<(), HapError>> + Send;

    /// List every stored key, sorted.
    fn keys(&self) -> impl Future<Output = Result<Vec<String>, HapError>> + Send;
}

impl<T: KeyValueStore> KeyValueStore for std::sync::Arc<T> {
    fn get(&self, key: &str) -> impl Future<Output = Result<Option<Vec<u8>>, HapError>> + Send {
        (**self).get(key)
    }

    fn set(&self, key: &str, value: &[u8]) -> impl Future<Output = Result<(), HapError>> + Send {
        (**self).set(key, value)
    }

    fn delete(&self, key: &str) -> impl Future<Output = Result<(), HapError>> + Send {
        (**self).delete(key)
    }

    fn keys(&self) -> impl Future<Output = Result<Vec<String>, HapError>> + Send {
        (**self).keys()
    }
}

/// Check that `key` can be used with any [`KeyValueStore`].
///
/// # Errors
///
/// Returns [`ValidationError::InvalidKey`] when the key is empty, starts with
/// a dot, or contains characters outside `[A-Za-z0-9._-]`.
pub fn validate_key(key: &str) -> Result<(), HapError> {
    let valid = !key.is_empty()
        && !key.starts_with('.')
        && key
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || matches!(c, '.' | '_' | '-'));
    if valid {
        Ok(())
    } else {
        Err(ValidationError::InvalidKey(key.to_string()).into())
    }
}
