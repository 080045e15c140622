use std::sync::Arc;

use crate::error::{StoreError, StoreResult};

/// A stored value together with the version it was written at.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Versioned<T> {
    pub version: u64,
    pub value: T,
}

/// Durable, versioned key-value store.
///
/// All implementations must satisfy these invariants:
/// - A key that was never written (or was removed) reads as `None` and has
///   version 0.
/// - Each successful write returns the new version, one above the previous.
/// - `save_if` is atomic with respect to other writers on the same store
///   instance: it either replaces the value at `expected_version` or fails
///   with [`StoreError::Conflict`].
/// - Unreadable or corrupt data is an error, never an empty value.
///
/// Callers that perform read-modify-write cycles (the ledger does, on every
/// append) should pass the version they loaded to `save_if` so a concurrent
/// writer is detected rather than silently overwritten.
pub trait KeyValueStore: Send + Sync {
    /// Read the current value and version of `key`.
    fn load(&self, key: &str) -> StoreResult<Option<Versioned<Vec<u8>>>>;

    /// Replace the value of `key` if its current version is
    /// `expected_version`. Returns the new version.
    fn save_if(&self, key: &str, value: &[u8], expected_version: u64) -> StoreResult<u64>;

    /// Delete `key`. Returns `true` if it existed.
    fn remove(&self, key: &str) -> StoreResult<bool>;

    /// All keys currently present, sorted.
    fn keys(&self) -> StoreResult<Vec<String>>;

    /// Current version of `key` (0 when absent).
    fn version(&self, key: &str) -> StoreResult<u64> {
        Ok(self.load(key)?.map(|v| v.version).unwrap_or(0))
    }

    /// Unconditional last-write-wins replace. Returns the new version.
    fn save(&self, key: &str, value: &[u8]) -> StoreResult<u64> {
        let current = self.version(key)?;
        self.save_if(key, value, current)
    }
}

/// Reject keys that cannot be mapped onto a file name safely.
pub fn validate_key(key: &str) -> StoreResult<()> {
    let valid = !key.is_empty()
        && key != "."
        && key != ".."
        && key
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || matches!(c, '.' | '_' | '-'));
    if valid {
        Ok(())
    } else {
        Err(StoreError::InvalidKey(key.to_string()))
    }
}

impl<S: KeyValueStore + ?Sized> KeyValueStore for Arc<S> {
    fn load(&self, key: &str) -> StoreResult<Option<Versioned<Vec<u8>>>> {
        (**self).load(key)
    }

    fn save_if(&self, key: &str, value: &[u8], expected_version: u64) -> StoreResult<u64> {
        (**self).save_if(key, value, expected_version)
    }

    fn remove(&self, key: &str) -> StoreResult<bool> {
        (**self).remove(key)
    }

    fn keys(&self) -> StoreResult<Vec<String>> {
        (**self).keys()
    }
}

impl<S: KeyValueStore + ?Sized> KeyValueStore for Box<S> {
    fn load(&self, key: &str) -> StoreResult<Option<Versioned<Vec<u8>>>> {
        (**self).load(key)
    }

    fn save_if(&self, key: &str, value: &[u8], expected_version: u64) -> StoreResult<u64> {
        (**self).save_if(key, value, expected_version)
    }

    fn remove(&self, key: &str) -> StoreResult<bool> {
        (**self).remove(key)
    }

    fn keys(&self) -> StoreResult<Vec<String>> {
        (**self).keys()
    }
}
