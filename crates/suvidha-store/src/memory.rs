use std::collections::HashMap;
use std::sync::{RwLock, RwLockReadGuard, RwLockWriteGuard};

use crate::error::{StoreError, StoreResult};
use crate::traits::{validate_key, KeyValueStore, Versioned};

/// In-memory, HashMap-based store.
///
/// Intended for tests and embedding. Values are held behind a `RwLock` and
/// cloned on read and write. Versions survive `remove`, so a key that is
/// removed and written again never reuses a version a reader may still hold.
pub struct InMemoryStore {
    entries: RwLock<HashMap<String, Slot>>,
}

#[derive(Clone)]
struct Slot {
    version: u64,
    value: Option<Vec<u8>>,
}

impl InMemoryStore {
    /// Create a new empty store.
    pub fn new() -> Self {
        Self {
            entries: RwLock::new(HashMap::new()),
        }
    }

    /// Number of keys currently holding a value.
    pub fn len(&self) -> usize {
        self.read_guard()
            .map(|map| map.values().filter(|slot| slot.value.is_some()).count())
            .unwrap_or(0)
    }

    /// Returns `true` if no key holds a value.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Total bytes across all stored values.
    pub fn total_bytes(&self) -> u64 {
        self.read_guard()
            .map(|map| {
                map.values()
                    .filter_map(|slot| slot.value.as_ref())
                    .map(|value| value.len() as u64)
                    .sum()
            })
            .unwrap_or(0)
    }

    fn read_guard(&self) -> StoreResult<RwLockReadGuard<'_, HashMap<String, Slot>>> {
        self.entries
            .read()
            .map_err(|_| StoreError::Unavailable("memory store lock poisoned".into()))
    }

    fn write_guard(&self) -> StoreResult<RwLockWriteGuard<'_, HashMap<String, Slot>>> {
        self.entries
            .write()
            .map_err(|_| StoreError::Unavailable("memory store lock poisoned".into()))
    }
}

impl Default for InMemoryStore {
    fn default() -> Self {
        Self::new()
    }
}

impl KeyValueStore for InMemoryStore {
    fn load(&self, key: &str) -> StoreResult<Option<Versioned<Vec<u8>>>> {
        validate_key(key)?;
        let map = self.read_guard()?;
        Ok(map.get(key).and_then(|slot| {
            slot.value.as_ref().map(|value| Versioned {
                version: slot.version,
                value: value.clone(),
            })
        }))
    }

    fn save_if(&self, key: &str, value: &[u8], expected_version: u64) -> StoreResult<u64> {
        validate_key(key)?;
        let mut map = self.write_guard()?;
        let current = map
            .get(key)
            .filter(|slot| slot.value.is_some())
            .map(|slot| slot.version)
            .unwrap_or(0);
        if current != expected_version {
            return Err(StoreError::Conflict {
                key: key.to_string(),
                expected: expected_version,
                actual: current,
            });
        }

        let slot = map.entry(key.to_string()).or_insert(Slot {
            version: 0,
            value: None,
        });
        slot.version += 1;
        slot.value = Some(value.to_vec());
        Ok(slot.version)
    }

    fn remove(&self, key: &str) -> StoreResult<bool> {
        validate_key(key)?;
        let mut map = self.write_guard()?;
        Ok(map
            .get_mut(key)
            .and_then(|slot| slot.value.take())
            .is_some())
    }

    fn keys(&self) -> StoreResult<Vec<String>> {
        let map = self.read_guard()?;
        let mut keys: Vec<String> = map
            .iter()
            .filter(|(_, slot)| slot.value.is_some())
            .map(|(key, _)| key.clone())
            .collect();
        keys.sort();
        Ok(keys)
    }
}

impl std::fmt::Debug for InMemoryStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("InMemoryStore")
            .field("key_count", &self.len())
            .finish()
    }
}
