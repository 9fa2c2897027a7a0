use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use super::KeyValueStore;
use crate::error::StoreError;

/// In-memory key-value store.
///
/// Clones share the same map, so a test can keep a handle and inspect what
/// the settings store wrote. `fail_writes` makes every `save` fail without
/// touching existing entries.
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    inner: Arc<Mutex<Inner>>,
}

#[derive(Debug, Default)]
struct Inner {
    entries: HashMap<String, Vec<u8>>,
    fail_writes: bool,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Seed a raw value, bypassing failure injection.
    pub fn insert(&self, key: &str, bytes: impl Into<Vec<u8>>) {
        if let Ok(mut inner) = self.inner.lock() {
            inner.entries.insert(key.to_string(), bytes.into());
        }
    }

    pub fn get(&self, key: &str) -> Option<Vec<u8>> {
        self.inner.lock().ok()?.entries.get(key).cloned()
    }

    pub fn set_fail_writes(&self, fail: bool) {
        if let Ok(mut inner) = self.inner.lock() {
            inner.fail_writes = fail;
        }
    }
}

impl KeyValueStore for MemoryStore {
    fn load(&self, key: &str) -> Result<Option<Vec<u8>>, StoreError> {
        let inner = self.inner.lock().map_err(|e| StoreError::ReadFailed {
            key: key.to_string(),
            message: e.to_string(),
        })?;
        Ok(inner.entries.get(key).cloned())
    }

    fn save(&mut self, key: &str, bytes: &[u8]) -> Result<(), StoreError> {
        let mut inner = self.inner.lock().map_err(|e| StoreError::WriteFailed {
            key: key.to_string(),
            message: e.to_string(),
        })?;
        if inner.fail_writes {
            return Err(StoreError::WriteFailed {
                key: key.to_string(),
                message: "write failure injected".into(),
            });
        }
        inner.entries.insert(key.to_string(), bytes.to_vec());
        Ok(())
    }
}
