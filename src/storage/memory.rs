//! In-memory object store.
//!
//! Used by tests and local development. Records every call so tests can
//! assert on exactly which puts and deletes a workflow issued, and supports
//! injected put and delete failures for exercising the compensation and
//! warning paths.

use std::collections::HashMap;

use bookbin_common::{Error, Result};
use bytes::Bytes;
use parking_lot::Mutex;

use super::ObjectStore;

/// One stored object.
#[derive(Debug, Clone)]
pub struct StoredObject {
    pub content_type: String,
    pub bytes: Bytes,
}

#[derive(Default)]
pub struct MemoryObjectStore {
    objects: Mutex<HashMap<String, StoredObject>>,
    put_log: Mutex<Vec<String>>,
    delete_log: Mutex<Vec<String>>,
    fail_puts_containing: Mutex<Option<String>>,
    fail_deletes_containing: Mutex<Option<String>>,
}

impl MemoryObjectStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Make every `put` whose key contains `fragment` fail. An empty
    /// fragment fails all puts.
    pub fn fail_puts_containing(&self, fragment: impl Into<String>) {
        *self.fail_puts_containing.lock() = Some(fragment.into());
    }

    /// Stop injecting put failures.
    pub fn clear_put_failures(&self) {
        *self.fail_puts_containing.lock() = None;
    }

    /// Make every `delete` whose key contains `fragment` fail. An empty
    /// fragment fails all deletes.
    pub fn fail_deletes_containing(&self, fragment: impl Into<String>) {
        *self.fail_deletes_containing.lock() = Some(fragment.into());
    }

    /// Stop injecting delete failures.
    pub fn clear_delete_failures(&self) {
        *self.fail_deletes_containing.lock() = None;
    }

    /// The object under `key`, if present.
    pub fn object(&self, key: &str) -> Option<StoredObject> {
        self.objects.lock().get(key).cloned()
    }

    /// Keys currently stored, sorted.
    pub fn keys(&self) -> Vec<String> {
        let mut keys: Vec<String> = self.objects.lock().keys().cloned().collect();
        keys.sort();
        keys
    }

    pub fn is_empty(&self) -> bool {
        self.objects.lock().is_empty()
    }

    /// Number of `put` calls issued, including failed ones.
    pub fn put_count(&self) -> usize {
        self.put_log.lock().len()
    }

    /// Number of `delete` calls issued.
    pub fn delete_count(&self) -> usize {
        self.delete_log.lock().len()
    }
}

#[async_trait::async_trait]
impl ObjectStore for MemoryObjectStore {
    async fn put(&self, key: &str, content_type: &str, bytes: Bytes) -> Result<()> {
        self.put_log.lock().push(key.to_string());

        if let Some(fragment) = self.fail_puts_containing.lock().as_deref() {
            if key.contains(fragment) {
                return Err(Error::storage_write(key, "injected put failure"));
            }
        }

        self.objects.lock().insert(
            key.to_string(),
            StoredObject {
                content_type: content_type.to_string(),
                bytes,
            },
        );
        Ok(())
    }

    async fn delete(&self, key: &str) -> Result<()> {
        self.delete_log.lock().push(key.to_string());

        if let Some(fragment) = self.fail_deletes_containing.lock().as_deref() {
            if key.contains(fragment) {
                return Err(Error::storage_delete(key, "injected delete failure"));
            }
        }

        // Removing an absent key is not an error.
        self.objects.lock().remove(key);
        Ok(())
    }
}
