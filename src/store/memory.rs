//! In-memory store (HashMap-backed)
//!
//! Implements both store traits, which makes it the reference backend for
//! tests and small tools. Supports write failure injection so callers can
//! exercise mid-sequence failure handling.

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use bytes::Bytes;
use parking_lot::RwLock;

use super::{BlockingStore, Store, StoreError};

/// In-memory store keeping all contents in a shared HashMap
#[derive(Clone, Default)]
pub struct MemoryStore {
    files: Arc<RwLock<HashMap<String, Bytes>>>,
    fail_writes: Arc<RwLock<bool>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Make every subsequent write fail with a backend error
    pub fn set_fail_writes(&self, enabled: bool) {
        *self.fail_writes.write() = enabled;
    }

    /// Number of stored files
    pub fn file_count(&self) -> usize {
        self.files.read().len()
    }

    /// Whether `path` currently holds contents
    pub fn contains(&self, path: &str) -> bool {
        self.files.read().contains_key(path)
    }

    /// Paths of all stored files, unordered
    pub fn paths(&self) -> Vec<String> {
        self.files.read().keys().cloned().collect()
    }

    /// Remove all stored files
    pub fn clear(&self) {
        self.files.write().clear();
    }

    fn read_inner(&self, path: &str) -> Option<Bytes> {
        self.files.read().get(path).cloned()
    }

    fn write_inner(&self, path: &str, data: Bytes) -> Result<(), StoreError> {
        if *self.fail_writes.read() {
            return Err(StoreError::backend("simulated write failure"));
        }
        self.files.write().insert(path.to_string(), data);
        Ok(())
    }

    fn delete_inner(&self, path: &str) {
        self.files.write().remove(path);
    }
}

#[async_trait]
impl Store for MemoryStore {
    async fn read(&self, path: &str) -> Result<Option<Bytes>, StoreError> {
        Ok(self.read_inner(path))
    }

    async fn write(&self, path: &str, data: Bytes) -> Result<(), StoreError> {
        self.write_inner(path, data)
    }

    async fn delete(&self, path: &str) -> Result<(), StoreError> {
        self.delete_inner(path);
        Ok(())
    }
}

impl BlockingStore for MemoryStore {
    fn read(&self, path: &str) -> Result<Option<Bytes>, StoreError> {
        Ok(self.read_inner(path))
    }

    fn write(&self, path: &str, data: Bytes) -> Result<(), StoreError> {
        self.write_inner(path, data)
    }

    fn delete(&self, path: &str) -> Result<(), StoreError> {
        self.delete_inner(path);
        Ok(())
    }
}
