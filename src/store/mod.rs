//! Storage abstraction
//!
//! Defines the `Store` and `BlockingStore` traits that storage backends
//! must satisfy. The library never persists anything itself: originals are
//! read and derivatives written through whichever implementation the
//! caller supplies (filesystem, object storage, in-memory, ...).
//!
//! A backend may implement either trait or both; the processor exposes
//! `process` for blocking stores and `process_async` for async ones.

use async_trait::async_trait;
use bytes::Bytes;
use thiserror::Error;

pub mod fs;
pub mod memory;

pub use fs::{BlockingFsStore, FsStore};
pub use memory::MemoryStore;

/// Errors raised by store implementations
#[derive(Error, Debug)]
pub enum StoreError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Backend-specific failure (connection refused, quota exceeded, ...)
    #[error("storage backend error: {0}")]
    Backend(String),
}

impl StoreError {
    pub fn backend(message: impl Into<String>) -> Self {
        StoreError::Backend(message.into())
    }
}

/// Asynchronous store capability
///
/// Reads resolve missing paths as `Ok(None)` rather than an error, so
/// implementations can reserve `StoreError` for genuine backend failures.
#[async_trait]
pub trait Store: Send + Sync {
    /// Read the full contents at `path`, or `None` if nothing is stored there
    async fn read(&self, path: &str) -> Result<Option<Bytes>, StoreError>;

    /// Write `data` at `path`, overwriting any existing contents
    async fn write(&self, path: &str, data: Bytes) -> Result<(), StoreError>;

    /// Delete the contents at `path`; deleting a missing path is not an error
    async fn delete(&self, path: &str) -> Result<(), StoreError>;
}

/// Blocking store capability, mirroring [`Store`]
pub trait BlockingStore: Send + Sync {
    /// Read the full contents at `path`, or `None` if nothing is stored there
    fn read(&self, path: &str) -> Result<Option<Bytes>, StoreError>;

    /// Write `data` at `path`, overwriting any existing contents
    fn write(&self, path: &str, data: Bytes) -> Result<(), StoreError>;

    /// Delete the contents at `path`; deleting a missing path is not an error
    fn delete(&self, path: &str) -> Result<(), StoreError>;
}
