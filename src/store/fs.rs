//! Filesystem stores
//!
//! `FsStore` uses `tokio::fs`; `BlockingFsStore` is the `std::fs` mirror.
//! Both are rooted at a directory and resolve every path relative to it.
//! Writes are atomic (temp file then rename) so a crashed process never
//! leaves a half-written derivative behind.

use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use async_trait::async_trait;
use bytes::Bytes;

use super::{BlockingStore, Store, StoreError};

// Appends rather than replaces the extension: `photo.jpg` and `photo.png`
// written concurrently must not share a temp file
fn temp_path(path: &Path) -> PathBuf {
    let mut name = path.as_os_str().to_os_string();
    name.push(".tmp");
    PathBuf::from(name)
}

/// Async filesystem store rooted at a directory
pub struct FsStore {
    root: PathBuf,
}

impl FsStore {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    fn full_path(&self, path: &str) -> PathBuf {
        self.root.join(path)
    }
}

#[async_trait]
impl Store for FsStore {
    async fn read(&self, path: &str) -> Result<Option<Bytes>, StoreError> {
        match tokio::fs::read(self.full_path(path)).await {
            Ok(data) => Ok(Some(Bytes::from(data))),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    async fn write(&self, path: &str, data: Bytes) -> Result<(), StoreError> {
        let target = self.full_path(path);
        if let Some(parent) = target.parent() {
            tokio::fs::create_dir_all(parent).await?;
        }

        let temp = temp_path(&target);
        tokio::fs::write(&temp, &data).await?;
        tokio::fs::rename(&temp, &target).await?;
        Ok(())
    }

    async fn delete(&self, path: &str) -> Result<(), StoreError> {
        match tokio::fs::remove_file(self.full_path(path)).await {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e.into()),
        }
    }
}

/// Blocking filesystem store rooted at a directory
pub struct BlockingFsStore {
    root: PathBuf,
}

impl BlockingFsStore {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    fn full_path(&self, path: &str) -> PathBuf {
        self.root.join(path)
    }
}

impl BlockingStore for BlockingFsStore {
    fn read(&self, path: &str) -> Result<Option<Bytes>, StoreError> {
        match std::fs::read(self.full_path(path)) {
            Ok(data) => Ok(Some(Bytes::from(data))),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    fn write(&self, path: &str, data: Bytes) -> Result<(), StoreError> {
        let target = self.full_path(path);
        if let Some(parent) = target.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let temp = temp_path(&target);
        std::fs::write(&temp, &data)?;
        std::fs::rename(&temp, &target)?;
        Ok(())
    }

    fn delete(&self, path: &str) -> Result<(), StoreError> {
        match std::fs::remove_file(self.full_path(path)) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e.into()),
        }
    }
}
