//! Processing orchestration
//!
//! `Processor` ties the pieces together: read the original through the
//! store, decode it, resolve the applicable sizes, resize and re-encode
//! one derivative per size, write each derivative back through the store
//! and return the aggregated metadata.
//!
//! One planning core drives both execution modes. `process` runs against a
//! [`BlockingStore`]; `process_async` runs against a [`Store`] and issues
//! the derivative writes concurrently. In both modes either every
//! derivative lands or the call fails; derivatives already written before
//! a failure are NOT rolled back — cleanup is the caller's responsibility.

use bytes::Bytes;

use crate::error::ProcessError;
use crate::formats::FormatRegistry;
use crate::metadata::{ImageMetadata, ImageVersion};
use crate::resize;
use crate::sizes::SizeTable;
use crate::store::{BlockingStore, Store};

/// One derivative ready to be written
struct Derivative {
    file_name: String,
    data: Bytes,
}

/// Outcome of the planning core: metadata plus the encoded derivatives
struct Plan {
    metadata: ImageMetadata,
    derivatives: Vec<Derivative>,
}

/// Generates resized versions of stored images
///
/// The store is supplied at construction; sizes and formats default to
/// [`SizeTable::standard`] and [`FormatRegistry::default`] and can be
/// replaced builder-style. Each processing call is independent and holds
/// no state afterwards.
pub struct Processor<S> {
    store: S,
    sizes: SizeTable,
    formats: FormatRegistry,
}

impl<S> Processor<S> {
    pub fn new(store: S) -> Self {
        Self {
            store,
            sizes: SizeTable::standard(),
            formats: FormatRegistry::default(),
        }
    }

    pub fn with_sizes(mut self, sizes: SizeTable) -> Self {
        self.sizes = sizes;
        self
    }

    pub fn with_formats(mut self, formats: FormatRegistry) -> Self {
        self.formats = formats;
        self
    }

    /// Shared core: everything between reading the original and writing
    /// the derivatives. Pure CPU work, no store I/O.
    fn plan(&self, path: &str, data: &[u8]) -> Result<Plan, ProcessError> {
        let decoded = resize::decode(data)?;

        // The path extension drives the handler choice so containers that
        // share a signature (JPEG vs MPO) resolve correctly; content
        // detection covers extension-less paths.
        let handler = self
            .formats
            .by_path(path)
            .or_else(|| self.formats.by_container(decoded.format))
            .ok_or_else(|| ProcessError::unsupported_format(format!("{:?}", decoded.format)))?;

        let sizes = self.sizes.resolve(&handler.mime);
        tracing::debug!(
            path,
            mime = %handler.mime,
            width = decoded.width(),
            height = decoded.height(),
            sizes = sizes.len(),
            "planning image versions"
        );

        let mut versions = Vec::with_capacity(sizes.len());
        let mut derivatives = Vec::with_capacity(sizes.len());
        for size in sizes {
            let resized = resize::resize_to_max_side(&decoded, size.max_side)?;
            let encoded = handler.encode(&resized)?;
            let version = ImageVersion::mint(size, &handler.extension);
            derivatives.push(Derivative {
                file_name: version.file_name.clone(),
                data: Bytes::from(encoded),
            });
            versions.push(version);
        }

        Ok(Plan {
            metadata: ImageMetadata {
                width: decoded.width(),
                height: decoded.height(),
                extension: handler.extension.clone(),
                mime: handler.mime.clone(),
                versions,
            },
            derivatives,
        })
    }
}

impl<S: BlockingStore> Processor<S> {
    /// Process `path` with blocking store calls
    ///
    /// Reads the original, generates one derivative per resolved size and
    /// writes them sequentially. Returns the aggregated metadata, versions
    /// in size table order.
    pub fn process(&self, path: &str) -> Result<ImageMetadata, ProcessError> {
        let data = self
            .store
            .read(path)?
            .ok_or_else(|| ProcessError::not_found(path))?;

        let plan = self.plan(path, &data)?;
        for derivative in &plan.derivatives {
            self.store.write(&derivative.file_name, derivative.data.clone())?;
        }

        tracing::info!(path, versions = plan.metadata.versions.len(), "processed image");
        Ok(plan.metadata)
    }
}

impl<S: Store> Processor<S> {
    /// Process `path` with awaited store calls
    ///
    /// Same algorithm as [`Processor::process`]; the store read and the
    /// derivative writes are the only suspension points. Writes are issued
    /// concurrently and must all succeed. Version order in the returned
    /// metadata follows the size table, never write completion order.
    pub async fn process_async(&self, path: &str) -> Result<ImageMetadata, ProcessError> {
        let data = self
            .store
            .read(path)
            .await?
            .ok_or_else(|| ProcessError::not_found(path))?;

        let plan = self.plan(path, &data)?;
        let writes = plan
            .derivatives
            .iter()
            .map(|derivative| self.store.write(&derivative.file_name, derivative.data.clone()));
        futures::future::try_join_all(writes).await?;

        tracing::info!(path, versions = plan.metadata.versions.len(), "processed image");
        Ok(plan.metadata)
    }
}
