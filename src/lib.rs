//! Thumbsmith: generate named resized versions of uploaded images
//!
//! Given an original image and a per-mime table of named target sizes,
//! the processor reads the original through a caller-supplied store,
//! computes proportionally scaled dimensions for each size, resizes and
//! re-encodes (alpha and GIF animation preserved), writes each derivative
//! back through the store under a `{size_name}-{id}{extension}` name and
//! returns the aggregated metadata.
//!
//! ```no_run
//! use thumbsmith::{Processor, SizeTable, ImageSize};
//! use thumbsmith::store::BlockingFsStore;
//!
//! # fn main() -> Result<(), thumbsmith::ProcessError> {
//! let sizes = SizeTable::empty().insert(
//!     "image/jpeg",
//!     vec![ImageSize::new("medium", 1200), ImageSize::new("thumbnail", 200)],
//! )?;
//!
//! let processor = Processor::new(BlockingFsStore::new("uploads")).with_sizes(sizes);
//! let metadata = processor.process("cat.jpg")?;
//!
//! for version in &metadata.versions {
//!     println!("{} -> {}", version.size_name, version.file_name);
//! }
//! # Ok(())
//! # }
//! ```

pub mod error;
pub mod formats;
pub mod metadata;
pub mod processor;
pub mod resize;
pub mod sizes;
pub mod store;

// Re-export commonly used types
pub use error::ProcessError;
pub use formats::{FormatRegistry, ImageFormat};
pub use metadata::{ImageMetadata, ImageVersion};
pub use processor::Processor;
pub use sizes::{ImageSize, SizeTable, WILDCARD_MIME};
pub use store::{BlockingStore, Store, StoreError};
