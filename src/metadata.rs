//! Image metadata model
//!
//! Transient records describing one processed original and the versions
//! generated for it. Nothing here is persisted by the library; callers
//! store what they need.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::sizes::ImageSize;

/// Fresh collision-resistant version id (hyphen-less UUID v4)
///
/// Ids are random rather than sequential so derivative file names never
/// collide across concurrent processing calls.
pub fn new_version_id() -> String {
    Uuid::new_v4().simple().to_string()
}

/// One generated derivative of an original image
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ImageVersion {
    /// Name of the size this version was generated for
    pub size_name: String,
    /// Unique id minted for this processing call
    pub id: String,
    /// Configured maximum side length
    pub max_side: u32,
    /// Store path of the derivative: `{size_name}-{id}{extension}`
    pub file_name: String,
}

impl ImageVersion {
    /// Mint a version for `size`, deriving the file name from a fresh id
    /// and the output `extension` (dot included, e.g. `.jpg`)
    pub fn mint(size: &ImageSize, extension: &str) -> Self {
        let id = new_version_id();
        let file_name = format!("{}-{}{}", size.name, id, extension);
        Self {
            size_name: size.name.clone(),
            id,
            max_side: size.max_side,
            file_name,
        }
    }
}

/// Metadata of a processed original and its generated versions
///
/// `width`/`height` are the original's dimensions; `versions` follows the
/// order of the matched size list.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ImageMetadata {
    pub width: u32,
    pub height: u32,
    pub extension: String,
    pub mime: String,
    pub versions: Vec<ImageVersion>,
}

impl ImageMetadata {
    /// Aspect ratio of the original (width over height)
    pub fn ratio(&self) -> f64 {
        f64::from(self.width) / f64::from(self.height)
    }
}
