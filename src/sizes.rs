//! Size table: which named sizes to generate for which mime type
//!
//! A table maps a mime string (or the `"*"` wildcard) to an ordered list
//! of named maximum side lengths. Resolution is exact mime first, then
//! wildcard, then nothing; there is no partial matching on subtype.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::error::ProcessError;

/// Wildcard mime key matching any mime without an exact entry
pub const WILDCARD_MIME: &str = "*";

/// A named target size: derivatives keep their aspect ratio and their
/// larger dimension never exceeds `max_side`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ImageSize {
    pub name: String,
    pub max_side: u32,
}

impl ImageSize {
    pub fn new(name: impl Into<String>, max_side: u32) -> Self {
        Self {
            name: name.into(),
            max_side,
        }
    }
}

/// Ordered size lists keyed by mime type
///
/// List order is preserved: versions in the returned metadata follow the
/// order sizes were inserted with, not their magnitude.
#[derive(Debug, Clone, Default, Serialize)]
pub struct SizeTable {
    entries: HashMap<String, Vec<ImageSize>>,
}

// Deserialization funnels through `insert` so configuration files cannot
// smuggle in tables that construction would reject
impl<'de> Deserialize<'de> for SizeTable {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        #[derive(Deserialize)]
        struct RawSizeTable {
            entries: HashMap<String, Vec<ImageSize>>,
        }

        let raw = RawSizeTable::deserialize(deserializer)?;
        let mut table = SizeTable::empty();
        for (mime, sizes) in raw.entries {
            table = table.insert(mime, sizes).map_err(serde::de::Error::custom)?;
        }
        Ok(table)
    }
}

impl SizeTable {
    /// Empty table: no derivatives for any mime
    pub fn empty() -> Self {
        Self::default()
    }

    /// Register the size list for a mime type (or [`WILDCARD_MIME`])
    ///
    /// Rejects zero `max_side`, empty size names, and duplicate size names
    /// within the same mime.
    pub fn insert(
        mut self,
        mime: impl Into<String>,
        sizes: Vec<ImageSize>,
    ) -> Result<Self, ProcessError> {
        let mime = mime.into();

        for (i, size) in sizes.iter().enumerate() {
            if size.name.is_empty() {
                return Err(ProcessError::size_configuration(format!(
                    "size at index {} for mime `{}` has an empty name",
                    i, mime
                )));
            }
            if size.max_side == 0 {
                return Err(ProcessError::size_configuration(format!(
                    "size `{}` for mime `{}` has max_side 0",
                    size.name, mime
                )));
            }
            if sizes[..i].iter().any(|other| other.name == size.name) {
                return Err(ProcessError::size_configuration(format!(
                    "duplicate size name `{}` for mime `{}`",
                    size.name, mime
                )));
            }
        }

        self.entries.insert(mime, sizes);
        Ok(self)
    }

    /// Sizes to generate for `mime`: exact entry, else wildcard, else none
    pub fn resolve(&self, mime: &str) -> &[ImageSize] {
        if let Some(sizes) = self.entries.get(mime) {
            return sizes;
        }
        if let Some(sizes) = self.entries.get(WILDCARD_MIME) {
            return sizes;
        }
        &[]
    }

    /// Default table: medium/thumbnail for everything, smaller targets for
    /// GIFs (every frame of an animation gets resized, so GIF derivatives
    /// are kept small)
    pub fn standard() -> Self {
        let mut entries = HashMap::new();
        entries.insert(
            WILDCARD_MIME.to_string(),
            vec![ImageSize::new("medium", 1200), ImageSize::new("thumbnail", 200)],
        );
        entries.insert(
            "image/gif".to_string(),
            vec![ImageSize::new("medium", 200), ImageSize::new("thumbnail", 120)],
        );
        Self { entries }
    }
}
