//! Format handlers and registry
//!
//! A handler ties a mime type to the container it decodes from, the
//! container it re-encodes to, the output file extension and an encode
//! quality. The built-in set covers JPEG, PJPEG, PNG, GIF and MPO; callers
//! register additional handlers on the registry.
//!
//! MPO is the odd one out: the container carries JPEG data, so it is
//! recognized by its `.mpo` path extension and re-encoded as plain JPEG.

use image::codecs::gif::{GifEncoder, Repeat};
use image::codecs::jpeg::JpegEncoder;
use image::Frame;
use image::ImageFormat as ContainerFormat;
use std::io::Cursor;
use std::path::Path;

use crate::error::ProcessError;
use crate::resize::DecodedImage;

const JPEG_QUALITY: u8 = 80;

/// How one image format is recognized and re-encoded
#[derive(Debug, Clone)]
pub struct ImageFormat {
    /// Mime type this handler answers for
    pub mime: String,
    /// Output file extension, dot included
    pub extension: String,
    /// Path extensions recognized as this format, dot included, lowercase
    pub input_extensions: Vec<String>,
    /// Container the decoder reports for this format
    pub container: ContainerFormat,
    /// Container derivatives are encoded to
    pub encode_as: ContainerFormat,
    /// Encode quality for lossy targets, `None` for the encoder default
    pub quality: Option<u8>,
}

impl ImageFormat {
    /// Handler for a format that re-encodes to its own container
    pub fn new(
        mime: impl Into<String>,
        extension: impl Into<String>,
        input_extensions: Vec<String>,
        container: ContainerFormat,
        quality: Option<u8>,
    ) -> Self {
        Self {
            mime: mime.into(),
            extension: extension.into(),
            input_extensions,
            container,
            encode_as: container,
            quality,
        }
    }

    pub fn jpeg() -> Self {
        Self::new(
            "image/jpeg",
            ".jpg",
            vec![".jpg".to_string(), ".jpeg".to_string()],
            ContainerFormat::Jpeg,
            Some(JPEG_QUALITY),
        )
    }

    pub fn pjpeg() -> Self {
        Self::new(
            "image/pjpeg",
            ".jpg",
            vec![],
            ContainerFormat::Jpeg,
            Some(JPEG_QUALITY),
        )
    }

    pub fn png() -> Self {
        Self::new(
            "image/png",
            ".png",
            vec![".png".to_string()],
            ContainerFormat::Png,
            None,
        )
    }

    pub fn gif() -> Self {
        Self::new(
            "image/gif",
            ".gif",
            vec![".gif".to_string()],
            ContainerFormat::Gif,
            None,
        )
    }

    /// Multi-picture JPEG container; derivatives come out as plain JPEG
    pub fn mpo() -> Self {
        Self {
            mime: "image/mpo".to_string(),
            extension: ".jpg".to_string(),
            input_extensions: vec![".mpo".to_string()],
            container: ContainerFormat::Jpeg,
            encode_as: ContainerFormat::Jpeg,
            quality: Some(JPEG_QUALITY),
        }
    }

    /// Encode a resized image to this handler's output container
    ///
    /// PNG keeps the RGBA buffer, so transparency survives. GIF encodes
    /// every frame with its delay and loops forever, so animations stay
    /// animated.
    pub fn encode(&self, image: &DecodedImage) -> Result<Vec<u8>, ProcessError> {
        match self.encode_as {
            ContainerFormat::Jpeg => {
                let mut out = Vec::new();
                let mut encoder =
                    JpegEncoder::new_with_quality(&mut out, self.quality.unwrap_or(JPEG_QUALITY));
                encoder
                    .encode_image(&image.image.to_rgb8())
                    .map_err(|e| ProcessError::encode("jpeg", e.to_string()))?;
                Ok(out)
            }
            ContainerFormat::Png => {
                let mut out = Cursor::new(Vec::new());
                image
                    .image
                    .write_to(&mut out, ContainerFormat::Png)
                    .map_err(|e| ProcessError::encode("png", e.to_string()))?;
                Ok(out.into_inner())
            }
            ContainerFormat::Gif => {
                let mut out = Vec::new();
                {
                    let mut encoder = GifEncoder::new(&mut out);
                    encoder
                        .set_repeat(Repeat::Infinite)
                        .map_err(|e| ProcessError::encode("gif", e.to_string()))?;
                    match &image.frames {
                        Some(frames) => encoder
                            .encode_frames(frames.iter().cloned())
                            .map_err(|e| ProcessError::encode("gif", e.to_string()))?,
                        None => encoder
                            .encode_frames(std::iter::once(Frame::new(image.image.to_rgba8())))
                            .map_err(|e| ProcessError::encode("gif", e.to_string()))?,
                    }
                }
                Ok(out)
            }
            other => Err(ProcessError::encode(
                format!("{:?}", other),
                "no encoder registered for this container",
            )),
        }
    }
}

/// Ordered collection of format handlers
///
/// Lookups return the first match, so earlier registrations win.
#[derive(Debug, Clone)]
pub struct FormatRegistry {
    formats: Vec<ImageFormat>,
}

impl Default for FormatRegistry {
    fn default() -> Self {
        Self {
            formats: vec![
                ImageFormat::jpeg(),
                ImageFormat::pjpeg(),
                ImageFormat::png(),
                ImageFormat::gif(),
                ImageFormat::mpo(),
            ],
        }
    }
}

impl FormatRegistry {
    /// Registry with no handlers at all
    pub fn empty() -> Self {
        Self { formats: vec![] }
    }

    /// Add a handler; it participates in all subsequent lookups
    pub fn register(&mut self, format: ImageFormat) {
        self.formats.push(format);
    }

    pub fn by_mime(&self, mime: &str) -> Option<&ImageFormat> {
        self.formats.iter().find(|f| f.mime == mime)
    }

    /// Match a handler by the source path's extension (case-insensitive)
    pub fn by_path(&self, path: &str) -> Option<&ImageFormat> {
        let extension = Path::new(path)
            .extension()
            .and_then(|e| e.to_str())
            .map(|e| format!(".{}", e.to_lowercase()))?;
        self.formats
            .iter()
            .find(|f| f.input_extensions.iter().any(|known| *known == extension))
    }

    /// Match a handler by the container the decoder detected
    pub fn by_container(&self, container: ContainerFormat) -> Option<&ImageFormat> {
        self.formats.iter().find(|f| f.container == container)
    }
}
