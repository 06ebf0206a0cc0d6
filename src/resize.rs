//! Decoding and proportional resizing
//!
//! Decoding goes through the `image` crate; pixel work goes through
//! `fast_image_resize` with a Lanczos3 filter over RGBA buffers, so alpha
//! channels survive resizing. Animated GIFs are decoded into their full
//! frame list and every frame is resized to the same target dimensions,
//! keeping per-frame delays and frame order.

use std::fmt;
use std::io::Cursor;
use std::num::NonZeroU32;

use image::codecs::gif::GifDecoder;
use image::io::Reader as ImageReader;
use image::{AnimationDecoder, DynamicImage, Frame, ImageFormat, RgbaImage};

use crate::error::ProcessError;

/// A decoded original or derivative, static or animated
#[derive(Clone)]
pub struct DecodedImage {
    /// The image pixels (first frame for animated inputs)
    pub image: DynamicImage,
    /// All frames, present only for GIF inputs
    pub frames: Option<Vec<Frame>>,
    /// Detected container format
    pub format: ImageFormat,
}

impl DecodedImage {
    pub fn width(&self) -> u32 {
        self.image.width()
    }

    pub fn height(&self) -> u32 {
        self.image.height()
    }

    pub fn frame_count(&self) -> usize {
        self.frames.as_ref().map_or(1, Vec::len)
    }

    pub fn is_animated(&self) -> bool {
        self.frame_count() > 1
    }
}

// Manual impl: `image::Frame` has no `Debug`, and dumping frame buffers
// would be useless anyway
impl fmt::Debug for DecodedImage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DecodedImage")
            .field("width", &self.width())
            .field("height", &self.height())
            .field("frames", &self.frame_count())
            .field("format", &self.format)
            .finish()
    }
}

/// Decode raw bytes into a [`DecodedImage`]
///
/// GIFs keep their full frame list; JPEG inputs are rotated upright
/// according to their EXIF orientation before anything else looks at the
/// dimensions.
pub fn decode(data: &[u8]) -> Result<DecodedImage, ProcessError> {
    let format = image::guess_format(data).map_err(|e| ProcessError::invalid_image(e.to_string()))?;

    if format == ImageFormat::Gif {
        let decoder =
            GifDecoder::new(Cursor::new(data)).map_err(|e| ProcessError::invalid_image(e.to_string()))?;
        let frames = decoder
            .into_frames()
            .collect_frames()
            .map_err(|e| ProcessError::invalid_image(e.to_string()))?;
        let first = frames
            .first()
            .ok_or_else(|| ProcessError::invalid_image("GIF contains no frames"))?;

        return Ok(DecodedImage {
            image: DynamicImage::ImageRgba8(first.buffer().clone()),
            frames: Some(frames),
            format,
        });
    }

    let image = ImageReader::with_format(Cursor::new(data), format)
        .decode()
        .map_err(|e| ProcessError::invalid_image(e.to_string()))?;

    Ok(DecodedImage {
        image: apply_exif_orientation(image, data),
        frames: None,
        format,
    })
}

/// Rotate `image` upright per its EXIF orientation tag
///
/// Only the plain rotations (3, 6, 8) are handled; mirrored orientations
/// and images without EXIF data pass through untouched.
fn apply_exif_orientation(image: DynamicImage, data: &[u8]) -> DynamicImage {
    let exif = match exif::Reader::new().read_from_container(&mut Cursor::new(data)) {
        Ok(exif) => exif,
        Err(_) => return image,
    };

    let orientation = exif
        .get_field(exif::Tag::Orientation, exif::In::PRIMARY)
        .and_then(|field| field.value.get_uint(0));

    match orientation {
        Some(3) => image.rotate180(),
        Some(6) => image.rotate90(),
        Some(8) => image.rotate270(),
        _ => image,
    }
}

/// Proportionally fit `(width, height)` so the larger side equals
/// `max_side`
///
/// Originals whose larger side is already within `max_side` pass through
/// unchanged; this library never upscales. The scaled side is rounded to
/// the nearest integer and both results are at least 1.
pub fn fit_to_max_side(width: u32, height: u32, max_side: u32) -> (u32, u32) {
    // Size tables reject max_side 0, but this function is public API
    let max_side = max_side.max(1);

    if width.max(height) <= max_side {
        return (width, height);
    }

    if width >= height {
        let other = f64::from(height) * f64::from(max_side) / f64::from(width);
        (max_side, (other.round() as u32).max(1))
    } else {
        let other = f64::from(width) * f64::from(max_side) / f64::from(height);
        ((other.round() as u32).max(1), max_side)
    }
}

/// Resize `src` so its larger side is at most `max_side`
///
/// Static images resize their single buffer; animated images resize every
/// frame to the same dimensions, preserving delays. Pass-through inputs
/// are returned as cheap clones.
pub fn resize_to_max_side(src: &DecodedImage, max_side: u32) -> Result<DecodedImage, ProcessError> {
    let (target_w, target_h) = fit_to_max_side(src.width(), src.height(), max_side);
    if (target_w, target_h) == (src.width(), src.height()) {
        return Ok(src.clone());
    }

    match &src.frames {
        Some(frames) => {
            let resized = frames
                .iter()
                .map(|frame| {
                    let buffer = resize_rgba(frame.buffer(), target_w, target_h)?;
                    Ok(Frame::from_parts(buffer, 0, 0, frame.delay()))
                })
                .collect::<Result<Vec<_>, ProcessError>>()?;
            let first = resized[0].buffer().clone();

            Ok(DecodedImage {
                image: DynamicImage::ImageRgba8(first),
                frames: Some(resized),
                format: src.format,
            })
        }
        None => {
            let buffer = resize_rgba(&src.image.to_rgba8(), target_w, target_h)?;
            Ok(DecodedImage {
                image: DynamicImage::ImageRgba8(buffer),
                frames: None,
                format: src.format,
            })
        }
    }
}

/// Lanczos3 resize of one RGBA buffer
fn resize_rgba(src: &RgbaImage, target_w: u32, target_h: u32) -> Result<RgbaImage, ProcessError> {
    use fast_image_resize::{FilterType, Image, PixelType, ResizeAlg, Resizer};

    let src_width = NonZeroU32::new(src.width())
        .ok_or_else(|| ProcessError::resize("source width is 0"))?;
    let src_height = NonZeroU32::new(src.height())
        .ok_or_else(|| ProcessError::resize("source height is 0"))?;
    let dst_width =
        NonZeroU32::new(target_w).ok_or_else(|| ProcessError::resize("target width is 0"))?;
    let dst_height =
        NonZeroU32::new(target_h).ok_or_else(|| ProcessError::resize("target height is 0"))?;

    let src_image = Image::from_vec_u8(src_width, src_height, src.as_raw().clone(), PixelType::U8x4)
        .map_err(|e| ProcessError::resize(format!("source buffer rejected: {:?}", e)))?;
    let mut dst_image = Image::new(dst_width, dst_height, PixelType::U8x4);

    let mut resizer = Resizer::new(ResizeAlg::Convolution(FilterType::Lanczos3));
    resizer
        .resize(&src_image.view(), &mut dst_image.view_mut())
        .map_err(|e| ProcessError::resize(format!("resize operation failed: {:?}", e)))?;

    RgbaImage::from_raw(target_w, target_h, dst_image.into_vec())
        .ok_or_else(|| ProcessError::resize("output buffer has unexpected length"))
}
