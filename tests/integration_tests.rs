//! End-to-end tests: real encoded images through real stores

use std::io::Cursor;

use bytes::Bytes;
use image::codecs::gif::{GifDecoder, GifEncoder, Repeat};
use image::{AnimationDecoder, Delay, DynamicImage, Frame, ImageFormat, RgbaImage};
use tempfile::TempDir;

use thumbsmith::store::{BlockingFsStore, BlockingStore, FsStore, MemoryStore, Store};
use thumbsmith::{ImageSize, ProcessError, Processor, SizeTable, WILDCARD_MIME};

fn encode_rgba(img: RgbaImage, format: ImageFormat) -> Bytes {
    let mut buffer = Cursor::new(Vec::new());
    DynamicImage::ImageRgba8(img)
        .write_to(&mut buffer, format)
        .unwrap();
    Bytes::from(buffer.into_inner())
}

fn gradient_jpeg(width: u32, height: u32) -> Bytes {
    let img = RgbaImage::from_fn(width, height, |x, y| {
        image::Rgba([(x % 256) as u8, (y % 256) as u8, 99, 255])
    });
    encode_rgba(img, ImageFormat::Jpeg)
}

fn transparent_png(width: u32, height: u32) -> Bytes {
    // Left half fully transparent, right half opaque
    let img = RgbaImage::from_fn(width, height, |x, _| {
        image::Rgba([200, 50, 50, if x < width / 2 { 0 } else { 255 }])
    });
    encode_rgba(img, ImageFormat::Png)
}

fn animated_gif(width: u32, height: u32, frame_count: u32) -> Bytes {
    let mut out = Vec::new();
    {
        let mut encoder = GifEncoder::new(&mut out);
        encoder.set_repeat(Repeat::Infinite).unwrap();
        for i in 0..frame_count {
            let shade = (i * 40 % 256) as u8;
            let buffer = RgbaImage::from_pixel(width, height, image::Rgba([shade, 0, 255, 255]));
            let frame = Frame::from_parts(buffer, 0, 0, Delay::from_numer_denom_ms(100, 1));
            encoder.encode_frame(frame).unwrap();
        }
    }
    Bytes::from(out)
}

/// JPEG with an APP1 EXIF segment carrying just an orientation tag
fn jpeg_with_orientation(width: u32, height: u32, orientation: u8) -> Bytes {
    let jpeg = gradient_jpeg(width, height);

    // Little-endian TIFF header + one-entry IFD (tag 0x0112, SHORT)
    let tiff: [u8; 26] = [
        0x49, 0x49, 0x2A, 0x00, 0x08, 0x00, 0x00, 0x00, // header, IFD at 8
        0x01, 0x00, // entry count
        0x12, 0x01, 0x03, 0x00, 0x01, 0x00, 0x00, 0x00, // orientation, SHORT, count 1
        orientation, 0x00, 0x00, 0x00, // value
        0x00, 0x00, 0x00, 0x00, // no next IFD
    ];

    let mut app1 = vec![0xFF, 0xE1];
    let payload_len = (2 + 6 + tiff.len()) as u16;
    app1.extend_from_slice(&payload_len.to_be_bytes());
    app1.extend_from_slice(b"Exif\0\0");
    app1.extend_from_slice(&tiff);

    let mut out = Vec::with_capacity(jpeg.len() + app1.len());
    out.extend_from_slice(&jpeg[..2]);
    out.extend_from_slice(&app1);
    out.extend_from_slice(&jpeg[2..]);
    Bytes::from(out)
}

fn abc_sizes(mime: &str) -> SizeTable {
    SizeTable::empty()
        .insert(
            mime,
            vec![
                ImageSize::new("a", 500),
                ImageSize::new("b", 400),
                ImageSize::new("c", 300),
            ],
        )
        .unwrap()
}

#[test]
fn jpeg_derivatives_match_configured_sizes() {
    let store = MemoryStore::new();
    BlockingStore::write(&store, "photo.jpg", gradient_jpeg(2520, 1418)).unwrap();

    let processor = Processor::new(store.clone()).with_sizes(abc_sizes("image/jpeg"));
    let metadata = processor.process("photo.jpg").unwrap();

    assert_eq!((metadata.width, metadata.height), (2520, 1418));
    assert_eq!(metadata.versions.len(), 3);

    let expected = [("a", 500, 281), ("b", 400, 225), ("c", 300, 169)];
    for (version, (name, w, h)) in metadata.versions.iter().zip(expected) {
        assert_eq!(version.size_name, name);
        assert_eq!(version.file_name, format!("{}-{}.jpg", name, version.id));

        let data = BlockingStore::read(&store, &version.file_name).unwrap().unwrap();
        let derivative = image::load_from_memory(&data).unwrap();
        assert_eq!((derivative.width(), derivative.height()), (w, h));
    }
}

#[test]
fn png_derivatives_keep_transparency() {
    let store = MemoryStore::new();
    BlockingStore::write(&store, "logo.png", transparent_png(600, 400)).unwrap();

    let sizes = SizeTable::empty()
        .insert("image/png", vec![ImageSize::new("thumbnail", 150)])
        .unwrap();
    let processor = Processor::new(store.clone()).with_sizes(sizes);

    let metadata = processor.process("logo.png").unwrap();
    assert_eq!(metadata.mime, "image/png");

    let data = BlockingStore::read(&store, &metadata.versions[0].file_name)
        .unwrap()
        .unwrap();
    let derivative = image::load_from_memory(&data).unwrap();
    assert_eq!((derivative.width(), derivative.height()), (150, 100));

    let rgba = derivative.to_rgba8();
    assert!(rgba.pixels().any(|p| p.0[3] < 16), "transparency was lost");
    assert!(rgba.pixels().any(|p| p.0[3] > 240), "opaque half was lost");
}

#[test]
fn animated_gif_keeps_its_frames() {
    let store = MemoryStore::new();
    BlockingStore::write(&store, "anim.gif", animated_gif(300, 200, 5)).unwrap();

    let sizes = SizeTable::empty()
        .insert("image/gif", vec![ImageSize::new("small", 120)])
        .unwrap();
    let processor = Processor::new(store.clone()).with_sizes(sizes);

    let metadata = processor.process("anim.gif").unwrap();
    assert_eq!(metadata.mime, "image/gif");
    assert_eq!(metadata.versions[0].file_name, format!("small-{}.gif", metadata.versions[0].id));

    let data = BlockingStore::read(&store, &metadata.versions[0].file_name)
        .unwrap()
        .unwrap();
    let decoder = GifDecoder::new(Cursor::new(&data[..])).unwrap();
    let frames = decoder.into_frames().collect_frames().unwrap();

    assert_eq!(frames.len(), 5, "animation lost frames");
    assert_eq!(frames[0].buffer().width(), 120);
    assert_eq!(frames[0].buffer().height(), 80);
}

#[test]
fn mpo_path_resolves_to_mpo_mime_and_jpeg_output() {
    // MPO containers carry JPEG data; the path extension picks the handler
    let store = MemoryStore::new();
    BlockingStore::write(&store, "stereo.mpo", gradient_jpeg(640, 480)).unwrap();

    let processor = Processor::new(store.clone()).with_sizes(abc_sizes("image/mpo"));
    let metadata = processor.process("stereo.mpo").unwrap();

    assert_eq!(metadata.mime, "image/mpo");
    assert_eq!(metadata.extension, ".jpg");
    assert_eq!(metadata.versions.len(), 3);
    for version in &metadata.versions {
        assert!(version.file_name.ends_with(".jpg"));
        let data = BlockingStore::read(&store, &version.file_name).unwrap().unwrap();
        assert_eq!(&data[0..2], &[0xFF, 0xD8]);
    }
}

#[test]
fn exif_rotated_jpeg_produces_upright_versions() {
    // Landscape pixels, orientation 6: the camera held the sensor sideways,
    // so the upright image is portrait
    let store = MemoryStore::new();
    BlockingStore::write(&store, "sideways.jpg", jpeg_with_orientation(600, 300, 6)).unwrap();

    let sizes = SizeTable::empty()
        .insert("image/jpeg", vec![ImageSize::new("small", 100)])
        .unwrap();
    let processor = Processor::new(store.clone()).with_sizes(sizes);

    let metadata = processor.process("sideways.jpg").unwrap();
    assert_eq!((metadata.width, metadata.height), (300, 600));

    let data = BlockingStore::read(&store, &metadata.versions[0].file_name)
        .unwrap()
        .unwrap();
    let derivative = image::load_from_memory(&data).unwrap();
    assert_eq!((derivative.width(), derivative.height()), (50, 100));
}

#[test]
fn small_original_passes_through_at_original_dimensions() {
    let store = MemoryStore::new();
    BlockingStore::write(&store, "tiny.jpg", gradient_jpeg(180, 120)).unwrap();

    let processor = Processor::new(store.clone()).with_sizes(abc_sizes("image/jpeg"));
    let metadata = processor.process("tiny.jpg").unwrap();

    // 180x120 is within every configured max_side: derivatives are still
    // produced, never upscaled
    assert_eq!(metadata.versions.len(), 3);
    for version in &metadata.versions {
        let data = BlockingStore::read(&store, &version.file_name).unwrap().unwrap();
        let derivative = image::load_from_memory(&data).unwrap();
        assert_eq!((derivative.width(), derivative.height()), (180, 120));
    }
}

#[test]
fn unknown_mime_without_wildcard_yields_metadata_only() {
    let store = MemoryStore::new();
    BlockingStore::write(&store, "logo.png", transparent_png(320, 200)).unwrap();

    let processor = Processor::new(store.clone()).with_sizes(abc_sizes("image/jpeg"));
    let metadata = processor.process("logo.png").unwrap();

    assert!(metadata.versions.is_empty());
    assert_eq!((metadata.width, metadata.height), (320, 200));
    assert_eq!(metadata.mime, "image/png");
    assert_eq!(store.file_count(), 1);
}

#[test]
fn wildcard_applies_to_unlisted_mimes() {
    let store = MemoryStore::new();
    BlockingStore::write(&store, "logo.png", transparent_png(640, 640)).unwrap();

    let sizes = SizeTable::empty()
        .insert(WILDCARD_MIME, vec![ImageSize::new("thumbnail", 64)])
        .unwrap();
    let processor = Processor::new(store.clone()).with_sizes(sizes);

    let metadata = processor.process("logo.png").unwrap();
    assert_eq!(metadata.versions.len(), 1);
    assert_eq!(metadata.versions[0].size_name, "thumbnail");
}

#[test]
fn missing_original_raises_not_found_and_writes_nothing() {
    let store = MemoryStore::new();
    let processor = Processor::new(store.clone());

    let err = processor.process("nowhere.jpg").unwrap_err();
    assert!(matches!(err, ProcessError::NotFound { .. }));
    assert_eq!(store.file_count(), 0);
}

#[tokio::test]
async fn async_processing_through_the_filesystem() {
    let dir = TempDir::new().unwrap();
    let store = FsStore::new(dir.path());
    store.write("in/photo.jpg", gradient_jpeg(1000, 500)).await.unwrap();

    let processor = Processor::new(FsStore::new(dir.path())).with_sizes(abc_sizes("image/jpeg"));
    let metadata = processor.process_async("in/photo.jpg").await.unwrap();

    assert_eq!(metadata.versions.len(), 3);
    for version in &metadata.versions {
        assert!(dir.path().join(&version.file_name).exists());
    }
}

#[test]
fn blocking_processing_through_the_filesystem() {
    let dir = TempDir::new().unwrap();
    let store = BlockingFsStore::new(dir.path());
    store.write("photo.jpg", gradient_jpeg(900, 300)).unwrap();

    let processor = Processor::new(BlockingFsStore::new(dir.path()))
        .with_sizes(abc_sizes("image/jpeg"));
    let metadata = processor.process("photo.jpg").unwrap();

    assert_eq!(metadata.versions.len(), 3);
    let first = image::load_from_memory(
        &store.read(&metadata.versions[0].file_name).unwrap().unwrap(),
    )
    .unwrap();
    assert_eq!((first.width(), first.height()), (500, 167));
}

#[tokio::test]
async fn async_and_blocking_agree_on_metadata_shape() {
    let store = MemoryStore::new();
    Store::write(&store, "pic.jpg", gradient_jpeg(800, 800)).await.unwrap();

    let processor = Processor::new(store.clone()).with_sizes(abc_sizes("image/jpeg"));

    let blocking = processor.process("pic.jpg").unwrap();
    let asynchronous = processor.process_async("pic.jpg").await.unwrap();

    assert_eq!(blocking.width, asynchronous.width);
    assert_eq!(blocking.height, asynchronous.height);
    assert_eq!(blocking.mime, asynchronous.mime);
    let names = |m: &thumbsmith::ImageMetadata| {
        m.versions.iter().map(|v| v.size_name.clone()).collect::<Vec<_>>()
    };
    assert_eq!(names(&blocking), names(&asynchronous));
    // ids differ per call even for the same original
    assert_ne!(blocking.versions[0].id, asynchronous.versions[0].id);
}
