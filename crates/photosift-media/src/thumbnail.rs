//! JPEG thumbnail generation.

use std::io::Cursor;
use std::path::{Path, PathBuf};

use image::codecs::jpeg::JpegEncoder;
use image::imageops::FilterType;
use image::DynamicImage;
use tokio_util::sync::CancellationToken;

use photosift_core::ThumbnailOptions;

/// Render a JPEG thumbnail for an image file.
///
/// Sources already inside the bounding box keep their dimensions; a
/// thumbnail is never an upscale. Missing or undecodable sources yield
/// `None`.
pub(crate) async fn generate(
    path: &Path,
    options: ThumbnailOptions,
    cancel: &CancellationToken,
) -> Option<Vec<u8>> {
    if cancel.is_cancelled() {
        return None;
    }

    let path: PathBuf = path.to_owned();
    tokio::task::spawn_blocking(move || generate_blocking(&path, options))
        .await
        .ok()
        .flatten()
}

fn generate_blocking(path: &Path, options: ThumbnailOptions) -> Option<Vec<u8>> {
    let source = image::open(path).ok()?;
    let resized = resize_to_fit(source, &options);

    let mut out = Cursor::new(Vec::new());
    let mut encoder = JpegEncoder::new_with_quality(&mut out, options.quality);
    encoder.encode_image(&resized.to_rgb8()).ok()?;
    Some(out.into_inner())
}

fn resize_to_fit(source: DynamicImage, options: &ThumbnailOptions) -> DynamicImage {
    let (width, height) = (source.width(), source.height());
    if width <= options.max_width && height <= options.max_height {
        return source;
    }

    if options.preserve_aspect_ratio {
        source.resize(options.max_width, options.max_height, FilterType::Triangle)
    } else {
        source.resize_exact(options.max_width, options.max_height, FilterType::Triangle)
    }
}
