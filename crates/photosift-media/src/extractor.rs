//! Public extraction facade.

use std::path::Path;

use tokio_util::sync::CancellationToken;

use photosift_core::{ImageMetadata, ThumbnailOptions};

use crate::{metadata, thumbnail};

/// Extracts dimensions, EXIF metadata, and thumbnails from image files.
///
/// All operations are read-only with respect to the source file.
#[derive(Debug, Clone, Copy, Default)]
pub struct MetadataExtractor;

impl MetadataExtractor {
    /// Create a new extractor.
    pub fn new() -> Self {
        Self
    }

    /// Extract dimensions and EXIF fields from an image.
    pub async fn extract(&self, path: &Path, cancel: &CancellationToken) -> ImageMetadata {
        metadata::extract(path, cancel).await
    }

    /// Generate a JPEG thumbnail, or `None` when the source cannot be
    /// decoded or the operation is cancelled.
    pub async fn generate_thumbnail(
        &self,
        path: &Path,
        options: ThumbnailOptions,
        cancel: &CancellationToken,
    ) -> Option<Vec<u8>> {
        thumbnail::generate(path, options, cancel).await
    }
}
