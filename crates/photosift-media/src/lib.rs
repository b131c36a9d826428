//! Image metadata extraction and thumbnail generation for photosift.
//!
//! Wraps the blocking `image` and EXIF decoders behind async entry
//! points that run on the blocking thread pool.

mod extractor;
mod metadata;
mod thumbnail;

pub use extractor::MetadataExtractor;

// Re-export core types for convenience
pub use photosift_core::{ImageMetadata, ThumbnailOptions};
