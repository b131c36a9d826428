//! Value types produced by the scanning and processing pipeline.

use std::path::{Path, PathBuf};
use std::time::Duration;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A file discovered by the scanner.
///
/// Immutable snapshot of the file as seen at scan time. The extension is
/// stored lower-cased so downstream filtering never re-derives it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScannedFile {
    /// Absolute path to the file.
    pub path: PathBuf,
    /// Lower-cased extension without the leading dot.
    pub extension: String,
    /// File size in bytes.
    pub size: u64,
    /// Last modification time.
    pub modified: DateTime<Utc>,
}

impl ScannedFile {
    /// Create a scanned-file record, deriving the extension from the path.
    pub fn new(path: impl Into<PathBuf>, size: u64, modified: DateTime<Utc>) -> Self {
        let path = path.into();
        let extension = extension_of(&path);
        Self {
            path,
            extension,
            size,
            modified,
        }
    }

    /// File name portion of the path, empty when the path has none.
    pub fn file_name(&self) -> String {
        self.path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default()
    }
}

/// Lower-cased extension of a path, without the dot.
pub(crate) fn extension_of(path: &Path) -> String {
    path.extension()
        .map(|e| e.to_string_lossy().to_lowercase())
        .unwrap_or_default()
}

/// Outcome of hashing a single file.
///
/// Hashing never surfaces an error type; failures are carried in the
/// result itself. A failed result always has an empty hash.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HashResult {
    /// Path of the hashed file.
    pub path: PathBuf,
    /// Lowercase hex digest, empty on failure.
    pub hash: String,
    /// Bytes read before finishing or failing.
    pub bytes_processed: u64,
    /// Wall-clock time spent on this file.
    pub elapsed: Duration,
    /// Whether the full file was hashed.
    pub success: bool,
    /// Failure description when `success` is false.
    pub error: Option<String>,
}

impl HashResult {
    /// Successful hash of a file.
    pub fn success(
        path: impl Into<PathBuf>,
        hash: impl Into<String>,
        bytes_processed: u64,
        elapsed: Duration,
    ) -> Self {
        Self {
            path: path.into(),
            hash: hash.into(),
            bytes_processed,
            elapsed,
            success: true,
            error: None,
        }
    }

    /// Failed hash attempt. The hash field stays empty.
    pub fn failure(
        path: impl Into<PathBuf>,
        error: impl Into<String>,
        bytes_processed: u64,
        elapsed: Duration,
    ) -> Self {
        Self {
            path: path.into(),
            hash: String::new(),
            bytes_processed,
            elapsed,
            success: false,
            error: Some(error.into()),
        }
    }

    /// Failure caused by cancellation mid-read.
    pub fn cancelled(path: impl Into<PathBuf>, bytes_processed: u64, elapsed: Duration) -> Self {
        Self::failure(path, "hashing cancelled", bytes_processed, elapsed)
    }
}

/// Metadata extracted from an image file.
///
/// Every EXIF-derived field is independently optional; an image with no
/// EXIF block at all is still a successful extraction.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ImageMetadata {
    /// Whether the image could be decoded at all.
    pub success: bool,
    /// Failure description when `success` is false.
    pub error: Option<String>,
    /// Pixel width, present on success.
    pub width: Option<u32>,
    /// Pixel height, present on success.
    pub height: Option<u32>,
    /// Capture timestamp from EXIF.
    pub taken_at: Option<DateTime<Utc>>,
    /// Camera manufacturer.
    pub camera_make: Option<String>,
    /// Camera model.
    pub camera_model: Option<String>,
    /// GPS latitude in decimal degrees, negative for south.
    pub latitude: Option<f64>,
    /// GPS longitude in decimal degrees, negative for west.
    pub longitude: Option<f64>,
    /// ISO sensitivity.
    pub iso: Option<u32>,
    /// Aperture as an f-number.
    pub aperture: Option<f64>,
    /// Exposure time in seconds.
    pub shutter_speed: Option<f64>,
    /// Focal length in millimetres.
    pub focal_length: Option<f64>,
}

impl ImageMetadata {
    /// Successful extraction with the decoded dimensions.
    pub fn ok(width: u32, height: u32) -> Self {
        Self {
            success: true,
            width: Some(width),
            height: Some(height),
            ..Self::default()
        }
    }

    /// Failed extraction.
    pub fn failed(error: impl Into<String>) -> Self {
        Self {
            success: false,
            error: Some(error.into()),
            ..Self::default()
        }
    }
}

/// Outcome of indexing one configured directory.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DirectoryResult {
    /// Catalog identifier of the directory.
    pub directory_id: i64,
    /// Configured path of the directory.
    pub path: PathBuf,
    /// Whether the directory was indexed without a fatal error.
    pub success: bool,
    /// Image files discovered by the scan.
    pub files_scanned: u64,
    /// Files processed and accepted by the catalog.
    pub files_processed: u64,
    /// Failure description when `success` is false.
    pub error: Option<String>,
}

impl DirectoryResult {
    /// Successful directory pass.
    pub fn success(
        directory_id: i64,
        path: impl Into<PathBuf>,
        files_scanned: u64,
        files_processed: u64,
    ) -> Self {
        Self {
            directory_id,
            path: path.into(),
            success: true,
            files_scanned,
            files_processed,
            error: None,
        }
    }

    /// Failed directory pass.
    pub fn failure(directory_id: i64, path: impl Into<PathBuf>, error: impl Into<String>) -> Self {
        Self {
            directory_id,
            path: path.into(),
            success: false,
            files_scanned: 0,
            files_processed: 0,
            error: Some(error.into()),
        }
    }

    /// Result for a directory skipped because an earlier scan covered it.
    pub fn skipped(directory_id: i64, path: impl Into<PathBuf>) -> Self {
        Self::success(directory_id, path, 0, 0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_scanned_file_extension() {
        let file = ScannedFile::new("/photos/IMG_0001.JPG", 1024, Utc::now());
        assert_eq!(file.extension, "jpg");
        assert_eq!(file.file_name(), "IMG_0001.JPG");
    }

    #[test]
    fn test_scanned_file_no_extension() {
        let file = ScannedFile::new("/photos/README", 10, Utc::now());
        assert_eq!(file.extension, "");
    }

    #[test]
    fn test_hash_result_failure_has_no_hash() {
        let result = HashResult::failure("/p/a.jpg", "boom", 12, Duration::from_millis(5));
        assert!(!result.success);
        assert!(result.hash.is_empty());
        assert_eq!(result.error.as_deref(), Some("boom"));
    }

    #[test]
    fn test_hash_result_cancelled() {
        let result = HashResult::cancelled("/p/a.jpg", 0, Duration::ZERO);
        assert!(!result.success);
        assert!(result.error.unwrap().contains("cancelled"));
    }

    #[test]
    fn test_image_metadata_ok_defaults() {
        let meta = ImageMetadata::ok(800, 600);
        assert!(meta.success);
        assert_eq!(meta.width, Some(800));
        assert!(meta.taken_at.is_none());
        assert!(meta.camera_make.is_none());
    }

    #[test]
    fn test_directory_result_skipped_is_zeroed_success() {
        let result = DirectoryResult::skipped(7, "/photos");
        assert!(result.success);
        assert_eq!(result.files_scanned, 0);
        assert_eq!(result.files_processed, 0);
    }
}
