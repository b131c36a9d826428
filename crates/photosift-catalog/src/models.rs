//! Wire types for the catalog service API.

use base64::Engine;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use photosift_core::ImageMetadata;

/// A directory the catalog wants indexed.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ScanDirectory {
    /// Catalog identifier.
    pub id: i64,
    /// Absolute path on this machine.
    pub path: String,
    /// Whether subdirectories are included.
    pub include_subdirectories: bool,
}

/// One file in a reindex query.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FileCheck {
    /// Absolute file path.
    pub file_path: String,
    /// Modification time observed on disk.
    pub modified_at: DateTime<Utc>,
}

/// Catalog verdict for one queried file.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReindexStatus {
    /// Absolute file path, matching the query.
    pub file_path: String,
    /// Modification time the catalog has on record.
    pub last_modified_at: Option<DateTime<Utc>>,
    /// Whether the file should be processed again.
    pub needs_reindex: bool,
}

/// A fully processed file submitted for ingestion.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FileIngest {
    pub file_path: String,
    pub file_name: String,
    /// Lowercase hex content hash.
    pub hash: String,
    pub size: u64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub width: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub height: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub taken_at: Option<DateTime<Utc>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub camera_make: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub camera_model: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub latitude: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub longitude: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub iso: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub aperture: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub shutter_speed: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub focal_length: Option<f64>,
    /// Base64-encoded JPEG thumbnail.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub thumbnail: Option<String>,
}

impl FileIngest {
    /// Create an ingest record with the required fields.
    pub fn new(
        file_path: impl Into<String>,
        file_name: impl Into<String>,
        hash: impl Into<String>,
        size: u64,
    ) -> Self {
        Self {
            file_path: file_path.into(),
            file_name: file_name.into(),
            hash: hash.into(),
            size,
            width: None,
            height: None,
            taken_at: None,
            camera_make: None,
            camera_model: None,
            latitude: None,
            longitude: None,
            iso: None,
            aperture: None,
            shutter_speed: None,
            focal_length: None,
            thumbnail: None,
        }
    }

    /// Copy extracted metadata fields into the record.
    pub fn with_metadata(mut self, metadata: &ImageMetadata) -> Self {
        self.width = metadata.width;
        self.height = metadata.height;
        self.taken_at = metadata.taken_at;
        self.camera_make = metadata.camera_make.clone();
        self.camera_model = metadata.camera_model.clone();
        self.latitude = metadata.latitude;
        self.longitude = metadata.longitude;
        self.iso = metadata.iso;
        self.aperture = metadata.aperture;
        self.shutter_speed = metadata.shutter_speed;
        self.focal_length = metadata.focal_length;
        self
    }

    /// Attach thumbnail bytes, base64-encoded for the wire.
    pub fn with_thumbnail(mut self, bytes: &[u8]) -> Self {
        self.thumbnail = Some(base64::engine::general_purpose::STANDARD.encode(bytes));
        self
    }
}

/// Ingest outcome counts reported by the catalog.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct IngestSummary {
    /// Files the catalog accepted.
    pub succeeded: u64,
    /// Files the catalog rejected.
    pub failed: u64,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_camel_case_wire_names() {
        let check = FileCheck {
            file_path: "/photos/a.jpg".to_string(),
            modified_at: Utc::now(),
        };
        let json = serde_json::to_value(&check).unwrap();
        assert!(json.get("filePath").is_some());
        assert!(json.get("modifiedAt").is_some());
    }

    #[test]
    fn test_ingest_omits_absent_fields() {
        let ingest = FileIngest::new("/photos/a.jpg", "a.jpg", "abc123", 42);
        let json = serde_json::to_value(&ingest).unwrap();
        assert!(json.get("width").is_none());
        assert!(json.get("thumbnail").is_none());
        assert_eq!(json["size"], 42);
    }

    #[test]
    fn test_ingest_with_metadata() {
        let mut metadata = ImageMetadata::ok(800, 600);
        metadata.camera_make = Some("Canon".to_string());
        metadata.iso = Some(400);

        let ingest = FileIngest::new("/photos/a.jpg", "a.jpg", "abc", 1).with_metadata(&metadata);
        assert_eq!(ingest.width, Some(800));
        assert_eq!(ingest.camera_make.as_deref(), Some("Canon"));
        assert_eq!(ingest.iso, Some(400));
    }

    #[test]
    fn test_thumbnail_is_base64() {
        let ingest = FileIngest::new("/p/a.jpg", "a.jpg", "abc", 1).with_thumbnail(&[0xFF, 0xD8]);
        assert_eq!(ingest.thumbnail.as_deref(), Some("/9g="));
    }

    #[test]
    fn test_reindex_status_roundtrip() {
        let json = r#"{"filePath":"/p/a.jpg","lastModifiedAt":null,"needsReindex":true}"#;
        let status: ReindexStatus = serde_json::from_str(json).unwrap();
        assert!(status.needs_reindex);
        assert!(status.last_modified_at.is_none());
    }
}
