//! Scan filter and engine configuration types.

use derive_builder::Builder;
use serde::{Deserialize, Serialize};

/// Image extensions the indexer recognises, lower-cased.
pub const SUPPORTED_EXTENSIONS: &[&str] = &[
    "jpg", "jpeg", "png", "gif", "heic", "webp", "bmp", "tif", "tiff",
];

/// Filtering rules applied while walking a directory tree.
#[derive(Debug, Clone, Builder, Serialize, Deserialize)]
#[builder(setter(into), build_fn(validate = "Self::validate"))]
pub struct ScanFilter {
    /// Extensions to accept, lower-cased, without dots.
    #[builder(default = "default_extensions()")]
    #[serde(default = "default_extensions")]
    pub extensions: Vec<String>,

    /// Skip files whose name starts with a dot.
    #[builder(default = "true")]
    #[serde(default = "default_true")]
    pub skip_hidden_files: bool,

    /// Skip directories whose name starts with a dot.
    #[builder(default = "true")]
    #[serde(default = "default_true")]
    pub skip_hidden_dirs: bool,

    /// Maximum traversal depth below the root (None = unlimited).
    #[builder(default)]
    #[serde(default)]
    pub max_depth: Option<usize>,
}

fn default_extensions() -> Vec<String> {
    SUPPORTED_EXTENSIONS.iter().map(|e| e.to_string()).collect()
}

fn default_true() -> bool {
    true
}

impl ScanFilterBuilder {
    fn validate(&self) -> Result<(), String> {
        if let Some(ref extensions) = self.extensions {
            if extensions.is_empty() {
                return Err("Extension list cannot be empty".to_string());
            }
        }
        Ok(())
    }
}

impl ScanFilter {
    /// Create a new scan filter builder.
    pub fn builder() -> ScanFilterBuilder {
        ScanFilterBuilder::default()
    }

    /// Check whether an extension (any case, no dot) is accepted.
    pub fn is_supported_extension(&self, extension: &str) -> bool {
        let lower = extension.to_lowercase();
        self.extensions.iter().any(|e| *e == lower)
    }

    /// Check whether a file or directory name counts as hidden.
    pub fn is_hidden(name: &str) -> bool {
        name.starts_with('.')
    }
}

impl Default for ScanFilter {
    fn default() -> Self {
        Self {
            extensions: default_extensions(),
            skip_hidden_files: true,
            skip_hidden_dirs: true,
            max_depth: None,
        }
    }
}

/// Thumbnail generation settings.
#[derive(Debug, Clone, Copy, Builder, Serialize, Deserialize)]
#[builder(build_fn(validate = "Self::validate"))]
pub struct ThumbnailOptions {
    /// Maximum thumbnail width in pixels.
    #[builder(default = "200")]
    #[serde(default = "default_thumb_dim")]
    pub max_width: u32,

    /// Maximum thumbnail height in pixels.
    #[builder(default = "200")]
    #[serde(default = "default_thumb_dim")]
    pub max_height: u32,

    /// JPEG quality, 0-100.
    #[builder(default = "75")]
    #[serde(default = "default_quality")]
    pub quality: u8,

    /// Keep the source aspect ratio when resizing.
    #[builder(default = "true")]
    #[serde(default = "default_true")]
    pub preserve_aspect_ratio: bool,
}

fn default_thumb_dim() -> u32 {
    200
}

fn default_quality() -> u8 {
    75
}

impl ThumbnailOptionsBuilder {
    fn validate(&self) -> Result<(), String> {
        if let Some(quality) = self.quality {
            if quality > 100 {
                return Err(format!("Quality must be 0-100, got {quality}"));
            }
        }
        if self.max_width == Some(0) || self.max_height == Some(0) {
            return Err("Thumbnail dimensions must be non-zero".to_string());
        }
        Ok(())
    }
}

impl ThumbnailOptions {
    /// Create a new thumbnail options builder.
    pub fn builder() -> ThumbnailOptionsBuilder {
        ThumbnailOptionsBuilder::default()
    }
}

impl Default for ThumbnailOptions {
    fn default() -> Self {
        Self {
            max_width: 200,
            max_height: 200,
            quality: 75,
            preserve_aspect_ratio: true,
        }
    }
}

/// Configuration for a full indexing cycle.
#[derive(Debug, Clone, Builder, Serialize, Deserialize)]
#[builder(setter(into), build_fn(validate = "Self::validate"))]
pub struct EngineConfig {
    /// Directories processed concurrently.
    #[builder(default = "4")]
    #[serde(default = "default_parallelism")]
    pub directory_parallelism: usize,

    /// Files hashed concurrently within a directory.
    #[builder(default = "4")]
    #[serde(default = "default_parallelism")]
    pub hash_parallelism: usize,

    /// Generate and submit thumbnails alongside metadata.
    #[builder(default = "false")]
    #[serde(default)]
    pub generate_thumbnails: bool,

    /// Thumbnail settings, used when `generate_thumbnails` is set.
    #[builder(default)]
    #[serde(default)]
    pub thumbnails: ThumbnailOptions,

    /// Filter applied to every directory walk.
    #[builder(default)]
    #[serde(default)]
    pub filter: ScanFilter,
}

fn default_parallelism() -> usize {
    4
}

impl EngineConfigBuilder {
    fn validate(&self) -> Result<(), String> {
        if self.directory_parallelism == Some(0) {
            return Err("Directory parallelism must be at least 1".to_string());
        }
        if self.hash_parallelism == Some(0) {
            return Err("Hash parallelism must be at least 1".to_string());
        }
        Ok(())
    }
}

impl EngineConfig {
    /// Create a new engine config builder.
    pub fn builder() -> EngineConfigBuilder {
        EngineConfigBuilder::default()
    }
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            directory_parallelism: 4,
            hash_parallelism: 4,
            generate_thumbnails: false,
            thumbnails: ThumbnailOptions::default(),
            filter: ScanFilter::default(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_filter_defaults() {
        let filter = ScanFilter::default();
        assert!(filter.skip_hidden_files);
        assert!(filter.skip_hidden_dirs);
        assert!(filter.max_depth.is_none());
        assert_eq!(filter.extensions.len(), SUPPORTED_EXTENSIONS.len());
    }

    #[test]
    fn test_filter_extension_case_insensitive() {
        let filter = ScanFilter::default();
        assert!(filter.is_supported_extension("jpg"));
        assert!(filter.is_supported_extension("JPG"));
        assert!(filter.is_supported_extension("Tiff"));
        assert!(!filter.is_supported_extension("txt"));
        assert!(!filter.is_supported_extension(""));
    }

    #[test]
    fn test_filter_rejects_empty_extension_list() {
        let result = ScanFilter::builder().extensions(Vec::<String>::new()).build();
        assert!(result.is_err());
    }

    #[test]
    fn test_filter_hidden_names() {
        assert!(ScanFilter::is_hidden(".DS_Store"));
        assert!(ScanFilter::is_hidden(".cache"));
        assert!(!ScanFilter::is_hidden("photos"));
    }

    #[test]
    fn test_thumbnail_defaults() {
        let options = ThumbnailOptions::default();
        assert_eq!(options.max_width, 200);
        assert_eq!(options.max_height, 200);
        assert_eq!(options.quality, 75);
        assert!(options.preserve_aspect_ratio);
    }

    #[test]
    fn test_thumbnail_builder_validation() {
        assert!(ThumbnailOptions::builder().quality(101).build().is_err());
        assert!(ThumbnailOptions::builder().max_width(0u32).build().is_err());

        let options = ThumbnailOptions::builder()
            .max_width(64u32)
            .max_height(64u32)
            .quality(90)
            .build()
            .unwrap();
        assert_eq!(options.max_width, 64);
        assert_eq!(options.quality, 90);
    }

    #[test]
    fn test_engine_config_builder() {
        let config = EngineConfig::builder()
            .directory_parallelism(2usize)
            .hash_parallelism(8usize)
            .generate_thumbnails(true)
            .build()
            .unwrap();
        assert_eq!(config.directory_parallelism, 2);
        assert_eq!(config.hash_parallelism, 8);
        assert!(config.generate_thumbnails);
    }

    #[test]
    fn test_engine_config_rejects_zero_parallelism() {
        assert!(EngineConfig::builder()
            .directory_parallelism(0usize)
            .build()
            .is_err());
        assert!(EngineConfig::builder()
            .hash_parallelism(0usize)
            .build()
            .is_err());
    }
}
