//! Core types and configuration for photosift.
//!
//! This crate provides the fundamental data structures shared across
//! the photosift crates: scanned-file records, hash and metadata results,
//! scan filters, and engine configuration.

mod config;
mod error;
mod types;

pub use config::{
    EngineConfig, EngineConfigBuilder, ScanFilter, ScanFilterBuilder, ThumbnailOptions,
    ThumbnailOptionsBuilder, SUPPORTED_EXTENSIONS,
};
pub use error::ScanError;
pub use types::{DirectoryResult, HashResult, ImageMetadata, ScannedFile};
