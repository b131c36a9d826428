//! Scan progress reporting.

use std::path::PathBuf;

/// Progress information during a directory walk.
#[derive(Debug, Clone)]
pub struct ScanProgress {
    /// Number of image files discovered so far.
    pub files_discovered: u64,
    /// Total bytes of the discovered files.
    pub bytes_discovered: u64,
    /// Most recently discovered file.
    pub current_path: PathBuf,
}

impl ScanProgress {
    /// Create initial progress state.
    pub fn new() -> Self {
        Self {
            files_discovered: 0,
            bytes_discovered: 0,
            current_path: PathBuf::new(),
        }
    }
}

impl Default for ScanProgress {
    fn default() -> Self {
        Self::new()
    }
}
