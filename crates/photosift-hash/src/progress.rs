//! Hash progress reporting.

use std::path::PathBuf;

/// Progress information while hashing a file.
#[derive(Debug, Clone)]
pub struct HashProgress {
    /// File being hashed.
    pub path: PathBuf,
    /// Bytes read so far.
    pub bytes_processed: u64,
    /// Total file size in bytes.
    pub total_bytes: u64,
    /// Completion percentage, 0-100. The final report is always 100.
    pub percent: f64,
}

impl HashProgress {
    pub(crate) fn new(path: PathBuf, bytes_processed: u64, total_bytes: u64) -> Self {
        let percent = if total_bytes == 0 {
            100.0
        } else {
            (bytes_processed as f64 / total_bytes as f64) * 100.0
        };
        Self {
            path,
            bytes_processed,
            total_bytes,
            percent,
        }
    }
}
