//! JWalk-based image-file scanner.
//!
//! The walk runs on a blocking task and feeds a bounded channel; the
//! consumer sees a lazy async stream. Dropping the receiver stops the
//! walk through channel closure.

use std::path::{Path, PathBuf};
use std::time::Duration;

use chrono::{DateTime, Utc};
use jwalk::{Parallelism, WalkDir};
use tokio::sync::{broadcast, mpsc};
use tokio_stream::wrappers::ReceiverStream;
use tokio_util::sync::CancellationToken;

use photosift_core::{ScanError, ScanFilter, ScannedFile};

use crate::progress::ScanProgress;

/// Channel capacity between the walking task and the consumer. Bounds
/// memory when the consumer is slower than the walk.
const CHANNEL_CAPACITY: usize = 256;

/// Lazy directory scanner that yields image files as an async stream.
pub struct ImageScanner {
    filter: ScanFilter,
    progress_tx: broadcast::Sender<ScanProgress>,
}

impl ImageScanner {
    /// Create a scanner with the default image filter.
    pub fn new() -> Self {
        Self::with_filter(ScanFilter::default())
    }

    /// Create a scanner with a custom filter.
    pub fn with_filter(filter: ScanFilter) -> Self {
        let (progress_tx, _) = broadcast::channel(100);
        Self {
            filter,
            progress_tx,
        }
    }

    /// Subscribe to discovery progress updates.
    pub fn subscribe(&self) -> broadcast::Receiver<ScanProgress> {
        self.progress_tx.subscribe()
    }

    /// Walk `root` and stream every matching image file.
    ///
    /// A nonexistent or non-directory root produces an empty stream. On
    /// cancellation the stream yields `Err(ScanError::Cancelled)` once and
    /// then ends; items yielded before that point remain valid.
    pub fn scan(
        &self,
        root: impl Into<PathBuf>,
        recursive: bool,
        cancel: CancellationToken,
    ) -> ReceiverStream<Result<ScannedFile, ScanError>> {
        let root = root.into();
        let filter = self.filter.clone();
        let progress_tx = self.progress_tx.clone();
        let (tx, rx) = mpsc::channel(CHANNEL_CAPACITY);

        tokio::task::spawn_blocking(move || {
            walk_tree(&root, recursive, &filter, &progress_tx, &tx, &cancel);
        });

        ReceiverStream::new(rx)
    }
}

impl Default for ImageScanner {
    fn default() -> Self {
        Self::new()
    }
}

/// Blocking walk body. Sends results until the walk ends, the receiver
/// goes away, or the token cancels.
fn walk_tree(
    root: &Path,
    recursive: bool,
    filter: &ScanFilter,
    progress_tx: &broadcast::Sender<ScanProgress>,
    tx: &mpsc::Sender<Result<ScannedFile, ScanError>>,
    cancel: &CancellationToken,
) {
    // Missing or non-directory roots end the stream without an error.
    let root = match root.canonicalize() {
        Ok(path) if path.is_dir() => path,
        _ => return,
    };

    if cancel.is_cancelled() {
        let _ = tx.blocking_send(Err(ScanError::Cancelled));
        return;
    }

    let max_depth = if recursive {
        filter.max_depth.unwrap_or(usize::MAX)
    } else {
        1
    };
    let skip_hidden_dirs = filter.skip_hidden_dirs;

    let walker = WalkDir::new(&root)
        .parallelism(Parallelism::RayonDefaultPool {
            busy_timeout: Duration::from_millis(100),
        })
        .skip_hidden(false)
        .follow_links(false)
        .min_depth(1)
        .max_depth(max_depth)
        .process_read_dir(move |_depth, _path, _state, children| {
            if skip_hidden_dirs {
                children.retain(|entry| match entry {
                    Ok(entry) => {
                        !entry.file_type.is_dir()
                            || !ScanFilter::is_hidden(&entry.file_name.to_string_lossy())
                    }
                    Err(_) => true,
                });
            }
        });

    let mut files_discovered: u64 = 0;
    let mut bytes_discovered: u64 = 0;

    for entry_result in walker {
        if cancel.is_cancelled() {
            let _ = tx.blocking_send(Err(ScanError::Cancelled));
            return;
        }

        let entry = match entry_result {
            Ok(entry) => entry,
            Err(err) => {
                let path = err.path().map(|p| p.to_path_buf()).unwrap_or_default();
                let io = err
                    .io_error()
                    .map(|e| std::io::Error::new(e.kind(), e.to_string()))
                    .unwrap_or_else(|| std::io::Error::other(err.to_string()));
                if tx.blocking_send(Err(ScanError::io(path, io))).is_err() {
                    return;
                }
                continue;
            }
        };

        if !entry.file_type().is_file() {
            continue;
        }

        let path = entry.path();
        let file_name = entry.file_name().to_string_lossy().to_string();

        if filter.skip_hidden_files && ScanFilter::is_hidden(&file_name) {
            continue;
        }

        let extension = match path.extension() {
            Some(ext) => ext.to_string_lossy().to_string(),
            None => continue,
        };
        if !filter.is_supported_extension(&extension) {
            continue;
        }

        let metadata = match entry.metadata() {
            Ok(metadata) => metadata,
            Err(err) => {
                let io = err
                    .io_error()
                    .map(|e| std::io::Error::new(e.kind(), e.to_string()))
                    .unwrap_or_else(|| std::io::Error::other(err.to_string()));
                if tx.blocking_send(Err(ScanError::io(&path, io))).is_err() {
                    return;
                }
                continue;
            }
        };

        let size = metadata.len();
        if size == 0 {
            continue;
        }

        let modified: DateTime<Utc> = metadata
            .modified()
            .map(DateTime::<Utc>::from)
            .unwrap_or_else(|_| Utc::now());

        let file = ScannedFile::new(&path, size, modified);

        files_discovered += 1;
        bytes_discovered += size;
        let _ = progress_tx.send(ScanProgress {
            files_discovered,
            bytes_discovered,
            current_path: path.clone(),
        });

        if tx.blocking_send(Ok(file)).is_err() {
            // Receiver dropped, stop walking.
            return;
        }
    }
}
