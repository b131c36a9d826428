//! Lazy image-file discovery for photosift.
//!
//! This crate walks directory trees with jwalk and exposes the matching
//! image files as a cancellable async stream.
//!
//! # Overview
//!
//! `photosift-scan` turns a blocking parallel walk into a lazy stream:
//!
//! - **Bounded memory**: the walk feeds a bounded channel, so an
//!   arbitrarily large tree never piles up in memory
//! - **Cancellable**: a [`CancellationToken`](tokio_util::sync::CancellationToken)
//!   stops the walk between files
//! - **Filtered**: extension, hidden-entry, and depth rules come from
//!   [`ScanFilter`]
//! - **Progress updates** via broadcast channels
//!
//! # Example
//!
//! ```rust,no_run
//! use photosift_scan::ImageScanner;
//! use tokio_stream::StreamExt;
//! use tokio_util::sync::CancellationToken;
//!
//! # async fn run() {
//! let scanner = ImageScanner::new();
//! let mut stream = scanner.scan("/photos", true, CancellationToken::new());
//!
//! while let Some(item) = stream.next().await {
//!     match item {
//!         Ok(file) => println!("{} ({} bytes)", file.path.display(), file.size),
//!         Err(err) => eprintln!("scan error: {err}"),
//!     }
//! }
//! # }
//! ```

mod progress;
mod scanner;

pub use progress::ScanProgress;
pub use scanner::ImageScanner;

// Re-export core types for convenience
pub use photosift_core::{ScanError, ScanFilter, ScannedFile};
