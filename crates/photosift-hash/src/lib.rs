//! Streaming content hashing for photosift.
//!
//! Files are hashed with BLAKE3 in fixed-size chunks so large images
//! never load fully into memory, with broadcast progress and bounded
//! batch parallelism.

mod hasher;
mod progress;

pub use hasher::ContentHasher;
pub use progress::HashProgress;

// Re-export core types for convenience
pub use photosift_core::HashResult;
