//! Indexing engine for photosift.
//!
//! Ties the scanner, hasher, metadata extractor, and catalog client
//! together into cancellable indexing cycles with cycle-scoped dedup
//! state.

mod indexer;
mod session;

pub use indexer::{EngineError, Indexer};
pub use session::ScanSession;

// Re-export core types for convenience
pub use photosift_core::{DirectoryResult, EngineConfig};
