//! Cycle-scoped scan session state.
//!
//! A session remembers which directories and files the current cycle
//! already handled, so overlapping configured directories are not
//! processed twice. State lives in memory only; a fresh process starts
//! with an empty session.

use std::path::Path;
use std::sync::RwLock;

use chrono::{DateTime, Utc};
use dashmap::DashSet;
use uuid::Uuid;

/// Concurrent per-cycle dedup state.
///
/// Paths are compared after normalization, so `/Photos/2023/` and
/// `/photos/2023` refer to the same directory.
#[derive(Debug)]
pub struct ScanSession {
    identity: RwLock<SessionIdentity>,
    scanned_dirs: DashSet<String>,
    processed_files: DashSet<String>,
}

#[derive(Debug, Clone)]
struct SessionIdentity {
    id: Uuid,
    started_at: DateTime<Utc>,
}

impl ScanSession {
    /// Create a session with a fresh identity and empty state.
    pub fn new() -> Self {
        Self {
            identity: RwLock::new(SessionIdentity {
                id: Uuid::new_v4(),
                started_at: Utc::now(),
            }),
            scanned_dirs: DashSet::new(),
            processed_files: DashSet::new(),
        }
    }

    /// Replace the session identity and clear all tracked state.
    pub fn start_new_session(&self) -> Uuid {
        let id = Uuid::new_v4();
        {
            // Identity swap and set clearing happen under the write lock
            // so no reader observes a new id with old state.
            let mut identity = self.identity.write().unwrap_or_else(|e| e.into_inner());
            identity.id = id;
            identity.started_at = Utc::now();
            self.scanned_dirs.clear();
            self.processed_files.clear();
        }
        id
    }

    /// Current session id.
    pub fn id(&self) -> Uuid {
        self.identity.read().unwrap_or_else(|e| e.into_inner()).id
    }

    /// When the current session began.
    pub fn started_at(&self) -> DateTime<Utc> {
        self.identity
            .read()
            .unwrap_or_else(|e| e.into_inner())
            .started_at
    }

    /// Record that a directory was fully scanned this cycle.
    pub fn mark_directory_scanned(&self, path: &Path) {
        self.scanned_dirs.insert(normalize(path));
    }

    /// Whether this exact directory was already scanned this cycle.
    pub fn is_directory_scanned(&self, path: &Path) -> bool {
        self.scanned_dirs.contains(&normalize(path))
    }

    /// Record that a file was processed this cycle.
    pub fn mark_file_processed(&self, path: &Path) {
        self.processed_files.insert(normalize(path));
    }

    /// Whether this file was already processed this cycle.
    pub fn is_file_processed(&self, path: &Path) -> bool {
        self.processed_files.contains(&normalize(path))
    }

    /// Whether `path` equals, or sits below, any scanned directory.
    ///
    /// Containment respects path segments: `/photos/2023` covers
    /// `/photos/2023/trip` but not `/photos/2023-backup`.
    pub fn is_path_covered_by_scanned_directory(&self, path: &Path) -> bool {
        let normalized = normalize(path);
        self.scanned_dirs.iter().any(|dir| {
            let dir = dir.key();
            normalized == *dir
                || (normalized.len() > dir.len()
                    && normalized.starts_with(dir.as_str())
                    && normalized.as_bytes()[dir.len()] == b'/')
        })
    }

    /// Number of directories scanned this cycle.
    pub fn scanned_directory_count(&self) -> usize {
        self.scanned_dirs.len()
    }

    /// Number of files processed this cycle.
    pub fn processed_file_count(&self) -> usize {
        self.processed_files.len()
    }
}

impl Default for ScanSession {
    fn default() -> Self {
        Self::new()
    }
}

/// Canonical comparison form: forward slashes, lower case, no trailing
/// separator.
fn normalize(path: &Path) -> String {
    let mut normalized = path.to_string_lossy().replace('\\', "/").to_lowercase();
    while normalized.len() > 1 && normalized.ends_with('/') {
        normalized.pop();
    }
    normalized
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    #[test]
    fn test_new_session_clears_state() {
        let session = ScanSession::new();
        session.mark_directory_scanned(Path::new("/photos"));
        session.mark_file_processed(Path::new("/photos/a.jpg"));
        let old_id = session.id();

        let new_id = session.start_new_session();

        assert_ne!(old_id, new_id);
        assert_eq!(new_id, session.id());
        assert!(!session.is_directory_scanned(Path::new("/photos")));
        assert!(!session.is_file_processed(Path::new("/photos/a.jpg")));
        assert_eq!(session.scanned_directory_count(), 0);
        assert_eq!(session.processed_file_count(), 0);
    }

    #[test]
    fn test_directory_normalization() {
        let session = ScanSession::new();
        session.mark_directory_scanned(Path::new("/Photos/2023/"));

        assert!(session.is_directory_scanned(Path::new("/photos/2023")));
        assert!(session.is_directory_scanned(Path::new("/PHOTOS/2023/")));
        assert!(!session.is_directory_scanned(Path::new("/photos/2024")));
    }

    #[test]
    fn test_file_normalization() {
        let session = ScanSession::new();
        session.mark_file_processed(Path::new("/Photos/IMG_01.JPG"));

        assert!(session.is_file_processed(Path::new("/photos/img_01.jpg")));
        assert!(!session.is_file_processed(Path::new("/photos/img_02.jpg")));
    }

    #[test]
    fn test_coverage_exact_and_descendant() {
        let session = ScanSession::new();
        session.mark_directory_scanned(Path::new("/photos/2023"));

        assert!(session.is_path_covered_by_scanned_directory(Path::new("/photos/2023")));
        assert!(session.is_path_covered_by_scanned_directory(Path::new("/photos/2023/trip")));
        assert!(session.is_path_covered_by_scanned_directory(Path::new("/photos/2023/trip/day1")));
    }

    #[test]
    fn test_coverage_respects_segment_boundaries() {
        let session = ScanSession::new();
        session.mark_directory_scanned(Path::new("/photos/2023"));

        assert!(!session.is_path_covered_by_scanned_directory(Path::new("/photos/2023-backup")));
        assert!(!session.is_path_covered_by_scanned_directory(Path::new("/photos/20231")));
        assert!(!session.is_path_covered_by_scanned_directory(Path::new("/photos")));
    }

    #[test]
    fn test_coverage_case_insensitive() {
        let session = ScanSession::new();
        session.mark_directory_scanned(Path::new("/Photos/Vacation"));

        assert!(session.is_path_covered_by_scanned_directory(Path::new("/photos/vacation/day1")));
    }

    #[test]
    fn test_concurrent_marking() {
        use std::sync::Arc;

        let session = Arc::new(ScanSession::new());
        let mut handles = Vec::new();
        for i in 0..8 {
            let session = Arc::clone(&session);
            handles.push(std::thread::spawn(move || {
                for j in 0..100 {
                    let path = PathBuf::from(format!("/photos/dir{i}/file{j}.jpg"));
                    session.mark_file_processed(&path);
                    assert!(session.is_file_processed(&path));
                }
            }));
        }
        for handle in handles {
            handle.join().unwrap();
        }
        assert_eq!(session.processed_file_count(), 800);
    }
}
