//! Streaming BLAKE3 file hashing.
//!
//! Hashing never returns an error type: unreadable files and
//! cancellations become failed [`HashResult`]s so a batch always yields
//! exactly one result per input.

use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Instant;

use blake3::Hasher;
use tokio::io::AsyncReadExt;
use tokio::sync::{broadcast, mpsc, Semaphore};
use tokio::task::JoinSet;
use tokio_stream::wrappers::ReceiverStream;
use tokio_util::sync::CancellationToken;

use photosift_core::HashResult;

use crate::progress::HashProgress;

/// Read buffer size for streaming hashes.
const READ_BUFFER_SIZE: usize = 64 * 1024;

/// Channel capacity for batch result delivery.
const BATCH_CHANNEL_CAPACITY: usize = 64;

/// Streaming content hasher with progress reporting.
#[derive(Clone)]
pub struct ContentHasher {
    progress_tx: broadcast::Sender<HashProgress>,
}

impl ContentHasher {
    /// Create a new hasher.
    pub fn new() -> Self {
        let (progress_tx, _) = broadcast::channel(100);
        Self { progress_tx }
    }

    /// Subscribe to hash progress updates.
    pub fn subscribe(&self) -> broadcast::Receiver<HashProgress> {
        self.progress_tx.subscribe()
    }

    /// Hash a single file, reading it in 64 KiB chunks.
    ///
    /// Missing or unreadable files produce a failed result with an empty
    /// hash. Cancellation mid-read produces a failed result as well; a
    /// cancelled hash is never reported as a success.
    pub async fn hash_file(&self, path: &Path, cancel: &CancellationToken) -> HashResult {
        let start = Instant::now();

        let total_bytes = match tokio::fs::metadata(path).await {
            Ok(metadata) => metadata.len(),
            Err(err) => {
                return HashResult::failure(path, err.to_string(), 0, start.elapsed());
            }
        };

        let mut file = match tokio::fs::File::open(path).await {
            Ok(file) => file,
            Err(err) => {
                return HashResult::failure(path, err.to_string(), 0, start.elapsed());
            }
        };

        let mut hasher = Hasher::new();
        let mut buffer = vec![0u8; READ_BUFFER_SIZE];
        let mut bytes_processed: u64 = 0;

        loop {
            if cancel.is_cancelled() {
                return HashResult::cancelled(path, bytes_processed, start.elapsed());
            }

            let bytes_read = match file.read(&mut buffer).await {
                Ok(n) => n,
                Err(err) => {
                    return HashResult::failure(
                        path,
                        err.to_string(),
                        bytes_processed,
                        start.elapsed(),
                    );
                }
            };
            if bytes_read == 0 {
                break;
            }

            hasher.update(&buffer[..bytes_read]);
            bytes_processed += bytes_read as u64;

            let _ = self.progress_tx.send(HashProgress::new(
                path.to_path_buf(),
                bytes_processed,
                total_bytes,
            ));
        }

        // Final report, pinned to the actual byte count.
        let _ = self.progress_tx.send(HashProgress::new(
            path.to_path_buf(),
            bytes_processed,
            bytes_processed,
        ));

        let hash = hasher.finalize().to_hex().to_string();
        HashResult::success(path, hash, bytes_processed, start.elapsed())
    }

    /// Hash a batch of files with bounded parallelism.
    ///
    /// Yields exactly one result per input path, in completion order.
    /// Cancellation stops new work from launching; paths not yet started
    /// still emit a cancelled failure so the count holds.
    pub fn hash_batch(
        &self,
        paths: Vec<PathBuf>,
        parallelism: usize,
        cancel: CancellationToken,
    ) -> ReceiverStream<HashResult> {
        let (tx, rx) = mpsc::channel(BATCH_CHANNEL_CAPACITY);
        let hasher = self.clone();
        let semaphore = Arc::new(Semaphore::new(parallelism.max(1)));

        tokio::spawn(async move {
            let mut workers = JoinSet::new();

            for path in paths {
                if cancel.is_cancelled() {
                    let result = HashResult::cancelled(&path, 0, std::time::Duration::ZERO);
                    if tx.send(result).await.is_err() {
                        return;
                    }
                    continue;
                }

                let Ok(permit) = semaphore.clone().acquire_owned().await else {
                    break;
                };
                let hasher = hasher.clone();
                let cancel = cancel.clone();
                let tx = tx.clone();
                workers.spawn(async move {
                    let result = hasher.hash_file(&path, &cancel).await;
                    drop(permit);
                    let _ = tx.send(result).await;
                });
            }

            while workers.join_next().await.is_some() {}
        });

        ReceiverStream::new(rx)
    }
}

impl Default for ContentHasher {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;
    use tokio_stream::StreamExt;

    #[tokio::test]
    async fn test_hash_matches_blake3() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("a.jpg");
        fs::write(&path, b"hello photosift").unwrap();

        let hasher = ContentHasher::new();
        let result = hasher.hash_file(&path, &CancellationToken::new()).await;

        assert!(result.success);
        assert_eq!(result.hash, blake3::hash(b"hello photosift").to_hex().to_string());
        assert_eq!(result.bytes_processed, 15);
    }

    #[tokio::test]
    async fn test_hash_is_lowercase_hex() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("a.jpg");
        fs::write(&path, b"data").unwrap();

        let hasher = ContentHasher::new();
        let result = hasher.hash_file(&path, &CancellationToken::new()).await;

        assert_eq!(result.hash.len(), 64);
        assert!(result
            .hash
            .chars()
            .all(|c| c.is_ascii_digit() || ('a'..='f').contains(&c)));
    }

    #[tokio::test]
    async fn test_identical_content_same_hash() {
        let temp = TempDir::new().unwrap();
        let first = temp.path().join("first.jpg");
        let second = temp.path().join("second.jpg");
        fs::write(&first, b"same bytes").unwrap();
        fs::write(&second, b"same bytes").unwrap();

        let hasher = ContentHasher::new();
        let cancel = CancellationToken::new();
        let a = hasher.hash_file(&first, &cancel).await;
        let b = hasher.hash_file(&second, &cancel).await;

        assert_eq!(a.hash, b.hash);
    }

    #[tokio::test]
    async fn test_different_content_different_hash() {
        let temp = TempDir::new().unwrap();
        let first = temp.path().join("first.jpg");
        let second = temp.path().join("second.jpg");
        fs::write(&first, b"one").unwrap();
        fs::write(&second, b"two").unwrap();

        let hasher = ContentHasher::new();
        let cancel = CancellationToken::new();
        let a = hasher.hash_file(&first, &cancel).await;
        let b = hasher.hash_file(&second, &cancel).await;

        assert_ne!(a.hash, b.hash);
    }

    #[tokio::test]
    async fn test_missing_file_is_failure_with_empty_hash() {
        let hasher = ContentHasher::new();
        let result = hasher
            .hash_file(Path::new("/no/such/file.jpg"), &CancellationToken::new())
            .await;

        assert!(!result.success);
        assert!(result.hash.is_empty());
        assert!(result.error.is_some());
    }

    #[tokio::test]
    async fn test_pre_cancelled_never_succeeds() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("big.jpg");
        fs::write(&path, vec![0u8; 1024 * 1024]).unwrap();

        let cancel = CancellationToken::new();
        cancel.cancel();

        let hasher = ContentHasher::new();
        let result = hasher.hash_file(&path, &cancel).await;

        assert!(!result.success);
        assert!(result.hash.is_empty());
        assert!(result.error.unwrap().contains("cancelled"));
    }

    #[tokio::test]
    async fn test_progress_final_report_is_complete() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("a.jpg");
        fs::write(&path, vec![1u8; 200_000]).unwrap();

        let hasher = ContentHasher::new();
        let mut progress_rx = hasher.subscribe();
        let result = hasher.hash_file(&path, &CancellationToken::new()).await;
        assert!(result.success);

        let mut last = None;
        while let Ok(progress) = progress_rx.try_recv() {
            last = Some(progress);
        }
        let last = last.unwrap();
        assert_eq!(last.bytes_processed, 200_000);
        assert_eq!(last.percent, 100.0);
    }

    async fn run_batch(parallelism: usize) {
        let temp = TempDir::new().unwrap();
        let mut paths = Vec::new();
        for i in 0..10 {
            let path = temp.path().join(format!("photo{i}.jpg"));
            fs::write(&path, format!("content {i}")).unwrap();
            paths.push(path);
        }

        let hasher = ContentHasher::new();
        let results: Vec<HashResult> = hasher
            .hash_batch(paths.clone(), parallelism, CancellationToken::new())
            .collect()
            .await;

        assert_eq!(results.len(), paths.len());
        assert!(results.iter().all(|r| r.success));

        let mut seen: Vec<&Path> = results.iter().map(|r| r.path.as_path()).collect();
        seen.sort();
        let mut expected: Vec<&Path> = paths.iter().map(|p| p.as_path()).collect();
        expected.sort();
        assert_eq!(seen, expected);
    }

    #[tokio::test]
    async fn test_batch_one_result_per_input_serial() {
        run_batch(1).await;
    }

    #[tokio::test]
    async fn test_batch_one_result_per_input_parallel() {
        run_batch(8).await;
    }

    #[tokio::test]
    async fn test_batch_failure_does_not_abort_rest() {
        let temp = TempDir::new().unwrap();
        let good = temp.path().join("good.jpg");
        fs::write(&good, b"fine").unwrap();
        let paths = vec![good.clone(), temp.path().join("missing.jpg")];

        let hasher = ContentHasher::new();
        let results: Vec<HashResult> = hasher
            .hash_batch(paths, 4, CancellationToken::new())
            .collect()
            .await;

        assert_eq!(results.len(), 2);
        assert_eq!(results.iter().filter(|r| r.success).count(), 1);
        assert_eq!(results.iter().filter(|r| !r.success).count(), 1);
    }

    #[tokio::test]
    async fn test_batch_cancelled_still_one_result_per_input() {
        let temp = TempDir::new().unwrap();
        let mut paths = Vec::new();
        for i in 0..5 {
            let path = temp.path().join(format!("photo{i}.jpg"));
            fs::write(&path, b"data").unwrap();
            paths.push(path);
        }

        let cancel = CancellationToken::new();
        cancel.cancel();

        let hasher = ContentHasher::new();
        let results: Vec<HashResult> = hasher.hash_batch(paths, 2, cancel).collect().await;

        assert_eq!(results.len(), 5);
        assert!(results.iter().all(|r| !r.success));
    }
}
