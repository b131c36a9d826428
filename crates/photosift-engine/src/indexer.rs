//! Indexing cycle orchestration.
//!
//! A cycle lists the enabled directories from the catalog and processes
//! them under a bounded worker pool. Per directory the pipeline is
//! scan, reindex check, hash, metadata extraction, batch ingest.

use std::collections::{HashMap, HashSet};
use std::path::{Path, PathBuf};
use std::sync::Arc;

use thiserror::Error;
use tokio::sync::Semaphore;
use tokio::task::JoinSet;
use tokio_stream::StreamExt;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use photosift_catalog::{CatalogApi, CatalogError, FileCheck, FileIngest, ScanDirectory};
use photosift_core::{DirectoryResult, EngineConfig, HashResult, ScanError, ScannedFile};
use photosift_hash::ContentHasher;
use photosift_media::MetadataExtractor;
use photosift_scan::ImageScanner;

use crate::session::ScanSession;

/// Fatal errors for an indexing cycle.
///
/// Per-directory problems never surface here; they become failed
/// [`DirectoryResult`]s instead.
#[derive(Debug, Error)]
pub enum EngineError {
    /// The catalog could not provide the directory list.
    #[error("Failed to list enabled directories: {0}")]
    DirectoryListing(#[source] CatalogError),

    /// The cycle was cancelled.
    #[error("Indexing cycle cancelled")]
    Cancelled,
}

/// Drives indexing cycles against a catalog service.
#[derive(Clone)]
pub struct Indexer {
    catalog: Arc<dyn CatalogApi>,
    session: Arc<ScanSession>,
    hasher: ContentHasher,
    extractor: MetadataExtractor,
    config: EngineConfig,
}

impl Indexer {
    /// Create an indexer talking to the given catalog.
    pub fn new(catalog: Arc<dyn CatalogApi>, config: EngineConfig) -> Self {
        Self {
            catalog,
            session: Arc::new(ScanSession::new()),
            hasher: ContentHasher::new(),
            extractor: MetadataExtractor::new(),
            config,
        }
    }

    /// The session tracking this indexer's cycle state.
    pub fn session(&self) -> &ScanSession {
        &self.session
    }

    /// Subscribe to per-file hash progress.
    pub fn subscribe_hash_progress(&self) -> tokio::sync::broadcast::Receiver<photosift_hash::HashProgress> {
        self.hasher.subscribe()
    }

    /// Run one full indexing cycle.
    ///
    /// Starts a fresh session, fetches the enabled directories, and
    /// processes them concurrently. Results arrive in completion order.
    pub async fn run_cycle(
        &self,
        cancel: &CancellationToken,
    ) -> Result<Vec<DirectoryResult>, EngineError> {
        let session_id = self.session.start_new_session();
        info!(%session_id, "starting indexing cycle");

        let directories = self
            .catalog
            .enabled_directories()
            .await
            .map_err(EngineError::DirectoryListing)?;
        info!(count = directories.len(), "fetched enabled directories");

        if cancel.is_cancelled() {
            return Err(EngineError::Cancelled);
        }

        let semaphore = Arc::new(Semaphore::new(self.config.directory_parallelism));
        let mut workers: JoinSet<DirectoryResult> = JoinSet::new();

        for directory in directories {
            if cancel.is_cancelled() {
                break;
            }
            let Ok(permit) = semaphore.clone().acquire_owned().await else {
                break;
            };
            let indexer = self.clone();
            let cancel = cancel.clone();
            workers.spawn(async move {
                let result = indexer.index_directory(directory, &cancel).await;
                drop(permit);
                result
            });
        }

        let mut results = Vec::new();
        while let Some(joined) = workers.join_next().await {
            match joined {
                Ok(result) => results.push(result),
                Err(err) => warn!("directory worker panicked: {err}"),
            }
        }

        if cancel.is_cancelled() {
            return Err(EngineError::Cancelled);
        }
        Ok(results)
    }

    /// Index a single configured directory.
    pub async fn index_directory(
        &self,
        directory: ScanDirectory,
        cancel: &CancellationToken,
    ) -> DirectoryResult {
        let path = PathBuf::from(&directory.path);

        // A directory nested under an already-scanned one needs no walk
        // and no catalog traffic.
        if self.session.is_path_covered_by_scanned_directory(&path) {
            debug!(path = %path.display(), "directory covered by earlier scan, skipping");
            return DirectoryResult::skipped(directory.id, path);
        }

        if !path.is_dir() {
            return DirectoryResult::failure(
                directory.id,
                path,
                "directory does not exist on disk",
            );
        }

        let (files_scanned, candidates) = match self
            .scan_directory(&path, directory.include_subdirectories, cancel)
            .await
        {
            Ok(scanned) => scanned,
            Err(ScanError::Cancelled) => {
                return DirectoryResult::failure(directory.id, path, "scan cancelled");
            }
            Err(err) => {
                return DirectoryResult::failure(directory.id, path, err.to_string());
            }
        };

        let candidates = self.filter_reindex_candidates(candidates).await;

        if cancel.is_cancelled() {
            return DirectoryResult::failure(directory.id, path, "indexing cancelled");
        }

        let ingests = self.process_files(&candidates, cancel).await;

        if cancel.is_cancelled() {
            return DirectoryResult::failure(directory.id, path, "indexing cancelled");
        }

        let submitted: Vec<PathBuf> = ingests.iter().map(|i| PathBuf::from(&i.file_path)).collect();
        let result = if ingests.is_empty() {
            DirectoryResult::success(directory.id, &path, files_scanned, 0)
        } else {
            match self.catalog.ingest_batch(ingests).await {
                Ok(summary) => {
                    for file in &submitted {
                        self.session.mark_file_processed(file);
                    }
                    info!(
                        path = %path.display(),
                        scanned = files_scanned,
                        succeeded = summary.succeeded,
                        failed = summary.failed,
                        "directory ingested"
                    );
                    DirectoryResult::success(directory.id, &path, files_scanned, summary.succeeded)
                }
                Err(err) => {
                    warn!(path = %path.display(), "batch ingest failed: {err}");
                    DirectoryResult {
                        directory_id: directory.id,
                        path: path.clone(),
                        success: false,
                        files_scanned,
                        files_processed: 0,
                        error: Some(format!("batch ingest failed: {err}")),
                    }
                }
            }
        };

        // The walk finished, so the directory counts as scanned for the
        // rest of the cycle even when nothing was ingested.
        self.session.mark_directory_scanned(&path);
        if let Err(err) = self.catalog.update_last_scanned(directory.id).await {
            warn!(directory_id = directory.id, "failed to update last-scanned: {err}");
        }

        result
    }

    /// Walk the directory, returning the scan count and the files not
    /// yet processed this cycle.
    async fn scan_directory(
        &self,
        path: &Path,
        recursive: bool,
        cancel: &CancellationToken,
    ) -> Result<(u64, Vec<ScannedFile>), ScanError> {
        let scanner = ImageScanner::with_filter(self.config.filter.clone());
        let mut stream = scanner.scan(path, recursive, cancel.clone());

        let mut files_scanned: u64 = 0;
        let mut candidates = Vec::new();
        while let Some(item) = stream.next().await {
            match item {
                Ok(file) => {
                    files_scanned += 1;
                    if !self.session.is_file_processed(&file.path) {
                        candidates.push(file);
                    }
                }
                Err(ScanError::Cancelled) => return Err(ScanError::Cancelled),
                Err(err) => warn!("scan error: {err}"),
            }
        }
        Ok((files_scanned, candidates))
    }

    /// Ask the catalog which candidates need processing. On any failure
    /// the check fails open and every candidate stays in.
    async fn filter_reindex_candidates(&self, candidates: Vec<ScannedFile>) -> Vec<ScannedFile> {
        if candidates.is_empty() {
            return candidates;
        }

        let checks: Vec<FileCheck> = candidates
            .iter()
            .map(|file| FileCheck {
                file_path: file.path.to_string_lossy().into_owned(),
                modified_at: file.modified,
            })
            .collect();

        match self.catalog.check_reindex(checks).await {
            Ok(statuses) => {
                let needed: HashSet<String> = statuses
                    .into_iter()
                    .filter(|status| status.needs_reindex)
                    .map(|status| status.file_path)
                    .collect();
                candidates
                    .into_iter()
                    .filter(|file| needed.contains(file.path.to_string_lossy().as_ref()))
                    .collect()
            }
            Err(err) => {
                warn!("reindex check failed, processing all candidates: {err}");
                candidates
            }
        }
    }

    /// Hash candidates, extract metadata, and build ingest records.
    /// Files whose hash fails are dropped with a warning.
    async fn process_files(
        &self,
        candidates: &[ScannedFile],
        cancel: &CancellationToken,
    ) -> Vec<FileIngest> {
        if candidates.is_empty() {
            return Vec::new();
        }

        let by_path: HashMap<&Path, &ScannedFile> = candidates
            .iter()
            .map(|file| (file.path.as_path(), file))
            .collect();

        let paths: Vec<PathBuf> = candidates.iter().map(|file| file.path.clone()).collect();
        let hashes: Vec<HashResult> = self
            .hasher
            .hash_batch(paths, self.config.hash_parallelism, cancel.clone())
            .collect()
            .await;

        let mut ingests = Vec::new();
        for hash in hashes {
            if !hash.success {
                warn!(path = %hash.path.display(), "hash failed: {}", hash.error.as_deref().unwrap_or("unknown"));
                continue;
            }
            let Some(file) = by_path.get(hash.path.as_path()) else {
                continue;
            };

            let metadata = self.extractor.extract(&file.path, cancel).await;
            let mut ingest = FileIngest::new(
                file.path.to_string_lossy().into_owned(),
                file.file_name(),
                hash.hash,
                file.size,
            );
            if metadata.success {
                ingest = ingest.with_metadata(&metadata);
                if self.config.generate_thumbnails {
                    if let Some(bytes) = self
                        .extractor
                        .generate_thumbnail(&file.path, self.config.thumbnails, cancel)
                        .await
                    {
                        ingest = ingest.with_thumbnail(&bytes);
                    }
                }
            } else {
                debug!(path = %file.path.display(), "metadata extraction failed, ingesting hash only");
            }
            ingests.push(ingest);
        }
        ingests
    }
}
