//! HTTP implementation of the catalog API.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use thiserror::Error;

use crate::models::{FileCheck, FileIngest, IngestSummary, ReindexStatus, ScanDirectory};

/// Request timeout applied at the client level; callers never carry
/// their own timeouts.
const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

/// Errors from talking to the catalog service.
#[derive(Debug, Error)]
pub enum CatalogError {
    /// Transport failure or non-success status.
    #[error("Catalog request failed: {0}")]
    Request(#[from] reqwest::Error),

    /// The service could not serve the request.
    #[error("Catalog unavailable: {0}")]
    Unavailable(String),
}

/// The catalog operations the indexing engine depends on.
#[async_trait]
pub trait CatalogApi: Send + Sync {
    /// Directories currently enabled for indexing.
    async fn enabled_directories(&self) -> Result<Vec<ScanDirectory>, CatalogError>;

    /// Ask which of the given files need reprocessing.
    async fn check_reindex(
        &self,
        files: Vec<FileCheck>,
    ) -> Result<Vec<ReindexStatus>, CatalogError>;

    /// Submit a batch of processed files.
    async fn ingest_batch(&self, files: Vec<FileIngest>) -> Result<IngestSummary, CatalogError>;

    /// Record that a directory pass just finished.
    async fn update_last_scanned(&self, directory_id: i64) -> Result<(), CatalogError>;
}

/// JSON-over-HTTP catalog client.
pub struct HttpCatalogClient {
    client: Client,
    base_url: String,
}

impl HttpCatalogClient {
    /// Create a client for the catalog at `base_url`.
    pub fn new(base_url: impl Into<String>) -> Result<Self, CatalogError> {
        let base_url = base_url.into().trim_end_matches('/').to_string();
        let client = Client::builder().timeout(REQUEST_TIMEOUT).build()?;
        Ok(Self { client, base_url })
    }

    /// Base URL this client talks to.
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn url(&self, path: &str) -> String {
        format!("{}{path}", self.base_url)
    }
}

#[async_trait]
impl CatalogApi for HttpCatalogClient {
    async fn enabled_directories(&self) -> Result<Vec<ScanDirectory>, CatalogError> {
        let directories = self
            .client
            .get(self.url("/api/scan-directories/enabled"))
            .send()
            .await?
            .error_for_status()?
            .json()
            .await?;
        Ok(directories)
    }

    async fn check_reindex(
        &self,
        files: Vec<FileCheck>,
    ) -> Result<Vec<ReindexStatus>, CatalogError> {
        let statuses = self
            .client
            .post(self.url("/api/files/check-reindex"))
            .json(&files)
            .send()
            .await?
            .error_for_status()?
            .json()
            .await?;
        Ok(statuses)
    }

    async fn ingest_batch(&self, files: Vec<FileIngest>) -> Result<IngestSummary, CatalogError> {
        let summary = self
            .client
            .post(self.url("/api/files/batch-ingest"))
            .json(&files)
            .send()
            .await?
            .error_for_status()?
            .json()
            .await?;
        Ok(summary)
    }

    async fn update_last_scanned(&self, directory_id: i64) -> Result<(), CatalogError> {
        self.client
            .post(self.url(&format!("/api/scan-directories/{directory_id}/last-scanned")))
            .send()
            .await?
            .error_for_status()?;
        Ok(())
    }
}
