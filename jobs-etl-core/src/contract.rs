//! # contract: the two I/O seams of the pipeline
//!
//! The pipeline touches the outside world in exactly two places: reading job listings
//! from the upstream API ([`JobSource`]) and writing the CSV to object storage
//! ([`ObjectStore`]). Both are traits so that the orchestration in
//! [`crate::pipeline`] can be exercised against deterministic mocks.
//!
//! ## Mocking & Testing
//! - Both traits are annotated for `mockall`; enable the `test-export-mocks` feature
//!   (on by default) to use `MockJobSource` / `MockObjectStore` from integration tests.
//!
//! ## Implementations
//! - [`crate::fetch::ApiJobSource`]: reqwest client against the public jobs API.
//! - [`crate::s3::S3ObjectStore`]: aws-sdk-s3 client.

use async_trait::async_trait;
use mockall::automock;
use serde::{Deserialize, Serialize};

use crate::error::{FetchError, UploadError};

/// One job entry exactly as returned by the API. Only guaranteed to be JSON.
pub type RawJobRecord = serde_json::Value;

/// The five-column projection of a job written to CSV.
///
/// Field order here is the column order of the CSV.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct NormalizedJobRecord {
    pub publication_date: String,
    pub name: String,
    pub job_type: String,
    pub location: String,
    pub company: String,
}

/// A single object write.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PutObject {
    pub bucket: String,
    pub key: String,
    pub content_type: String,
    pub body: Vec<u8>,
}

/// What the store reported back for a successful write.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct UploadResult {
    pub bucket: String,
    pub key: String,
    pub etag: Option<String>,
    pub version_id: Option<String>,
}

/// Source of raw job listings.
#[cfg_attr(any(test, feature = "test-export-mocks"), automock)]
#[async_trait]
pub trait JobSource: Send + Sync {
    /// Fetch the configured page. Single attempt, no retry.
    async fn fetch(&self) -> Result<Vec<RawJobRecord>, FetchError>;
}

/// Destination for the produced CSV.
#[cfg_attr(any(test, feature = "test-export-mocks"), automock)]
#[async_trait]
pub trait ObjectStore: Send + Sync {
    /// Create or overwrite `req.key` in `req.bucket` with `req.body`.
    async fn put_object(&self, req: PutObject) -> Result<UploadResult, UploadError>;
}
