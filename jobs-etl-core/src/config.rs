use std::path::PathBuf;
use std::time::Duration;

use secrecy::SecretString;
use tracing::{debug, info};

pub const DEFAULT_RESULTS_KEY: &str = "results";
pub const DEFAULT_API_TIMEOUT: Duration = Duration::from_secs(30);
pub const DEFAULT_STORAGE_TIMEOUT: Duration = Duration::from_secs(60);

/// Fully resolved configuration for one run. Built once by the loader and then only borrowed.
#[derive(Debug, Clone)]
pub struct PipelineConfig {
    pub api: ApiConfig,
    pub output: OutputConfig,
    pub storage: StorageConfig,
    pub credentials: Credentials,
}

impl PipelineConfig {
    pub fn trace_loaded(&self) {
        info!(
            base_url = %self.api.base_url,
            page = self.api.page,
            bucket = %self.storage.bucket,
            key = %self.storage.key,
            region = %self.storage.region,
            "Loaded PipelineConfig"
        );
        debug!(?self, "PipelineConfig loaded (full debug)");
    }
}

#[derive(Debug, Clone)]
pub struct ApiConfig {
    pub base_url: reqwest::Url,
    pub page: u32,
    /// Key of the job list in the response object.
    pub results_key: String,
    pub timeout: Duration,
}

#[derive(Debug, Clone)]
pub struct OutputConfig {
    pub file_name: String,
    /// Also write the CSV to `file_name` on local disk.
    pub keep_local: bool,
    /// Reduce `publication_date` to its `YYYY-MM-DD` part.
    pub date_only: bool,
}

impl OutputConfig {
    pub fn local_path(&self) -> PathBuf {
        PathBuf::from(&self.file_name)
    }
}

#[derive(Debug, Clone)]
pub struct StorageConfig {
    pub bucket: String,
    /// Final object key (any folder prefix already resolved).
    pub key: String,
    pub region: String,
    /// Custom endpoint for S3-compatible stores. Path-style addressing is used when set.
    pub endpoint_url: Option<String>,
    pub timeout: Duration,
}

/// Static object-store credentials. `SecretString` keeps the secret parts out of `Debug` output.
#[derive(Debug, Clone)]
pub struct Credentials {
    pub access_key_id: String,
    pub secret_access_key: SecretString,
    pub session_token: Option<SecretString>,
}
