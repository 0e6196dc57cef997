//! Error taxonomy for the pipeline.
//!
//! Each stage has its own error type. [`EtlError`] wraps them at the top level and
//! reports which stage failed and what kind of failure it was, so the CLI can print
//! a single line without inspecting the inner variants.

use std::path::PathBuf;

use thiserror::Error;

/// Maximum number of characters of a response body carried in an [`FetchError::Api`].
pub const BODY_SNIPPET_CHARS: usize = 200;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config file {path:?}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to parse config YAML: {0}")]
    Parse(String),
    #[error("missing required config key `{0}`")]
    MissingKey(&'static str),
    #[error("invalid value for config key `{key}`: {reason}")]
    Invalid { key: &'static str, reason: String },
}

#[derive(Debug, Error)]
pub enum SecretsError {
    #[error("failed to read secrets file {path:?}: {reason}")]
    File { path: PathBuf, reason: String },
    #[error("secret `{0}` is not set")]
    Missing(&'static str),
    #[error("secret `{0}` is empty")]
    Empty(&'static str),
}

#[derive(Debug, Error)]
pub enum FetchError {
    #[error("request to {url} failed: {source}")]
    Network {
        url: String,
        #[source]
        source: reqwest::Error,
    },
    #[error("API responded with status {status}: {reason} (body: {snippet})")]
    Api {
        status: u16,
        reason: String,
        snippet: String,
    },
}

#[derive(Debug, Error)]
pub enum SerializationError {
    #[error("failed to encode CSV: {0}")]
    Csv(#[from] csv::Error),
    #[error("failed to write CSV file {path:?}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

#[derive(Debug, Error)]
pub enum UploadError {
    #[error("object store rejected credentials ({code}): {message}")]
    Auth {
        status: Option<u16>,
        code: String,
        message: String,
    },
    #[error("object store error (status {}, code {code}): {message}", display_status(.status))]
    Storage {
        status: Option<u16>,
        code: String,
        message: String,
    },
}

#[derive(Debug, Error)]
pub enum EtlError {
    #[error(transparent)]
    Config(#[from] ConfigError),
    #[error(transparent)]
    Secrets(#[from] SecretsError),
    #[error(transparent)]
    Fetch(#[from] FetchError),
    #[error(transparent)]
    Serialization(#[from] SerializationError),
    #[error(transparent)]
    Upload(#[from] UploadError),
}

impl EtlError {
    /// Pipeline stage the error originated in.
    pub fn stage(&self) -> &'static str {
        match self {
            EtlError::Config(_) => "config",
            EtlError::Secrets(_) => "secrets",
            EtlError::Fetch(_) => "fetch",
            EtlError::Serialization(_) => "serialize",
            EtlError::Upload(_) => "upload",
        }
    }

    pub fn kind(&self) -> &'static str {
        match self {
            EtlError::Config(_) => "ConfigError",
            EtlError::Secrets(_) => "SecretsError",
            EtlError::Fetch(FetchError::Network { .. }) => "NetworkError",
            EtlError::Fetch(FetchError::Api { .. }) => "ApiError",
            EtlError::Serialization(_) => "SerializationError",
            EtlError::Upload(UploadError::Auth { .. }) => "AuthError",
            EtlError::Upload(UploadError::Storage { .. }) => "StorageError",
        }
    }
}

fn display_status(status: &Option<u16>) -> String {
    status.map_or_else(|| "n/a".to_string(), |s| s.to_string())
}

/// Cuts `body` down to [`BODY_SNIPPET_CHARS`] characters for diagnostics.
pub fn body_snippet(body: &str) -> String {
    match body.char_indices().nth(BODY_SNIPPET_CHARS) {
        Some((idx, _)) => format!("{}...", &body[..idx]),
        None => body.to_string(),
    }
}
