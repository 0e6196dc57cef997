//! CSV Writer: serializes normalized records into an in-memory payload.

use std::fs;
use std::path::Path;

use sha2::{Digest, Sha256};
use tracing::{debug, info};

use crate::contract::NormalizedJobRecord;
use crate::error::SerializationError;

/// Column names in output order.
pub const HEADER: [&str; 5] = ["publication_date", "name", "job_type", "location", "company"];

pub const CONTENT_TYPE: &str = "text/csv";

/// UTF-8 CSV text: a header row followed by one row per record.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CsvPayload {
    bytes: Vec<u8>,
    rows: usize,
}

impl CsvPayload {
    pub fn as_bytes(&self) -> &[u8] {
        &self.bytes
    }

    pub fn into_bytes(self) -> Vec<u8> {
        self.bytes
    }

    /// Data rows, excluding the header.
    pub fn rows(&self) -> usize {
        self.rows
    }

    pub fn len(&self) -> usize {
        self.bytes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }

    /// Hex-encoded SHA-256 of the payload bytes.
    pub fn sha256_hex(&self) -> String {
        let mut hasher = Sha256::new();
        hasher.update(&self.bytes);
        format!("{:x}", hasher.finalize())
    }

    /// Writes a local copy of the payload.
    pub fn save(&self, path: &Path) -> Result<(), SerializationError> {
        fs::write(path, &self.bytes).map_err(|e| SerializationError::Io {
            path: path.to_path_buf(),
            source: e,
        })?;
        info!(path = %path.display(), bytes = self.bytes.len(), "CSV saved to local file");
        Ok(())
    }
}

/// Serializes `records` with RFC-4180 quoting. Empty input yields the header alone.
pub fn write_csv(records: &[NormalizedJobRecord]) -> Result<CsvPayload, SerializationError> {
    let mut writer = csv::WriterBuilder::new()
        .has_headers(false)
        .from_writer(Vec::new());

    // Written explicitly so an empty record list still gets a header.
    writer.write_record(HEADER)?;
    for record in records {
        writer.serialize(record)?;
    }
    let bytes = writer
        .into_inner()
        .map_err(|e| SerializationError::Csv(e.into_error().into()))?;

    debug!(rows = records.len(), bytes = bytes.len(), "CSV payload built");
    Ok(CsvPayload {
        bytes,
        rows: records.len(),
    })
}
