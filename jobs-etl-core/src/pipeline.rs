//! High-level pipeline: orchestrates fetch → extract → CSV → upload for one page of jobs.
//!
//! # Responsibilities
//! - Fail-fast orchestration: the first failing step returns its error unchanged
//! - A failed fetch means no CSV is built; a failed serialization means no upload is attempted
//! - Logs every step inside a `pipeline` span for traceability
//!
//! # Callable From
//! - The CLI crate, with [`ApiJobSource`](crate::fetch::ApiJobSource) and
//!   [`S3ObjectStore`](crate::s3::S3ObjectStore)
//! - Integration tests, with `MockJobSource` / `MockObjectStore`

use std::path::PathBuf;

use serde::Serialize;
use tracing::{error, info, info_span, Instrument};

use crate::config::PipelineConfig;
use crate::contract::{JobSource, ObjectStore, PutObject, UploadResult};
use crate::csv_writer::{write_csv, CONTENT_TYPE};
use crate::error::EtlError;
use crate::extract::{extract, ExtractOptions};

/// Summary of a successful run.
#[derive(Debug, Clone, Serialize)]
pub struct PipelineReport {
    pub records_written: usize,
    pub records_skipped: usize,
    pub payload_bytes: usize,
    pub payload_sha256: String,
    pub local_file: Option<PathBuf>,
    pub upload: UploadResult,
}

pub async fn run_pipeline<S, U>(
    config: &PipelineConfig,
    source: &S,
    store: &U,
) -> Result<PipelineReport, EtlError>
where
    S: JobSource + ?Sized,
    U: ObjectStore + ?Sized,
{
    let span = info_span!("pipeline", page = config.api.page, bucket = %config.storage.bucket);
    run_steps(config, source, store).instrument(span).await
}

async fn run_steps<S, U>(
    config: &PipelineConfig,
    source: &S,
    store: &U,
) -> Result<PipelineReport, EtlError>
where
    S: JobSource + ?Sized,
    U: ObjectStore + ?Sized,
{
    // --- Step 1: Fetch ---
    info!("[PIPELINE] Fetching job listings");
    let raw = source.fetch().await.map_err(|e| {
        error!(error = %e, "[PIPELINE][ERROR] Fetch failed");
        EtlError::from(e)
    })?;

    // --- Step 2: Extract ---
    let options = ExtractOptions {
        date_only: config.output.date_only,
    };
    let extraction = extract(raw, &options);
    info!(
        records = extraction.records.len(),
        skipped = extraction.skipped,
        "[PIPELINE] Extracted job fields"
    );

    // --- Step 3: Serialize ---
    let payload = write_csv(&extraction.records).map_err(|e| {
        error!(error = %e, "[PIPELINE][ERROR] CSV serialization failed");
        EtlError::from(e)
    })?;
    let local_file = if config.output.keep_local {
        let path = config.output.local_path();
        payload.save(&path).map_err(|e| {
            error!(error = %e, "[PIPELINE][ERROR] Saving local CSV failed");
            EtlError::from(e)
        })?;
        Some(path)
    } else {
        None
    };
    let payload_bytes = payload.len();
    let payload_sha256 = payload.sha256_hex();
    info!(rows = payload.rows(), bytes = payload_bytes, sha256 = %payload_sha256, "[PIPELINE] CSV built");

    // --- Step 4: Upload ---
    let request = PutObject {
        bucket: config.storage.bucket.clone(),
        key: config.storage.key.clone(),
        content_type: CONTENT_TYPE.to_string(),
        body: payload.into_bytes(),
    };
    let upload = store.put_object(request).await.map_err(|e| {
        error!(error = %e, "[PIPELINE][ERROR] Upload failed");
        EtlError::from(e)
    })?;
    info!(bucket = %upload.bucket, key = %upload.key, "[PIPELINE] Upload done");

    Ok(PipelineReport {
        records_written: extraction.records.len(),
        records_skipped: extraction.skipped,
        payload_bytes,
        payload_sha256,
        local_file,
        upload,
    })
}
