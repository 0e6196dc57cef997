//! # jobs-etl CLI Interface (Module)
//!
//! Command parsing and the async entrypoint. All pipeline logic lives in
//! [`jobs-etl-core`]; this module loads configuration, wires the concrete API client
//! and S3 store, and turns the outcome into user-visible output.
//!
//! - For command-line users: run the `jobs-etl` binary, optionally with `--config` / `--secrets`.
//! - For programmatic/integration use: call [`run`] with a constructed [`Cli`].
//!
//! [`jobs-etl-core`]: ../../jobs_etl_core/
use std::path::PathBuf;

use anyhow::Result;
use clap::Parser;
use jobs_etl_core::error::EtlError;
use jobs_etl_core::fetch::ApiJobSource;
use jobs_etl_core::pipeline::{run_pipeline, PipelineReport};
use jobs_etl_core::s3::S3ObjectStore;

use crate::load_config::load_config;

/// CLI for jobs-etl: fetch one page of job listings, write them as CSV and upload to S3.
#[derive(Parser, Debug)]
#[clap(
    name = "jobs-etl",
    version,
    about = "Fetch job listings from the jobs API, write them as CSV and upload the file to an S3 bucket"
)]
pub struct Cli {
    /// Path to the YAML config file
    #[clap(long, short, default_value = "config.yaml")]
    pub config: PathBuf,

    /// Dotenv-format file holding ACCESS_KEY / SECRET_ACCESS_KEY / SESSION_TOKEN.
    /// The process environment is used when omitted.
    #[clap(long)]
    pub secrets: Option<PathBuf>,

    /// Log diagnostics to stderr (-v info, -vv debug). RUST_LOG takes precedence.
    #[clap(short, long, action = clap::ArgAction::Count)]
    pub verbose: u8,
}

impl Cli {
    /// Default log filter for the chosen verbosity. Without `-v` only the
    /// one-line outcome is printed.
    pub fn log_filter(&self) -> &'static str {
        match self.verbose {
            0 => "off",
            1 => "info",
            _ => "debug",
        }
    }
}

/// The single stderr line for a failed run.
pub fn failure_line(err: &EtlError) -> String {
    format!("[ERROR] {} stage failed ({}): {}", err.stage(), err.kind(), err)
}

fn summary_line(report: &PipelineReport) -> String {
    let mut line = format!(
        "Uploaded {} job records to s3://{}/{}",
        report.records_written, report.upload.bucket, report.upload.key
    );
    if report.records_skipped > 0 {
        line.push_str(&format!(" ({} skipped)", report.records_skipped));
    }
    if let Some(etag) = &report.upload.etag {
        line.push_str(&format!(" etag={etag}"));
    }
    line
}

async fn execute(cli: &Cli) -> Result<PipelineReport, EtlError> {
    let config = load_config(&cli.config, cli.secrets.as_deref())?;
    let source = ApiJobSource::new(&config.api)?;
    let store = S3ObjectStore::new(&config.storage, &config.credentials);
    run_pipeline(&config, &source, &store).await
}

/// Extracted async CLI logic entrypoint for integration tests and main()
pub async fn run(cli: Cli) -> Result<()> {
    // Emit a top-level 'trace_initialised' event at the very start
    tracing::info!("trace_initialised");

    match execute(&cli).await {
        Ok(report) => {
            tracing::info!(?report, "Pipeline complete");
            println!("{}", summary_line(&report));
            Ok(())
        }
        Err(e) => {
            tracing::error!(stage = e.stage(), kind = e.kind(), error = ?e, "Pipeline failed");
            eprintln!("{}", failure_line(&e));
            Err(anyhow::Error::new(e))
        }
    }
}
