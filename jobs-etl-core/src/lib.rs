#![doc = "jobs-etl-core: core pipeline library for jobs-etl."]

//! This crate holds the data model, the two I/O contracts and their concrete
//! implementations, and the orchestration that chains them.
//!
//! # Usage
//! Load a [`config::PipelineConfig`], build an [`fetch::ApiJobSource`] and an
//! [`s3::S3ObjectStore`] from it, then call [`pipeline::run_pipeline`].

pub mod config;
pub mod contract;
pub mod csv_writer;
pub mod error;
pub mod extract;
pub mod fetch;
pub mod pipeline;
pub mod s3;
