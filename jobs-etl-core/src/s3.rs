//! Object Store Uploader backed by `aws-sdk-s3`.
//!
//! The client is built from the explicit [`StorageConfig`] and [`Credentials`] only;
//! nothing is read from the ambient AWS environment or profile files. SDK retries are
//! disabled so each upload is a single attempt.

use async_trait::async_trait;
use aws_sdk_s3::config::retry::RetryConfig;
use aws_sdk_s3::config::timeout::TimeoutConfig;
use aws_sdk_s3::config::http::HttpResponse;
use aws_sdk_s3::config::{BehaviorVersion, Credentials as S3Credentials, Region};
use aws_sdk_s3::error::{DisplayErrorContext, ProvideErrorMetadata, SdkError};
use aws_sdk_s3::operation::put_object::PutObjectError;
use aws_sdk_s3::primitives::ByteStream;
use aws_sdk_s3::Client;
use secrecy::ExposeSecret;
use tracing::{error, info};

use crate::config::{Credentials, StorageConfig};
use crate::contract::{ObjectStore, PutObject, UploadResult};
use crate::error::UploadError;

/// S3 error codes that mean the credentials themselves were refused.
pub const AUTH_ERROR_CODES: [&str; 6] = [
    "AccessDenied",
    "InvalidAccessKeyId",
    "SignatureDoesNotMatch",
    "ExpiredToken",
    "InvalidToken",
    "TokenRefreshRequired",
];

pub struct S3ObjectStore {
    client: Client,
}

impl S3ObjectStore {
    pub fn new(storage: &StorageConfig, credentials: &Credentials) -> Self {
        let credential = S3Credentials::new(
            &credentials.access_key_id,
            credentials.secret_access_key.expose_secret(),
            credentials
                .session_token
                .as_ref()
                .map(|token| token.expose_secret().to_string()),
            None,
            "jobs-etl",
        );
        let timeouts = TimeoutConfig::builder()
            .operation_timeout(storage.timeout)
            .build();

        let mut builder = aws_sdk_s3::Config::builder()
            .behavior_version(BehaviorVersion::latest())
            .region(Region::new(storage.region.clone()))
            .credentials_provider(credential)
            .retry_config(RetryConfig::disabled())
            .timeout_config(timeouts);
        if let Some(endpoint) = &storage.endpoint_url {
            builder = builder.endpoint_url(endpoint).force_path_style(true);
        }

        info!(
            region = %storage.region,
            endpoint = storage.endpoint_url.as_deref().unwrap_or("aws"),
            "Initialized S3 client"
        );
        Self {
            client: Client::from_conf(builder.build()),
        }
    }
}

/// Maps a failed store call onto the error taxonomy: refused credentials become
/// [`UploadError::Auth`], everything else [`UploadError::Storage`].
pub fn classify_store_failure(
    status: Option<u16>,
    code: Option<&str>,
    message: String,
) -> UploadError {
    let is_auth = matches!(status, Some(401) | Some(403))
        || code.is_some_and(|c| AUTH_ERROR_CODES.contains(&c));
    let code = code.unwrap_or("Unknown").to_string();
    if is_auth {
        UploadError::Auth {
            status,
            code,
            message,
        }
    } else {
        UploadError::Storage {
            status,
            code,
            message,
        }
    }
}

fn upload_error(err: &SdkError<PutObjectError, HttpResponse>) -> UploadError {
    let status = err.raw_response().map(|raw| raw.status().as_u16());
    let message = err
        .message()
        .map(str::to_string)
        .unwrap_or_else(|| DisplayErrorContext(err).to_string());
    classify_store_failure(status, err.code(), message)
}

#[async_trait]
impl ObjectStore for S3ObjectStore {
    async fn put_object(&self, req: PutObject) -> Result<UploadResult, UploadError> {
        info!(
            bucket = %req.bucket,
            key = %req.key,
            bytes = req.body.len(),
            "Uploading object to S3"
        );

        let output = self
            .client
            .put_object()
            .bucket(&req.bucket)
            .key(&req.key)
            .content_type(&req.content_type)
            .body(ByteStream::from(req.body))
            .send()
            .await
            .map_err(|e| {
                let classified = upload_error(&e);
                error!(
                    error = %DisplayErrorContext(&e),
                    bucket = %req.bucket,
                    key = %req.key,
                    "S3 PutObject failed"
                );
                classified
            })?;

        let result = UploadResult {
            bucket: req.bucket,
            key: req.key,
            etag: output.e_tag().map(str::to_string),
            version_id: output.version_id().map(str::to_string),
        };
        info!(etag = ?result.etag, version_id = ?result.version_id, "S3 upload done");
        Ok(result)
    }
}
