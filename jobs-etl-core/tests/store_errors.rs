use jobs_etl_core::error::{EtlError, FetchError, UploadError};
use jobs_etl_core::s3::classify_store_failure;

#[test]
fn test_forbidden_status_is_auth_error() {
    let err = classify_store_failure(Some(403), Some("AccessDenied"), "Access Denied".into());
    match err {
        UploadError::Auth { status, code, message } => {
            assert_eq!(status, Some(403));
            assert_eq!(code, "AccessDenied");
            assert_eq!(message, "Access Denied");
        }
        other => panic!("expected Auth, got {other:?}"),
    }
    assert_eq!(EtlError::from(classify_store_failure(Some(401), None, String::new())).kind(), "AuthError");
}

#[test]
fn test_credential_error_codes_are_auth_without_status() {
    for code in ["InvalidAccessKeyId", "SignatureDoesNotMatch", "ExpiredToken"] {
        let err = classify_store_failure(None, Some(code), "rejected".into());
        assert!(matches!(err, UploadError::Auth { .. }), "{code} should be Auth");
    }
}

#[test]
fn test_missing_bucket_is_storage_error() {
    let err = classify_store_failure(
        Some(404),
        Some("NoSuchBucket"),
        "The specified bucket does not exist".into(),
    );
    match &err {
        UploadError::Storage { status, code, .. } => {
            assert_eq!(*status, Some(404));
            assert_eq!(code, "NoSuchBucket");
        }
        other => panic!("expected Storage, got {other:?}"),
    }
    let text = err.to_string();
    assert!(text.contains("404") && text.contains("NoSuchBucket"), "{text}");
}

#[test]
fn test_transport_failure_without_status_is_storage_error() {
    let err = classify_store_failure(None, None, "dispatch failure".into());
    match &err {
        UploadError::Storage { status, code, .. } => {
            assert_eq!(*status, None);
            assert_eq!(code, "Unknown");
        }
        other => panic!("expected Storage, got {other:?}"),
    }
    assert!(err.to_string().contains("n/a"));
}

#[test]
fn test_etl_error_reports_stage_and_kind() {
    let api = EtlError::from(FetchError::Api {
        status: 500,
        reason: "Internal Server Error".into(),
        snippet: String::new(),
    });
    assert_eq!(api.stage(), "fetch");
    assert_eq!(api.kind(), "ApiError");

    let storage = EtlError::from(classify_store_failure(Some(500), Some("InternalError"), "boom".into()));
    assert_eq!(storage.stage(), "upload");
    assert_eq!(storage.kind(), "StorageError");
}
