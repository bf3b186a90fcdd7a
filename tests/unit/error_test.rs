//! Tests for error types

use prometheus_loadgate::core::{LoaderError, TransportError, UploadError, ValidationError};

#[test]
fn test_file_too_large_error() {
    let err = ValidationError::FileTooLarge { size: 12, limit: 10 };
    assert_eq!(format!("{}", err), "file too large: 12 bytes (limit 10)");
}

#[test]
fn test_unsupported_type_error() {
    let err = ValidationError::UnsupportedType {
        expected_prefix: "image/".to_string(),
        actual: "text/plain".to_string(),
    };
    assert_eq!(format!("{}", err), "unsupported file type `text/plain` (expected image/*)");
}

#[test]
fn test_too_many_files_error() {
    let err = ValidationError::TooManyFiles { existing: 8, incoming: 3, limit: 10 };
    assert_eq!(
        format!("{}", err),
        "too many files: 8 uploaded + 3 new exceeds limit 10"
    );
}

#[test]
fn test_transport_errors() {
    assert_eq!(
        format!("{}", TransportError::Upload("timeout".to_string())),
        "upload failed: timeout"
    );
    assert_eq!(
        format!("{}", TransportError::Remove("403".to_string())),
        "remove failed: 403"
    );
    assert_eq!(
        format!("{}", TransportError::Fetch("404".to_string())),
        "fetch failed: 404"
    );
}

#[test]
fn test_upload_error_is_transparent() {
    let err: UploadError = ValidationError::EmptyFile.into();
    assert!(err.is_validation());
    assert_eq!(format!("{}", err), "file is empty");

    let err: UploadError = TransportError::Upload("boom".to_string()).into();
    assert!(!err.is_validation());
    assert_eq!(format!("{}", err), "upload failed: boom");
}

#[test]
fn test_loader_errors() {
    assert_eq!(
        format!("{}", LoaderError::AlreadyAttached("observing".to_string())),
        "loader already attached (state: observing)"
    );
    assert_eq!(format!("{}", LoaderError::Detached), "loader detached");
}
