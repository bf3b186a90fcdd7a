//! Tests for in-memory storage and fetcher backends

use prometheus_loadgate::core::{ObjectStorage, ResourceFetcher, TransportError, UploadFile};
use prometheus_loadgate::infra::{InMemoryFetcher, InMemoryStorage};

#[tokio::test]
async fn test_storage_upload_and_remove() {
    let storage = InMemoryStorage::new("https://cdn/");
    let file = UploadFile::new("a.png", "image/png", vec![0; 4]);

    let receipt = storage.upload("u/images/1-a.png", &file).await.unwrap();
    assert_eq!(receipt.public_uri, "https://cdn/u/images/1-a.png");
    assert_eq!(storage.get("u/images/1-a.png").unwrap().size, 4);
    assert_eq!(storage.len(), 1);

    storage.remove(&["u/images/1-a.png".to_string()]).await.unwrap();
    assert!(storage.is_empty());
    assert_eq!(storage.remove_calls().len(), 1);
}

#[tokio::test]
async fn test_storage_rejects_duplicate_key() {
    let storage = InMemoryStorage::new("https://cdn");
    let file = UploadFile::new("a.png", "image/png", vec![0; 4]);
    storage.upload("k", &file).await.unwrap();
    assert!(matches!(
        storage.upload("k", &file).await,
        Err(TransportError::Upload(_))
    ));
}

#[tokio::test]
async fn test_storage_scripted_failures() {
    let storage = InMemoryStorage::new("https://cdn");
    storage.fail_uploads_for("bad.png");
    storage.set_fail_removes(true);

    let bad = UploadFile::new("bad.png", "image/png", vec![0; 4]);
    assert!(storage.upload("k1", &bad).await.is_err());
    assert_eq!(storage.upload_calls(), vec!["k1".to_string()]);
    assert!(storage.is_empty());

    assert!(matches!(
        storage.remove(&["k1".to_string()]).await,
        Err(TransportError::Remove(_))
    ));
}

#[tokio::test]
async fn test_fetcher_records_and_fails() {
    let fetcher = InMemoryFetcher::new();
    fetcher.fail("https://cdn/missing.png");
    assert!(fetcher.fetch("https://cdn/ok.png").await.is_ok());
    assert_eq!(
        fetcher.fetch("https://cdn/missing.png").await,
        Err(TransportError::Fetch("404 for https://cdn/missing.png".into()))
    );
    assert_eq!(fetcher.fetched().len(), 2);
}
