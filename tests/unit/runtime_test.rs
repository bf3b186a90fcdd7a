//! Tests for tokio runtime adapters and status views

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

use prometheus_loadgate::core::{
    BatchUploader, JobStatus, LoadState, LoadTarget, NoViewportObserver, RenderHint, Spawn,
    TargetId, Timer, UploadContext, UploadFile, UploadPolicy, VisibilityLoader,
};
use prometheus_loadgate::infra::{InMemoryFetcher, InMemoryStorage};
use prometheus_loadgate::runtime::{load_status, BatchStatusResponse, TokioSpawner, TokioTimer};

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn test_tokio_spawner_spawn() {
    let spawner = TokioSpawner::new(tokio::runtime::Handle::current());

    let (tx, rx) = tokio::sync::oneshot::channel();
    spawner.spawn(async move {
        tx.send(123).unwrap();
    });

    let result = rx.await.expect("oneshot result");
    assert_eq!(result, 123);
}

#[test]
fn test_tokio_spawner_outside_runtime() {
    assert!(TokioSpawner::current().is_err());
    assert!(TokioTimer::current().is_err());
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn test_tokio_timer_fires_and_cancels() {
    let timer = TokioTimer::current().unwrap();
    let fired = Arc::new(AtomicUsize::new(0));

    let counter = Arc::clone(&fired);
    timer.schedule(
        Duration::from_millis(50),
        Box::new(move || {
            counter.fetch_add(1, Ordering::SeqCst);
        }),
    );
    let counter = Arc::clone(&fired);
    let cancelled = timer.schedule(
        Duration::from_millis(50),
        Box::new(move || {
            counter.fetch_add(100, Ordering::SeqCst);
        }),
    );
    assert_eq!(timer.pending(), 2);
    timer.cancel(cancelled);

    tokio::time::sleep(Duration::from_millis(300)).await;
    assert_eq!(fired.load(Ordering::SeqCst), 1);
    assert_eq!(timer.pending(), 0);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn test_loader_on_tokio_spawner() {
    let loader = VisibilityLoader::new(
        LoadTarget::new(TargetId(9), "https://cdn/hero.webp"),
        Arc::new(NoViewportObserver),
        Arc::new(InMemoryFetcher::new()),
        TokioSpawner::current().unwrap(),
    );
    loader.attach().unwrap();

    for _ in 0..100 {
        if loader.state() == LoadState::Loaded {
            break;
        }
        tokio::time::sleep(Duration::from_millis(5)).await;
    }
    let status = load_status(&loader);
    assert_eq!(status.state, LoadState::Loaded);
    assert_eq!(status.hint, RenderHint::Resource("https://cdn/hero.webp".into()));
    assert_eq!(status.error, None);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn test_cloned_spawner_backs_many_loaders() {
    let spawner = TokioSpawner::current().unwrap();
    let fetcher = Arc::new(InMemoryFetcher::new());
    let loaders: Vec<_> = (0..3u64)
        .map(|i| {
            let loader = VisibilityLoader::new(
                LoadTarget::new(TargetId(i), format!("https://cdn/{i}.webp")),
                Arc::new(NoViewportObserver),
                fetcher.clone(),
                spawner.clone(),
            );
            loader.attach().unwrap();
            loader
        })
        .collect();

    for _ in 0..100 {
        if loaders.iter().all(|l| l.state() == LoadState::Loaded) {
            break;
        }
        tokio::time::sleep(Duration::from_millis(5)).await;
    }
    assert!(loaders.iter().all(|l| l.state() == LoadState::Loaded));
    assert_eq!(fetcher.fetched().len(), 3);
}

#[tokio::test]
async fn test_batch_status_response() {
    let storage = Arc::new(InMemoryStorage::new("https://cdn"));
    let uploader = BatchUploader::new(storage, UploadPolicy::default());
    let files = vec![
        UploadFile::new("a.png", "image/png", vec![1, 2, 3]),
        UploadFile::new("notes.txt", "text/plain", vec![1]),
    ];
    let report = uploader
        .upload_batch(files, &UploadContext::new("u1", "images"), 0, |_| {})
        .await
        .unwrap();

    let response = BatchStatusResponse::from(&report);
    assert_eq!(response.batch_id, report.batch_id);
    assert_eq!(response.summary.done, 1);
    assert_eq!(response.summary.failed, 1);
    assert_eq!(response.jobs[0].status, JobStatus::Done);
    assert!(response.jobs[0].uri.as_deref().unwrap().starts_with("https://cdn/u1/images/"));
    assert_eq!(response.jobs[1].status, JobStatus::Failed);
    assert_eq!(
        response.jobs[1].error.as_deref(),
        Some("unsupported file type `text/plain` (expected image/*)")
    );

    let json = serde_json::to_value(&response).unwrap();
    assert_eq!(json["jobs"][1]["status"], "failed");
}
