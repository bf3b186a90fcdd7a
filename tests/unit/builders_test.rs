//! Tests for builder modules

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use prometheus_loadgate::builders::{
    build_debouncer, build_loader, build_throttler, build_upload_context, build_uploader,
    build_window_calculator,
};
use prometheus_loadgate::config::LoadgateConfig;
use prometheus_loadgate::core::{LoadState, NoViewportObserver, RenderHint, TargetId};
use prometheus_loadgate::infra::{InMemoryFetcher, InMemoryStorage, ManualSpawner, ManualTimer};

#[test]
fn test_build_uploader_uses_config_policy() {
    let mut cfg = LoadgateConfig::default();
    cfg.upload.max_count = 2;
    let uploader = build_uploader(&cfg, Arc::new(InMemoryStorage::new("https://cdn"))).unwrap();
    assert_eq!(uploader.policy().max_count, 2);
    assert_eq!(uploader.public_url("a/b.png"), "https://cdn/a/b.png");
}

#[test]
fn test_build_uploader_rejects_invalid_config() {
    let mut cfg = LoadgateConfig::default();
    cfg.upload.max_count = 0;
    let err = build_uploader(&cfg, Arc::new(InMemoryStorage::new("https://cdn")))
        .err()
        .unwrap();
    assert!(err.to_string().starts_with("config invalid:"));
}

#[test]
fn test_build_upload_context() {
    let cfg = LoadgateConfig::default();
    let ctx = build_upload_context(&cfg, "user-7");
    assert_eq!(ctx.context_id, "user-7");
    assert_eq!(ctx.category, "images");
}

#[test]
fn test_build_loader_applies_threshold() {
    let mut cfg = LoadgateConfig::default();
    cfg.loader.visibility_threshold = 0.25;
    let loader = build_loader(
        &cfg,
        TargetId(4),
        "https://cdn/full.jpg",
        Some("thumb.jpg".into()),
        Arc::new(NoViewportObserver),
        Arc::new(InMemoryFetcher::new()),
        ManualSpawner::new(),
    )
    .unwrap();
    assert_eq!(loader.state(), LoadState::Idle);
    assert!((loader.target().visibility_threshold - 0.25).abs() < f64::EPSILON);
    assert_eq!(loader.target().root_margin, cfg.loader.root_margin);
    assert_eq!(
        loader.render_hint(),
        RenderHint::Placeholder(Some("thumb.jpg".into()))
    );
}

#[test]
fn test_build_window_calculator() {
    let cfg = LoadgateConfig::default();
    let calc = build_window_calculator(&cfg).unwrap();
    let window = calc.visible_range(0.0, 500.0, 100).unwrap();
    assert_eq!(window.start_index, 0);
    assert_eq!(window.end_index, 15);
}

#[test]
fn test_build_rate_limiters() {
    let cfg = LoadgateConfig::default();
    let timer = Arc::new(ManualTimer::new());
    let hits = Arc::new(AtomicUsize::new(0));

    let counter = Arc::clone(&hits);
    let debounced = build_debouncer(
        &cfg,
        move |_: ()| {
            counter.fetch_add(1, Ordering::SeqCst);
        },
        timer.clone(),
    )
    .unwrap();
    assert_eq!(debounced.wait(), cfg.rate_limit.debounce());

    let throttled = build_throttler(&cfg, |x: u32| x * 2, timer.clone()).unwrap();
    assert_eq!(throttled.limit(), cfg.rate_limit.throttle());
    assert_eq!(throttled.call(21), 42);
    assert_eq!(throttled.call(1), 42);

    debounced.call(());
    timer.advance(cfg.rate_limit.debounce());
    assert_eq!(hits.load(Ordering::SeqCst), 1);
}
