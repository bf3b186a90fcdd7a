//! Tests for configuration validation

use std::collections::HashMap;
use std::time::Duration;

use prometheus_loadgate::config::{
    LoadgateConfig, LoaderConfig, RateLimitConfig, UploadConfig, WindowConfig,
};
use prometheus_loadgate::core::{Length, RootMargin};

fn lookup_from(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
    let map: HashMap<String, String> = pairs
        .iter()
        .map(|(k, v)| ((*k).to_string(), (*v).to_string()))
        .collect();
    move |key| map.get(key).cloned()
}

#[test]
fn test_default_config_is_valid() {
    let cfg = LoadgateConfig::default();
    assert!(cfg.validate().is_ok());
    assert_eq!(cfg.rate_limit.debounce(), Duration::from_millis(300));
    assert_eq!(cfg.rate_limit.throttle(), Duration::from_millis(100));
    assert_eq!(cfg.upload.max_count, 10);
    assert_eq!(cfg.upload.max_bytes_per_file, 5 * 1024 * 1024);
}

#[test]
fn test_rate_limit_zero_rejected() {
    let invalid = RateLimitConfig {
        debounce_ms: 0,
        throttle_ms: 100,
    };
    assert!(invalid.validate().is_err());
}

#[test]
fn test_loader_threshold_out_of_range() {
    let invalid = LoaderConfig {
        visibility_threshold: 1.5,
        root_margin: RootMargin::ZERO,
    };
    assert!(invalid.validate().is_err());
}

#[test]
fn test_window_item_size_must_be_positive() {
    let invalid = WindowConfig {
        item_size: 0.0,
        overscan: 3,
    };
    assert!(invalid.validate().is_err());
}

#[test]
fn test_upload_config_invalid_in_flight() {
    let invalid = UploadConfig {
        max_in_flight: Some(0),
        ..UploadConfig::default()
    };
    let err = invalid.validate().unwrap_err();
    assert!(err.contains("max_in_flight"));
}

#[test]
fn test_root_config_prefixes_section() {
    let mut cfg = LoadgateConfig::default();
    cfg.upload.category = "/".into();
    let err = cfg.validate().unwrap_err();
    assert!(err.starts_with("upload invalid:"));
}

#[test]
fn test_upload_config_policy() {
    let cfg = UploadConfig {
        max_count: 4,
        max_in_flight: Some(2),
        ..UploadConfig::default()
    };
    let policy = cfg.policy();
    assert_eq!(policy.max_count, 4);
    assert_eq!(policy.max_in_flight, Some(2));
    assert_eq!(policy.accepted_mime_prefix, "image/");
}

#[test]
fn test_from_json_str_partial() {
    let cfg = LoadgateConfig::from_json_str(
        r#"{
            "loader": { "visibility_threshold": 0.5, "root_margin": "10px 0px" },
            "window": { "overscan": 5 }
        }"#,
    )
    .unwrap();
    assert!((cfg.loader.visibility_threshold - 0.5).abs() < f64::EPSILON);
    assert_eq!(cfg.loader.root_margin.top, Length::Px(10.0));
    assert_eq!(cfg.loader.root_margin.right, Length::Px(0.0));
    assert_eq!(cfg.window.overscan, 5);
    assert!((cfg.window.item_size - 50.0).abs() < f64::EPSILON);
}

#[test]
fn test_from_json_str_rejects_invalid() {
    let err = LoadgateConfig::from_json_str(r#"{ "rate_limit": { "debounce_ms": 0 } }"#)
        .unwrap_err();
    assert!(err.starts_with("rate_limit invalid:"));
    assert!(LoadgateConfig::from_json_str("{ not json").is_err());
}

#[test]
fn test_from_lookup_overrides() {
    let cfg = LoadgateConfig::from_lookup(lookup_from(&[
        ("LOADGATE_DEBOUNCE_MS", "250"),
        ("LOADGATE_ROOT_MARGIN", "20%"),
        ("LOADGATE_MAX_COUNT", " 3 "),
        ("LOADGATE_UPLOAD_CATEGORY", "avatars"),
        ("LOADGATE_MAX_IN_FLIGHT", "2"),
    ]))
    .unwrap();
    assert_eq!(cfg.rate_limit.debounce_ms, 250);
    assert_eq!(cfg.rate_limit.throttle_ms, 100);
    assert_eq!(cfg.loader.root_margin, RootMargin::uniform(Length::Percent(20.0)));
    assert_eq!(cfg.upload.max_count, 3);
    assert_eq!(cfg.upload.category, "avatars");
    assert_eq!(cfg.upload.max_in_flight, Some(2));
}

#[test]
fn test_from_lookup_rejects_garbage() {
    let err = LoadgateConfig::from_lookup(lookup_from(&[("LOADGATE_OVERSCAN", "many")]))
        .unwrap_err();
    assert!(format!("{err:#}").contains("LOADGATE_OVERSCAN"));

    assert!(
        LoadgateConfig::from_lookup(lookup_from(&[("LOADGATE_VISIBILITY_THRESHOLD", "2")]))
            .is_err()
    );
}
