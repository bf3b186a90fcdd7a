//! Tests for utility functions

use prometheus_loadgate::util::{
    file_extension, generate_object_key, init_tracing, now_ms, DEFAULT_LOG_FILTER, KEY_SUFFIX_LEN,
};

#[test]
fn test_now_ms_is_recent() {
    // 2020-01-01T00:00:00Z
    assert!(now_ms() > 1_577_836_800_000);
}

#[test]
fn test_generated_key_uses_context_and_category() {
    let key = generate_object_key("/listing-9/", "covers", "front.webp", 42);
    assert!(key.starts_with("listing-9/covers/42-"));
    assert!(key.ends_with(".webp"));
}

#[test]
fn test_generated_key_without_extension() {
    let key = generate_object_key("u", "c", "README", 7);
    assert_eq!(key.len(), "u/c/7-".len() + KEY_SUFFIX_LEN);
}

#[test]
fn test_file_extension() {
    assert_eq!(file_extension("a.JPEG"), Some("jpeg".to_string()));
    assert_eq!(file_extension("a"), None);
}

#[test]
fn test_init_tracing_is_idempotent() {
    init_tracing();
    init_tracing();
    tracing::info!(filter = DEFAULT_LOG_FILTER, "tracing initialised");
}
