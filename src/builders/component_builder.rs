//! Builders to construct loaders, uploaders and rate limiters from configuration.

use std::sync::Arc;

use crate::config::LoadgateConfig;
use crate::core::{
    debounce, throttle, AppResult, BatchUploader, Debounced, LoadTarget, ObjectStorage,
    ResourceFetcher, Spawn, TargetId, Throttled, Timer, UploadContext, ViewportObserver,
    VisibilityLoader, WindowCalculator,
};

fn validated(cfg: &LoadgateConfig) -> AppResult<()> {
    cfg.validate()
        .map_err(|e| anyhow::anyhow!("config invalid: {e}"))
}

/// Build a batch uploader over `storage` with the configured limits.
pub fn build_uploader(
    cfg: &LoadgateConfig,
    storage: Arc<dyn ObjectStorage>,
) -> AppResult<BatchUploader> {
    validated(cfg)?;
    Ok(BatchUploader::new(storage, cfg.upload.policy()))
}

/// Upload context for `context_id` under the configured category.
pub fn build_upload_context(cfg: &LoadgateConfig, context_id: impl Into<String>) -> UploadContext {
    UploadContext::new(context_id, cfg.upload.category.clone())
}

/// Build an idle visibility loader using the configured threshold and margin.
pub fn build_loader<S>(
    cfg: &LoadgateConfig,
    id: TargetId,
    resource_uri: impl Into<String>,
    placeholder_uri: Option<String>,
    observer: Arc<dyn ViewportObserver>,
    fetcher: Arc<dyn ResourceFetcher>,
    spawner: S,
) -> AppResult<VisibilityLoader<S>>
where
    S: Spawn + Send + Sync + 'static,
{
    validated(cfg)?;
    let mut target = LoadTarget::new(id, resource_uri)
        .with_threshold(cfg.loader.visibility_threshold)
        .with_root_margin(cfg.loader.root_margin);
    target.placeholder_uri = placeholder_uri;
    Ok(VisibilityLoader::new(target, observer, fetcher, spawner))
}

/// Window calculator for the configured row geometry.
pub fn build_window_calculator(cfg: &LoadgateConfig) -> AppResult<WindowCalculator> {
    validated(cfg)?;
    Ok(WindowCalculator::new(cfg.window.item_size, cfg.window.overscan))
}

/// Debounce `f` with the configured quiet period.
pub fn build_debouncer<A, F>(
    cfg: &LoadgateConfig,
    f: F,
    timer: Arc<dyn Timer>,
) -> AppResult<Debounced<A>>
where
    A: Send + 'static,
    F: Fn(A) + Send + Sync + 'static,
{
    validated(cfg)?;
    Ok(debounce(f, cfg.rate_limit.debounce(), timer))
}

/// Throttle `f` with the configured interval.
pub fn build_throttler<A, R, F>(
    cfg: &LoadgateConfig,
    f: F,
    timer: Arc<dyn Timer>,
) -> AppResult<Throttled<A, R>>
where
    R: Clone + Send + 'static,
    F: Fn(A) -> R + Send + Sync + 'static,
{
    validated(cfg)?;
    Ok(throttle(f, cfg.rate_limit.throttle(), timer))
}
