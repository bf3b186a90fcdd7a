//! Component configuration structures.

use std::str::FromStr;
use std::time::Duration;

use anyhow::Context;
use serde::{Deserialize, Serialize};

use crate::core::{AppResult, RootMargin, UploadPolicy};

/// Debounce/throttle intervals.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RateLimitConfig {
    /// Quiet period for debounced handlers (search boxes, resize).
    pub debounce_ms: u64,
    /// Interval for throttled handlers (scroll).
    pub throttle_ms: u64,
}

impl Default for RateLimitConfig {
    fn default() -> Self {
        Self {
            debounce_ms: 300,
            throttle_ms: 100,
        }
    }
}

impl RateLimitConfig {
    /// Debounce quiet period.
    pub const fn debounce(&self) -> Duration {
        Duration::from_millis(self.debounce_ms)
    }

    /// Throttle interval.
    pub const fn throttle(&self) -> Duration {
        Duration::from_millis(self.throttle_ms)
    }

    /// Validate interval values.
    pub fn validate(&self) -> Result<(), String> {
        if self.debounce_ms == 0 {
            return Err("debounce_ms must be greater than 0".into());
        }
        if self.throttle_ms == 0 {
            return Err("throttle_ms must be greater than 0".into());
        }
        Ok(())
    }
}

/// Visibility loader defaults.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LoaderConfig {
    /// Visible fraction that triggers loading.
    pub visibility_threshold: f64,
    /// Viewport expansion, CSS-style (`"50px"`, `"10px 0px"`).
    pub root_margin: RootMargin,
}

impl Default for LoaderConfig {
    fn default() -> Self {
        Self {
            visibility_threshold: 0.1,
            root_margin: RootMargin::uniform(crate::core::Length::Px(50.0)),
        }
    }
}

impl LoaderConfig {
    /// Validate threshold range.
    pub fn validate(&self) -> Result<(), String> {
        if !(0.0..=1.0).contains(&self.visibility_threshold) {
            return Err("visibility_threshold must be within [0, 1]".into());
        }
        Ok(())
    }
}

/// Virtual list geometry.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct WindowConfig {
    /// Row size in pixels.
    pub item_size: f64,
    /// Extra rows rendered on each side.
    pub overscan: usize,
}

impl Default for WindowConfig {
    fn default() -> Self {
        Self {
            item_size: 50.0,
            overscan: 3,
        }
    }
}

impl WindowConfig {
    /// Validate row size.
    pub fn validate(&self) -> Result<(), String> {
        if !self.item_size.is_finite() || self.item_size <= 0.0 {
            return Err("item_size must be a positive number".into());
        }
        Ok(())
    }
}

/// Batch upload limits.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct UploadConfig {
    /// Cap on already-uploaded plus incoming files.
    pub max_count: usize,
    /// Per-file byte ceiling.
    pub max_bytes_per_file: u64,
    /// Accepted MIME prefix.
    pub accepted_mime_prefix: String,
    /// Key category below the context id.
    pub category: String,
    /// Optional cap on simultaneous storage calls.
    pub max_in_flight: Option<usize>,
}

impl Default for UploadConfig {
    fn default() -> Self {
        let policy = UploadPolicy::default();
        Self {
            max_count: policy.max_count,
            max_bytes_per_file: policy.max_bytes_per_file,
            accepted_mime_prefix: policy.accepted_mime_prefix,
            category: "images".into(),
            max_in_flight: policy.max_in_flight,
        }
    }
}

impl UploadConfig {
    /// Validate limits.
    pub fn validate(&self) -> Result<(), String> {
        if self.max_count == 0 {
            return Err("max_count must be greater than 0".into());
        }
        if self.max_bytes_per_file == 0 {
            return Err("max_bytes_per_file must be greater than 0".into());
        }
        if self.category.trim_matches('/').is_empty() {
            return Err("category must not be empty".into());
        }
        if self.max_in_flight == Some(0) {
            return Err("max_in_flight must be greater than 0 when set".into());
        }
        Ok(())
    }

    /// Policy enforced by the uploader.
    pub fn policy(&self) -> UploadPolicy {
        UploadPolicy {
            accepted_mime_prefix: self.accepted_mime_prefix.clone(),
            max_bytes_per_file: self.max_bytes_per_file,
            max_count: self.max_count,
            max_in_flight: self.max_in_flight,
        }
    }
}

/// Root configuration.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LoadgateConfig {
    /// Debounce/throttle intervals.
    pub rate_limit: RateLimitConfig,
    /// Visibility loader defaults.
    pub loader: LoaderConfig,
    /// Virtual list geometry.
    pub window: WindowConfig,
    /// Batch upload limits.
    pub upload: UploadConfig,
}

impl LoadgateConfig {
    /// Validate every section.
    pub fn validate(&self) -> Result<(), String> {
        self.rate_limit
            .validate()
            .map_err(|e| format!("rate_limit invalid: {e}"))?;
        self.loader
            .validate()
            .map_err(|e| format!("loader invalid: {e}"))?;
        self.window
            .validate()
            .map_err(|e| format!("window invalid: {e}"))?;
        self.upload
            .validate()
            .map_err(|e| format!("upload invalid: {e}"))?;
        Ok(())
    }

    /// Parse configuration from a JSON string and validate.
    pub fn from_json_str(input: &str) -> Result<Self, String> {
        let cfg: Self = serde_json::from_str(input).map_err(|e| format!("parse error: {e}"))?;
        cfg.validate()?;
        Ok(cfg)
    }

    /// Defaults overridden by `LOADGATE_*` environment variables, after
    /// loading a `.env` file if one exists.
    pub fn from_env() -> AppResult<Self> {
        let _ = dotenvy::dotenv();
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Defaults overridden by whatever `lookup` returns for each
    /// `LOADGATE_*` key.
    pub fn from_lookup<F>(lookup: F) -> AppResult<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut cfg = Self::default();
        override_with(&lookup, "LOADGATE_DEBOUNCE_MS", &mut cfg.rate_limit.debounce_ms)?;
        override_with(&lookup, "LOADGATE_THROTTLE_MS", &mut cfg.rate_limit.throttle_ms)?;
        override_with(
            &lookup,
            "LOADGATE_VISIBILITY_THRESHOLD",
            &mut cfg.loader.visibility_threshold,
        )?;
        if let Some(raw) = lookup("LOADGATE_ROOT_MARGIN") {
            cfg.loader.root_margin = raw
                .parse()
                .map_err(|e: String| anyhow::anyhow!(e))
                .context("LOADGATE_ROOT_MARGIN")?;
        }
        override_with(&lookup, "LOADGATE_ITEM_SIZE", &mut cfg.window.item_size)?;
        override_with(&lookup, "LOADGATE_OVERSCAN", &mut cfg.window.overscan)?;
        override_with(&lookup, "LOADGATE_MAX_COUNT", &mut cfg.upload.max_count)?;
        override_with(
            &lookup,
            "LOADGATE_MAX_BYTES_PER_FILE",
            &mut cfg.upload.max_bytes_per_file,
        )?;
        override_with(
            &lookup,
            "LOADGATE_ACCEPTED_MIME_PREFIX",
            &mut cfg.upload.accepted_mime_prefix,
        )?;
        override_with(&lookup, "LOADGATE_UPLOAD_CATEGORY", &mut cfg.upload.category)?;
        if let Some(raw) = lookup("LOADGATE_MAX_IN_FLIGHT") {
            cfg.upload.max_in_flight = Some(
                raw.trim()
                    .parse()
                    .with_context(|| format!("LOADGATE_MAX_IN_FLIGHT=`{raw}`"))?,
            );
        }
        cfg.validate().map_err(anyhow::Error::msg)?;
        Ok(cfg)
    }
}

fn override_with<T, F>(lookup: &F, key: &str, slot: &mut T) -> AppResult<()>
where
    T: FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
    F: Fn(&str) -> Option<String>,
{
    if let Some(raw) = lookup(key) {
        *slot = raw
            .trim()
            .parse()
            .with_context(|| format!("{key}=`{raw}`"))?;
    }
    Ok(())
}
