//! Configuration models for rate limits, loaders, windows and uploads.

pub mod loadgate;

pub use loadgate::{LoadgateConfig, LoaderConfig, RateLimitConfig, UploadConfig, WindowConfig};
