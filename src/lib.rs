//! # Prometheus Loadgate
//!
//! Client-side resource scheduling for single-threaded, event-driven hosts.
//!
//! This library decides *when* and *in what order* bounded work runs in a UI
//! client: timers, network fetches and viewport observation. It owns no
//! rendering; every component reports state that a presentation layer turns
//! into pixels.
//!
//! ## Components
//!
//! - **RateLimiter**: `debounce` and `throttle` wrappers over any callable
//! - **VisibilityLoader**: one-shot, viewport-gated fetch with an explicit
//!   `Idle → Observing → Loading → Loaded | Failed` state machine and an eager
//!   fallback for hosts without viewport observation
//! - **WindowCalculator**: pure visible-range computation for virtual scrolling
//! - **BatchUploader**: validated, keyed, concurrent multi-file upload with
//!   per-job outcomes and partial-failure semantics
//!
//! ## Host Capabilities
//!
//! Timers, viewport observers, fetchers, object storage and spawners are
//! injected traits (see [`core::capability`]). The `infra` module ships
//! deterministic in-memory versions; the `runtime` module ships tokio-backed
//! ones behind the `tokio-runtime` feature.
//!
//! ```rust,ignore
//! use std::sync::Arc;
//! use prometheus_loadgate::core::{BatchUploader, UploadContext, UploadFile, UploadPolicy};
//! use prometheus_loadgate::infra::InMemoryStorage;
//!
//! let uploader = BatchUploader::new(
//!     Arc::new(InMemoryStorage::new("https://cdn.example.com")),
//!     UploadPolicy::default(),
//! );
//! let report = uploader
//!     .upload_batch(files, &UploadContext::new("user-1", "gallery"), 0, |done| {
//!         println!("stored {}", done.uri);
//!     })
//!     .await?;
//! println!("{:?}", report.summary());
//! ```
//!
//! ## Virtual Scrolling
//!
//! ```rust
//! use prometheus_loadgate::core::compute_visible_range;
//!
//! let window = compute_visible_range(0.0, 500.0, 50.0, 100, 0).unwrap();
//! assert_eq!((window.start_index, window.end_index), (0, 9));
//! ```

#![deny(missing_docs)]
#![deny(unsafe_code)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![warn(clippy::nursery)]

/// Core scheduling components and host capability traits.
pub mod core;
/// Configuration models for rate limits, loaders, windows and uploads.
pub mod config;
/// Builders to construct components from configuration.
pub mod builders;
/// Infrastructure adapters: in-memory timers, observers, storage and spawners.
pub mod infra;
/// Runtime adapters (tokio) and API surface.
pub mod runtime;
/// Shared utilities.
pub mod util;
