//! Host capabilities consumed by the scheduling components.
//!
//! Every component receives its timer, viewport observer, fetcher, storage
//! and spawner as injected trait objects. Production hosts plug in real
//! implementations (see `runtime`); tests plug in the deterministic
//! in-memory versions from `infra`.

use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::core::batch_uploader::UploadFile;
use crate::core::geometry::RootMargin;
use crate::core::TransportError;

/// Callback run once when a scheduled timer fires.
pub type TimerCallback = Box<dyn FnOnce() + Send + 'static>;

/// Opaque handle to a scheduled timer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TimerHandle(pub u64);

/// Deferred-execution primitive of the host.
pub trait Timer: Send + Sync {
    /// Run `callback` once after `delay`.
    fn schedule(&self, delay: Duration, callback: TimerCallback) -> TimerHandle;
    /// Cancel a pending timer. Cancelling a fired or unknown handle is a no-op.
    fn cancel(&self, handle: TimerHandle);
}

/// Identity of an observable element.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct TargetId(pub u64);

/// Handle returned by [`ViewportObserver::observe`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Subscription(pub u64);

/// Options for a viewport registration.
#[derive(Debug, Clone, PartialEq)]
pub struct ObserveOptions {
    /// Ratios at which the observer reports crossings.
    pub thresholds: Vec<f64>,
    /// Expansion applied to the viewport before intersecting.
    pub root_margin: RootMargin,
}

/// A single intersection report.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct IntersectionEntry {
    /// Element the report is about.
    pub target: TargetId,
    /// Whether any part of the element intersects the expanded viewport.
    pub is_intersecting: bool,
    /// Visible fraction of the element, in `[0, 1]`.
    pub intersection_ratio: f64,
}

/// Callback invoked for every intersection report.
pub type IntersectionCallback = Arc<dyn Fn(IntersectionEntry) + Send + Sync>;

/// Viewport-observation capability of the host.
pub trait ViewportObserver: Send + Sync {
    /// Whether the host can observe intersections at all.
    ///
    /// Loaders attached to an unsupported observer load eagerly.
    fn supported(&self) -> bool {
        true
    }

    /// Register interest in `target`.
    fn observe(
        &self,
        target: TargetId,
        options: ObserveOptions,
        callback: IntersectionCallback,
    ) -> Subscription;

    /// Drop a registration. Unknown subscriptions are ignored.
    fn unobserve(&self, subscription: Subscription);
}

/// Observer for hosts without viewport observation.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoViewportObserver;

impl ViewportObserver for NoViewportObserver {
    fn supported(&self) -> bool {
        false
    }

    fn observe(
        &self,
        _target: TargetId,
        _options: ObserveOptions,
        _callback: IntersectionCallback,
    ) -> Subscription {
        Subscription(0)
    }

    fn unobserve(&self, _subscription: Subscription) {}
}

/// Fetches a remote resource (e.g. an image) for a visibility loader.
#[async_trait]
pub trait ResourceFetcher: Send + Sync + 'static {
    /// Fetch `uri`; the payload itself is owned by the host.
    async fn fetch(&self, uri: &str) -> Result<(), TransportError>;
}

/// Successful upload acknowledgement.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UploadReceipt {
    /// Publicly reachable uri of the stored object.
    pub public_uri: String,
}

/// Object-storage capability of the backend.
///
/// Keys are path-like strings treated as opaque identifiers.
#[async_trait]
pub trait ObjectStorage: Send + Sync + 'static {
    /// Store `file` under `key`.
    async fn upload(&self, key: &str, file: &UploadFile) -> Result<UploadReceipt, TransportError>;

    /// Public uri for `key` without contacting the backend.
    fn public_url(&self, key: &str) -> String;

    /// Delete the objects stored under `keys`.
    async fn remove(&self, keys: &[String]) -> Result<(), TransportError>;
}

/// Abstraction for spawning task execution on a runtime.
pub trait Spawn {
    /// Spawn an async task that returns a future.
    fn spawn<F>(&self, fut: F)
    where
        F: Future<Output = ()> + Send + 'static;
}
