//! Viewport-gated, one-shot resource loading.
//!
//! A [`VisibilityLoader`] drives one [`LoadTarget`] through
//! `Idle → Observing → Loading → Loaded | Failed`. Observation is torn down
//! the moment loading starts, so a target is fetched at most once. Hosts
//! without viewport observation take the eager `Idle → Loading` path.

use std::fmt;
use std::sync::{Arc, Weak};

use parking_lot::Mutex;
use serde::{Deserialize, Serialize};

use crate::core::capability::{
    IntersectionEntry, ObserveOptions, ResourceFetcher, Spawn, Subscription, TargetId,
    ViewportObserver,
};
use crate::core::events::{build_event, EventKind, SharedEventSink};
use crate::core::geometry::RootMargin;
use crate::core::{LoaderError, TransportError};

/// Lifecycle of a load target.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LoadState {
    /// Created, not attached yet.
    Idle,
    /// Waiting for the element to become visible.
    Observing,
    /// Fetch in flight.
    Loading,
    /// Fetch succeeded.
    Loaded,
    /// Fetch failed; never retried.
    Failed,
}

impl LoadState {
    /// `Loaded` and `Failed` never transition again.
    pub const fn is_terminal(self) -> bool {
        matches!(self, Self::Loaded | Self::Failed)
    }
}

impl fmt::Display for LoadState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::Idle => "idle",
            Self::Observing => "observing",
            Self::Loading => "loading",
            Self::Loaded => "loaded",
            Self::Failed => "failed",
        };
        f.write_str(s)
    }
}

/// What the UI layer should draw for a target.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "use", content = "uri", rename_all = "snake_case")]
pub enum RenderHint {
    /// Show the placeholder (if any) while the resource is not loaded.
    Placeholder(Option<String>),
    /// Show the loaded resource.
    Resource(String),
    /// Show the failure treatment.
    Failure,
}

/// A resource bound to an observable element.
#[derive(Debug, Clone, PartialEq)]
pub struct LoadTarget {
    /// Observed element.
    pub id: TargetId,
    /// Resource fetched once the element is visible.
    pub resource_uri: String,
    /// Low-cost stand-in shown until the resource loads.
    pub placeholder_uri: Option<String>,
    /// Minimum visible fraction, in `[0, 1]`, that triggers loading.
    pub visibility_threshold: f64,
    /// Viewport expansion used for the visibility check.
    pub root_margin: RootMargin,
}

impl LoadTarget {
    /// Target that loads as soon as any part of it is visible.
    pub fn new(id: TargetId, resource_uri: impl Into<String>) -> Self {
        Self {
            id,
            resource_uri: resource_uri.into(),
            placeholder_uri: None,
            visibility_threshold: 0.0,
            root_margin: RootMargin::ZERO,
        }
    }

    /// Set a placeholder uri.
    #[must_use]
    pub fn with_placeholder(mut self, uri: impl Into<String>) -> Self {
        self.placeholder_uri = Some(uri.into());
        self
    }

    /// Set the visibility threshold, clamped to `[0, 1]`.
    #[must_use]
    pub fn with_threshold(mut self, threshold: f64) -> Self {
        self.visibility_threshold = if threshold.is_nan() {
            0.0
        } else {
            threshold.clamp(0.0, 1.0)
        };
        self
    }

    /// Set the root margin.
    #[must_use]
    pub const fn with_root_margin(mut self, margin: RootMargin) -> Self {
        self.root_margin = margin;
        self
    }

    fn is_visible_enough(&self, entry: &IntersectionEntry) -> bool {
        entry.target == self.id
            && entry.is_intersecting
            && entry.intersection_ratio >= self.visibility_threshold
    }
}

struct LoaderCore {
    state: LoadState,
    subscription: Option<Subscription>,
    detached: bool,
    error: Option<TransportError>,
}

struct LoaderShared<S> {
    target: LoadTarget,
    core: Mutex<LoaderCore>,
    observer: Arc<dyn ViewportObserver>,
    fetcher: Arc<dyn ResourceFetcher>,
    spawner: S,
    events: Mutex<Option<SharedEventSink>>,
}

/// Drives a single [`LoadTarget`] through its load state machine.
///
/// Dropping the loader detaches it.
pub struct VisibilityLoader<S> {
    shared: Arc<LoaderShared<S>>,
}

impl<S> LoaderShared<S> {
    fn emit(&self, state: LoadState) {
        tracing::debug!(target_id = self.target.id.0, %state, "load state changed");
        let sink = self.events.lock().clone();
        if let Some(sink) = sink {
            sink.lock().record(build_event(
                format!("target-{}", self.target.id.0),
                EventKind::LoadState {
                    target: self.target.id,
                    state,
                },
            ));
        }
    }

    fn detach(&self) {
        let subscription = {
            let mut core = self.core.lock();
            if core.detached {
                return;
            }
            core.detached = true;
            core.subscription.take()
        };
        if let Some(subscription) = subscription {
            self.observer.unobserve(subscription);
            tracing::debug!(target_id = self.target.id.0, "observation cancelled");
        }
    }

    fn finish(&self, result: Result<(), TransportError>) {
        let state = {
            let mut core = self.core.lock();
            if core.detached {
                tracing::debug!(
                    target_id = self.target.id.0,
                    "fetch finished after detach; result discarded"
                );
                return;
            }
            if core.state != LoadState::Loading {
                tracing::error!(
                    target_id = self.target.id.0,
                    state = %core.state,
                    "fetch finished outside loading state"
                );
                return;
            }
            core.state = match result {
                Ok(()) => LoadState::Loaded,
                Err(err) => {
                    tracing::warn!(
                        target_id = self.target.id.0,
                        uri = %self.target.resource_uri,
                        "resource fetch failed: {err}"
                    );
                    core.error = Some(err);
                    LoadState::Failed
                }
            };
            core.state
        };
        self.emit(state);
    }
}

impl<S> VisibilityLoader<S>
where
    S: Spawn + Send + Sync + 'static,
{
    /// Create an idle loader.
    pub fn new(
        target: LoadTarget,
        observer: Arc<dyn ViewportObserver>,
        fetcher: Arc<dyn ResourceFetcher>,
        spawner: S,
    ) -> Self {
        Self {
            shared: Arc::new(LoaderShared {
                target,
                core: Mutex::new(LoaderCore {
                    state: LoadState::Idle,
                    subscription: None,
                    detached: false,
                    error: None,
                }),
                observer,
                fetcher,
                spawner,
                events: Mutex::new(None),
            }),
        }
    }

    /// Attach an event sink.
    #[must_use]
    pub fn with_events(self, sink: SharedEventSink) -> Self {
        *self.shared.events.lock() = Some(sink);
        self
    }

    /// Start observing the target, or load eagerly if the host cannot observe.
    ///
    /// Returns the state the loader entered.
    pub fn attach(&self) -> Result<LoadState, LoaderError> {
        let shared = &self.shared;
        let eager = !shared.observer.supported();
        {
            let mut core = shared.core.lock();
            if core.detached {
                return Err(LoaderError::Detached);
            }
            if core.state != LoadState::Idle {
                return Err(LoaderError::AlreadyAttached(core.state.to_string()));
            }
            core.state = if eager {
                LoadState::Loading
            } else {
                LoadState::Observing
            };
        }

        if eager {
            tracing::debug!(
                target_id = shared.target.id.0,
                "viewport observation unavailable; loading eagerly"
            );
            shared.emit(LoadState::Loading);
            Self::start_fetch(shared);
            return Ok(LoadState::Loading);
        }

        shared.emit(LoadState::Observing);
        let weak: Weak<LoaderShared<S>> = Arc::downgrade(shared);
        let subscription = shared.observer.observe(
            shared.target.id,
            ObserveOptions {
                thresholds: vec![shared.target.visibility_threshold],
                root_margin: shared.target.root_margin,
            },
            Arc::new(move |entry: IntersectionEntry| {
                if let Some(shared) = weak.upgrade() {
                    Self::on_intersection(&shared, &entry);
                }
            }),
        );

        // The observer may have reported synchronously and already moved us on.
        let stale = {
            let mut core = shared.core.lock();
            if core.state == LoadState::Observing && !core.detached {
                core.subscription = Some(subscription);
                false
            } else {
                true
            }
        };
        if stale {
            shared.observer.unobserve(subscription);
        }
        Ok(self.state())
    }

    fn on_intersection(shared: &Arc<LoaderShared<S>>, entry: &IntersectionEntry) {
        if !shared.target.is_visible_enough(entry) {
            return;
        }
        let subscription = {
            let mut core = shared.core.lock();
            if core.detached || core.state != LoadState::Observing {
                return;
            }
            core.state = LoadState::Loading;
            core.subscription.take()
        };
        if let Some(subscription) = subscription {
            shared.observer.unobserve(subscription);
        }
        shared.emit(LoadState::Loading);
        Self::start_fetch(shared);
    }

    fn start_fetch(shared: &Arc<LoaderShared<S>>) {
        let task = Arc::clone(shared);
        shared.spawner.spawn(async move {
            let result = task.fetcher.fetch(&task.target.resource_uri).await;
            task.finish(result);
        });
    }
}

impl<S> VisibilityLoader<S> {
    /// Stop observing. An in-flight fetch still completes but is discarded.
    pub fn detach(&self) {
        self.shared.detach();
    }

    /// Whether [`detach`](Self::detach) has been called.
    pub fn is_detached(&self) -> bool {
        self.shared.core.lock().detached
    }

    /// Current state.
    pub fn state(&self) -> LoadState {
        self.shared.core.lock().state
    }

    /// Fetch error, once `Failed`.
    pub fn error(&self) -> Option<TransportError> {
        self.shared.core.lock().error.clone()
    }

    /// The target this loader drives.
    pub fn target(&self) -> &LoadTarget {
        &self.shared.target
    }

    /// What the UI should draw right now.
    pub fn render_hint(&self) -> RenderHint {
        match self.state() {
            LoadState::Loaded => RenderHint::Resource(self.shared.target.resource_uri.clone()),
            LoadState::Failed => RenderHint::Failure,
            LoadState::Idle | LoadState::Observing | LoadState::Loading => {
                RenderHint::Placeholder(self.shared.target.placeholder_uri.clone())
            }
        }
    }
}

impl<S> Drop for VisibilityLoader<S> {
    fn drop(&mut self) {
        self.shared.detach();
    }
}
