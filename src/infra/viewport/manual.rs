//! Geometry-driven viewport observer for tests and headless hosts.

use std::collections::HashMap;

use parking_lot::Mutex;

use crate::core::capability::{
    IntersectionCallback, IntersectionEntry, ObserveOptions, Subscription, TargetId,
    ViewportObserver,
};
use crate::core::geometry::{intersect, Rect};

struct Registration {
    target: TargetId,
    options: ObserveOptions,
    callback: IntersectionCallback,
    /// Last reported `(is_intersecting, thresholds crossed)`.
    last: Option<(bool, usize)>,
}

impl Registration {
    /// Report for the current geometry, if it differs from the last one.
    fn evaluate(
        &mut self,
        viewport: &Rect,
        elements: &HashMap<TargetId, Rect>,
    ) -> Option<IntersectionEntry> {
        let rect = elements.get(&self.target)?;
        let (is_intersecting, ratio) = intersect(rect, viewport, &self.options.root_margin);
        let crossed = self
            .options
            .thresholds
            .iter()
            .filter(|t| ratio >= **t)
            .count();
        let current = (is_intersecting, crossed);
        if self.last == Some(current) {
            return None;
        }
        self.last = Some(current);
        Some(IntersectionEntry {
            target: self.target,
            is_intersecting,
            intersection_ratio: ratio,
        })
    }
}

struct ObserverState {
    viewport: Rect,
    elements: HashMap<TargetId, Rect>,
    registrations: HashMap<u64, Registration>,
    next_id: u64,
}

/// Viewport observer computed from element rectangles.
///
/// Like a browser observer, it reports each registration once initially and
/// then whenever a threshold is crossed. The initial report for an element
/// that is already placed is delivered from inside `observe`, before it
/// returns; later reports are delivered by [`notify`](Self::notify), which
/// every geometry change calls.
pub struct ManualViewportObserver {
    supported: bool,
    state: Mutex<ObserverState>,
}

impl ManualViewportObserver {
    /// Observer over `viewport`.
    pub fn new(viewport: Rect) -> Self {
        Self {
            supported: true,
            state: Mutex::new(ObserverState {
                viewport,
                elements: HashMap::new(),
                registrations: HashMap::new(),
                next_id: 1,
            }),
        }
    }

    /// Observer for a host that lacks viewport observation.
    pub fn unsupported() -> Self {
        Self {
            supported: false,
            ..Self::new(Rect::default())
        }
    }

    /// Position an element and deliver any resulting reports.
    pub fn place(&self, target: TargetId, rect: Rect) {
        self.state.lock().elements.insert(target, rect);
        self.notify();
    }

    /// Replace the viewport and deliver any resulting reports.
    pub fn set_viewport(&self, viewport: Rect) {
        self.state.lock().viewport = viewport;
        self.notify();
    }

    /// Scroll vertically to `offset` and deliver any resulting reports.
    pub fn scroll_to(&self, offset: f64) {
        self.state.lock().viewport.y = offset;
        self.notify();
    }

    /// Number of live registrations.
    pub fn observed_count(&self) -> usize {
        self.state.lock().registrations.len()
    }

    /// Whether any registration watches `target`.
    pub fn is_observing(&self, target: TargetId) -> bool {
        self.state
            .lock()
            .registrations
            .values()
            .any(|r| r.target == target)
    }

    /// Evaluate every registration and deliver changed reports.
    ///
    /// Callbacks run without the observer's lock held, so they may
    /// unobserve. Returns the number of reports delivered.
    pub fn notify(&self) -> usize {
        let deliveries: Vec<(IntersectionCallback, IntersectionEntry)> = {
            let mut state = self.state.lock();
            let viewport = state.viewport;
            let elements = state.elements.clone();
            let mut out = Vec::new();
            for registration in state.registrations.values_mut() {
                if let Some(entry) = registration.evaluate(&viewport, &elements) {
                    out.push((registration.callback.clone(), entry));
                }
            }
            out
        };
        let delivered = deliveries.len();
        for (callback, entry) in deliveries {
            callback(entry);
        }
        delivered
    }
}

impl ViewportObserver for ManualViewportObserver {
    fn supported(&self) -> bool {
        self.supported
    }

    fn observe(
        &self,
        target: TargetId,
        options: ObserveOptions,
        callback: IntersectionCallback,
    ) -> Subscription {
        let (id, initial) = {
            let mut state = self.state.lock();
            let id = state.next_id;
            state.next_id += 1;
            let mut registration = Registration {
                target,
                options,
                callback,
                last: None,
            };
            let initial = registration
                .evaluate(&state.viewport, &state.elements)
                .map(|entry| (registration.callback.clone(), entry));
            state.registrations.insert(id, registration);
            (id, initial)
        };
        if let Some((callback, entry)) = initial {
            callback(entry);
        }
        Subscription(id)
    }

    fn unobserve(&self, subscription: Subscription) {
        self.state.lock().registrations.remove(&subscription.0);
    }
}
