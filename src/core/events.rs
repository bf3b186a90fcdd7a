//! Progress event sinks.
//!
//! Loaders and uploaders report every state transition to an optional sink so
//! the UI layer can render progress without polling.

use std::collections::VecDeque;
use std::sync::Arc;

use parking_lot::Mutex;
use serde::{Deserialize, Serialize};

use crate::core::batch_uploader::JobStatus;
use crate::core::capability::TargetId;
use crate::core::visibility_loader::LoadState;
use crate::util::clock::now_ms;

/// What happened.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum EventKind {
    /// A visibility loader changed state.
    LoadState {
        /// Observed element.
        target: TargetId,
        /// New state.
        state: LoadState,
    },
    /// An upload job changed status.
    JobStatus {
        /// Position of the job in its batch.
        index: usize,
        /// New status.
        status: JobStatus,
        /// Error message when the job failed.
        error: Option<String>,
    },
    /// A batch finished.
    BatchFinished {
        /// Jobs that ended `Done`.
        done: usize,
        /// Jobs that ended `Failed`.
        failed: usize,
    },
}

/// Progress event structure.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LoadgateEvent {
    /// Batch or loader identifier the event belongs to.
    pub source: String,
    /// Timestamp milliseconds.
    pub created_at_ms: u128,
    /// Event details.
    pub kind: EventKind,
}

/// Event sink abstraction.
pub trait EventSink: Send {
    /// Record an event.
    fn record(&mut self, event: LoadgateEvent);
}

/// Event sink shared between a component and its spawned work.
pub type SharedEventSink = Arc<Mutex<Box<dyn EventSink>>>;

/// Wrap a sink for sharing.
pub fn shared_sink(sink: impl EventSink + 'static) -> SharedEventSink {
    Arc::new(Mutex::new(Box::new(sink)))
}

/// In-memory event sink for testing and dev.
pub struct InMemoryEventSink {
    events: VecDeque<LoadgateEvent>,
    max_events: usize,
}

impl InMemoryEventSink {
    /// Create a new in-memory sink with a bounded buffer.
    pub fn new(max_events: usize) -> Self {
        Self {
            events: VecDeque::with_capacity(max_events.min(1024)),
            max_events,
        }
    }

    /// Retrieve a snapshot of stored events.
    pub fn events(&self) -> Vec<LoadgateEvent> {
        self.events.iter().cloned().collect()
    }
}

impl EventSink for InMemoryEventSink {
    fn record(&mut self, event: LoadgateEvent) {
        if self.max_events == 0 {
            return;
        }
        if self.events.len() >= self.max_events {
            self.events.pop_front();
        }
        self.events.push_back(event);
    }
}

/// Sink that forwards events as `tracing` records.
#[derive(Debug, Default, Clone, Copy)]
pub struct TracingEventSink;

impl EventSink for TracingEventSink {
    fn record(&mut self, event: LoadgateEvent) {
        tracing::debug!(source = %event.source, kind = ?event.kind, "loadgate event");
    }
}

/// Helper to build an event stamped with the current time.
pub fn build_event(source: impl Into<String>, kind: EventKind) -> LoadgateEvent {
    LoadgateEvent {
        source: source.into(),
        created_at_ms: now_ms(),
        kind,
    }
}
