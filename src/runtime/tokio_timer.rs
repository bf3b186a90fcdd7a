//! Tokio-backed timer.

use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;

use parking_lot::Mutex;
use tokio::sync::oneshot;

use crate::core::capability::{Timer, TimerCallback, TimerHandle};

/// Timer that sleeps on a tokio runtime.
///
/// Each scheduled callback is a spawned task racing its sleep against a
/// cancellation signal; callbacks run on a runtime worker.
#[derive(Clone)]
pub struct TokioTimer {
    handle: tokio::runtime::Handle,
    next_id: Arc<AtomicU64>,
    cancels: Arc<Mutex<HashMap<u64, oneshot::Sender<()>>>>,
}

impl TokioTimer {
    /// Timer on the given runtime.
    pub fn new(handle: tokio::runtime::Handle) -> Self {
        Self {
            handle,
            next_id: Arc::new(AtomicU64::new(1)),
            cancels: Arc::new(Mutex::new(HashMap::new())),
        }
    }

    /// Timer bound to the runtime of the calling context.
    pub fn current() -> Result<Self, tokio::runtime::TryCurrentError> {
        tokio::runtime::Handle::try_current().map(Self::new)
    }

    /// Timers scheduled and neither fired nor cancelled.
    pub fn pending(&self) -> usize {
        self.cancels.lock().len()
    }
}

impl Timer for TokioTimer {
    fn schedule(&self, delay: Duration, callback: TimerCallback) -> TimerHandle {
        let id = self.next_id.fetch_add(1, Ordering::Relaxed);
        let (cancel_tx, cancel_rx) = oneshot::channel();
        self.cancels.lock().insert(id, cancel_tx);

        let cancels = Arc::clone(&self.cancels);
        self.handle.spawn(async move {
            tokio::select! {
                () = tokio::time::sleep(delay) => {
                    if cancels.lock().remove(&id).is_some() {
                        callback();
                    }
                }
                _ = cancel_rx => {}
            }
        });
        TimerHandle(id)
    }

    fn cancel(&self, handle: TimerHandle) {
        if let Some(cancel) = self.cancels.lock().remove(&handle.0) {
            let _ = cancel.send(());
        }
    }
}
