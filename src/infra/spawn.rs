//! Cooperative single-thread spawner.

use std::future::Future;
use std::sync::Arc;
use std::task::{Context, Poll};

use futures::future::BoxFuture;
use futures::task::noop_waker;
use futures::FutureExt;
use parking_lot::Mutex;

use crate::core::Spawn;

/// Spawner that queues futures and polls them only when asked.
///
/// Models a host task queue: nothing runs until
/// [`run_until_stalled`](Self::run_until_stalled) is called, and everything
/// runs on the calling thread.
#[derive(Clone, Default)]
pub struct ManualSpawner {
    tasks: Arc<Mutex<Vec<BoxFuture<'static, ()>>>>,
}

impl ManualSpawner {
    /// Empty task queue.
    pub fn new() -> Self {
        Self::default()
    }

    /// Tasks spawned but not finished.
    pub fn pending(&self) -> usize {
        self.tasks.lock().len()
    }

    /// Poll queued tasks until none of them can make progress.
    ///
    /// Returns the number of tasks still pending.
    pub fn run_until_stalled(&self) -> usize {
        let waker = noop_waker();
        let mut cx = Context::from_waker(&waker);
        loop {
            let batch = std::mem::take(&mut *self.tasks.lock());
            if batch.is_empty() {
                return 0;
            }
            let mut progressed = false;
            let mut still_pending = Vec::with_capacity(batch.len());
            for mut task in batch {
                match task.poll_unpin(&mut cx) {
                    Poll::Ready(()) => progressed = true,
                    Poll::Pending => still_pending.push(task),
                }
            }
            let mut tasks = self.tasks.lock();
            let spawned = std::mem::take(&mut *tasks);
            let spawned_any = !spawned.is_empty();
            tasks.extend(still_pending);
            tasks.extend(spawned);
            if !progressed && !spawned_any {
                return tasks.len();
            }
        }
    }
}

impl Spawn for ManualSpawner {
    fn spawn<F>(&self, fut: F)
    where
        F: Future<Output = ()> + Send + 'static,
    {
        self.tasks.lock().push(fut.boxed());
    }
}
