//! Tokio-backed [`Spawn`] for visibility-loader fetches.
//!
//! Loaders hand each one-shot fetch to their spawner; on a tokio host the
//! fetch runs as a detached task and reports back through the loader's
//! shared state.

use std::future::Future;
use std::sync::Arc;

use crate::core::Spawn;

/// Runs loader fetches as detached tasks on a tokio runtime.
///
/// Cloning shares the runtime handle, so one spawner can back many loaders.
#[derive(Clone)]
pub struct TokioSpawner {
    handle: Arc<tokio::runtime::Handle>,
}

impl TokioSpawner {
    /// Spawner for the runtime behind `handle`.
    pub fn new(handle: tokio::runtime::Handle) -> Self {
        Self {
            handle: Arc::new(handle),
        }
    }

    /// Spawner bound to the runtime of the calling context.
    pub fn current() -> Result<Self, tokio::runtime::TryCurrentError> {
        tokio::runtime::Handle::try_current().map(Self::new)
    }
}

impl Spawn for TokioSpawner {
    fn spawn<F>(&self, fut: F)
    where
        F: Future<Output = ()> + Send + 'static,
    {
        self.handle.spawn(fut);
    }
}
