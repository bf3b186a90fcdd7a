//! Debounce and throttle wrappers.
//!
//! Both wrappers defer work only through the injected [`Timer`]; neither ever
//! blocks the caller, and each keeps at most one timer pending.

use std::sync::Arc;
use std::time::Duration;

use parking_lot::Mutex;

use crate::core::capability::{Timer, TimerHandle};

struct DebounceState<A> {
    pending: Option<TimerHandle>,
    args: Option<A>,
    /// Bumped on every call so a stale timer never runs newer arguments twice.
    generation: u64,
}

/// Trailing-edge debounced wrapper produced by [`debounce`].
///
/// Clones share the same pending call.
pub struct Debounced<A> {
    f: Arc<dyn Fn(A) + Send + Sync>,
    wait: Duration,
    timer: Arc<dyn Timer>,
    state: Arc<Mutex<DebounceState<A>>>,
}

impl<A> Clone for Debounced<A> {
    fn clone(&self) -> Self {
        Self {
            f: Arc::clone(&self.f),
            wait: self.wait,
            timer: Arc::clone(&self.timer),
            state: Arc::clone(&self.state),
        }
    }
}

/// Coalesce bursts of calls into one call of `f`, `wait` after the latest.
///
/// `f` receives the arguments of the last call in the burst. Its outcome is
/// not observable by callers; handle failures inside `f`.
pub fn debounce<A, F>(f: F, wait: Duration, timer: Arc<dyn Timer>) -> Debounced<A>
where
    A: Send + 'static,
    F: Fn(A) + Send + Sync + 'static,
{
    Debounced {
        f: Arc::new(f),
        wait,
        timer,
        state: Arc::new(Mutex::new(DebounceState {
            pending: None,
            args: None,
            generation: 0,
        })),
    }
}

impl<A: Send + 'static> Debounced<A> {
    /// Record a call, replacing any pending one and restarting the quiet period.
    pub fn call(&self, args: A) {
        let mut state = self.state.lock();
        if let Some(handle) = state.pending.take() {
            self.timer.cancel(handle);
        }
        state.args = Some(args);
        state.generation = state.generation.wrapping_add(1);
        let generation = state.generation;

        let f = Arc::clone(&self.f);
        let shared = Arc::clone(&self.state);
        let handle = self.timer.schedule(
            self.wait,
            Box::new(move || {
                let args = {
                    let mut state = shared.lock();
                    if state.generation != generation {
                        return;
                    }
                    state.pending = None;
                    state.args.take()
                };
                if let Some(args) = args {
                    tracing::trace!("debounced call firing");
                    f(args);
                }
            }),
        );
        state.pending = Some(handle);
    }

    /// Drop the pending call, if any.
    pub fn cancel(&self) {
        let mut state = self.state.lock();
        if let Some(handle) = state.pending.take() {
            self.timer.cancel(handle);
        }
        state.args = None;
    }

    /// Run the pending call now instead of waiting for the quiet period.
    ///
    /// Returns `true` if a call was pending.
    pub fn flush(&self) -> bool {
        let args = {
            let mut state = self.state.lock();
            if let Some(handle) = state.pending.take() {
                self.timer.cancel(handle);
            }
            state.args.take()
        };
        match args {
            Some(args) => {
                (self.f)(args);
                true
            }
            None => false,
        }
    }

    /// Whether a call is waiting for the quiet period to end.
    pub fn is_pending(&self) -> bool {
        self.state.lock().pending.is_some()
    }

    /// Configured quiet period.
    pub const fn wait(&self) -> Duration {
        self.wait
    }
}

struct ThrottleState<R> {
    suppressing: bool,
    reset: Option<TimerHandle>,
    last_result: Option<R>,
}

/// Leading-edge throttled wrapper produced by [`throttle`].
///
/// Clones share the same window.
pub struct Throttled<A, R = ()> {
    f: Arc<dyn Fn(A) -> R + Send + Sync>,
    limit: Duration,
    timer: Arc<dyn Timer>,
    state: Arc<Mutex<ThrottleState<R>>>,
}

impl<A, R> Clone for Throttled<A, R> {
    fn clone(&self) -> Self {
        Self {
            f: Arc::clone(&self.f),
            limit: self.limit,
            timer: Arc::clone(&self.timer),
            state: Arc::clone(&self.state),
        }
    }
}

/// Run `f` at most once per `limit`, firing immediately on the first call.
///
/// `f` runs on the caller's stack, so whatever it returns (including an
/// `Err`) reaches the triggering caller, and a panic unwinds into it without
/// opening the suppression window.
pub fn throttle<A, R, F>(f: F, limit: Duration, timer: Arc<dyn Timer>) -> Throttled<A, R>
where
    R: Clone + Send + 'static,
    F: Fn(A) -> R + Send + Sync + 'static,
{
    Throttled {
        f: Arc::new(f),
        limit,
        timer,
        state: Arc::new(Mutex::new(ThrottleState {
            suppressing: false,
            reset: None,
            last_result: None,
        })),
    }
}

impl<A, R: Clone + Send + 'static> Throttled<A, R> {
    /// Invoke `f` if the window is open; otherwise return the previous result.
    pub fn call(&self, args: A) -> R {
        {
            let state = self.state.lock();
            if state.suppressing {
                if let Some(result) = &state.last_result {
                    tracing::trace!("throttled call suppressed");
                    return result.clone();
                }
            }
        }

        let result = (self.f)(args);

        let mut state = self.state.lock();
        state.last_result = Some(result.clone());
        state.suppressing = true;
        if let Some(handle) = state.reset.take() {
            self.timer.cancel(handle);
        }
        let shared = Arc::clone(&self.state);
        state.reset = Some(self.timer.schedule(
            self.limit,
            Box::new(move || {
                let mut state = shared.lock();
                state.suppressing = false;
                state.reset = None;
            }),
        ));
        result
    }

    /// Result of the most recent actual invocation.
    pub fn last_result(&self) -> Option<R> {
        self.state.lock().last_result.clone()
    }

    /// Whether calls are currently being suppressed.
    pub fn is_suppressing(&self) -> bool {
        self.state.lock().suppressing
    }

    /// Reopen the window immediately.
    pub fn reset(&self) {
        let mut state = self.state.lock();
        if let Some(handle) = state.reset.take() {
            self.timer.cancel(handle);
        }
        state.suppressing = false;
    }

    /// Configured interval.
    pub const fn limit(&self) -> Duration {
        self.limit
    }
}
