//! Virtual-clock timer for deterministic scheduling.

use std::collections::{BTreeMap, HashMap};
use std::time::Duration;

use parking_lot::Mutex;

use crate::core::capability::{Timer, TimerCallback, TimerHandle};

struct TimerState {
    now: Duration,
    next_id: u64,
    /// Ordered by deadline, then by scheduling order.
    queue: BTreeMap<(Duration, u64), TimerCallback>,
    deadlines: HashMap<u64, Duration>,
}

/// Timer driven by explicit [`advance`](Self::advance) calls.
///
/// Callbacks run on the thread calling `advance`, in deadline order, with the
/// virtual clock set to their deadline. Callbacks may schedule or cancel
/// further timers.
pub struct ManualTimer {
    state: Mutex<TimerState>,
}

impl ManualTimer {
    /// Timer at virtual time zero.
    pub fn new() -> Self {
        Self {
            state: Mutex::new(TimerState {
                now: Duration::ZERO,
                next_id: 1,
                queue: BTreeMap::new(),
                deadlines: HashMap::new(),
            }),
        }
    }

    /// Current virtual time.
    pub fn now(&self) -> Duration {
        self.state.lock().now
    }

    /// Number of timers waiting to fire.
    pub fn pending(&self) -> usize {
        self.state.lock().queue.len()
    }

    /// Move the clock forward by `by`, firing every timer that comes due.
    ///
    /// Returns the number of callbacks run.
    pub fn advance(&self, by: Duration) -> usize {
        let target = self.state.lock().now + by;
        let mut fired = 0;
        loop {
            let callback = {
                let mut state = self.state.lock();
                let due = state
                    .queue
                    .first_key_value()
                    .map(|(key, _)| *key)
                    .filter(|(deadline, _)| *deadline <= target);
                let Some(key) = due else {
                    state.now = target;
                    break;
                };
                state.now = key.0;
                state.deadlines.remove(&key.1);
                state.queue.remove(&key)
            };
            if let Some(callback) = callback {
                callback();
                fired += 1;
            }
        }
        fired
    }

    /// Fire everything pending, however far in the future.
    pub fn run_all(&self) -> usize {
        let mut fired = 0;
        loop {
            let next = {
                let state = self.state.lock();
                state
                    .queue
                    .first_key_value()
                    .map(|((deadline, _), _)| deadline.saturating_sub(state.now))
            };
            match next {
                Some(delay) => fired += self.advance(delay),
                None => return fired,
            }
        }
    }
}

impl Default for ManualTimer {
    fn default() -> Self {
        Self::new()
    }
}

impl Timer for ManualTimer {
    fn schedule(&self, delay: Duration, callback: TimerCallback) -> TimerHandle {
        let mut state = self.state.lock();
        let id = state.next_id;
        state.next_id += 1;
        let deadline = state.now + delay;
        state.queue.insert((deadline, id), callback);
        state.deadlines.insert(id, deadline);
        TimerHandle(id)
    }

    fn cancel(&self, handle: TimerHandle) {
        let mut state = self.state.lock();
        if let Some(deadline) = state.deadlines.remove(&handle.0) {
            state.queue.remove(&(deadline, handle.0));
        }
    }
}
