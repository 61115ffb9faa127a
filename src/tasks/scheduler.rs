//! Deferred Task Scheduling
//!
//! `Scheduler` runs a callback at a deadline and hands back a handle that can
//! cancel it. The detail cache uses it for sliding expiry.

use std::collections::BTreeMap;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::{Duration, Instant};

use tokio::runtime::Handle;
use tracing::debug;

/// A deferred callback.
pub type Task = Box<dyn FnOnce() + Send + 'static>;

// == Scheduler ==
/// Runs tasks at a point in time.
pub trait Scheduler: Send + Sync {
    /// Current time on this scheduler's clock.
    fn now(&self) -> Instant;

    /// Runs `task` once `deadline` has passed, unless cancelled first.
    fn schedule_at(&self, deadline: Instant, task: Task) -> TimerHandle;
}

// == Timer Handle ==
/// Cancels a scheduled task. Dropping the handle leaves the task scheduled.
pub struct TimerHandle {
    cancel: Option<Box<dyn FnOnce() + Send + 'static>>,
}

impl TimerHandle {
    pub fn new(cancel: impl FnOnce() + Send + 'static) -> Self {
        Self {
            cancel: Some(Box::new(cancel)),
        }
    }

    /// Prevents the task from running. Calling it again does nothing.
    pub fn cancel(&mut self) {
        if let Some(cancel) = self.cancel.take() {
            cancel();
        }
    }

    pub fn is_cancelled(&self) -> bool {
        self.cancel.is_none()
    }
}

impl std::fmt::Debug for TimerHandle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TimerHandle")
            .field("cancelled", &self.is_cancelled())
            .finish()
    }
}

// == Tokio Scheduler ==
/// Schedules each task as a tokio task sleeping until its deadline.
#[derive(Debug, Clone)]
pub struct TokioScheduler {
    handle: Handle,
}

impl TokioScheduler {
    /// Creates a scheduler on the current tokio runtime.
    ///
    /// # Panics
    /// Panics when called outside a tokio runtime.
    pub fn new() -> Self {
        Self::from_handle(Handle::current())
    }

    pub fn from_handle(handle: Handle) -> Self {
        Self { handle }
    }
}

impl Scheduler for TokioScheduler {
    fn now(&self) -> Instant {
        Instant::now()
    }

    fn schedule_at(&self, deadline: Instant, task: Task) -> TimerHandle {
        let join = self.handle.spawn(async move {
            tokio::time::sleep_until(tokio::time::Instant::from_std(deadline)).await;
            task();
        });
        TimerHandle::new(move || join.abort())
    }
}

// == Manual Scheduler ==
/// Scheduler with a clock that only moves when told to.
///
/// Tasks run synchronously inside [`ManualScheduler::advance`], in deadline
/// order. Used to test expiry without waiting on real time.
#[derive(Clone)]
pub struct ManualScheduler {
    state: Arc<Mutex<ManualState>>,
}

struct ManualState {
    now: Instant,
    next_id: u64,
    pending: BTreeMap<(Instant, u64), Task>,
}

impl ManualScheduler {
    pub fn new() -> Self {
        Self {
            state: Arc::new(Mutex::new(ManualState {
                now: Instant::now(),
                next_id: 0,
                pending: BTreeMap::new(),
            })),
        }
    }

    /// Moves the clock forward and runs every task now due.
    ///
    /// Returns the number of tasks run.
    pub fn advance(&self, by: Duration) -> usize {
        let now = {
            let mut state = lock(&self.state);
            state.now += by;
            state.now
        };

        let mut fired = 0;
        loop {
            // Release the lock before running so tasks can schedule more work
            let task = {
                let mut state = lock(&self.state);
                let due = state
                    .pending
                    .keys()
                    .next()
                    .copied()
                    .filter(|(deadline, _)| *deadline <= now);
                due.and_then(|key| state.pending.remove(&key))
            };

            match task {
                Some(task) => {
                    task();
                    fired += 1;
                }
                None => break,
            }
        }

        debug!("Manual scheduler advanced {:?}, ran {} tasks", by, fired);
        fired
    }

    /// Number of scheduled, uncancelled tasks.
    pub fn pending(&self) -> usize {
        lock(&self.state).pending.len()
    }
}

impl Default for ManualScheduler {
    fn default() -> Self {
        Self::new()
    }
}

impl Scheduler for ManualScheduler {
    fn now(&self) -> Instant {
        lock(&self.state).now
    }

    fn schedule_at(&self, deadline: Instant, task: Task) -> TimerHandle {
        let key = {
            let mut state = lock(&self.state);
            let key = (deadline, state.next_id);
            state.next_id += 1;
            state.pending.insert(key, task);
            key
        };

        let state = Arc::downgrade(&self.state);
        TimerHandle::new(move || {
            if let Some(state) = state.upgrade() {
                lock(&state).pending.remove(&key);
            }
        })
    }
}

/// Locks `mutex`, recovering the data if a task panicked while holding it.
pub(crate) fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}
