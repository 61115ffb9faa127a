//! Detail Cache Module
//!
//! In-memory cache with sliding expiration. Each entry owns a pending removal
//! on the scheduler; every read cancels it and schedules a fresh one.

use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, Weak};
use std::time::{Duration, Instant};

use tracing::debug;

use crate::tasks::{lock, Scheduler, TimerHandle};

/// Default sliding expiry window
pub const DEFAULT_DETAIL_TTL: Duration = Duration::from_secs(5 * 60);

// == Slot ==
struct Slot<V> {
    value: V,
    deadline: Instant,
    /// Identifies the removal currently armed for this slot
    generation: u64,
    timer: TimerHandle,
}

struct Inner<V> {
    entries: Mutex<HashMap<String, Slot<V>>>,
    next_generation: AtomicU64,
}

// == Detail Cache ==
/// Cache of values keyed by item id that expire after `ttl` without use.
///
/// Cloning shares the same entries.
pub struct DetailCache<V> {
    inner: Arc<Inner<V>>,
    scheduler: Arc<dyn Scheduler>,
    ttl: Duration,
}

impl<V> Clone for DetailCache<V> {
    fn clone(&self) -> Self {
        Self {
            inner: self.inner.clone(),
            scheduler: self.scheduler.clone(),
            ttl: self.ttl,
        }
    }
}

impl<V: Clone + Send + 'static> DetailCache<V> {
    // == Constructor ==
    pub fn new(scheduler: Arc<dyn Scheduler>, ttl: Duration) -> Self {
        Self {
            inner: Arc::new(Inner {
                entries: Mutex::new(HashMap::new()),
                next_generation: AtomicU64::new(0),
            }),
            scheduler,
            ttl,
        }
    }

    // == Insert ==
    /// Stores `value` under `id` and starts its expiry window.
    ///
    /// Replacing an existing entry cancels its pending removal.
    pub fn insert(&self, id: &str, value: V) {
        // Held while arming so a removal that fires at once waits for the slot
        let mut entries = lock(&self.inner.entries);
        let (deadline, generation, timer) = self.arm(id);
        let slot = Slot {
            value,
            deadline,
            generation,
            timer,
        };

        if let Some(mut old) = entries.insert(id.to_string(), slot) {
            old.timer.cancel();
        }
    }

    // == Get ==
    /// Returns the value for `id`, restarting its expiry window.
    pub fn get(&self, id: &str) -> Option<V> {
        let mut entries = lock(&self.inner.entries);
        let slot = entries.get_mut(id)?;

        slot.timer.cancel();
        let (deadline, generation, timer) = self.arm(id);
        slot.deadline = deadline;
        slot.generation = generation;
        slot.timer = timer;

        Some(slot.value.clone())
    }

    // == Remove ==
    /// Drops `id` and its pending removal.
    pub fn remove(&self, id: &str) -> Option<V> {
        let mut slot = lock(&self.inner.entries).remove(id)?;
        slot.timer.cancel();
        Some(slot.value)
    }

    /// When `id` will expire if it is not used again.
    pub fn deadline(&self, id: &str) -> Option<Instant> {
        lock(&self.inner.entries).get(id).map(|slot| slot.deadline)
    }

    pub fn contains(&self, id: &str) -> bool {
        lock(&self.inner.entries).contains_key(id)
    }

    pub fn len(&self) -> usize {
        lock(&self.inner.entries).len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn ttl(&self) -> Duration {
        self.ttl
    }

    // == Arm ==
    /// Schedules the removal of `id` one window from now.
    fn arm(&self, id: &str) -> (Instant, u64, TimerHandle) {
        let generation = self.inner.next_generation.fetch_add(1, Ordering::Relaxed);
        let deadline = self.scheduler.now() + self.ttl;
        let weak = Arc::downgrade(&self.inner);
        let id = id.to_string();

        let timer = self
            .scheduler
            .schedule_at(deadline, Box::new(move || expire(weak, &id, generation)));
        (deadline, generation, timer)
    }
}

/// Removes `id` if the removal that fired is still the one armed for it.
fn expire<V>(inner: Weak<Inner<V>>, id: &str, generation: u64) {
    let Some(inner) = inner.upgrade() else {
        return;
    };

    let mut entries = lock(&inner.entries);
    if entries.get(id).is_some_and(|slot| slot.generation == generation) {
        entries.remove(id);
        debug!("Detail entry '{}' expired", id);
    }
}
