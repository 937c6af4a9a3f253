//! Cancellable delayed tasks over a host-driven clock.
//!
//! The scheduler never reads wall time. The host advances it explicitly, which
//! keeps debounce and settle timing deterministic in tests and lets a browser
//! binding forward `setTimeout` ticks or animation frames.

use std::collections::{BTreeMap, HashMap};
use std::time::Duration;

/// Opaque handle for a scheduled task.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TaskHandle(u64);

#[derive(Debug)]
pub struct Scheduler<T> {
    now: Duration,
    next_id: u64,
    queue: BTreeMap<(Duration, u64), T>,
    deadlines: HashMap<u64, Duration>,
}

impl<T> Default for Scheduler<T> {
    fn default() -> Self {
        Self {
            now: Duration::ZERO,
            next_id: 0,
            queue: BTreeMap::new(),
            deadlines: HashMap::new(),
        }
    }
}

impl<T> Scheduler<T> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Current monotonic time.
    pub fn now(&self) -> Duration {
        self.now
    }

    pub fn schedule(&mut self, delay: Duration, task: T) -> TaskHandle {
        let id = self.next_id;
        self.next_id += 1;
        let deadline = self.now.saturating_add(delay);
        self.queue.insert((deadline, id), task);
        self.deadlines.insert(id, deadline);
        TaskHandle(id)
    }

    /// Cancel a pending task. Returns `false` when it already ran or was
    /// cancelled before.
    pub fn cancel(&mut self, handle: TaskHandle) -> bool {
        match self.deadlines.remove(&handle.0) {
            Some(deadline) => self.queue.remove(&(deadline, handle.0)).is_some(),
            None => false,
        }
    }

    pub fn is_pending(&self, handle: TaskHandle) -> bool {
        self.deadlines.contains_key(&handle.0)
    }

    pub fn pending(&self) -> usize {
        self.queue.len()
    }

    /// Deadline of the earliest pending task.
    pub fn next_deadline(&self) -> Option<Duration> {
        self.queue.keys().next().map(|(deadline, _)| *deadline)
    }

    /// Move the clock forward by `dt` without firing anything.
    pub fn advance_clock(&mut self, dt: Duration) {
        self.now = self.now.saturating_add(dt);
    }

    /// Move the clock to `at`. Earlier instants are ignored; time is monotonic.
    pub fn set_clock(&mut self, at: Duration) {
        self.now = self.now.max(at);
    }

    /// Remove the earliest task whose deadline has passed.
    pub fn pop_due(&mut self) -> Option<(TaskHandle, T)> {
        let key = *self.queue.keys().next()?;
        if key.0 > self.now {
            return None;
        }
        let task = self.queue.remove(&key)?;
        self.deadlines.remove(&key.1);
        Some((TaskHandle(key.1), task))
    }
}
