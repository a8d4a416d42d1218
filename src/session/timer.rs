//! Cancellable delayed callbacks.
//!
//! The session never calls back into itself from a timer. A scheduler hands
//! out handles, and whoever drives the event loop delivers due handles to
//! `SessionController::on_timer`.

use std::collections::BTreeMap;
use std::time::Duration;

/// Identifies one scheduled timer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TimerHandle(u64);

/// Something that can schedule and cancel delayed wake-ups.
pub trait Scheduler {
    /// Schedule a wake-up `delay` from now.
    fn schedule(&mut self, delay: Duration) -> TimerHandle;

    /// Cancel a timer. Returns false if it already fired or was cancelled.
    fn cancel(&mut self, handle: TimerHandle) -> bool;
}

/// A virtual-clock scheduler.
///
/// Time only moves when `advance` is called, which makes debounce behaviour
/// deterministic in tests and in scripted sessions.
#[derive(Debug, Default)]
pub struct TimerQueue {
    now: Duration,
    next_id: u64,
    deadlines: BTreeMap<TimerHandle, Duration>,
}

impl TimerQueue {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Current virtual time.
    #[must_use]
    pub fn now(&self) -> Duration {
        self.now
    }

    /// Number of timers still waiting.
    #[must_use]
    pub fn pending(&self) -> usize {
        self.deadlines.len()
    }

    /// Earliest deadline among pending timers.
    #[must_use]
    pub fn next_deadline(&self) -> Option<Duration> {
        self.deadlines.values().min().copied()
    }

    /// Move the clock forward and return the timers that came due, in
    /// deadline order (ties in scheduling order).
    pub fn advance(&mut self, by: Duration) -> Vec<TimerHandle> {
        self.now = self.now.saturating_add(by);
        let now = self.now;

        let mut due: Vec<(Duration, TimerHandle)> = self
            .deadlines
            .iter()
            .filter(|&(_, &deadline)| deadline <= now)
            .map(|(&handle, &deadline)| (deadline, handle))
            .collect();
        due.sort();

        for (_, handle) in &due {
            self.deadlines.remove(handle);
        }
        due.into_iter().map(|(_, handle)| handle).collect()
    }

    /// Advance to the last pending deadline, firing everything.
    pub fn settle(&mut self) -> Vec<TimerHandle> {
        let Some(last) = self.deadlines.values().max().copied() else {
            return Vec::new();
        };
        self.advance(last.saturating_sub(self.now))
    }
}

impl Scheduler for TimerQueue {
    fn schedule(&mut self, delay: Duration) -> TimerHandle {
        let handle = TimerHandle(self.next_id);
        self.next_id += 1;
        self.deadlines.insert(handle, self.now.saturating_add(delay));
        handle
    }

    fn cancel(&mut self, handle: TimerHandle) -> bool {
        self.deadlines.remove(&handle).is_some()
    }
}
