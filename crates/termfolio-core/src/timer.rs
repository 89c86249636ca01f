#![forbid(unsafe_code)]

//! Host-clock timers.
//!
//! Nothing here reads a clock. The host passes the current time (elapsed
//! since session start) and the timers report what is due, which keeps the
//! whole session single-threaded and replayable.

use std::cmp::Ordering;
use std::collections::{BinaryHeap, HashSet};
use std::time::Duration;

/// Handle for cancelling a scheduled timer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TimerId(u64);

#[derive(Debug)]
struct Entry<E> {
    deadline: Duration,
    id: TimerId,
    event: E,
}

impl<E> PartialEq for Entry<E> {
    fn eq(&self, other: &Self) -> bool {
        self.deadline == other.deadline && self.id == other.id
    }
}

impl<E> Eq for Entry<E> {}

impl<E> PartialOrd for Entry<E> {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl<E> Ord for Entry<E> {
    // Reversed so the max-heap yields the earliest deadline; ties fire in
    // scheduling order.
    fn cmp(&self, other: &Self) -> Ordering {
        other
            .deadline
            .cmp(&self.deadline)
            .then_with(|| other.id.cmp(&self.id))
    }
}

/// One-shot timers carrying an event payload.
#[derive(Debug)]
pub struct Timers<E> {
    heap: BinaryHeap<Entry<E>>,
    cancelled: HashSet<TimerId>,
    next_id: u64,
}

impl<E> Default for Timers<E> {
    fn default() -> Self {
        Self::new()
    }
}

impl<E> Timers<E> {
    #[must_use]
    pub fn new() -> Self {
        Self {
            heap: BinaryHeap::new(),
            cancelled: HashSet::new(),
            next_id: 0,
        }
    }

    /// Fire `event` once `now >= deadline`.
    pub fn schedule(&mut self, deadline: Duration, event: E) -> TimerId {
        let id = TimerId(self.next_id);
        self.next_id += 1;
        self.heap.push(Entry {
            deadline,
            id,
            event,
        });
        id
    }

    /// Cancel a timer. Returns `false` if it already fired or was cancelled.
    pub fn cancel(&mut self, id: TimerId) -> bool {
        let live = self
            .heap
            .iter()
            .any(|entry| entry.id == id && !self.cancelled.contains(&id));
        if live {
            self.cancelled.insert(id);
        }
        live
    }

    /// Pop the earliest timer that is due at `now`.
    pub fn pop_due(&mut self, now: Duration) -> Option<(TimerId, E)> {
        loop {
            let due = self.heap.peek().is_some_and(|entry| entry.deadline <= now);
            if !due {
                return None;
            }
            let entry = self.heap.pop()?;
            if self.cancelled.remove(&entry.id) {
                continue;
            }
            return Some((entry.id, entry.event));
        }
    }

    /// Earliest live deadline.
    #[must_use]
    pub fn next_deadline(&self) -> Option<Duration> {
        self.heap
            .iter()
            .filter(|entry| !self.cancelled.contains(&entry.id))
            .map(|entry| entry.deadline)
            .min()
    }

    /// Number of live timers.
    #[must_use]
    pub fn len(&self) -> usize {
        self.heap.len() - self.cancelled.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Drop every pending timer.
    pub fn clear(&mut self) {
        self.heap.clear();
        self.cancelled.clear();
    }
}

/// Fixed-period tick source.
///
/// After a stall the interval reports the missed ticks, capped at
/// `max_catch_up`, then realigns to the current time.
#[derive(Debug, Clone)]
pub struct Interval {
    period: Duration,
    next: Duration,
    max_catch_up: u32,
}

impl Interval {
    /// First tick fires one period after `start`.
    #[must_use]
    pub fn new(period: Duration, start: Duration) -> Self {
        Self {
            period,
            next: start + period,
            max_catch_up: 4,
        }
    }

    #[must_use]
    pub fn with_max_catch_up(mut self, max: u32) -> Self {
        self.max_catch_up = max.max(1);
        self
    }

    #[must_use]
    pub fn period(&self) -> Duration {
        self.period
    }

    /// Time of the next tick.
    #[must_use]
    pub fn next_deadline(&self) -> Duration {
        self.next
    }

    /// Number of ticks due at `now` (bounded by the catch-up cap).
    pub fn poll(&mut self, now: Duration) -> u32 {
        if self.period.is_zero() || now < self.next {
            return 0;
        }
        let mut fired = 0u32;
        while now >= self.next && fired < self.max_catch_up {
            self.next += self.period;
            fired += 1;
        }
        if now >= self.next {
            // Too far behind: skip the backlog instead of bursting.
            let behind = (now - self.next).as_nanos() / self.period.as_nanos();
            self.next += self.period * (behind as u32 + 1);
        }
        fired
    }
}
