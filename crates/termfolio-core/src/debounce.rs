#![forbid(unsafe_code)]

//! Latest-wins debouncer driven by a host clock.
//!
//! A [`Debouncer`] is a single reschedulable timer: each new value replaces
//! the pending one and pushes the deadline out by the quiet period. The
//! value is released once, after the first quiet period with no new input.
//!
//! # Invariants
//!
//! - Latest wins: the last value in a burst is the one released.
//! - At most one release per quiet period.
//! - Deterministic: identical call sequences yield identical releases.

use std::time::Duration;

#[derive(Debug, Clone)]
pub struct Debouncer<T> {
    quiet: Duration,
    pending: Option<(T, Duration)>,
    coalesced: u64,
}

impl<T> Debouncer<T> {
    #[must_use]
    pub fn new(quiet: Duration) -> Self {
        Self {
            quiet,
            pending: None,
            coalesced: 0,
        }
    }

    /// Record a new value at `now`, cancelling any pending one.
    pub fn trigger(&mut self, value: T, now: Duration) {
        if self.pending.is_some() {
            self.coalesced += 1;
        }
        self.pending = Some((value, now + self.quiet));
    }

    /// Release the pending value if its quiet period has elapsed.
    pub fn poll(&mut self, now: Duration) -> Option<T> {
        let ready = matches!(&self.pending, Some((_, deadline)) if now >= *deadline);
        if !ready {
            return None;
        }
        self.pending.take().map(|(value, _)| value)
    }

    /// Deadline of the pending value, if any.
    #[must_use]
    pub fn deadline(&self) -> Option<Duration> {
        self.pending.as_ref().map(|(_, deadline)| *deadline)
    }

    #[must_use]
    pub fn is_pending(&self) -> bool {
        self.pending.is_some()
    }

    /// Values superseded before they were released.
    #[must_use]
    pub fn coalesced(&self) -> u64 {
        self.coalesced
    }

    /// Drop the pending value without releasing it.
    pub fn cancel(&mut self) {
        self.pending = None;
    }
}
