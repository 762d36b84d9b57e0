//! Debounce for the search box.

use std::time::{Duration, Instant};

/// Delays a changing value until it has been stable for `interval`.
///
/// Holds at most one pending value. Every `push` replaces it and re-arms
/// the deadline, so intermediate values are dropped and an older deadline
/// can never fire after a newer push.
#[derive(Debug)]
pub struct Debouncer<T> {
    /// Required stability interval.
    interval: Duration,
    /// Latest value and the instant it settles at.
    pending: Option<(T, Instant)>,
}

impl<T> Debouncer<T> {
    /// Creates an idle debouncer.
    #[must_use]
    pub const fn new(interval: Duration) -> Self {
        Self {
            interval,
            pending: None,
        }
    }

    /// Records a new value observed at `now`, resetting the timer.
    pub fn push(&mut self, value: T, now: Instant) {
        let deadline = now.checked_add(self.interval).unwrap_or(now);
        self.pending = Some((value, deadline));
    }

    /// Returns the pending value once `now` has reached its deadline.
    ///
    /// The value is handed out exactly once.
    pub fn poll(&mut self, now: Instant) -> Option<T> {
        match self.pending {
            Some((_, deadline)) if now >= deadline => self.pending.take().map(|(value, _)| value),
            _ => None,
        }
    }

    /// Instant at which the pending value settles.
    #[must_use]
    pub fn deadline(&self) -> Option<Instant> {
        self.pending.as_ref().map(|(_, deadline)| *deadline)
    }

    /// Drops the pending value.
    pub fn cancel(&mut self) {
        self.pending = None;
    }
}
