//! Minimum-interval request pacing shared by the API clients.

use std::time::{Duration, Instant};

/// Paces requests so that consecutive calls are at least `min_interval` apart.
///
/// TMDB allows roughly 40 requests per second; the trending store is far
/// less busy but shares the same pacing to avoid bursts from the UI.
#[derive(Debug)]
pub struct RateLimiter {
    /// Minimum interval between requests.
    min_interval: Duration,
    /// Last request timestamp.
    last_request: Option<Instant>,
}

impl RateLimiter {
    /// Creates a new rate limiter with the given minimum interval.
    pub(crate) const fn new(min_interval: Duration) -> Self {
        Self {
            min_interval,
            last_request: None,
        }
    }

    /// Waits until the next request is allowed, then records it.
    pub async fn wait(&mut self) {
        if let Some(remaining) = self.remaining(Instant::now()) {
            tokio::time::sleep(remaining).await;
        }
        self.last_request = Some(Instant::now());
    }

    /// Time left before a request at `now` would be allowed.
    fn remaining(&self, now: Instant) -> Option<Duration> {
        let last = self.last_request?;
        let elapsed = now.saturating_duration_since(last);
        (elapsed < self.min_interval).then(|| self.min_interval.saturating_sub(elapsed))
    }
}
