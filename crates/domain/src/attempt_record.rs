//! Per-key attempt history for sliding-window rate limiting.

use chrono::{DateTime, Duration, Utc};

/// Ordered timestamps of the attempts recorded for one rate-limit key.
///
/// Timestamps are non-decreasing in insertion order. Only timestamps inside
/// `(now - window, now]` count as active; older ones are logically expired
/// whether or not [`AttemptRecord::prune`] has removed them yet.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AttemptRecord {
    attempts: Vec<DateTime<Utc>>,
}

impl AttemptRecord {
    /// Creates an empty record.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends an attempt.
    ///
    /// A timestamp earlier than the last recorded one is clamped to it so the
    /// sequence stays non-decreasing when the wall clock steps backwards.
    pub fn record(&mut self, at: DateTime<Utc>) {
        let at = self.attempts.last().map_or(at, |last| at.max(*last));
        self.attempts.push(at);
    }

    /// Counts attempts newer than `now - window`.
    #[must_use]
    pub fn active_count(&self, now: DateTime<Utc>, window: Duration) -> usize {
        let cutoff = window_cutoff(now, window);
        self.attempts
            .iter()
            .rev()
            .take_while(|attempt| **attempt > cutoff)
            .count()
    }

    /// Drops expired attempts and returns how many were removed.
    pub fn prune(&mut self, now: DateTime<Utc>, window: Duration) -> usize {
        let cutoff = window_cutoff(now, window);
        let expired = self
            .attempts
            .iter()
            .take_while(|attempt| **attempt <= cutoff)
            .count();
        self.attempts.drain(..expired);
        expired
    }

    /// Returns the recorded timestamps, oldest first.
    #[must_use]
    pub fn attempts(&self) -> &[DateTime<Utc>] {
        &self.attempts
    }

    /// Returns whether nothing has been recorded.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.attempts.is_empty()
    }
}

/// Windows reaching past the representable range keep every attempt active.
fn window_cutoff(now: DateTime<Utc>, window: Duration) -> DateTime<Utc> {
    now.checked_sub_signed(window)
        .unwrap_or(DateTime::<Utc>::MIN_UTC)
}
