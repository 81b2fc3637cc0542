use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use hrdesk_core::{AppError, AppResult};
use hrdesk_domain::AttemptRecord;

use super::config::RateLimitRule;
use super::ports::Clock;

/// In-memory sliding-window rate limiter.
///
/// Clones share one attempt store, so a single limiter built at startup can be
/// handed to every request handler. Independently constructed limiters never
/// see each other's attempts.
#[derive(Clone)]
pub struct RateLimiter {
    rule: RateLimitRule,
    clock: Arc<dyn Clock>,
    records: Arc<Mutex<HashMap<String, AttemptRecord>>>,
}

impl RateLimiter {
    /// Creates a limiter with an empty attempt store.
    #[must_use]
    pub fn new(rule: RateLimitRule, clock: Arc<dyn Clock>) -> Self {
        Self {
            rule,
            clock,
            records: Arc::new(Mutex::new(HashMap::new())),
        }
    }

    /// Returns the rule this limiter enforces.
    #[must_use]
    pub fn rule(&self) -> &RateLimitRule {
        &self.rule
    }

    /// Decides whether `key` may make another attempt now.
    ///
    /// An allowed check records the attempt. A rejected check records
    /// nothing, so polling while locked out never extends the lockout.
    pub fn is_allowed(&self, key: &str) -> bool {
        let now = self.clock.now();
        let window = self.rule.window();
        let mut records = self.lock_records();
        let record = records.entry(key.to_owned()).or_default();

        record.prune(now, window);
        if count_as_u32(record.active_count(now, window)) >= self.rule.max_attempts() {
            return false;
        }

        record.record(now);
        true
    }

    /// Returns how many attempts `key` has left in the current window.
    ///
    /// Read-only: never prunes or records. Unknown keys get the full budget.
    #[must_use]
    pub fn remaining_attempts(&self, key: &str) -> u32 {
        let now = self.clock.now();
        let active = self
            .lock_records()
            .get(key)
            .map_or(0, |record| record.active_count(now, self.rule.window()));

        self.rule.max_attempts().saturating_sub(count_as_u32(active))
    }

    /// Clears every attempt recorded for `key`.
    pub fn reset(&self, key: &str) {
        self.lock_records().remove(key);
    }

    /// Same decision as [`RateLimiter::is_allowed`], as a result.
    ///
    /// The error message carries the wait hint and the remaining attempts.
    pub fn check(&self, key: &str) -> AppResult<()> {
        if self.is_allowed(key) {
            return Ok(());
        }

        Err(AppError::RateLimited(format!(
            "too many {} attempts, please try again in {} ({} attempts remaining)",
            self.rule.category(),
            self.rule.wait_hint(),
            self.remaining_attempts(key),
        )))
    }

    /// Drops keys with no active attempt and returns how many were removed.
    pub fn cleanup(&self) -> usize {
        let now = self.clock.now();
        let window = self.rule.window();
        let mut records = self.lock_records();
        let before = records.len();
        records.retain(|_, record| {
            record.prune(now, window);
            !record.is_empty()
        });
        before - records.len()
    }

    /// Number of keys currently holding a record.
    #[must_use]
    pub fn tracked_keys(&self) -> usize {
        self.lock_records().len()
    }

    fn lock_records(&self) -> MutexGuard<'_, HashMap<String, AttemptRecord>> {
        // Every critical section leaves the map consistent, so a panic elsewhere
        // cannot corrupt it.
        self.records.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

fn count_as_u32(count: usize) -> u32 {
    u32::try_from(count).unwrap_or(u32::MAX)
}
