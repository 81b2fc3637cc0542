use std::sync::{Arc, Mutex};

use chrono::{DateTime, Duration, TimeZone, Utc};
use hrdesk_core::AppError;

use super::{Clock, RateLimitRule, RateLimiter};

const WINDOW_MS: i64 = 900_000;

struct ManualClock {
    now: Mutex<DateTime<Utc>>,
}

impl ManualClock {
    fn new() -> Self {
        let start = Utc
            .timestamp_millis_opt(1_700_000_000_000)
            .single()
            .unwrap_or_else(|| panic!("test clock start"));
        Self {
            now: Mutex::new(start),
        }
    }

    fn advance_ms(&self, millis: i64) {
        let mut now = self.now.lock().unwrap_or_else(|_| panic!("clock lock"));
        *now += Duration::milliseconds(millis);
    }
}

impl Clock for ManualClock {
    fn now(&self) -> DateTime<Utc> {
        *self.now.lock().unwrap_or_else(|_| panic!("clock lock"))
    }
}

fn login_limiter() -> (RateLimiter, Arc<ManualClock>) {
    let clock = Arc::new(ManualClock::new());
    let rule = RateLimitRule::login(5, WINDOW_MS).unwrap_or_else(|_| panic!("valid rule"));
    (RateLimiter::new(rule, clock.clone()), clock)
}

#[test]
fn rule_rejects_non_positive_max_attempts() {
    for max_attempts in [0, -3] {
        let result = RateLimitRule::login(max_attempts, WINDOW_MS);
        assert!(matches!(result, Err(AppError::InvalidConfiguration(_))));
    }
}

#[test]
fn rule_rejects_non_positive_window() {
    for window_ms in [0, -1] {
        let result = RateLimitRule::login(5, window_ms);
        assert!(matches!(result, Err(AppError::InvalidConfiguration(_))));
    }
}

#[test]
fn rule_rejects_blank_category() {
    let result = RateLimitRule::new("  ", 5, WINDOW_MS);
    assert!(matches!(result, Err(AppError::InvalidConfiguration(_))));
}

#[test]
fn rule_formats_wait_hint() {
    let rule = RateLimitRule::login(5, WINDOW_MS).unwrap_or_else(|_| panic!("valid rule"));
    assert_eq!(rule.retry_after_seconds(), 900);
    assert_eq!(rule.wait_hint(), "15 minutes");

    let rule = RateLimitRule::login(5, 1_500).unwrap_or_else(|_| panic!("valid rule"));
    assert_eq!(rule.retry_after_seconds(), 2);
    assert_eq!(rule.wait_hint(), "2 seconds");
}

#[test]
fn unseen_key_has_full_budget() {
    let (limiter, _clock) = login_limiter();
    assert_eq!(limiter.remaining_attempts("10.0.0.1"), 5);
    assert_eq!(limiter.tracked_keys(), 0);
}

#[test]
fn sixth_attempt_is_rejected_until_window_expires() {
    let (limiter, clock) = login_limiter();

    for _ in 0..5 {
        assert!(limiter.is_allowed("K"));
    }
    assert!(!limiter.is_allowed("K"));

    clock.advance_ms(WINDOW_MS + 1);
    assert!(limiter.is_allowed("K"));
    assert_eq!(limiter.remaining_attempts("K"), 4);
}

#[test]
fn remaining_attempts_read_is_idempotent() {
    let (limiter, _clock) = login_limiter();
    assert!(limiter.is_allowed("K"));
    assert!(limiter.is_allowed("K"));

    let first = limiter.remaining_attempts("K");
    for _ in 0..10 {
        assert_eq!(limiter.remaining_attempts("K"), first);
    }
    assert_eq!(first, 3);
}

#[test]
fn reset_clears_history() {
    let (limiter, _clock) = login_limiter();
    for _ in 0..4 {
        assert!(limiter.is_allowed("K"));
    }

    limiter.reset("K");
    assert_eq!(limiter.remaining_attempts("K"), 5);
}

#[test]
fn rejected_attempt_is_not_counted() {
    let (limiter, clock) = login_limiter();
    for _ in 0..5 {
        assert!(limiter.is_allowed("K"));
    }

    for _ in 0..3 {
        assert!(!limiter.is_allowed("K"));
        assert_eq!(limiter.remaining_attempts("K"), 0);
    }

    // Polling while locked out must not push the window forward.
    clock.advance_ms(WINDOW_MS + 1);
    assert_eq!(limiter.remaining_attempts("K"), 5);
}

#[test]
fn keys_are_independent() {
    let (limiter, _clock) = login_limiter();
    for _ in 0..5 {
        assert!(limiter.is_allowed("A"));
    }

    assert_eq!(limiter.remaining_attempts("A"), 0);
    assert_eq!(limiter.remaining_attempts("B"), 5);
    assert!(limiter.is_allowed("B"));
}

#[test]
fn attempts_expire_one_by_one() {
    let (limiter, clock) = login_limiter();
    assert!(limiter.is_allowed("K"));
    clock.advance_ms(60_000);
    for _ in 0..4 {
        assert!(limiter.is_allowed("K"));
    }
    assert!(!limiter.is_allowed("K"));

    clock.advance_ms(WINDOW_MS - 60_000 + 1);
    assert_eq!(limiter.remaining_attempts("K"), 1);
    assert!(limiter.is_allowed("K"));
    assert!(!limiter.is_allowed("K"));
}

#[test]
fn clones_share_attempts_but_new_limiters_do_not() {
    let (limiter, clock) = login_limiter();
    let shared = limiter.clone();
    assert!(shared.is_allowed("K"));
    assert_eq!(limiter.remaining_attempts("K"), 4);

    let rule = RateLimitRule::login(5, WINDOW_MS).unwrap_or_else(|_| panic!("valid rule"));
    let separate = RateLimiter::new(rule, clock);
    assert_eq!(separate.remaining_attempts("K"), 5);
}

#[test]
fn check_reports_wait_hint_when_limited() {
    let (limiter, _clock) = login_limiter();
    for _ in 0..5 {
        assert!(limiter.check("K").is_ok());
    }

    match limiter.check("K") {
        Err(AppError::RateLimited(message)) => {
            assert!(message.contains("15 minutes"));
            assert!(message.contains("0 attempts remaining"));
        }
        other => panic!("expected rate limit error, got {other:?}"),
    }
}

#[test]
fn cleanup_drops_only_expired_keys() {
    let (limiter, clock) = login_limiter();
    assert!(limiter.is_allowed("old"));
    clock.advance_ms(WINDOW_MS / 2);
    assert!(limiter.is_allowed("fresh"));

    clock.advance_ms(WINDOW_MS / 2 + 1);
    assert_eq!(limiter.cleanup(), 1);
    assert_eq!(limiter.tracked_keys(), 1);
    assert_eq!(limiter.remaining_attempts("fresh"), 4);
}
