use chrono::Duration;

use hrdesk_core::{AppError, AppResult, NonEmptyString};

/// Category name used for the login form limiter.
pub const LOGIN_RATE_LIMIT_CATEGORY: &str = "login";

/// Configuration for a rate limit rule.
///
/// Both limits are fixed for the lifetime of the limiter built from the rule.
#[derive(Debug, Clone)]
pub struct RateLimitRule {
    category: NonEmptyString,
    max_attempts: u32,
    window: Duration,
}

impl RateLimitRule {
    /// Creates a new rate limit rule.
    ///
    /// Fails with [`AppError::InvalidConfiguration`] when `max_attempts` or
    /// `window_ms` is zero or negative, since such a limiter could never
    /// admit a caller.
    pub fn new(category: impl Into<String>, max_attempts: i32, window_ms: i64) -> AppResult<Self> {
        let category = NonEmptyString::new(category).map_err(|_| {
            AppError::InvalidConfiguration("rate limit category must not be empty".to_owned())
        })?;

        if max_attempts <= 0 {
            return Err(AppError::InvalidConfiguration(format!(
                "max_attempts must be greater than zero, got {max_attempts}"
            )));
        }

        if window_ms <= 0 {
            return Err(AppError::InvalidConfiguration(format!(
                "window_ms must be greater than zero, got {window_ms}"
            )));
        }

        let max_attempts = u32::try_from(max_attempts).map_err(|error| {
            AppError::InvalidConfiguration(format!("invalid max_attempts: {error}"))
        })?;
        let window = Duration::try_milliseconds(window_ms).ok_or_else(|| {
            AppError::InvalidConfiguration(format!("window_ms {window_ms} is out of range"))
        })?;

        Ok(Self {
            category,
            max_attempts,
            window,
        })
    }

    /// Creates the rule guarding the login form.
    pub fn login(max_attempts: i32, window_ms: i64) -> AppResult<Self> {
        Self::new(LOGIN_RATE_LIMIT_CATEGORY, max_attempts, window_ms)
    }

    /// Returns the category name (e.g. "login").
    #[must_use]
    pub fn category(&self) -> &str {
        self.category.as_str()
    }

    /// Maximum number of attempts allowed in the window.
    #[must_use]
    pub fn max_attempts(&self) -> u32 {
        self.max_attempts
    }

    /// Sliding window length.
    #[must_use]
    pub fn window(&self) -> Duration {
        self.window
    }

    /// Window length in whole seconds, rounded up, for `Retry-After` hints.
    #[must_use]
    pub fn retry_after_seconds(&self) -> i64 {
        let millis = self.window.num_milliseconds();
        millis / 1_000 + i64::from(millis % 1_000 != 0)
    }

    /// Human-readable wait hint, e.g. "15 minutes".
    #[must_use]
    pub fn wait_hint(&self) -> String {
        let seconds = self.retry_after_seconds();
        match seconds {
            1 => "1 second".to_owned(),
            60 => "1 minute".to_owned(),
            3_600 => "1 hour".to_owned(),
            _ if seconds % 3_600 == 0 => format!("{} hours", seconds / 3_600),
            _ if seconds % 60 == 0 => format!("{} minutes", seconds / 60),
            _ => format!("{seconds} seconds"),
        }
    }
}
