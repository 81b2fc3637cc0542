//! Login orchestration ports and application service.
//!
//! Runs one form submission through the guard sequence: sanitize the
//! username, validate the fields, consult the rate limiter, call the
//! authentication backend, then clear the limiter on success. Failed
//! authentication leaves the consumed attempt recorded.

use std::sync::Arc;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use hrdesk_core::{AppError, AppResult};
use hrdesk_domain::{
    FieldRule, ValidationResult, sanitize_text, validate_password, validate_username,
};

use crate::RateLimiter;

// ---------------------------------------------------------------------------
// Ports
// ---------------------------------------------------------------------------

/// Session issued by the authentication backend.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AuthSession {
    /// Bearer token for subsequent API calls.
    pub token: String,
    /// User profile as returned by the backend; passed through untouched.
    pub user: serde_json::Value,
}

/// Port for the external credential check.
#[async_trait]
pub trait CredentialAuthenticator: Send + Sync {
    /// Submits credentials to the authentication backend.
    ///
    /// Must fail with [`AppError::Unauthorized`] when the backend rejects the
    /// credentials; any other error is treated as an outage.
    async fn submit_credentials(&self, username: &str, password: &str) -> AppResult<AuthSession>;
}

// ---------------------------------------------------------------------------
// Policy and request types
// ---------------------------------------------------------------------------

/// Switches for optional login checks.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct LoginPolicy {
    /// Apply the password rule before contacting the backend.
    ///
    /// Off by default: existing accounts may predate the rule, and the
    /// backend remains the authority on password correctness.
    pub validate_password: bool,
}

/// One login form submission.
#[derive(Debug, Clone, Copy)]
pub struct LoginAttempt<'a> {
    /// Opaque rate-limit key for the caller (e.g. client address).
    pub key: &'a str,
    /// Raw username as typed.
    pub username: Option<&'a str>,
    /// Raw password as typed.
    pub password: Option<&'a str>,
}

/// Result of a login submission.
#[derive(Debug)]
pub enum LoginOutcome {
    /// Backend accepted the credentials; the limiter was reset for the key.
    Authenticated(AuthSession),
    /// A field broke its rule. No attempt was consumed.
    InvalidInput {
        /// Field that failed.
        field: FieldRule,
        /// Failing validation result carrying the rule message.
        result: ValidationResult,
    },
    /// The key exhausted its attempt budget for the current window.
    RateLimited {
        /// User-facing message with the wait hint, e.g. "... try again in 15 minutes ...".
        message: String,
        /// Attempts left in the window (usually zero).
        remaining_attempts: u32,
        /// Configured window length in seconds.
        retry_after_seconds: i64,
    },
    /// Backend rejected the credentials; the attempt stays recorded.
    Rejected {
        /// Attempts left in the window after this failure.
        remaining_attempts: u32,
    },
}

// ---------------------------------------------------------------------------
// Service
// ---------------------------------------------------------------------------

/// Application service for login submissions.
#[derive(Clone)]
pub struct LoginService {
    rate_limiter: RateLimiter,
    authenticator: Arc<dyn CredentialAuthenticator>,
    policy: LoginPolicy,
}

impl LoginService {
    /// Creates a new login service around a long-lived rate limiter.
    #[must_use]
    pub fn new(
        rate_limiter: RateLimiter,
        authenticator: Arc<dyn CredentialAuthenticator>,
        policy: LoginPolicy,
    ) -> Self {
        Self {
            rate_limiter,
            authenticator,
            policy,
        }
    }

    /// Returns the limiter shared by every submission.
    #[must_use]
    pub fn rate_limiter(&self) -> &RateLimiter {
        &self.rate_limiter
    }

    /// Returns the active policy.
    #[must_use]
    pub fn policy(&self) -> LoginPolicy {
        self.policy
    }

    /// Processes one login submission.
    ///
    /// Expected failures (bad input, exhausted budget, rejected credentials)
    /// come back as [`LoginOutcome`] variants. Only backend outages and other
    /// unexpected conditions are returned as errors.
    pub async fn login(&self, attempt: LoginAttempt<'_>) -> AppResult<LoginOutcome> {
        let username = sanitize_text(attempt.username);
        let password = attempt.password.unwrap_or_default();

        let username_result = validate_username(username.as_str());
        if !username_result.is_valid() {
            return Ok(LoginOutcome::InvalidInput {
                field: FieldRule::Username,
                result: username_result,
            });
        }

        if self.policy.validate_password {
            let password_result = validate_password(password);
            if !password_result.is_valid() {
                return Ok(LoginOutcome::InvalidInput {
                    field: FieldRule::Password,
                    result: password_result,
                });
            }
        }

        match self.rate_limiter.check(attempt.key) {
            Ok(()) => {}
            Err(AppError::RateLimited(message)) => {
                return Ok(LoginOutcome::RateLimited {
                    message,
                    remaining_attempts: self.rate_limiter.remaining_attempts(attempt.key),
                    retry_after_seconds: self.rate_limiter.rule().retry_after_seconds(),
                });
            }
            Err(error) => return Err(error),
        }

        match self
            .authenticator
            .submit_credentials(username.as_str(), password)
            .await
        {
            Ok(session) => {
                self.rate_limiter.reset(attempt.key);
                Ok(LoginOutcome::Authenticated(session))
            }
            Err(AppError::Unauthorized(_)) => Ok(LoginOutcome::Rejected {
                remaining_attempts: self.rate_limiter.remaining_attempts(attempt.key),
            }),
            Err(error) => Err(error),
        }
    }
}
