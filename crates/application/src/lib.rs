//! Application services and ports.

#![forbid(unsafe_code)]

mod login_service;
mod rate_limit_service;

pub use login_service::{
    AuthSession, CredentialAuthenticator, LoginAttempt, LoginOutcome, LoginPolicy, LoginService,
};
pub use rate_limit_service::{Clock, LOGIN_RATE_LIMIT_CATEGORY, RateLimitRule, RateLimiter};
