//! Sliding-window rate limiting for authentication attempts.
//!
//! Follows the OWASP Credential Stuffing Prevention cheat sheet: every
//! identifying key gets a fixed budget of attempts per window, a rejected
//! check never consumes budget, and a successful login clears the history.
//! The identifying key is supplied by the caller and treated as opaque.

mod config;
mod ports;
mod service;

#[cfg(test)]
mod tests;

pub use config::{LOGIN_RATE_LIMIT_CATEGORY, RateLimitRule};
pub use ports::Clock;
pub use service::RateLimiter;
