//! Infrastructure adapters for application ports.

#![forbid(unsafe_code)]

mod http_credential_authenticator;
mod system_clock;

pub use http_credential_authenticator::HttpCredentialAuthenticator;
pub use system_clock::SystemClock;
