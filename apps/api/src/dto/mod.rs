mod auth;
mod common;

pub use auth::{AuthLoginFailureResponse, AuthLoginRequest, AuthLoginResponse};
pub use common::HealthResponse;
