use std::sync::Arc;
use std::time::Duration;

use hrdesk_application::{LoginService, RateLimitRule, RateLimiter};
use hrdesk_core::AppError;
use hrdesk_infrastructure::{HttpCredentialAuthenticator, SystemClock};
use tokio::task::JoinHandle;
use tracing::{debug, info};

use crate::api_config::ApiConfig;
use crate::state::AppState;

/// Builds the shared state. The login limiter is created exactly once here
/// and shared by every request for the lifetime of the process.
pub fn build_app_state(config: &ApiConfig) -> Result<AppState, AppError> {
    let rule = RateLimitRule::login(
        config.login_limit.max_attempts,
        config.login_limit.window_ms,
    )?;
    let rate_limiter = RateLimiter::new(rule, Arc::new(SystemClock::new()));

    let http_client = HttpCredentialAuthenticator::client_with_timeout(config.auth_backend_timeout)?;
    let authenticator = HttpCredentialAuthenticator::new(
        http_client,
        &config.auth_backend_url,
        config.auth_login_path.as_str(),
    )?;

    info!(
        max_attempts = rate_limiter.rule().max_attempts(),
        window = %rate_limiter.rule().wait_hint(),
        validate_password = config.login_policy.validate_password,
        login_url = %authenticator.login_url(),
        "login guard configured"
    );

    Ok(AppState {
        login_service: LoginService::new(
            rate_limiter,
            Arc::new(authenticator),
            config.login_policy,
        ),
    })
}

/// Periodically drops limiter records whose attempts have all expired.
pub fn spawn_rate_limit_cleanup(rate_limiter: RateLimiter, period: Duration) -> JoinHandle<()> {
    tokio::spawn(async move {
        let mut interval = tokio::time::interval(period);
        loop {
            interval.tick().await;
            let removed = rate_limiter.cleanup();
            if removed > 0 {
                debug!(
                    removed,
                    tracked = rate_limiter.tracked_keys(),
                    "pruned expired login rate limit records"
                );
            }
        }
    })
}
