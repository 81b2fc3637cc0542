use std::env;
use std::net::{IpAddr, SocketAddr};
use std::str::FromStr;
use std::time::Duration;

use hrdesk_application::LoginPolicy;
use hrdesk_core::AppError;
use tracing_subscriber::EnvFilter;
use url::Url;

#[derive(Debug, Clone)]
pub struct LoginLimitConfig {
    pub max_attempts: i32,
    pub window_ms: i64,
    pub cleanup_interval: Duration,
}

#[derive(Debug, Clone)]
pub struct ApiConfig {
    pub api_host: String,
    pub api_port: u16,
    pub frontend_url: String,
    pub auth_backend_url: Url,
    pub auth_login_path: String,
    pub auth_backend_timeout: Duration,
    pub login_limit: LoginLimitConfig,
    pub login_policy: LoginPolicy,
}

impl ApiConfig {
    pub fn load() -> Result<Self, AppError> {
        let api_host = env::var("API_HOST").unwrap_or_else(|_| "127.0.0.1".to_owned());
        let api_port = parsed_env("API_PORT", 3001_u16)?;
        let frontend_url =
            env::var("FRONTEND_URL").unwrap_or_else(|_| "http://localhost:3000".to_owned());

        let auth_backend_url = Url::parse(required_non_empty_env("AUTH_BACKEND_URL")?.as_str())
            .map_err(|error| {
                AppError::InvalidConfiguration(format!("invalid AUTH_BACKEND_URL: {error}"))
            })?;
        let auth_login_path =
            env::var("AUTH_LOGIN_PATH").unwrap_or_else(|_| "/auth/login".to_owned());
        let auth_backend_timeout =
            Duration::from_secs(parsed_env("AUTH_BACKEND_TIMEOUT_SECONDS", 10_u64)?);

        let login_limit = LoginLimitConfig {
            max_attempts: parsed_env("LOGIN_MAX_ATTEMPTS", 5_i32)?,
            window_ms: parsed_env("LOGIN_WINDOW_MS", 15 * 60 * 1_000_i64)?,
            cleanup_interval: Duration::from_secs(
                parsed_env("LOGIN_CLEANUP_INTERVAL_SECONDS", 300_u64)?.max(1),
            ),
        };

        let login_policy = LoginPolicy {
            validate_password: flag_env("LOGIN_VALIDATE_PASSWORD", false)?,
        };

        Ok(Self {
            api_host,
            api_port,
            frontend_url,
            auth_backend_url,
            auth_login_path,
            auth_backend_timeout,
            login_limit,
            login_policy,
        })
    }

    pub fn socket_address(&self) -> Result<SocketAddr, AppError> {
        let host = IpAddr::from_str(&self.api_host).map_err(|error| {
            AppError::InvalidConfiguration(format!("invalid API_HOST '{}': {error}", self.api_host))
        })?;
        Ok(SocketAddr::from((host, self.api_port)))
    }
}

pub fn init_tracing() {
    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_target(false)
        .compact()
        .init();
}

fn required_env(name: &str) -> Result<String, AppError> {
    env::var(name).map_err(|_| AppError::InvalidConfiguration(format!("{name} is required")))
}

fn required_non_empty_env(name: &str) -> Result<String, AppError> {
    let value = required_env(name)?;
    if value.trim().is_empty() {
        return Err(AppError::InvalidConfiguration(format!(
            "{name} must not be empty"
        )));
    }

    Ok(value)
}

fn parsed_env<T>(name: &str, default: T) -> Result<T, AppError>
where
    T: FromStr,
    T::Err: std::fmt::Display,
{
    match env::var(name) {
        Ok(value) if !value.trim().is_empty() => parse_value(name, value.trim()),
        _ => Ok(default),
    }
}

fn flag_env(name: &str, default: bool) -> Result<bool, AppError> {
    match env::var(name) {
        Ok(value) if !value.trim().is_empty() => parse_flag(name, value.trim()),
        _ => Ok(default),
    }
}

fn parse_flag(name: &str, value: &str) -> Result<bool, AppError> {
    match value.to_ascii_lowercase().as_str() {
        "true" | "1" | "yes" | "on" => Ok(true),
        "false" | "0" | "no" | "off" => Ok(false),
        _ => Err(AppError::InvalidConfiguration(format!(
            "invalid {name}: expected true/false, 1/0, yes/no or on/off, got '{value}'"
        ))),
    }
}

fn parse_value<T>(name: &str, value: &str) -> Result<T, AppError>
where
    T: FromStr,
    T::Err: std::fmt::Display,
{
    value
        .parse::<T>()
        .map_err(|error| AppError::InvalidConfiguration(format!("invalid {name}: {error}")))
}
