//! HTTP adapter for the external authentication backend.

use std::time::Duration;

use async_trait::async_trait;
use hrdesk_application::{AuthSession, CredentialAuthenticator};
use hrdesk_core::{AppError, AppResult};
use reqwest::StatusCode;
use serde::Serialize;
use tracing::{debug, warn};
use url::Url;

#[derive(Serialize)]
struct CredentialsPayload<'a> {
    username: &'a str,
    password: &'a str,
}

/// Posts credentials to the backend login endpoint and decodes `{ token, user }`.
pub struct HttpCredentialAuthenticator {
    http_client: reqwest::Client,
    login_url: Url,
}

impl HttpCredentialAuthenticator {
    /// Creates an authenticator posting to `login_path` resolved against `base_url`.
    pub fn new(http_client: reqwest::Client, base_url: &Url, login_path: &str) -> AppResult<Self> {
        let login_url = base_url.join(login_path).map_err(|error| {
            AppError::InvalidConfiguration(format!(
                "invalid authentication login path '{login_path}': {error}"
            ))
        })?;

        Ok(Self {
            http_client,
            login_url,
        })
    }

    /// Builds the HTTP client with a request timeout.
    pub fn client_with_timeout(timeout: Duration) -> AppResult<reqwest::Client> {
        reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|error| AppError::Internal(format!("failed to build http client: {error}")))
    }

    /// Returns the resolved login endpoint.
    #[must_use]
    pub fn login_url(&self) -> &Url {
        &self.login_url
    }
}

#[async_trait]
impl CredentialAuthenticator for HttpCredentialAuthenticator {
    async fn submit_credentials(&self, username: &str, password: &str) -> AppResult<AuthSession> {
        let response = self
            .http_client
            .post(self.login_url.clone())
            .json(&CredentialsPayload { username, password })
            .send()
            .await
            .map_err(|error| {
                AppError::Internal(format!("authentication backend transport error: {error}"))
            })?;

        let status = response.status();
        if let Some(error) = error_for_status(status) {
            warn!(%status, url = %self.login_url, "authentication backend refused login");
            return Err(error);
        }

        debug!(%status, "authentication backend accepted credentials");
        response.json::<AuthSession>().await.map_err(|error| {
            AppError::Internal(format!(
                "failed to decode authentication backend response: {error}"
            ))
        })
    }
}

/// Maps a backend status to the port's error contract.
fn error_for_status(status: StatusCode) -> Option<AppError> {
    if status.is_success() {
        return None;
    }

    if status == StatusCode::UNAUTHORIZED || status == StatusCode::FORBIDDEN {
        return Some(AppError::Unauthorized(
            "invalid username or password".to_owned(),
        ));
    }

    Some(AppError::Internal(format!(
        "authentication backend responded with status {status}"
    )))
}
