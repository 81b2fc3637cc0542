use axum::Json;
use axum::extract::State;
use axum::http::header::RETRY_AFTER;
use axum::http::{HeaderMap, HeaderValue, StatusCode};
use axum::response::{IntoResponse, Response};
use hrdesk_application::{LoginAttempt, LoginOutcome};
use tracing::{error, info, warn};

use crate::dto::{AuthLoginFailureResponse, AuthLoginRequest, AuthLoginResponse};
use crate::error::{ApiError, ApiResult};
use crate::state::AppState;

use super::request_context::client_key;

/// POST /auth/login - Authenticate with username+password.
pub async fn login_handler(
    State(state): State<AppState>,
    headers: HeaderMap,
    Json(payload): Json<AuthLoginRequest>,
) -> ApiResult<Response> {
    let key = client_key(&headers);

    let outcome = state
        .login_service
        .login(LoginAttempt {
            key: key.as_str(),
            username: payload.username.as_deref(),
            password: payload.password.as_deref(),
        })
        .await
        .map_err(|app_error| {
            error!(client = %key, error = %app_error, "login could not be completed");
            ApiError::from(app_error)
        })?;

    let response = match outcome {
        LoginOutcome::Authenticated(session) => {
            info!(client = %key, "login succeeded");
            Json(AuthLoginResponse {
                token: session.token,
                user: session.user,
            })
            .into_response()
        }
        LoginOutcome::InvalidInput { field, result } => (
            StatusCode::BAD_REQUEST,
            Json(AuthLoginFailureResponse {
                message: result
                    .message()
                    .unwrap_or("invalid login input")
                    .to_owned(),
                field: Some(field.as_str().to_owned()),
                remaining_attempts: None,
                retry_after_seconds: None,
            }),
        )
            .into_response(),
        LoginOutcome::RateLimited {
            message,
            remaining_attempts,
            retry_after_seconds,
        } => {
            warn!(client = %key, remaining_attempts, "login rate limited");
            let mut response = (
                StatusCode::TOO_MANY_REQUESTS,
                Json(AuthLoginFailureResponse {
                    message,
                    field: None,
                    remaining_attempts: Some(remaining_attempts),
                    retry_after_seconds: Some(retry_after_seconds),
                }),
            )
                .into_response();
            response
                .headers_mut()
                .insert(RETRY_AFTER, HeaderValue::from(retry_after_seconds));
            response
        }
        LoginOutcome::Rejected { remaining_attempts } => {
            info!(client = %key, remaining_attempts, "login rejected by backend");
            // OWASP: generic error message for all credential failures.
            (
                StatusCode::UNAUTHORIZED,
                Json(AuthLoginFailureResponse {
                    message: format!(
                        "invalid username or password ({remaining_attempts} attempts remaining)"
                    ),
                    field: None,
                    remaining_attempts: Some(remaining_attempts),
                    retry_after_seconds: None,
                }),
            )
                .into_response()
        }
    };

    Ok(response)
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use async_trait::async_trait;
    use axum::Json;
    use axum::extract::State;
    use axum::http::header::RETRY_AFTER;
    use axum::http::{HeaderMap, HeaderValue, StatusCode};
    use axum::response::{IntoResponse, Response};
    use hrdesk_application::{
        AuthSession, CredentialAuthenticator, LoginPolicy, LoginService, RateLimitRule,
        RateLimiter,
    };
    use hrdesk_core::{AppError, AppResult};
    use hrdesk_infrastructure::SystemClock;
    use serde_json::Value;

    use crate::dto::AuthLoginRequest;
    use crate::state::AppState;

    use super::login_handler;

    struct PasswordCheckingAuthenticator;

    #[async_trait]
    impl CredentialAuthenticator for PasswordCheckingAuthenticator {
        async fn submit_credentials(
            &self,
            username: &str,
            password: &str,
        ) -> AppResult<AuthSession> {
            match password {
                "correct horse battery" => Ok(AuthSession {
                    token: "token-abc".to_owned(),
                    user: serde_json::json!({"username": username}),
                }),
                "outage" => Err(AppError::Internal("backend unavailable".to_owned())),
                _ => Err(AppError::Unauthorized("invalid credentials".to_owned())),
            }
        }
    }

    fn test_state(max_attempts: i32) -> AppState {
        let rule =
            RateLimitRule::login(max_attempts, 900_000).unwrap_or_else(|_| panic!("valid rule"));
        AppState {
            login_service: LoginService::new(
                RateLimiter::new(rule, Arc::new(SystemClock::new())),
                Arc::new(PasswordCheckingAuthenticator),
                LoginPolicy::default(),
            ),
        }
    }

    fn headers_for(client: &'static str) -> HeaderMap {
        let mut headers = HeaderMap::new();
        headers.insert("x-forwarded-for", HeaderValue::from_static(client));
        headers
    }

    fn request(username: Option<&str>, password: Option<&str>) -> Json<AuthLoginRequest> {
        Json(AuthLoginRequest {
            username: username.map(ToOwned::to_owned),
            password: password.map(ToOwned::to_owned),
        })
    }

    async fn call(state: &AppState, client: &'static str, body: Json<AuthLoginRequest>) -> Response {
        match login_handler(State(state.clone()), headers_for(client), body).await {
            Ok(response) => response,
            Err(error) => error.into_response(),
        }
    }

    async fn body_json(response: Response) -> Value {
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap_or_else(|_| panic!("response body"));
        serde_json::from_slice(&bytes).unwrap_or_else(|_| panic!("json body"))
    }

    #[tokio::test]
    async fn successful_login_returns_session() {
        let state = test_state(5);

        let response = call(
            &state,
            "203.0.113.1",
            request(Some(" jane.doe "), Some("correct horse battery")),
        )
        .await;

        assert_eq!(response.status(), StatusCode::OK);
        let body = body_json(response).await;
        assert_eq!(body["token"], "token-abc");
        assert_eq!(body["user"]["username"], "jane.doe");
    }

    #[tokio::test]
    async fn invalid_username_names_the_rule() {
        let state = test_state(5);

        let response = call(&state, "203.0.113.2", request(Some("jane doe"), Some("x"))).await;

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        let body = body_json(response).await;
        assert_eq!(body["field"], "username");
        assert_eq!(body["message"], "username contains invalid character ' '");
    }

    #[tokio::test]
    async fn non_string_username_is_reported_as_empty() {
        let state = test_state(5);
        let payload: AuthLoginRequest =
            serde_json::from_str(r#"{"username":42,"password":"x"}"#)
                .unwrap_or_else(|_| panic!("lenient login payload"));

        let response = call(&state, "203.0.113.7", Json(payload)).await;

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        let body = body_json(response).await;
        assert_eq!(body["field"], "username");
        assert_eq!(body["message"], "username must not be empty");
    }

    #[tokio::test]
    async fn rejected_login_reports_remaining_attempts() {
        let state = test_state(5);

        let response = call(&state, "203.0.113.3", request(Some("jane"), Some("wrong"))).await;

        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
        let body = body_json(response).await;
        assert_eq!(body["remaining_attempts"], 4);
    }

    #[tokio::test]
    async fn exhausted_client_is_rate_limited_with_retry_hint() {
        let state = test_state(2);
        for _ in 0..2 {
            call(&state, "203.0.113.4", request(Some("jane"), Some("wrong"))).await;
        }

        let response = call(
            &state,
            "203.0.113.4",
            request(Some("jane"), Some("correct horse battery")),
        )
        .await;

        assert_eq!(response.status(), StatusCode::TOO_MANY_REQUESTS);
        assert_eq!(
            response.headers().get(RETRY_AFTER),
            Some(&HeaderValue::from_static("900"))
        );
        let body = body_json(response).await;
        assert_eq!(body["remaining_attempts"], 0);
        assert_eq!(body["retry_after_seconds"], 900);
        assert!(
            body["message"]
                .as_str()
                .is_some_and(|message| message.contains("15 minutes"))
        );

        let other_client = call(
            &state,
            "203.0.113.5",
            request(Some("jane"), Some("correct horse battery")),
        )
        .await;
        assert_eq!(other_client.status(), StatusCode::OK);
    }

    #[tokio::test]
    async fn backend_outage_is_internal_error() {
        let state = test_state(5);

        let response = call(&state, "203.0.113.6", request(Some("jane"), Some("outage"))).await;

        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    }
}
