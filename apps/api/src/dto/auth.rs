use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;
use ts_rs::TS;

/// Incoming payload for username/password login.
///
/// Both fields are optional and non-string values decode as absent, so a
/// half-filled or malformed form reaches the field rules instead of failing
/// JSON extraction.
#[derive(Debug, Default, Deserialize, TS)]
#[ts(
    export,
    export_to = "../../../packages/api-types/src/generated/auth-login-request.ts"
)]
pub struct AuthLoginRequest {
    #[serde(default, deserialize_with = "string_or_absent")]
    pub username: Option<String>,
    #[serde(default, deserialize_with = "string_or_absent")]
    pub password: Option<String>,
}

fn string_or_absent<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    match Value::deserialize(deserializer)? {
        Value::String(value) => Ok(Some(value)),
        _ => Ok(None),
    }
}

/// Session returned after a successful login.
#[derive(Debug, Serialize, TS)]
#[ts(
    export,
    export_to = "../../../packages/api-types/src/generated/auth-login-response.ts"
)]
pub struct AuthLoginResponse {
    pub token: String,
    #[ts(type = "unknown")]
    pub user: serde_json::Value,
}

/// Failure payload for the login form.
///
/// `field` is set for rule violations; `remaining_attempts` for rejected or
/// rate-limited submissions; `retry_after_seconds` only when rate limited.
#[derive(Debug, Serialize, TS)]
#[ts(
    export,
    export_to = "../../../packages/api-types/src/generated/auth-login-failure-response.ts"
)]
pub struct AuthLoginFailureResponse {
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    #[ts(optional)]
    pub field: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    #[ts(optional)]
    pub remaining_attempts: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    #[ts(optional, type = "number")]
    pub retry_after_seconds: Option<i64>,
}
