// Token-exchange response parsing and the normalized user object.

use chrono::{DateTime, Utc};
use polyauth_core::error::{PolyauthError, Result};
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// A validated token-endpoint response.
///
/// `access_token` is guaranteed present; everything provider-specific stays
/// available through `raw`.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TokenResponse {
    pub access_token: String,
    pub token_type: Option<String>,
    pub scopes: Vec<String>,
    /// Derived from `expires_in` when the provider sends one.
    pub expires_at: Option<DateTime<Utc>>,
    /// The original response body, untouched.
    pub raw: Value,
}

impl TokenResponse {
    /// Validate and parse a token-endpoint body.
    ///
    /// A body carrying a non-null `error` field is a `Token` error no matter
    /// the HTTP status it arrived with, as is a body without `access_token`.
    pub fn from_raw(data: &Value) -> Result<Self> {
        if let Some(error) = data.get("error").filter(|v| !v.is_null()) {
            let code = error.as_str().unwrap_or("unknown_error");
            let message = data
                .get("error_description")
                .and_then(|v| v.as_str())
                .map(str::to_string)
                .unwrap_or_else(|| format!("token endpoint returned error \"{code}\""));
            return Err(PolyauthError::Token {
                provider: None,
                message,
            });
        }

        let access_token = data
            .get("access_token")
            .and_then(|v| v.as_str())
            .filter(|s| !s.is_empty())
            .ok_or_else(|| PolyauthError::Token {
                provider: None,
                message: "token endpoint response did not include an access_token".to_string(),
            })?
            .to_string();

        let token_type = data
            .get("token_type")
            .and_then(|v| v.as_str())
            .map(str::to_string);
        let scopes = data
            .get("scope")
            .and_then(|v| v.as_str())
            .map(|s| s.split(' ').filter(|p| !p.is_empty()).map(String::from).collect())
            .unwrap_or_default();
        let expires_at = data
            .get("expires_in")
            .and_then(|v| v.as_i64())
            .map(|secs| Utc::now() + chrono::Duration::seconds(secs));

        Ok(Self {
            access_token,
            token_type,
            scopes,
            expires_at,
            raw: data.clone(),
        })
    }
}

/// The provider-agnostic profile this crate guarantees regardless of which
/// identity provider authenticated the user. Serializes with camelCase keys
/// (`accessToken`); nullable fields serialize as `null`.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NormalizedUser {
    pub provider: String,
    pub id: String,
    pub email: Option<String>,
    pub name: String,
    pub avatar: Option<String>,
    pub access_token: String,
    pub raw: Value,
}
