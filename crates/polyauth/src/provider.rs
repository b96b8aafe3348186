// The SocialProvider capability trait and per-provider configuration.
//
// Orchestration lives in `flow`; a provider variant only supplies its
// endpoints, default scopes, the profile fetch, and (optionally) extra
// authorization-URL parameters. Adding a provider means implementing this
// trait and registering a constructor, nothing else.

use std::fmt;

use async_trait::async_trait;
use polyauth_core::error::{PolyauthError, Result};
use serde::{Deserialize, Serialize};
use url::Url;

use crate::http::HttpRequestor;

/// Per-provider OAuth credentials and redirect target.
///
/// Immutable once a provider instance is constructed. The serialized form
/// uses camelCase so host config files read `clientId`/`clientSecret`/
/// `redirectUri`.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProviderConfig {
    pub client_id: String,
    pub client_secret: String,
    pub redirect_uri: String,
    /// Overrides the provider's built-in default scopes when set and
    /// non-empty.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub scopes: Option<Vec<String>>,
}

impl ProviderConfig {
    pub fn new(
        client_id: impl Into<String>,
        client_secret: impl Into<String>,
        redirect_uri: impl Into<String>,
    ) -> Self {
        Self {
            client_id: client_id.into(),
            client_secret: client_secret.into(),
            redirect_uri: redirect_uri.into(),
            scopes: None,
        }
    }

    pub fn with_scopes(mut self, scopes: &[&str]) -> Self {
        self.scopes = Some(scopes.iter().map(|s| s.to_string()).collect());
        self
    }

    /// Read a configuration from `POLYAUTH_<PROVIDER>_CLIENT_ID`,
    /// `_CLIENT_SECRET`, `_REDIRECT_URI` and the optional space-separated
    /// `_SCOPES`. Fails with a `Config` error naming the provider if a
    /// required variable is missing.
    pub fn from_env(provider: &str) -> Result<Self> {
        let prefix = format!("POLYAUTH_{}", provider.to_uppercase());
        let var = |suffix: &str| std::env::var(format!("{prefix}_{suffix}")).unwrap_or_default();

        let scopes = std::env::var(format!("{prefix}_SCOPES"))
            .ok()
            .map(|raw| raw.split_whitespace().map(String::from).collect::<Vec<_>>())
            .filter(|list| !list.is_empty());

        let config = Self {
            client_id: var("CLIENT_ID"),
            client_secret: var("CLIENT_SECRET"),
            redirect_uri: var("REDIRECT_URI"),
            scopes,
        };
        config.validate(provider)?;
        Ok(config)
    }

    /// Check that all required fields are present and non-empty.
    pub fn validate(&self, provider: &str) -> Result<()> {
        let fields = [
            ("clientId", &self.client_id),
            ("clientSecret", &self.client_secret),
            ("redirectUri", &self.redirect_uri),
        ];
        for (field, value) in fields {
            if value.trim().is_empty() {
                return Err(PolyauthError::Config {
                    provider: Some(provider.to_string()),
                    message: format!("missing required field `{field}` for provider \"{provider}\""),
                });
            }
        }
        Ok(())
    }
}

/// A normalized profile as returned by a provider's `fetch_user`, before the
/// orchestrator attaches the provider name and access token.
#[derive(Debug, Clone)]
pub struct ProfileUser {
    /// Always a string, even when the provider returns a numeric id.
    pub id: String,
    pub email: Option<String>,
    pub name: String,
    /// Absolute URL when present.
    pub avatar: Option<String>,
    /// The provider's original profile response, untouched.
    pub raw: serde_json::Value,
}

/// The capability set a provider variant supplies.
#[async_trait]
pub trait SocialProvider: Send + Sync + fmt::Debug {
    /// Unique provider identifier (e.g. "github").
    fn id(&self) -> &'static str;

    /// Authorization endpoint URL.
    fn authorization_endpoint(&self) -> &str;

    /// Token endpoint URL.
    fn token_endpoint(&self) -> &str;

    /// Default scopes requested when neither the configuration nor the call
    /// overrides them.
    fn default_scopes(&self) -> &[&str];

    /// Hook for provider-specific authorization-URL query parameters.
    fn add_auth_params(&self, _url: &mut Url) {}

    /// Fetch and normalize the user profile for an access token.
    async fn fetch_user(&self, http: &HttpRequestor, access_token: &str) -> Result<ProfileUser>;
}
