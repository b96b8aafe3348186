// The authorization-code state machine, generic over `SocialProvider`.
//
// A `ProviderClient` owns one variant, one immutable configuration and one
// HTTP client. Both operations are per-call: nothing on the client mutates
// after construction, so concurrent callbacks on the same instance are safe.

use polyauth_core::error::{PolyauthError, Result};
use reqwest::Method;
use url::Url;

use crate::http::{HttpRequestor, RequestOptions};
use crate::provider::{ProviderConfig, SocialProvider};
use crate::request::CallbackRequest;
use crate::state::validate_state;
use crate::tokens::{NormalizedUser, TokenResponse};

/// Per-call options for `authorization_url`.
#[derive(Debug, Clone, Default)]
pub struct RedirectOptions {
    /// Overrides the configured scopes for this call only.
    pub scopes: Option<Vec<String>>,
    /// Opaque CSRF token, round-tripped through the provider.
    pub state: Option<String>,
}

/// Per-call options for `handle_callback`.
#[derive(Debug, Clone, Default)]
pub struct CallbackOptions {
    /// The state value originally issued and stored by the caller. When set,
    /// the callback's state is validated before any network call is made.
    pub state: Option<String>,
}

/// One configured provider instance: the flow operations of a single
/// identity provider.
#[derive(Debug)]
pub struct ProviderClient {
    provider: Box<dyn SocialProvider>,
    config: ProviderConfig,
    http: HttpRequestor,
}

impl ProviderClient {
    /// Construct a client, validating the configuration. Fails with a
    /// `Config` error naming the provider when a required field is missing.
    pub fn new(provider: Box<dyn SocialProvider>, config: ProviderConfig) -> Result<Self> {
        config.validate(provider.id())?;
        Ok(Self {
            provider,
            config,
            http: HttpRequestor::new(),
        })
    }

    /// The variant's fixed identifier.
    pub fn name(&self) -> &'static str {
        self.provider.id()
    }

    pub fn config(&self) -> &ProviderConfig {
        &self.config
    }

    /// Build the URL to redirect the user to.
    ///
    /// Pure function of the options and the instance configuration; no I/O.
    pub fn authorization_url(&self, options: &RedirectOptions) -> Result<Url> {
        let mut url =
            Url::parse(self.provider.authorization_endpoint()).map_err(|e| PolyauthError::Config {
                provider: Some(self.name().to_string()),
                message: format!("invalid authorization endpoint: {e}"),
            })?;

        let scopes = self.scopes_for(options);
        {
            let mut pairs = url.query_pairs_mut();
            pairs.append_pair("client_id", &self.config.client_id);
            pairs.append_pair("redirect_uri", &self.config.redirect_uri);
            pairs.append_pair("response_type", "code");
            pairs.append_pair("scope", &scopes.join(" "));
            if let Some(state) = &options.state {
                pairs.append_pair("state", state);
            }
        }
        self.provider.add_auth_params(&mut url);

        Ok(url)
    }

    /// Handle the provider's callback request and return the signed-in user.
    ///
    /// Validation happens in strict order, and everything up to and
    /// including state validation runs before any network call: a request
    /// that fails CSRF validation never triggers a token exchange. Either a
    /// fully populated user is returned or the callback fails; there is no
    /// partial result.
    pub async fn handle_callback(
        &self,
        request: &dyn CallbackRequest,
        options: &CallbackOptions,
    ) -> Result<NormalizedUser> {
        let params = request
            .callback_params()
            .map_err(|e| e.with_provider(self.name()))?;

        // A provider-reported error takes precedence over everything else,
        // including a `code` that may also be present.
        if let Some(code) = params.error {
            let message = params
                .error_description
                .unwrap_or_else(|| format!("provider returned error \"{code}\""));
            return Err(PolyauthError::AuthorizationDenied {
                provider: Some(self.name().to_string()),
                code,
                message,
            });
        }

        let code = params.code.ok_or_else(|| PolyauthError::MissingCode {
            provider: Some(self.name().to_string()),
        })?;

        if options.state.is_some() {
            validate_state(options.state.as_deref(), params.state.as_deref())
                .map_err(|e| e.with_provider(self.name()))?;
        }

        tracing::debug!(provider = self.name(), "exchanging authorization code");
        let tokens = self.exchange_code(&code).await?;

        let profile = self
            .provider
            .fetch_user(&self.http, &tokens.access_token)
            .await
            .map_err(|e| e.with_provider(self.name()))?;

        Ok(NormalizedUser {
            provider: self.name().to_string(),
            id: profile.id,
            email: profile.email,
            name: profile.name,
            avatar: profile.avatar,
            access_token: tokens.access_token,
            raw: profile.raw,
        })
    }

    /// POST the authorization code to the token endpoint and validate the
    /// response.
    async fn exchange_code(&self, code: &str) -> Result<TokenResponse> {
        let form = vec![
            ("client_id".to_string(), self.config.client_id.clone()),
            ("client_secret".to_string(), self.config.client_secret.clone()),
            ("code".to_string(), code.to_string()),
            ("redirect_uri".to_string(), self.config.redirect_uri.clone()),
            ("grant_type".to_string(), "authorization_code".to_string()),
        ];

        let body = self
            .http
            .request(
                self.provider.token_endpoint(),
                RequestOptions {
                    method: Method::POST,
                    form: Some(form),
                    ..Default::default()
                },
            )
            .await
            .map_err(|e| e.with_provider(self.name()))?;

        TokenResponse::from_raw(&body).map_err(|e| e.with_provider(self.name()))
    }

    /// Per-call override, else configured scopes, else the variant's
    /// defaults. Empty lists count as unset, so the result is never empty.
    fn scopes_for(&self, options: &RedirectOptions) -> Vec<String> {
        if let Some(scopes) = &options.scopes {
            if !scopes.is_empty() {
                return scopes.clone();
            }
        }
        if let Some(scopes) = &self.config.scopes {
            if !scopes.is_empty() {
                return scopes.clone();
            }
        }
        self.provider
            .default_scopes()
            .iter()
            .map(|s| s.to_string())
            .collect()
    }
}
