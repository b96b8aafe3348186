// GitHub provider.
//
// GitHub hides the email on `/user` when the account marks it private, so a
// secondary `/user/emails` request resolves it. That lookup is the one place
// a network failure is absorbed instead of surfaced: sign-in still succeeds,
// just without an email.

use async_trait::async_trait;
use polyauth_core::error::Result;
use serde::Deserialize;

use crate::http::{HttpRequestor, RequestOptions};
use crate::provider::{ProfileUser, SocialProvider};
use crate::providers::{json_string, non_empty};

#[derive(Debug, Clone)]
pub struct Github {
    /// Overridable for GitHub Enterprise deployments.
    pub authorization_endpoint: String,
    pub token_endpoint: String,
    pub user_endpoint: String,
    pub emails_endpoint: String,
}

impl Default for Github {
    fn default() -> Self {
        Self {
            authorization_endpoint: "https://github.com/login/oauth/authorize".into(),
            token_endpoint: "https://github.com/login/oauth/access_token".into(),
            user_endpoint: "https://api.github.com/user".into(),
            emails_endpoint: "https://api.github.com/user/emails".into(),
        }
    }
}

impl Github {
    pub fn new() -> Self {
        Self::default()
    }

    /// Fetch `/user/emails` and pick the best candidate. Callers treat a
    /// failure here as "no email".
    async fn lookup_email(&self, http: &HttpRequestor, access_token: &str) -> Result<Option<String>> {
        let body = http
            .request(
                &self.emails_endpoint,
                RequestOptions {
                    bearer: Some(access_token.to_string()),
                    ..Default::default()
                },
            )
            .await?;
        let entries: Vec<EmailEntry> = serde_json::from_value(body).unwrap_or_default();
        Ok(select_email(&entries))
    }
}

/// One entry of the `/user/emails` response.
#[derive(Debug, Deserialize)]
struct EmailEntry {
    email: String,
    #[serde(default)]
    primary: bool,
    #[serde(default)]
    verified: bool,
}

/// Primary-and-verified first, then any verified, then nothing.
fn select_email(entries: &[EmailEntry]) -> Option<String> {
    entries
        .iter()
        .find(|e| e.primary && e.verified)
        .or_else(|| entries.iter().find(|e| e.verified))
        .map(|e| e.email.clone())
}

#[async_trait]
impl SocialProvider for Github {
    fn id(&self) -> &'static str {
        "github"
    }

    fn authorization_endpoint(&self) -> &str {
        &self.authorization_endpoint
    }

    fn token_endpoint(&self) -> &str {
        &self.token_endpoint
    }

    fn default_scopes(&self) -> &[&str] {
        &["read:user", "user:email"]
    }

    async fn fetch_user(&self, http: &HttpRequestor, access_token: &str) -> Result<ProfileUser> {
        let profile = http
            .request(
                &self.user_endpoint,
                RequestOptions {
                    bearer: Some(access_token.to_string()),
                    ..Default::default()
                },
            )
            .await?;

        let id = json_string(&profile["id"]).unwrap_or_default();
        // Accounts without a display name fall back to the login handle.
        let name = non_empty(&profile, "name")
            .or_else(|| non_empty(&profile, "login"))
            .unwrap_or_default();

        let email = match non_empty(&profile, "email") {
            Some(email) => Some(email),
            None => match self.lookup_email(http, access_token).await {
                Ok(found) => found,
                Err(err) => {
                    tracing::warn!(
                        provider = "github",
                        error = %err,
                        "email lookup failed, continuing without an email"
                    );
                    None
                }
            },
        };

        Ok(ProfileUser {
            id,
            email,
            name,
            avatar: non_empty(&profile, "avatar_url"),
            raw: profile,
        })
    }
}
