// Google provider.
//
// The v2 userinfo endpoint returns a flat profile (`id`, `email`, `name`,
// `picture`), so normalization is a direct field mapping.

use async_trait::async_trait;
use polyauth_core::error::Result;
use url::Url;

use crate::http::{HttpRequestor, RequestOptions};
use crate::provider::{ProfileUser, SocialProvider};
use crate::providers::{json_string, non_empty};

#[derive(Debug, Clone)]
pub struct Google {
    pub authorization_endpoint: String,
    pub token_endpoint: String,
    pub user_endpoint: String,
}

impl Default for Google {
    fn default() -> Self {
        Self {
            authorization_endpoint: "https://accounts.google.com/o/oauth2/v2/auth".into(),
            token_endpoint: "https://oauth2.googleapis.com/token".into(),
            user_endpoint: "https://www.googleapis.com/oauth2/v2/userinfo".into(),
        }
    }
}

impl Google {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl SocialProvider for Google {
    fn id(&self) -> &'static str {
        "google"
    }

    fn authorization_endpoint(&self) -> &str {
        &self.authorization_endpoint
    }

    fn token_endpoint(&self) -> &str {
        &self.token_endpoint
    }

    fn default_scopes(&self) -> &[&str] {
        &["openid", "email", "profile"]
    }

    fn add_auth_params(&self, url: &mut Url) {
        url.query_pairs_mut().append_pair("access_type", "offline");
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

        Ok(ProfileUser {
            id: json_string(&profile["id"]).unwrap_or_default(),
            email: non_empty(&profile, "email"),
            name: non_empty(&profile, "name").unwrap_or_default(),
            avatar: non_empty(&profile, "picture"),
            raw: profile,
        })
    }
}
