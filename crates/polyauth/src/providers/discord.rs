// Discord provider.
//
// The profile carries an avatar *hash*, not a URL; the URL is synthesized
// from the CDN template. Hashes starting with `a_` are animated and get the
// `.gif` extension, everything else `.png`. Display name prefers the global
// display name over the username.

use async_trait::async_trait;
use polyauth_core::error::Result;

use crate::http::{HttpRequestor, RequestOptions};
use crate::provider::{ProfileUser, SocialProvider};
use crate::providers::{json_string, non_empty};

const AVATAR_CDN: &str = "https://cdn.discordapp.com/avatars";

#[derive(Debug, Clone)]
pub struct Discord {
    pub authorization_endpoint: String,
    pub token_endpoint: String,
    pub user_endpoint: String,
}

impl Default for Discord {
    fn default() -> Self {
        Self {
            authorization_endpoint: "https://discord.com/api/oauth2/authorize".into(),
            token_endpoint: "https://discord.com/api/oauth2/token".into(),
            user_endpoint: "https://discord.com/api/users/@me".into(),
        }
    }
}

impl Discord {
    pub fn new() -> Self {
        Self::default()
    }
}

/// CDN avatar URL for a user id and avatar hash; `None` hash means the
/// account has no custom avatar.
fn avatar_url(user_id: &str, hash: Option<&str>) -> Option<String> {
    let hash = hash.filter(|h| !h.is_empty())?;
    let ext = if hash.starts_with("a_") { "gif" } else { "png" };
    Some(format!("{AVATAR_CDN}/{user_id}/{hash}.{ext}"))
}

#[async_trait]
impl SocialProvider for Discord {
    fn id(&self) -> &'static str {
        "discord"
    }

    fn authorization_endpoint(&self) -> &str {
        &self.authorization_endpoint
    }

    fn token_endpoint(&self) -> &str {
        &self.token_endpoint
    }

    fn default_scopes(&self) -> &[&str] {
        &["identify", "email"]
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
        let name = non_empty(&profile, "global_name")
            .or_else(|| non_empty(&profile, "username"))
            .unwrap_or_default();
        let avatar = avatar_url(&id, profile.get("avatar").and_then(|v| v.as_str()));

        Ok(ProfileUser {
            id,
            email: non_empty(&profile, "email"),
            name,
            avatar,
            raw: profile,
        })
    }
}
