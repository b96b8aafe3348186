// End-to-end callback tests against a mock provider.
//
// Each test stands up a wiremock server playing the provider's token and
// profile endpoints, points a variant's endpoint fields at it, and drives
// `handle_callback` the way a host would.

use std::collections::HashMap;

use serde_json::json;
use wiremock::matchers::{body_string_contains, header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

use polyauth::{
    CallbackOptions, CallbackParams, Discord, Github, Google, ProviderClient, ProviderConfig,
    RawRequest,
};

fn config() -> ProviderConfig {
    ProviderConfig::new("client-id", "client-secret", "https://app.test/cb")
}

fn github_client(server: &MockServer) -> ProviderClient {
    let provider = Github {
        token_endpoint: format!("{}/login/oauth/access_token", server.uri()),
        user_endpoint: format!("{}/user", server.uri()),
        emails_endpoint: format!("{}/user/emails", server.uri()),
        ..Github::default()
    };
    ProviderClient::new(Box::new(provider), config()).unwrap()
}

fn google_client(server: &MockServer) -> ProviderClient {
    let provider = Google {
        token_endpoint: format!("{}/token", server.uri()),
        user_endpoint: format!("{}/userinfo", server.uri()),
        ..Google::default()
    };
    ProviderClient::new(Box::new(provider), config()).unwrap()
}

fn discord_client(server: &MockServer) -> ProviderClient {
    let provider = Discord {
        token_endpoint: format!("{}/api/oauth2/token", server.uri()),
        user_endpoint: format!("{}/api/users/@me", server.uri()),
        ..Discord::default()
    };
    ProviderClient::new(Box::new(provider), config()).unwrap()
}

fn callback_query(code: &str, state: Option<&str>) -> HashMap<String, String> {
    let mut query = HashMap::new();
    query.insert("code".to_string(), code.to_string());
    if let Some(state) = state {
        query.insert("state".to_string(), state.to_string());
    }
    query
}

async fn mount_token(server: &MockServer, token_path: &str, access_token: &str) {
    Mock::given(method("POST"))
        .and(path(token_path))
        .and(body_string_contains("grant_type=authorization_code"))
        .and(body_string_contains("client_id=client-id"))
        .and(body_string_contains("client_secret=client-secret"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "access_token": access_token,
            "token_type": "bearer",
            "scope": "read:user user:email"
        })))
        .expect(1)
        .mount(server)
        .await;
}

#[tokio::test]
async fn github_callback_returns_normalized_user() {
    let server = MockServer::start().await;
    mount_token(&server, "/login/oauth/access_token", "gho_test").await;

    Mock::given(method("GET"))
        .and(path("/user"))
        .and(header("authorization", "Bearer gho_test"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "id": 583231,
            "login": "octocat",
            "name": "The Octocat",
            "email": null,
            "avatar_url": "https://avatars.githubusercontent.com/u/583231"
        })))
        .expect(1)
        .mount(&server)
        .await;

    Mock::given(method("GET"))
        .and(path("/user/emails"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([
            { "email": "secondary@example.com", "primary": false, "verified": true },
            { "email": "octocat@example.com", "primary": true, "verified": true }
        ])))
        .expect(1)
        .mount(&server)
        .await;

    let state = polyauth::generate_state(32);
    let user = github_client(&server)
        .handle_callback(
            &callback_query("good-code", Some(&state)),
            &CallbackOptions {
                state: Some(state.clone()),
            },
        )
        .await
        .unwrap();

    assert_eq!(user.provider, "github");
    assert_eq!(user.id, "583231");
    assert_eq!(user.name, "The Octocat");
    assert_eq!(user.email.as_deref(), Some("octocat@example.com"));
    assert_eq!(
        user.avatar.as_deref(),
        Some("https://avatars.githubusercontent.com/u/583231")
    );
    assert_eq!(user.access_token, "gho_test");
    assert_eq!(user.raw["login"], "octocat");
}

#[tokio::test]
async fn github_email_lookup_failure_degrades_to_none() {
    let server = MockServer::start().await;
    mount_token(&server, "/login/oauth/access_token", "gho_test").await;

    Mock::given(method("GET"))
        .and(path("/user"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "id": 42,
            "login": "ghost",
            "name": null,
            "email": ""
        })))
        .mount(&server)
        .await;

    Mock::given(method("GET"))
        .and(path("/user/emails"))
        .respond_with(ResponseTemplate::new(500).set_body_json(json!({
            "message": "Server Error"
        })))
        .mount(&server)
        .await;

    let user = github_client(&server)
        .handle_callback(&callback_query("good-code", None), &CallbackOptions::default())
        .await
        .unwrap();

    // The secondary failure is absorbed; the callback still succeeds.
    assert_eq!(user.email, None);
    assert_eq!(user.name, "ghost");
    assert_eq!(user.avatar, None);
}

#[tokio::test]
async fn github_form_encoded_token_response_is_understood() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/login/oauth/access_token"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_string("access_token=gho_form&scope=read%3Auser&token_type=bearer")
                .insert_header("content-type", "application/x-www-form-urlencoded"),
        )
        .mount(&server)
        .await;

    Mock::given(method("GET"))
        .and(path("/user"))
        .and(header("authorization", "Bearer gho_form"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "id": 7,
            "login": "formuser",
            "email": "form@example.com"
        })))
        .mount(&server)
        .await;

    let user = github_client(&server)
        .handle_callback(&callback_query("good-code", None), &CallbackOptions::default())
        .await
        .unwrap();

    assert_eq!(user.access_token, "gho_form");
    assert_eq!(user.name, "formuser");
}

#[tokio::test]
async fn google_callback_maps_profile_fields() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/token"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "access_token": "ya29.token",
            "token_type": "Bearer",
            "expires_in": 3599
        })))
        .mount(&server)
        .await;

    Mock::given(method("GET"))
        .and(path("/userinfo"))
        .and(header("authorization", "Bearer ya29.token"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "id": "108204268033311374519",
            "email": "user@gmail.com",
            "name": "Ada Lovelace",
            "picture": "https://lh3.googleusercontent.com/a/photo"
        })))
        .mount(&server)
        .await;

    let user = google_client(&server)
        .handle_callback(&callback_query("g-code", None), &CallbackOptions::default())
        .await
        .unwrap();

    assert_eq!(user.provider, "google");
    assert_eq!(user.id, "108204268033311374519");
    assert_eq!(user.email.as_deref(), Some("user@gmail.com"));
    assert_eq!(user.name, "Ada Lovelace");
    assert_eq!(
        user.avatar.as_deref(),
        Some("https://lh3.googleusercontent.com/a/photo")
    );
}

#[tokio::test]
async fn discord_callback_synthesizes_avatar_and_prefers_global_name() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/api/oauth2/token"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "access_token": "discord-token"
        })))
        .mount(&server)
        .await;

    Mock::given(method("GET"))
        .and(path("/api/users/@me"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "id": "80351110224678912",
            "username": "nelly",
            "global_name": "Nelly",
            "avatar": "a_8342729096ea3675442027381ff50dfe",
            "email": "nelly@discord.com"
        })))
        .mount(&server)
        .await;

    let user = discord_client(&server)
        .handle_callback(&callback_query("d-code", None), &CallbackOptions::default())
        .await
        .unwrap();

    assert_eq!(user.provider, "discord");
    assert_eq!(user.name, "Nelly");
    assert_eq!(
        user.avatar.as_deref(),
        Some("https://cdn.discordapp.com/avatars/80351110224678912/a_8342729096ea3675442027381ff50dfe.gif")
    );
    assert_eq!(user.email.as_deref(), Some("nelly@discord.com"));
}

#[tokio::test]
async fn provider_error_takes_precedence_over_code() {
    // No mocks: a denied callback must never reach the network.
    let server = MockServer::start().await;
    let client = github_client(&server);

    let params = CallbackParams {
        code: Some("also-present".into()),
        error: Some("access_denied".into()),
        error_description: Some("The user has denied your application access.".into()),
        ..Default::default()
    };

    let err = client
        .handle_callback(&params, &CallbackOptions::default())
        .await
        .unwrap_err();
    assert_eq!(err.code(), "access_denied");
    assert_eq!(err.provider(), Some("github"));
    assert!(err.to_string().contains("denied your application"));
}

#[tokio::test]
async fn missing_code_fails_before_any_request() {
    let server = MockServer::start().await;
    let client = github_client(&server);

    let err = client
        .handle_callback(&RawRequest::new("/cb?state=abc"), &CallbackOptions::default())
        .await
        .unwrap_err();
    assert_eq!(err.code(), "missing_code");
    assert_eq!(err.provider(), Some("github"));
}

#[tokio::test]
async fn state_mismatch_blocks_the_token_exchange() {
    let server = MockServer::start().await;

    // The token endpoint must see zero requests.
    Mock::given(method("POST"))
        .and(path("/login/oauth/access_token"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "access_token": "never-issued"
        })))
        .expect(0)
        .mount(&server)
        .await;

    let err = github_client(&server)
        .handle_callback(
            &callback_query("good-code", Some("attacker-state")),
            &CallbackOptions {
                state: Some("expected-state".into()),
            },
        )
        .await
        .unwrap_err();
    assert_eq!(err.code(), "state_mismatch");
    assert_eq!(err.provider(), Some("github"));

    let err = github_client(&server)
        .handle_callback(
            &callback_query("good-code", None),
            &CallbackOptions {
                state: Some("expected-state".into()),
            },
        )
        .await
        .unwrap_err();
    assert_eq!(err.code(), "state_missing");
}

#[tokio::test]
async fn token_body_error_is_token_error_despite_200() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/login/oauth/access_token"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "error": "bad_verification_code",
            "error_description": "The code passed is incorrect or expired."
        })))
        .mount(&server)
        .await;

    let err = github_client(&server)
        .handle_callback(&callback_query("stale-code", None), &CallbackOptions::default())
        .await
        .unwrap_err();
    assert_eq!(err.code(), "token_error");
    assert_eq!(err.provider(), Some("github"));
    assert!(err.to_string().contains("incorrect or expired"));
}

#[tokio::test]
async fn token_response_without_access_token_is_token_error() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/token"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "token_type": "Bearer"
        })))
        .mount(&server)
        .await;

    let err = google_client(&server)
        .handle_callback(&callback_query("g-code", None), &CallbackOptions::default())
        .await
        .unwrap_err();
    assert_eq!(err.code(), "token_error");
    assert_eq!(err.provider(), Some("google"));
}

#[tokio::test]
async fn profile_http_error_is_surfaced() {
    let server = MockServer::start().await;
    mount_token(&server, "/login/oauth/access_token", "gho_bad").await;

    Mock::given(method("GET"))
        .and(path("/user"))
        .respond_with(ResponseTemplate::new(401).set_body_json(json!({
            "message": "Bad credentials"
        })))
        .mount(&server)
        .await;

    let err = github_client(&server)
        .handle_callback(&callback_query("good-code", None), &CallbackOptions::default())
        .await
        .unwrap_err();
    assert_eq!(err.code(), "http_error");
    assert_eq!(err.provider(), Some("github"));
    assert_eq!(err.http_status(), Some(401));
    assert!(err.to_string().contains("Bad credentials"));
}

#[tokio::test]
async fn unreachable_token_endpoint_is_network_error() {
    let provider = Github {
        // Nothing listens on port 1.
        token_endpoint: "http://127.0.0.1:1/token".into(),
        ..Github::default()
    };
    let client = ProviderClient::new(Box::new(provider), config()).unwrap();

    let err = client
        .handle_callback(&callback_query("good-code", None), &CallbackOptions::default())
        .await
        .unwrap_err();
    assert_eq!(err.code(), "network_error");
    assert_eq!(err.provider(), Some("github"));
}
