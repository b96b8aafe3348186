// Provider variants.
//
// Each variant is an independent `SocialProvider` implementation carrying
// its endpoints (overridable fields, so self-hosted deployments and tests
// can point them elsewhere), default scopes and profile normalization.

pub mod discord;
pub mod github;
pub mod google;

pub use discord::Discord;
pub use github::Github;
pub use google::Google;

use serde_json::Value;

/// Stringify a JSON id field. Providers disagree on whether ids are strings
/// or numbers; the normalized user always carries a string.
pub(crate) fn json_string(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}

/// Read `key` from a JSON object as a non-empty string.
pub(crate) fn non_empty(value: &Value, key: &str) -> Option<String> {
    value
        .get(key)
        .and_then(|v| v.as_str())
        .filter(|s| !s.is_empty())
        .map(str::to_string)
}
