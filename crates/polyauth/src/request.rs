// Callback request adaptation.
//
// The flow never assumes a host framework. A host hands `handle_callback`
// anything implementing `CallbackRequest`; implementations ship for the
// three common request representations (pre-parsed query map, a full URL,
// a raw URL string with headers), and a host with an exotic request type
// implements the trait itself, or extracts `CallbackParams` directly.

use std::collections::HashMap;

use polyauth_core::error::{PolyauthError, Result};
use url::Url;

/// Host used to absolutize path-only callback URLs when no `Host` header is
/// available.
pub const DEFAULT_HOST: &str = "localhost";

/// OAuth parameters extracted from a callback request. Derived per call,
/// never persisted.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CallbackParams {
    pub code: Option<String>,
    pub state: Option<String>,
    /// Provider-supplied denial code (e.g. `access_denied`).
    pub error: Option<String>,
    pub error_description: Option<String>,
}

/// A request representation the flow can extract OAuth parameters from.
pub trait CallbackRequest {
    fn callback_params(&self) -> Result<CallbackParams>;
}

/// Identity adapter: a host that already extracted the parameters passes
/// them through unchanged.
impl CallbackRequest for CallbackParams {
    fn callback_params(&self) -> Result<CallbackParams> {
        Ok(self.clone())
    }
}

/// A pre-parsed query mapping, e.g. a framework's query extractor.
impl CallbackRequest for HashMap<String, String> {
    fn callback_params(&self) -> Result<CallbackParams> {
        Ok(CallbackParams {
            code: self.get("code").cloned(),
            state: self.get("state").cloned(),
            error: self.get("error").cloned(),
            error_description: self.get("error_description").cloned(),
        })
    }
}

/// A fully parsed request URL.
impl CallbackRequest for Url {
    fn callback_params(&self) -> Result<CallbackParams> {
        Ok(params_from_url(self))
    }
}

/// A raw URL string (absolute or path-only) plus optional headers, as seen
/// by low-level HTTP servers. Path-only URLs are absolutized with the `Host`
/// header, falling back to [`DEFAULT_HOST`].
#[derive(Debug, Clone, Default)]
pub struct RawRequest {
    pub url: String,
    pub headers: HashMap<String, String>,
}

impl RawRequest {
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            headers: HashMap::new(),
        }
    }

    pub fn with_header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.insert(name.into(), value.into());
        self
    }

    fn host(&self) -> &str {
        self.headers
            .iter()
            .find(|(name, _)| name.eq_ignore_ascii_case("host"))
            .map(|(_, value)| value.as_str())
            .unwrap_or(DEFAULT_HOST)
    }
}

impl CallbackRequest for RawRequest {
    fn callback_params(&self) -> Result<CallbackParams> {
        let parsed = if self.url.starts_with("http://") || self.url.starts_with("https://") {
            Url::parse(&self.url)
        } else {
            let path = if self.url.starts_with('/') {
                self.url.clone()
            } else {
                format!("/{}", self.url)
            };
            Url::parse(&format!("http://{}{}", self.host(), path))
        };

        match parsed {
            Ok(url) => Ok(params_from_url(&url)),
            Err(_) => Err(PolyauthError::UnsupportedRequestShape { provider: None }),
        }
    }
}

fn params_from_url(url: &Url) -> CallbackParams {
    let mut params = CallbackParams::default();
    for (key, value) in url.query_pairs() {
        let slot = match key.as_ref() {
            "code" => &mut params.code,
            "state" => &mut params.state,
            "error" => &mut params.error,
            "error_description" => &mut params.error_description,
            _ => continue,
        };
        // First occurrence wins.
        if slot.is_none() {
            *slot = Some(value.into_owned());
        }
    }
    params
}
