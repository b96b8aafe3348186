// Generic request/parse helper for provider endpoints.
//
// One entry point, `HttpRequestor::request`, covers every network call the
// flow makes: it merges the identifying default headers with the caller's,
// negotiates JSON vs. form-encoded response bodies, and classifies failures
// into `Http` (non-success status) and `Network` (transport) errors.

use polyauth_core::error::{PolyauthError, Result};
use reqwest::header::{HeaderMap, HeaderName, HeaderValue, ACCEPT, USER_AGENT};
use reqwest::{Method, StatusCode};
use serde_json::Value;

/// Sent with every request so providers can attribute traffic.
const DEFAULT_USER_AGENT: &str = "polyauth";

/// Options for a single request. `method` defaults to GET.
#[derive(Debug, Default)]
pub struct RequestOptions {
    pub method: Method,
    /// Bearer token for the `Authorization` header.
    pub bearer: Option<String>,
    /// Extra headers; these override the defaults on name collision.
    pub headers: Vec<(String, String)>,
    /// Form-encoded POST body.
    pub form: Option<Vec<(String, String)>>,
}

/// A thin wrapper over a shared `reqwest::Client`.
#[derive(Debug, Clone, Default)]
pub struct HttpRequestor {
    client: reqwest::Client,
}

impl HttpRequestor {
    pub fn new() -> Self {
        Self::default()
    }

    /// Issue a request and return the parsed response body.
    ///
    /// The body is parsed as JSON first, then as a form-encoded string
    /// (GitHub's token endpoint answers that way unless asked for JSON, and
    /// sometimes regardless). A non-success status yields `Http` with a
    /// best-effort message from known provider error fields; a transport
    /// failure yields `Network` wrapping the cause.
    pub async fn request(&self, url: &str, options: RequestOptions) -> Result<Value> {
        let mut headers = HeaderMap::new();
        headers.insert(USER_AGENT, HeaderValue::from_static(DEFAULT_USER_AGENT));
        headers.insert(ACCEPT, HeaderValue::from_static("application/json"));
        for (name, value) in &options.headers {
            if let (Ok(name), Ok(value)) = (
                HeaderName::from_bytes(name.as_bytes()),
                HeaderValue::from_str(value),
            ) {
                headers.insert(name, value);
            }
        }

        let mut request = self.client.request(options.method, url).headers(headers);
        if let Some(token) = &options.bearer {
            request = request.bearer_auth(token);
        }
        if let Some(form) = &options.form {
            request = request.form(form);
        }

        let response = request.send().await.map_err(|e| PolyauthError::Network {
            provider: None,
            source: Box::new(e),
        })?;

        let status = response.status();
        let text = response.text().await.map_err(|e| PolyauthError::Network {
            provider: None,
            source: Box::new(e),
        })?;
        let body = parse_body(&text);

        if !status.is_success() {
            tracing::debug!(%status, %url, "provider endpoint returned a non-success status");
            return Err(PolyauthError::Http {
                provider: None,
                status: status.as_u16(),
                message: error_message(&body, status),
            });
        }

        Ok(body)
    }
}

/// Parse a response body: JSON when it is JSON, otherwise decoded as a
/// form-encoded string into a flat object.
fn parse_body(text: &str) -> Value {
    match serde_json::from_str(text) {
        Ok(value) => value,
        Err(_) => {
            let mut map = serde_json::Map::new();
            for (key, value) in url::form_urlencoded::parse(text.as_bytes()) {
                map.insert(key.into_owned(), Value::String(value.into_owned()));
            }
            Value::Object(map)
        }
    }
}

/// Best-effort human message for a non-success response.
fn error_message(body: &Value, status: StatusCode) -> String {
    for key in ["error_description", "error", "message"] {
        if let Some(text) = body.get(key).and_then(|v| v.as_str()) {
            if !text.is_empty() {
                return text.to_string();
            }
        }
    }
    format!("HTTP {}", status.as_u16())
}
