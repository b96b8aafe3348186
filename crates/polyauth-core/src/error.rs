// Error taxonomy for the authorization-code flow.
//
// Every failure a flow operation can surface is one of these variants. Each
// variant carries the provider it is attributed to (absent only for
// configuration errors raised before any provider instance exists) and maps
// to a stable snake_case code via `code()`. Callers are expected to branch
// on codes, never on message text.

use std::error::Error as StdError;

/// Unified error type for all flow operations.
#[derive(Debug, thiserror::Error)]
pub enum PolyauthError {
    /// Invalid or incomplete configuration (missing credential fields,
    /// unknown provider name, empty provider map).
    #[error("{message}")]
    Config {
        provider: Option<String>,
        message: String,
    },

    /// The callback request matched none of the recognized shapes.
    #[error("unsupported request shape: no OAuth callback parameters could be extracted")]
    UnsupportedRequestShape { provider: Option<String> },

    /// The provider redirected back with an `error` parameter. The code is
    /// the provider's own token (e.g. `access_denied`), not a polyauth code.
    #[error("{message}")]
    AuthorizationDenied {
        provider: Option<String>,
        code: String,
        message: String,
    },

    /// The callback carried neither a `code` nor an `error`.
    #[error("authorization callback did not include a code")]
    MissingCode { provider: Option<String> },

    /// State validation was requested but one side was absent.
    #[error("state validation requires both an expected and a received value")]
    StateMissing { provider: Option<String> },

    /// The received state does not match the expected value.
    #[error("state parameter does not match the expected value")]
    StateMismatch { provider: Option<String> },

    /// The token endpoint answered with a logical error: an `error` field in
    /// the body (regardless of HTTP status) or a body without `access_token`.
    #[error("{message}")]
    Token {
        provider: Option<String>,
        message: String,
    },

    /// A non-success HTTP status from a provider endpoint.
    #[error("{message}")]
    Http {
        provider: Option<String>,
        status: u16,
        message: String,
    },

    /// A transport-level failure (DNS, connection, timeout) before any
    /// response was received.
    #[error("network request failed: {source}")]
    Network {
        provider: Option<String>,
        #[source]
        source: Box<dyn StdError + Send + Sync>,
    },
}

impl PolyauthError {
    /// Stable machine-readable code for programmatic branching.
    ///
    /// For `AuthorizationDenied` this is the provider's own denial token.
    pub fn code(&self) -> &str {
        match self {
            Self::Config { .. } => "config_error",
            Self::UnsupportedRequestShape { .. } => "unsupported_request_shape",
            Self::AuthorizationDenied { code, .. } => code,
            Self::MissingCode { .. } => "missing_code",
            Self::StateMissing { .. } => "state_missing",
            Self::StateMismatch { .. } => "state_mismatch",
            Self::Token { .. } => "token_error",
            Self::Http { .. } => "http_error",
            Self::Network { .. } => "network_error",
        }
    }

    /// The provider this error is attributed to, when known.
    pub fn provider(&self) -> Option<&str> {
        match self {
            Self::Config { provider, .. }
            | Self::UnsupportedRequestShape { provider }
            | Self::AuthorizationDenied { provider, .. }
            | Self::MissingCode { provider }
            | Self::StateMissing { provider }
            | Self::StateMismatch { provider }
            | Self::Token { provider, .. }
            | Self::Http { provider, .. }
            | Self::Network { provider, .. } => provider.as_deref(),
        }
    }

    /// The HTTP status for `Http` errors.
    pub fn http_status(&self) -> Option<u16> {
        match self {
            Self::Http { status, .. } => Some(*status),
            _ => None,
        }
    }

    /// Stamp a provider name onto an error that does not carry one yet.
    ///
    /// Helpers like the state validator and the HTTP requestor are provider
    /// agnostic; the orchestrator attributes their errors at the boundary.
    pub fn with_provider(mut self, name: &str) -> Self {
        let slot = match &mut self {
            Self::Config { provider, .. }
            | Self::UnsupportedRequestShape { provider }
            | Self::AuthorizationDenied { provider, .. }
            | Self::MissingCode { provider }
            | Self::StateMissing { provider }
            | Self::StateMismatch { provider }
            | Self::Token { provider, .. }
            | Self::Http { provider, .. }
            | Self::Network { provider, .. } => provider,
        };
        if slot.is_none() {
            *slot = Some(name.to_string());
        }
        self
    }

    /// Build the `{provider, code, message}` error object.
    pub fn to_json(&self) -> serde_json::Value {
        serde_json::json!({
            "provider": self.provider(),
            "code": self.code(),
            "message": self.to_string(),
        })
    }
}

/// Unified result type for polyauth operations.
pub type Result<T> = std::result::Result<T, PolyauthError>;
