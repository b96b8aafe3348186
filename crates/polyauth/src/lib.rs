#![doc = include_str!("../README.md")]

pub mod client;
pub mod flow;
pub mod http;
pub mod provider;
pub mod providers;
pub mod request;
pub mod state;
pub mod tokens;

// Re-exports
pub use client::{create, create_with, ProviderRegistry};
pub use flow::{CallbackOptions, ProviderClient, RedirectOptions};
pub use http::{HttpRequestor, RequestOptions};
pub use polyauth_core::error::{PolyauthError, Result};
pub use provider::{ProfileUser, ProviderConfig, SocialProvider};
pub use providers::{Discord, Github, Google};
pub use request::{CallbackParams, CallbackRequest, RawRequest};
pub use state::{generate_state, validate_state, DEFAULT_STATE_BYTES};
pub use tokens::{NormalizedUser, TokenResponse};
