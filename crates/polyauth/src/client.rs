// Client factory: configuration map in, provider clients out.
//
// The set of known variants is an explicit `ProviderRegistry` value owned by
// the caller (or the built-in one), never a global. Registering a custom
// variant is just another entry; the factory and the flow never change.

use std::collections::HashMap;

use polyauth_core::error::{PolyauthError, Result};

use crate::flow::ProviderClient;
use crate::provider::{ProviderConfig, SocialProvider};
use crate::providers::{Discord, Github, Google};

/// Constructor for one provider variant.
pub type ProviderFactory = fn() -> Box<dyn SocialProvider>;

/// Explicit mapping from provider name to variant constructor.
#[derive(Debug, Clone)]
pub struct ProviderRegistry {
    factories: HashMap<&'static str, ProviderFactory>,
}

impl ProviderRegistry {
    /// An empty registry. Useful for hosts that want full control over the
    /// available variants.
    pub fn new() -> Self {
        Self {
            factories: HashMap::new(),
        }
    }

    /// The built-in variants: github, google, discord.
    pub fn builtin() -> Self {
        let mut registry = Self::new();
        registry.register("github", || Box::new(Github::new()));
        registry.register("google", || Box::new(Google::new()));
        registry.register("discord", || Box::new(Discord::new()));
        registry
    }

    pub fn register(&mut self, name: &'static str, factory: ProviderFactory) {
        self.factories.insert(name, factory);
    }

    /// Supported provider names, sorted for stable error messages.
    pub fn supported(&self) -> Vec<&'static str> {
        let mut names: Vec<_> = self.factories.keys().copied().collect();
        names.sort_unstable();
        names
    }

    fn build(&self, name: &str) -> Option<Box<dyn SocialProvider>> {
        self.factories.get(name).map(|factory| factory())
    }
}

impl Default for ProviderRegistry {
    fn default() -> Self {
        Self::new()
    }
}

/// Instantiate clients for every configured provider using the built-in
/// registry.
pub fn create(configs: HashMap<String, ProviderConfig>) -> Result<HashMap<String, ProviderClient>> {
    create_with(&ProviderRegistry::builtin(), configs)
}

/// Instantiate clients for every configured provider.
///
/// Fails with a `Config` error when the map is empty, when a name is not in
/// the registry (the message lists the supported names), or when an entry is
/// missing a required field.
pub fn create_with(
    registry: &ProviderRegistry,
    configs: HashMap<String, ProviderConfig>,
) -> Result<HashMap<String, ProviderClient>> {
    if configs.is_empty() {
        return Err(PolyauthError::Config {
            provider: None,
            message: "at least one provider must be configured".to_string(),
        });
    }

    let mut clients = HashMap::with_capacity(configs.len());
    for (name, config) in configs {
        let provider = registry.build(&name).ok_or_else(|| PolyauthError::Config {
            provider: Some(name.clone()),
            message: format!(
                "unknown provider \"{name}\", supported providers: {}",
                registry.supported().join(", ")
            ),
        })?;
        let client = ProviderClient::new(provider, config)?;
        clients.insert(name, client);
    }
    Ok(clients)
}
