//! Host-side credential store.
//!
//! Tools declare which credential they need (`AuthRequirement`); the host
//! resolves it here and injects the token into the invocation. Callers of a
//! tool never supply the token themselves.

use std::collections::HashMap;
use std::fmt;

use tracing::{info, warn};

use crate::domains::tools::{AuthRequirement, AuthToken, ToolDescriptor};

/// Tokens keyed by `(provider, auth_with)`.
#[derive(Clone, Default)]
pub struct CredentialStore {
    tokens: HashMap<(String, String), AuthToken>,
}

impl CredentialStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Environment variable holding the credential for `auth`,
    /// e.g. `ATP_GITHUB_ACCESS_TOKEN` or `ATP_TAVILY_API_KEY`.
    pub fn env_var(auth: &AuthRequirement) -> String {
        format!(
            "ATP_{}_{}",
            auth.provider.to_uppercase(),
            auth.auth_with.to_uppercase()
        )
    }

    /// Load a credential for every requirement the descriptors declare.
    pub fn from_env<'a>(descriptors: impl IntoIterator<Item = &'a ToolDescriptor>) -> Self {
        let mut store = Self::new();
        for descriptor in descriptors {
            let auth = &descriptor.auth;
            if store.resolve(auth).is_some() {
                continue;
            }

            let var = Self::env_var(auth);
            match std::env::var(&var) {
                Ok(token) if !token.is_empty() => {
                    info!("Credential for {} loaded from {}", auth.provider, var);
                    store.insert(auth, AuthToken::new(token));
                }
                _ => warn!(
                    "{} not set - {} tools will fail until a credential is configured",
                    var, auth.provider
                ),
            }
        }
        store
    }

    pub fn insert(&mut self, auth: &AuthRequirement, token: AuthToken) {
        self.tokens
            .insert((auth.provider.clone(), auth.auth_with.clone()), token);
    }

    pub fn with_token(mut self, auth: &AuthRequirement, token: impl Into<String>) -> Self {
        self.insert(auth, AuthToken::new(token));
        self
    }

    pub fn resolve(&self, auth: &AuthRequirement) -> Option<AuthToken> {
        self.tokens
            .get(&(auth.provider.clone(), auth.auth_with.clone()))
            .cloned()
    }
}

/// Custom Debug implementation to redact secrets from logs.
impl fmt::Debug for CredentialStore {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut keys: Vec<String> = self
            .tokens
            .keys()
            .map(|(provider, auth_with)| format!("{}:{}", provider, auth_with))
            .collect();
        keys.sort();
        f.debug_struct("CredentialStore")
            .field("credentials", &keys)
            .finish()
    }
}
