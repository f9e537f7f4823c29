//! Declarative tool descriptors.
//!
//! A descriptor names a tool, lists the parameters it accepts, marks the
//! required subset, and states which credential the host must inject.
//! Descriptors are validated once at registration and never change after.

use std::collections::HashSet;
use std::fmt;

use serde::{Deserialize, Serialize};

use super::error::ToolError;

/// How the external provider authenticates requests.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum AuthType {
    #[serde(rename = "OAuth2")]
    OAuth2,
    #[serde(rename = "api_key")]
    ApiKey,
}

impl fmt::Display for AuthType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::OAuth2 => f.write_str("OAuth2"),
            Self::ApiKey => f.write_str("api_key"),
        }
    }
}

/// The credential a tool needs: provider, mechanism and the field the
/// host should read the token from.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct AuthRequirement {
    pub provider: String,
    pub auth_type: AuthType,
    pub auth_with: String,
}

impl AuthRequirement {
    pub fn new(
        provider: impl Into<String>,
        auth_type: AuthType,
        auth_with: impl Into<String>,
    ) -> Self {
        Self {
            provider: provider.into(),
            auth_type,
            auth_with: auth_with.into(),
        }
    }

    /// OAuth2 access token for `provider`.
    pub fn oauth2(provider: impl Into<String>) -> Self {
        Self::new(provider, AuthType::OAuth2, "access_token")
    }

    /// Static API key for `provider`.
    pub fn api_key(provider: impl Into<String>) -> Self {
        Self::new(provider, AuthType::ApiKey, "api_key")
    }
}

/// Metadata describing one registered tool.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ToolDescriptor {
    pub name: String,
    pub params: Vec<String>,
    pub required: Vec<String>,
    pub description: String,
    pub auth: AuthRequirement,
}

impl ToolDescriptor {
    /// Start a descriptor with no parameters.
    pub fn new(
        name: impl Into<String>,
        description: impl Into<String>,
        auth: AuthRequirement,
    ) -> Self {
        Self {
            name: name.into(),
            params: Vec::new(),
            required: Vec::new(),
            description: description.into(),
            auth,
        }
    }

    /// Declare the accepted parameters, in order.
    pub fn params<I, S>(mut self, params: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.params = params.into_iter().map(Into::into).collect();
        self
    }

    /// Mark the subset of parameters the host must supply.
    pub fn required<I, S>(mut self, required: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.required = required.into_iter().map(Into::into).collect();
        self
    }

    pub fn declares(&self, param: &str) -> bool {
        self.params.iter().any(|p| p == param)
    }

    /// Check the descriptor invariants.
    pub fn validate(&self) -> Result<(), ToolError> {
        if self.name.trim().is_empty() {
            return Err(ToolError::invalid_descriptor(
                &self.name,
                "tool name must not be empty",
            ));
        }

        let mut seen = HashSet::new();
        for param in &self.params {
            if !seen.insert(param.as_str()) {
                return Err(ToolError::invalid_descriptor(
                    &self.name,
                    format!("parameter '{}' declared more than once", param),
                ));
            }
        }

        let undeclared: Vec<&str> = self
            .required
            .iter()
            .filter(|r| !seen.contains(r.as_str()))
            .map(String::as_str)
            .collect();
        if !undeclared.is_empty() {
            return Err(ToolError::invalid_descriptor(
                &self.name,
                format!(
                    "required parameters not declared: {}",
                    undeclared.join(", ")
                ),
            ));
        }

        Ok(())
    }

    /// JSON schema for the tool input, one untyped property per parameter.
    pub fn input_schema(&self) -> serde_json::Map<String, serde_json::Value> {
        let properties: serde_json::Map<String, serde_json::Value> = self
            .params
            .iter()
            .map(|p| (p.clone(), serde_json::json!({})))
            .collect();

        let mut schema = serde_json::Map::new();
        schema.insert("type".to_string(), "object".into());
        schema.insert("properties".to_string(), properties.into());
        schema.insert("required".to_string(), serde_json::json!(self.required));
        schema
    }
}
