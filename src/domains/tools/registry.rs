//! Tool Registry - central registration and dispatch for all tools.
//!
//! This module provides:
//! - Registration of descriptor/handler pairs, validated up front
//! - Lookup by name
//! - Invocation, which validates parameters, injects the auth token and
//!   turns every handler failure into a failure descriptor

use std::collections::BTreeMap;
use std::panic::{self, AssertUnwindSafe};

use serde_json::{Map, Value};
use tracing::{debug, info, warn};

use super::descriptor::ToolDescriptor;
use super::error::ToolError;
use super::handlers::ToolHandler;
use super::request::{AuthToken, InvocationRequest};
use super::result::InvocationResult;

/// A descriptor bound to its handler.
pub struct RegisteredTool {
    descriptor: ToolDescriptor,
    handler: Box<dyn ToolHandler>,
}

impl RegisteredTool {
    pub fn descriptor(&self) -> &ToolDescriptor {
        &self.descriptor
    }

    pub fn handler(&self) -> &dyn ToolHandler {
        self.handler.as_ref()
    }
}

/// Tool registry - holds every registered tool, keyed by name.
///
/// Populated at startup through `&mut self`, then shared read-only.
#[derive(Default)]
pub struct ToolRegistry {
    tools: BTreeMap<String, RegisteredTool>,
}

impl ToolRegistry {
    /// Create an empty tool registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Bind `handler` to `descriptor`.
    ///
    /// An existing binding with the same name is left untouched.
    pub fn register(
        &mut self,
        descriptor: ToolDescriptor,
        handler: impl ToolHandler + 'static,
    ) -> Result<(), ToolError> {
        descriptor.validate()?;

        if self.tools.contains_key(&descriptor.name) {
            return Err(ToolError::DuplicateTool(descriptor.name));
        }

        info!(
            "Registered tool {} (provider: {}, auth: {})",
            descriptor.name, descriptor.auth.provider, descriptor.auth.auth_type
        );
        self.tools.insert(
            descriptor.name.clone(),
            RegisteredTool {
                descriptor,
                handler: Box::new(handler),
            },
        );
        Ok(())
    }

    /// Find a tool by name.
    pub fn lookup(&self, name: &str) -> Result<&RegisteredTool, ToolError> {
        self.tools.get(name).ok_or_else(|| ToolError::unknown(name))
    }

    /// All descriptors, ordered by name.
    pub fn descriptors(&self) -> impl Iterator<Item = &ToolDescriptor> {
        self.tools.values().map(|t| &t.descriptor)
    }

    /// Get all tool names.
    pub fn tool_names(&self) -> Vec<&str> {
        self.tools.keys().map(String::as_str).collect()
    }

    pub fn len(&self) -> usize {
        self.tools.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tools.is_empty()
    }

    /// Invoke a tool.
    ///
    /// Returns `Err` only for problems with the call itself (unknown tool,
    /// missing required parameters). Anything that goes wrong inside the
    /// handler comes back as [`InvocationResult::Failure`].
    pub fn invoke(
        &self,
        name: &str,
        params: Map<String, Value>,
        auth_token: AuthToken,
    ) -> Result<InvocationResult, ToolError> {
        let tool = self.lookup(name).inspect_err(|_| {
            warn!("Unknown tool requested: {}", name);
        })?;
        let descriptor = &tool.descriptor;

        let missing: Vec<String> = descriptor
            .required
            .iter()
            .filter(|p| params.get(p.as_str()).is_none_or(Value::is_null))
            .cloned()
            .collect();
        if !missing.is_empty() {
            warn!("Tool {} called without {}", name, missing.join(", "));
            return Err(ToolError::MissingParameters {
                tool: name.to_string(),
                missing,
            });
        }

        let params: Map<String, Value> = params
            .into_iter()
            .filter(|(key, _)| {
                let declared = descriptor.declares(key);
                if !declared {
                    debug!("Dropping undeclared parameter '{}' for tool {}", key, name);
                }
                declared
            })
            .collect();

        info!("Invoking tool {}", name);
        let request = InvocationRequest::new(params, auth_token);
        let outcome = panic::catch_unwind(AssertUnwindSafe(|| tool.handler().call(&request)));

        let result = match outcome {
            Ok(Ok(payload)) => InvocationResult::success(payload),
            Ok(Err(e)) => {
                warn!("Tool {} failed: {}", name, e);
                InvocationResult::failure(e.to_string())
            }
            Err(panic) => {
                let message = panic
                    .downcast_ref::<&str>()
                    .map(|s| s.to_string())
                    .or_else(|| panic.downcast_ref::<String>().cloned())
                    .unwrap_or_else(|| "unknown panic".to_string());
                warn!("Tool {} panicked: {}", name, message);
                InvocationResult::failure(format!("Handler panicked: {}", message))
            }
        };

        Ok(result)
    }
}
