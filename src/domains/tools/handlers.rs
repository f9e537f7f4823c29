//! Tool handler contract.
//!
//! A handler receives the validated [`InvocationRequest`], performs its one
//! outbound call, and returns the payload. Errors are returned, not thrown:
//! the registry converts them into failure descriptors.

use serde_json::Value;

use super::error::ExternalCallError;
use super::request::InvocationRequest;

/// Trait implemented by every tool handler.
///
/// Handlers are synchronous and keep no state between calls. Closures with
/// the matching signature implement it directly.
pub trait ToolHandler: Send + Sync {
    fn call(&self, request: &InvocationRequest) -> Result<Value, ExternalCallError>;
}

impl<F> ToolHandler for F
where
    F: Fn(&InvocationRequest) -> Result<Value, ExternalCallError> + Send + Sync,
{
    fn call(&self, request: &InvocationRequest) -> Result<Value, ExternalCallError> {
        self(request)
    }
}
