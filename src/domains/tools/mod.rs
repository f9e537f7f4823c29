//! Tools domain module.
//!
//! This module holds the tool registration and invocation contract, plus the
//! toolkits built on it.
//!
//! ## Architecture
//!
//! - `descriptor.rs` - Declarative tool metadata and its invariants
//! - `request.rs` / `result.rs` - What a handler receives and what a call returns
//! - `handlers.rs` - The `ToolHandler` trait
//! - `registry.rs` - Registration, lookup and invocation
//! - `outbound.rs` - HTTP client abstraction used by handlers
//! - `definitions/` - GitHub, HubSpot and Tavily toolkits (one file each)
//! - `router.rs` - rmcp ToolRouter built from the registry
//! - `error.rs` - Tool-specific error types
//!
//! ## Adding a New Tool
//!
//! 1. Add a method with the `ToolMethod` signature to a toolkit in `definitions/`
//! 2. Register a `ToolDescriptor` for it in that toolkit's `register()`
//!
//! The router and the server pick it up from the registry.

pub mod definitions;
pub mod descriptor;
mod error;
mod handlers;
pub mod outbound;
mod registry;
pub mod request;
pub mod result;
pub mod router;

pub use definitions::register_toolkits;
pub use descriptor::{AuthRequirement, AuthType, ToolDescriptor};
pub use error::{ExternalCallError, ToolError};
pub use handlers::ToolHandler;
pub use outbound::{HttpClient, HttpRequest, HttpResponse, Method, ReqwestClient};
pub use registry::{RegisteredTool, ToolRegistry};
pub use request::{AuthToken, InvocationRequest};
pub use result::{FailureDescriptor, InvocationResult};
pub use router::{build_tool_router, dispatch};
