//! REST API toolkits behind a tool registry.
//!
//! Tools are declared with a [`ToolDescriptor`](domains::tools::ToolDescriptor),
//! bound to a handler in a [`ToolRegistry`](domains::tools::ToolRegistry), and
//! invoked with named parameters plus an auth token injected by the host.
//! Handler failures come back as `{"error": ...}` data, never as errors.
//!
//! # Architecture
//!
//! - **core**: configuration, errors, credential store, MCP server and transports
//! - **domains::tools**: the registry, the invocation contract and the
//!   GitHub, HubSpot and Tavily toolkits
//!
//! # Example
//!
//! ```rust,no_run
//! use std::sync::Arc;
//! use atp_toolkits::core::{Config, CredentialStore, McpServer};
//! use atp_toolkits::domains::tools::{ReqwestClient, ToolRegistry, register_toolkits};
//!
//! fn main() -> atp_toolkits::Result<()> {
//!     let config = Config::from_env();
//!     let mut registry = ToolRegistry::new();
//!     register_toolkits(&mut registry, &config, Arc::new(ReqwestClient::new(&config.client)))?;
//!     let credentials = CredentialStore::from_env(registry.descriptors());
//!     let server = McpServer::new(config, Arc::new(registry), Arc::new(credentials));
//!     // Serve it with a TransportService...
//!     Ok(())
//! }
//! ```

pub mod core;
pub mod domains;

// Re-export commonly used types for convenience
pub use core::{Config, Error, McpServer, Result};
