//! Core module containing shared infrastructure components.
//!
//! Configuration, error handling, the host-side credential store, the MCP
//! server and its transports.

pub mod config;
pub mod credentials;
pub mod error;
pub mod server;
pub mod transport;

pub use config::Config;
pub use credentials::CredentialStore;
pub use error::{Error, Result};
pub use server::McpServer;
pub use transport::{TransportConfig, TransportService};
